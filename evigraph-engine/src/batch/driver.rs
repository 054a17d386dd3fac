//! Batch driver: runs every record, accumulates results, flushes checkpoints.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::checkpoint::{BatchResults, CheckpointWriter};
use crate::config::BatchConfig;
use crate::error::Result;
use crate::pipeline::RecordProcessor;
use crate::record::Record;

/// Capacity of the event channel. Slow subscribers lag rather than block.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    Pending,
    Fetching,
    Aggregating,
    Flushing,
    Done,
}

/// Progress events broadcast while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Run started
    Started { run_id: Uuid, total: usize },
    /// A record produced a result
    RecordCompleted {
        key: String,
        steiner_len: usize,
        largest_len: usize,
    },
    /// A record failed and was omitted
    RecordFailed { key: String, error: String },
    /// An artifact was written
    CheckpointWritten { path: PathBuf, records: usize },
    /// Run finished
    Finished(BatchSummary),
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Intermediate artifacts, in write order.
    pub checkpoints: Vec<PathBuf>,
    pub final_artifact: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Drives a [`RecordProcessor`] over a record list.
///
/// The accumulator is owned by the driver loop; it is flushed to an
/// intermediate artifact every `flush_interval` attempted records and
/// cleared, so memory stays bounded by the interval. Failed records count
/// towards the cadence but are omitted from artifacts.
pub struct BatchDriver {
    processor: Arc<dyn RecordProcessor>,
    flush_interval: usize,
    record_concurrency: usize,
    limit: Option<usize>,
    writer: CheckpointWriter,
    events: broadcast::Sender<BatchEvent>,
    state: DriverState,
}

impl BatchDriver {
    pub fn new(processor: Arc<dyn RecordProcessor>, config: &BatchConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            processor,
            flush_interval: config.flush_interval.max(1),
            record_concurrency: config.record_concurrency.max(1),
            limit: config.limit,
            writer: CheckpointWriter::new(&config.output_dir, &config.intermediate_dir),
            events,
            state: DriverState::Pending,
        }
    }

    /// Subscribe to batch events.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.events.subscribe()
    }

    /// Broadcast a batch event.
    fn broadcast(&self, event: BatchEvent) {
        let _ = self.events.send(event);
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn run_id(&self) -> Uuid {
        self.writer.run_id()
    }

    /// Process every record (or the first `limit`).
    ///
    /// Artifacts an earlier run left in the same directories are removed
    /// first. Per-record failures are logged and skipped. Only a checkpoint
    /// failure ends the run early.
    pub async fn run(&mut self, mut records: Vec<Record>) -> Result<BatchSummary> {
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }

        let started_at = Utc::now();
        let run_id = self.writer.run_id();
        let total = records.len();
        info!(%run_id, total, flush_interval = self.flush_interval, "Starting batch run");
        self.writer.clear_stale().await?;
        self.broadcast(BatchEvent::Started { run_id, total });

        let processor = Arc::clone(&self.processor);
        let mut results = stream::iter(records)
            .map(move |record| {
                let processor = Arc::clone(&processor);
                async move {
                    let result = processor.process(&record).await;
                    (record.key, result)
                }
            })
            .buffer_unordered(self.record_concurrency);

        let mut accumulator = BatchResults::new();
        let mut checkpoints = Vec::new();
        let mut attempted = 0usize;
        let mut succeeded = 0usize;

        loop {
            self.state = DriverState::Fetching;
            let Some((key, result)) = results.next().await else {
                break;
            };
            self.state = DriverState::Aggregating;
            attempted += 1;

            match result {
                Ok(record_result) => {
                    succeeded += 1;
                    debug!(key = %key, steiner = record_result.steiner_len, "Record completed");
                    self.broadcast(BatchEvent::RecordCompleted {
                        key: key.clone(),
                        steiner_len: record_result.steiner_len,
                        largest_len: record_result.largest_len,
                    });
                    accumulator.insert(key, record_result);
                }
                Err(e) => {
                    error!(key = %key, error = %e, "Error processing record");
                    self.broadcast(BatchEvent::RecordFailed {
                        key,
                        error: e.to_string(),
                    });
                }
            }

            if attempted % self.flush_interval == 0 {
                self.state = DriverState::Flushing;
                let path = self.writer.write_intermediate(&accumulator).await?;
                self.broadcast(BatchEvent::CheckpointWritten {
                    path: path.clone(),
                    records: accumulator.len(),
                });
                checkpoints.push(path);
                accumulator.clear();
                self.state = DriverState::Pending;
            }
        }

        self.state = DriverState::Flushing;
        let final_artifact = self.writer.write_final(&accumulator).await?;
        self.broadcast(BatchEvent::CheckpointWritten {
            path: final_artifact.clone(),
            records: accumulator.len(),
        });
        accumulator.clear();
        self.state = DriverState::Done;

        let summary = BatchSummary {
            run_id,
            attempted,
            succeeded,
            failed: attempted - succeeded,
            checkpoints,
            final_artifact,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            %run_id,
            attempted,
            succeeded,
            failed = summary.failed,
            checkpoints = summary.checkpoints.len(),
            "Batch run finished"
        );
        self.broadcast(BatchEvent::Finished(summary.clone()));
        Ok(summary)
    }
}
