//! Generate command - run the batch driver over a record file
//!
//! Resolves, fetches and reduces a subgraph for every record, writing
//! intermediate checkpoints every `flush_interval` records and a final
//! artifact at the end.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};

use evigraph_engine::{
    build_pipeline, load_records, BatchDriver, BatchEvent, BatchSummary, EngineConfig,
};

use super::BackendArgs;
use crate::output::{Output, OutputFormat, TableDisplay, TableOutput};

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Record file: a JSON object keyed by record id
    pub input: PathBuf,

    /// Directory for the final artifact (intermediates go to <dir>/intermediate)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Records between intermediate checkpoints
    #[arg(long)]
    pub flush_interval: Option<usize>,

    /// Neighborhood fetches in flight
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Records processed concurrently
    #[arg(long)]
    pub record_concurrency: Option<usize>,

    /// Process only the first N records
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    #[command(flatten)]
    pub backend: BackendArgs,
}

impl GenerateArgs {
    /// Apply command-line overrides to the loaded configuration.
    pub fn apply(&self, config: &mut EngineConfig) {
        self.backend.apply(config);
        if let Some(dir) = &self.output_dir {
            config.batch.output_dir = dir.clone();
            config.batch.intermediate_dir = dir.join("intermediate");
        }
        if let Some(n) = self.flush_interval {
            config.batch.flush_interval = n;
        }
        if let Some(n) = self.concurrency {
            config.fetch.concurrency = n;
        }
        if let Some(n) = self.record_concurrency {
            config.batch.record_concurrency = n;
        }
        if self.limit.is_some() {
            config.batch.limit = self.limit;
        }
    }
}

/// Result of a generate run
#[derive(Debug, Serialize)]
pub struct GenerateReport {
    #[serde(flatten)]
    pub summary: BatchSummary,
    pub duration_secs: f64,
}

impl TableDisplay for GenerateReport {
    fn to_table(&self) -> String {
        let s = &self.summary;
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Batch complete".green().bold()));

        let pairs = [
            ("run", s.run_id.to_string()),
            ("attempted", s.attempted.to_string()),
            ("succeeded", s.succeeded.to_string()),
            ("failed", s.failed.to_string()),
            ("checkpoints", s.checkpoints.len().to_string()),
            ("final artifact", s.final_artifact.display().to_string()),
            ("duration", format!("{:.1}s", self.duration_secs)),
        ];
        output.push_str(&TableOutput::key_value(&pairs));

        if s.failed > 0 {
            output.push_str(&format!(
                "\n{} {} record(s) failed and were omitted; rerun with -v for details",
                "warning:".yellow().bold(),
                s.failed
            ));
        }
        output
    }
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Drive the progress bar from batch events until the run finishes.
async fn track_progress(mut events: broadcast::Receiver<BatchEvent>, bar: ProgressBar) {
    let mut failed = 0usize;
    loop {
        match events.recv().await {
            Ok(BatchEvent::Started { total, .. }) => bar.set_length(total as u64),
            Ok(BatchEvent::RecordCompleted { key, .. }) => {
                bar.set_message(key);
                bar.inc(1);
            }
            Ok(BatchEvent::RecordFailed { .. }) => {
                failed += 1;
                bar.set_message(format!("{} failed", failed));
                bar.inc(1);
            }
            Ok(BatchEvent::CheckpointWritten { path, records }) => {
                bar.println(format!("  wrote {} ({} records)", path.display(), records));
            }
            Ok(BatchEvent::Finished(_)) | Err(RecvError::Closed) => break,
            Err(RecvError::Lagged(skipped)) => bar.inc(skipped),
        }
    }
    bar.finish_and_clear();
}

/// Run the generate command
pub async fn run(
    args: GenerateArgs,
    mut config: EngineConfig,
    quiet: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }
    let records = load_records(&args.input)?;
    tracing::info!(path = %args.input.display(), records = records.len(), "Loaded records");

    let backends = args.backend.backends(&config)?;
    let pipeline = build_pipeline(&config, backends)?;
    let mut driver = BatchDriver::new(Arc::new(pipeline), &config.batch);

    let total = config
        .batch
        .limit
        .map_or(records.len(), |limit| limit.min(records.len()));
    let visible = !quiet && !args.no_progress && format == OutputFormat::Table && crate::output::is_tty();
    let progress = tokio::spawn(track_progress(driver.subscribe(), progress_bar(total, visible)));

    let summary = driver.run(records).await;
    drop(driver);
    progress.await?;

    let summary = summary?;
    let report = GenerateReport {
        duration_secs: summary.duration_secs(),
        summary,
    };
    Output::new(report, format).render()
}
