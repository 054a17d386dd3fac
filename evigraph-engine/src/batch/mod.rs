//! Checkpointed batch processing over many records.

mod checkpoint;
mod driver;

pub use checkpoint::{read_artifact, BatchResults, CheckpointWriter, FINAL_ARTIFACT};
pub use driver::{BatchDriver, BatchEvent, BatchSummary, DriverState};
