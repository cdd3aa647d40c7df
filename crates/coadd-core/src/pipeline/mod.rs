pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{run_coadd, run_coadd_reported};
pub use types::{CoaddOutput, PipelineStage, ProgressReporter};
