use ndarray::Array2;
use num_complex::Complex;

use crate::stack::OutputUnits;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    Stacking,
    Normalizing,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading exposures"),
            Self::Stacking => write!(f, "Stacking"),
            Self::Normalizing => write!(f, "Normalizing"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Result of a coadd run.
#[derive(Clone, Debug)]
pub struct CoaddOutput {
    /// Normalized coadd, still complex.
    pub image: Array2<Complex<f64>>,
    pub units: OutputUnits,
    pub exposure_count: usize,
    /// Largest |imaginary| left over from the FFT round trip.
    pub max_imaginary_residual: f64,
    pub non_finite_pixels: usize,
}

/// Thread-safe progress reporting for the pipeline.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., exposure count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_coadd` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
