use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Result;
use crate::exposure::ExposureSet;
use crate::io::fits::{load_exposure, write_coadd};
use crate::stack::{
    count_non_finite, max_imaginary_residual, normalize_stacked_image, real_part, stack_images,
};

use super::config::CoaddConfig;
use super::types::{CoaddOutput, NoOpReporter, PipelineStage, ProgressReporter};

/// Run the coadd: load every exposure, stack, normalize, write the real part.
pub fn run_coadd(config: &CoaddConfig) -> Result<CoaddOutput> {
    run_coadd_reported(config, Arc::new(NoOpReporter))
}

/// Run the coadd with a thread-safe progress reporter.
///
/// Nothing is written unless loading, stacking and normalizing all succeed.
pub fn run_coadd_reported(
    config: &CoaddConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<CoaddOutput> {
    config.validate()?;
    let total = config.images.len();
    info!(exposures = total, "Reading exposures");

    reporter.begin_stage(PipelineStage::Reading, Some(total));
    let keys = config.header.as_keys();
    let mut exposures = Vec::with_capacity(total);
    for (i, (image_path, psf_path)) in config.images.iter().zip(&config.psfs).enumerate() {
        exposures.push(load_exposure(image_path, psf_path, &keys)?);
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    if let Some(zero) = exposures.iter().find(|e| e.variance() == 0.0) {
        warn!(
            path = %zero.path.display(),
            "Sky sigma is zero; coadd will contain non-finite pixels"
        );
    }

    let (width, height) = (exposures[0].width(), exposures[0].height());
    let set: ExposureSet = exposures.into_iter().collect();

    reporter.begin_stage(PipelineStage::Stacking, None);
    let stacked = stack_images(&set.images, &set.psfs, &set.variances, &set.flux_zps)?;
    reporter.finish_stage();
    info!(height, width, "Stacking complete");

    let units = config.normalization.units;
    let energy = config.normalization.psf_energy;
    reporter.begin_stage(PipelineStage::Normalizing, None);
    let normalized = normalize_stacked_image(
        &stacked,
        &set.psfs,
        &set.variances,
        &set.flux_zps,
        units,
        energy,
    )?;
    reporter.finish_stage();

    let residual = max_imaginary_residual(&normalized);
    let non_finite = count_non_finite(&normalized);
    info!(units = %units, psf_energy = %energy, residual, "Normalization complete");
    if non_finite > 0 {
        warn!(pixels = non_finite, "Coadd contains non-finite pixels");
    }

    reporter.begin_stage(PipelineStage::Writing, None);
    write_coadd(&config.output, &real_part(&normalized), units)?;
    reporter.finish_stage();
    info!(output = %config.output.display(), "Coadd saved");

    Ok(CoaddOutput {
        image: normalized,
        units,
        exposure_count: set.len(),
        max_imaginary_residual: residual,
        non_finite_pixels: non_finite,
    })
}
