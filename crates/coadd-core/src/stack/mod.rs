pub mod normalize;
pub mod zogy;

use ndarray::Array2;
use num_complex::Complex;

use crate::error::{CoaddError, Result};

pub use normalize::{
    norm_factor, normalize_stacked_image, psf_energy_term, OutputUnits, PsfEnergy,
};
pub use zogy::stack_images;

/// Real part of a complex coadd.
pub fn real_part(data: &Array2<Complex<f64>>) -> Array2<f64> {
    data.mapv(|v| v.re)
}

/// Largest absolute imaginary component among finite pixels.
pub fn max_imaginary_residual(data: &Array2<Complex<f64>>) -> f64 {
    data.iter()
        .filter(|v| v.is_finite())
        .map(|v| v.im.abs())
        .fold(0.0, f64::max)
}

/// Number of pixels with an infinite or NaN component.
pub fn count_non_finite(data: &Array2<Complex<f64>>) -> usize {
    data.iter().filter(|v| !v.is_finite()).count()
}

pub(crate) fn check_lengths(
    images: usize,
    psfs: usize,
    variances: usize,
    flux_zps: usize,
) -> Result<()> {
    if images != psfs || images != variances || images != flux_zps {
        return Err(CoaddError::LengthMismatch {
            images,
            psfs,
            variances,
            flux_zps,
        });
    }
    if images == 0 {
        return Err(CoaddError::EmptySequence);
    }
    Ok(())
}

pub(crate) fn check_shape(
    what: String,
    expected: (usize, usize),
    found: (usize, usize),
) -> Result<()> {
    if expected != found {
        return Err(CoaddError::ShapeMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}
