use ndarray::{Array2, Zip};
use num_complex::Complex;
use rayon::prelude::*;
use tracing::debug;

use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::Result;
use crate::fft::{fft2d_forward, ifft2d_inverse};

use super::{check_lengths, check_shape};

/// Coadd aligned images with the Zackay & Ofek (2017) optimal weighting.
///
/// Computes `IFFT2D( Σᵢ (flux_zpᵢ / varianceᵢ) · FFT2D(psfᵢ) · FFT2D(imageᵢ) )`,
/// where the product of the two spectra is element-wise. The transform size is
/// the shape of the first image; every image and PSF must share it.
///
/// The result is complex. Mathematically it is real, so the imaginary part is
/// FFT round-off only; use [`super::real_part`] to get the image.
///
/// A zero variance is not rejected: its weight becomes infinite and the
/// non-finite values propagate through the sum. Callers must supply strictly
/// positive variances to get a finite result.
pub fn stack_images(
    images: &[Array2<f64>],
    psfs: &[Array2<f64>],
    variances: &[f64],
    flux_zps: &[f64],
) -> Result<Array2<Complex<f64>>> {
    check_lengths(images.len(), psfs.len(), variances.len(), flux_zps.len())?;

    let shape = images[0].dim();
    for (i, (image, psf)) in images.iter().zip(psfs).enumerate() {
        check_shape(format!("image {i}"), shape, image.dim())?;
        check_shape(format!("PSF {i}"), shape, psf.dim())?;
    }

    let weighted_spectrum = |i: usize| -> Array2<Complex<f64>> {
        let weight = flux_zps[i] / variances[i];
        let psf_fft = fft2d_forward(&psfs[i]);
        let mut term = fft2d_forward(&images[i]);
        Zip::from(&mut term)
            .and(&psf_fft)
            .for_each(|t, &p| *t = p * *t * weight);
        debug!(index = i, weight, "Exposure spectrum weighted");
        term
    };

    let n = images.len();
    let stacked_fft = if n >= PARALLEL_FRAME_THRESHOLD {
        (0..n)
            .into_par_iter()
            .map(weighted_spectrum)
            .reduce(|| Array2::zeros(shape), |acc, term| acc + term)
    } else {
        (0..n)
            .map(weighted_spectrum)
            .fold(Array2::zeros(shape), |acc, term| acc + term)
    };

    Ok(ifft2d_inverse(&stacked_fft))
}
