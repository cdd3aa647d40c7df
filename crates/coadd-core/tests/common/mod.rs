#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::Array2;
use num_complex::Complex;

use coadd_core::consts::{DEFAULT_SKY_SIGMA_KEY, DEFAULT_ZP_KEY};
use coadd_core::io::fits::write_image;

/// Deterministic, strictly positive test image.
pub fn test_image(h: usize, w: usize, seed: usize) -> Array2<f64> {
    Array2::from_shape_fn((h, w), |(r, c)| {
        ((r * 7 + c * 13 + seed * 5) % 17) as f64 / 17.0 + 0.1
    })
}

/// PSF that is one at the origin and zero elsewhere.
pub fn delta_psf(h: usize, w: usize) -> Array2<f64> {
    let mut psf = Array2::zeros((h, w));
    psf[[0, 0]] = 1.0;
    psf
}

/// Identity matrix used as a (square) PSF.
pub fn identity_psf(n: usize) -> Array2<f64> {
    Array2::eye(n)
}

/// Gaussian PSF centered at (0,0) with wrap-around, normalized to sum=1.
/// Every entry is positive, so its matrix square is positive too.
pub fn gaussian_psf(n: usize, sigma: f64) -> Array2<f64> {
    let wrap = |i: usize| {
        if i <= n / 2 {
            i as f64
        } else {
            i as f64 - n as f64
        }
    };
    let sigma2 = 2.0 * sigma * sigma;
    let psf = Array2::from_shape_fn((n, n), |(r, c)| {
        let (y, x) = (wrap(r), wrap(c));
        (-(x * x + y * y) / sigma2).exp()
    });
    let sum = psf.sum();
    psf / sum
}

pub fn assert_complex_close(a: &Array2<Complex<f64>>, b: &Array2<Complex<f64>>, tol: f64) {
    assert_eq!(a.dim(), b.dim());
    for ((idx, x), y) in a.indexed_iter().zip(b.iter()) {
        assert!(
            (x - y).norm() < tol,
            "mismatch at {idx:?}: {x} vs {y}"
        );
    }
}

/// Write an exposure image with the default calibration keywords.
pub fn write_exposure(dir: &Path, name: &str, image: &Array2<f64>, zp: f64, sky: f64) -> PathBuf {
    let path = dir.join(name);
    write_image(&path, image, &[(DEFAULT_ZP_KEY, zp), (DEFAULT_SKY_SIGMA_KEY, sky)])
        .expect("write exposure FITS");
    path
}

/// Write a PSF with no header keywords.
pub fn write_psf(dir: &Path, name: &str, psf: &Array2<f64>) -> PathBuf {
    let path = dir.join(name);
    write_image(&path, psf, &[]).expect("write PSF FITS");
    path
}
