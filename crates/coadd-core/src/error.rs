use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoaddError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::compat::errors::Error),

    #[error("Missing header keyword {key} in {}", .path.display())]
    MissingKeyword { path: PathBuf, key: String },

    #[error("Invalid image dimensions in {}: expected 2 axes, found {naxis}", .path.display())]
    InvalidDimensions { path: PathBuf, naxis: usize },

    #[error("{what} shape {found:?} does not match image shape {expected:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Input length mismatch: {images} images, {psfs} PSFs, {variances} variances, {flux_zps} zero points")]
    LengthMismatch {
        images: usize,
        psfs: usize,
        variances: usize,
        flux_zps: usize,
    },

    #[error("PSF {index} is not square ({rows}x{cols}); matrix energy needs a square PSF")]
    NonSquarePsf {
        index: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Empty exposure sequence")]
    EmptySequence,

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CoaddError>;
