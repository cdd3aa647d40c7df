use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SKY_SIGMA_KEY, DEFAULT_ZP_KEY};
use crate::error::{CoaddError, Result};
use crate::io::fits;
use crate::stack::{OutputUnits, PsfEnergy};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoaddConfig {
    /// Aligned input images, one per exposure.
    pub images: Vec<PathBuf>,
    /// PSF files, parallel to `images`.
    pub psfs: Vec<PathBuf>,
    pub output: PathBuf,
    #[serde(default)]
    pub header: HeaderKeyConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
}

impl CoaddConfig {
    /// Check that images and PSFs pair up one-to-one.
    pub fn validate(&self) -> Result<()> {
        if self.images.is_empty() {
            return Err(CoaddError::EmptySequence);
        }
        if self.images.len() != self.psfs.len() {
            return Err(CoaddError::Config(format!(
                "{} images but {} PSFs",
                self.images.len(),
                self.psfs.len()
            )));
        }
        Ok(())
    }
}

/// Names of the header keywords carrying the calibration of each image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderKeyConfig {
    pub zero_point: String,
    /// Keyword holding the sky standard deviation; variance is its square.
    pub sky_sigma: String,
}

impl Default for HeaderKeyConfig {
    fn default() -> Self {
        Self {
            zero_point: DEFAULT_ZP_KEY.to_string(),
            sky_sigma: DEFAULT_SKY_SIGMA_KEY.to_string(),
        }
    }
}

impl HeaderKeyConfig {
    pub fn as_keys(&self) -> fits::HeaderKeys<'_> {
        fits::HeaderKeys {
            zero_point: &self.zero_point,
            sky_sigma: &self.sky_sigma,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default)]
    pub units: OutputUnits,
    #[serde(default)]
    pub psf_energy: PsfEnergy,
}
