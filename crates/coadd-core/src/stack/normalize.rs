use std::fmt;

use ndarray::{Array2, Zip};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::consts::{BUNIT_FLUX, BUNIT_STDDEV};
use crate::error::{CoaddError, Result};

use super::{check_lengths, check_shape};

/// Units of the normalized coadd.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputUnits {
    /// Significance: stacked / sqrt(norm_factor).
    #[default]
    StdDev,
    /// Flux calibrated: stacked / norm_factor.
    Flux,
}

impl OutputUnits {
    /// Map the `flux_units` switch onto a unit choice.
    pub fn from_flux_units(flux_units: bool) -> Self {
        if flux_units {
            Self::Flux
        } else {
            Self::StdDev
        }
    }

    /// FITS `BUNIT` value for this unit choice.
    pub fn bunit(&self) -> &'static str {
        match self {
            Self::StdDev => BUNIT_STDDEV,
            Self::Flux => BUNIT_FLUX,
        }
    }
}

impl fmt::Display for OutputUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StdDev => write!(f, "Standard deviation"),
            Self::Flux => write!(f, "Flux"),
        }
    }
}

/// How the per-exposure PSF energy term `psf · psf` is formed.
///
/// `MatrixProduct` is the row-by-column product of the PSF with itself and is
/// the default. `Elementwise` squares each pixel, which is the textbook
/// power-spectrum energy term; it is only used when asked for explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsfEnergy {
    #[default]
    MatrixProduct,
    Elementwise,
}

impl fmt::Display for PsfEnergy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatrixProduct => write!(f, "Matrix product"),
            Self::Elementwise => write!(f, "Element-wise"),
        }
    }
}

/// Energy term of one PSF.
pub fn psf_energy_term(psf: &Array2<f64>, energy: PsfEnergy) -> Array2<f64> {
    match energy {
        PsfEnergy::MatrixProduct => psf.dot(psf),
        PsfEnergy::Elementwise => psf * psf,
    }
}

/// Per-pixel normalization factor `Σᵢ (flux_zpᵢ² / varianceᵢ) · (psfᵢ · psfᵢ)`.
pub fn norm_factor(
    psfs: &[Array2<f64>],
    variances: &[f64],
    flux_zps: &[f64],
    energy: PsfEnergy,
) -> Result<Array2<f64>> {
    check_lengths(psfs.len(), psfs.len(), variances.len(), flux_zps.len())?;

    let shape = psfs[0].dim();
    let mut norm = Array2::<f64>::zeros(shape);

    for (i, psf) in psfs.iter().enumerate() {
        let (rows, cols) = psf.dim();
        if energy == PsfEnergy::MatrixProduct && rows != cols {
            return Err(CoaddError::NonSquarePsf {
                index: i,
                rows,
                cols,
            });
        }
        check_shape(format!("PSF {i}"), shape, psf.dim())?;

        let weight = flux_zps[i] * flux_zps[i] / variances[i];
        norm.scaled_add(weight, &psf_energy_term(psf, energy));
    }

    Ok(norm)
}

/// Normalize a stacked image to flux or significance units.
///
/// Divides `stacked` element-wise by the normalization factor (`Flux`) or by
/// its square root (`StdDev`). Zero factors give infinities and negative
/// factors give NaN at the square root; neither is treated as an error.
pub fn normalize_stacked_image(
    stacked: &Array2<Complex<f64>>,
    psfs: &[Array2<f64>],
    variances: &[f64],
    flux_zps: &[f64],
    units: OutputUnits,
    energy: PsfEnergy,
) -> Result<Array2<Complex<f64>>> {
    let norm = norm_factor(psfs, variances, flux_zps, energy)?;
    check_shape("normalization factor".to_string(), stacked.dim(), norm.dim())?;

    let divisor = match units {
        OutputUnits::Flux => norm,
        OutputUnits::StdDev => norm.mapv(f64::sqrt),
    };

    Ok(Zip::from(stacked)
        .and(&divisor)
        .map_collect(|&s, &d| s / d))
}
