//! FITS reading of exposures and PSFs, and writing of the finished coadd.
//!
//! Pixels are read from the first HDU holding a two-axis image, which is the
//! primary HDU for classic files and an image extension for files written here
//! or by most survey pipelines. Header keywords are looked up in that HDU first,
//! then in the primary header. Pixel rows are kept in storage order, so an image
//! read and written back keeps its orientation.

use std::path::Path;

use fitsio::compat::fitsfile::FitsFile;
use fitsio::compat::hdu::{FitsHdu, HduInfo};
use fitsio::compat::headers::ReadsKey;
use fitsio::compat::images::{ImageDescription, ImageType, ReadImage, WriteImage};
use ndarray::Array2;
use tracing::debug;

use crate::error::{CoaddError, Result};
use crate::exposure::Exposure;
use crate::stack::OutputUnits;

const PRIMARY_HDU: usize = 0;
const IMAGE_EXTNAME: &str = "COADD";

/// Header keywords holding per-exposure calibration values.
#[derive(Clone, Debug)]
pub struct HeaderKeys<'a> {
    pub zero_point: &'a str,
    pub sky_sigma: &'a str,
}

/// An open file positioned on its image HDU, with the image shape as (height, width).
struct ImageHdu {
    fptr: FitsFile,
    hdu: FitsHdu,
    height: usize,
    width: usize,
}

fn open_image_hdu(path: &Path) -> Result<ImageHdu> {
    let fptr = FitsFile::open(path)?;

    // Axis count of the first non-empty image, reported when none is 2-D
    let mut first_naxis = None;
    for hdu in fptr.iter()? {
        let HduInfo::ImageInfo { shape, .. } = hdu.info(&fptr)? else {
            continue;
        };
        if shape.is_empty() || shape.iter().product::<usize>() == 0 {
            continue;
        }
        if let [width, height] = shape[..] {
            return Ok(ImageHdu {
                fptr,
                hdu,
                height,
                width,
            });
        }
        first_naxis.get_or_insert(shape.len());
    }

    Err(CoaddError::InvalidDimensions {
        path: path.to_path_buf(),
        naxis: first_naxis.unwrap_or(0),
    })
}

fn read_key<T: ReadsKey>(fptr: &FitsFile, hdu: &FitsHdu, path: &Path, key: &str) -> Result<T> {
    hdu.read_key::<T>(fptr, key)
        .or_else(|_| fptr.hdu(PRIMARY_HDU)?.read_key::<T>(fptr, key))
        .map_err(|_| CoaddError::MissingKeyword {
            path: path.to_path_buf(),
            key: key.to_string(),
        })
}

/// Read the image as a (NAXIS2, NAXIS1) array.
pub fn read_image(path: &Path) -> Result<Array2<f64>> {
    let ImageHdu {
        fptr,
        hdu,
        height,
        width,
    } = open_image_hdu(path)?;

    let pixels = f64::read_image(&fptr, &hdu)?;
    let found = pixels.len();
    let data = Array2::from_shape_vec((height, width), pixels).map_err(|_| {
        CoaddError::ShapeMismatch {
            what: format!("pixel data of {} ({found} values)", path.display()),
            expected: (height, width),
            found: (found, 1),
        }
    })?;

    debug!(path = %path.display(), height, width, "FITS image read");
    Ok(data)
}

/// Read a numeric keyword from the image header.
pub fn read_header_f64(path: &Path, key: &str) -> Result<f64> {
    let image = open_image_hdu(path)?;
    read_key(&image.fptr, &image.hdu, path, key)
}

/// Read a numeric keyword, returning `None` when it is absent.
pub fn read_header_f64_optional(path: &Path, key: &str) -> Result<Option<f64>> {
    match read_header_f64(path, key) {
        Ok(value) => Ok(Some(value)),
        Err(CoaddError::MissingKeyword { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read a string keyword from the image header.
pub fn read_header_string(path: &Path, key: &str) -> Result<String> {
    let image = open_image_hdu(path)?;
    read_key(&image.fptr, &image.hdu, path, key)
}

/// Load an image, its PSF, and the calibration keywords from the image header.
pub fn load_exposure(
    image_path: &Path,
    psf_path: &Path,
    keys: &HeaderKeys<'_>,
) -> Result<Exposure> {
    let image = read_image(image_path)?;

    let ImageHdu { fptr, hdu, .. } = open_image_hdu(image_path)?;
    let flux_zp = read_key(&fptr, &hdu, image_path, keys.zero_point)?;
    let sky_sigma = read_key(&fptr, &hdu, image_path, keys.sky_sigma)?;

    let psf = read_image(psf_path)?;

    debug!(
        image = %image_path.display(),
        psf = %psf_path.display(),
        flux_zp,
        sky_sigma,
        "Exposure loaded"
    );

    Ok(Exposure::new(image, psf, flux_zp, sky_sigma).with_path(image_path))
}

/// Create the file with an empty primary HDU followed by one image extension.
fn create_image_hdu(path: &Path, data: &Array2<f64>) -> Result<(FitsFile, FitsHdu)> {
    let (height, width) = data.dim();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: vec![width, height],
    };

    let mut fptr = FitsFile::create(path).overwrite().open()?;
    let hdu = fptr.create_image(IMAGE_EXTNAME, &description)?;

    let flat: Vec<f64> = data.iter().copied().collect();
    f64::write_image(&mut fptr, &hdu, &flat)?;
    Ok((fptr, hdu))
}

/// Write a double-precision image with numeric header keywords, replacing any existing file.
pub fn write_image(path: &Path, data: &Array2<f64>, keys: &[(&str, f64)]) -> Result<()> {
    let (mut fptr, hdu) = create_image_hdu(path, data)?;
    for (key, value) in keys {
        hdu.write_key(&mut fptr, *key, value)?;
    }
    Ok(())
}

/// Write the normalized coadd, tagging `BUNIT` with the output units.
pub fn write_coadd(path: &Path, data: &Array2<f64>, units: OutputUnits) -> Result<()> {
    let (mut fptr, hdu) = create_image_hdu(path, data)?;
    hdu.write_key(&mut fptr, "BUNIT", &units.bunit().to_string())?;
    debug!(path = %path.display(), units = %units, "Coadd written");
    Ok(())
}
