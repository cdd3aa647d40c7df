mod common;

use fitsio::compat::fitsfile::FitsFile;
use fitsio::compat::images::{ImageDescription, ImageType, WriteImage};
use ndarray::Array2;

use coadd_core::error::CoaddError;
use coadd_core::io::fits::{
    load_exposure, read_header_f64, read_header_f64_optional, read_header_string, read_image,
    write_coadd, write_image, HeaderKeys,
};
use coadd_core::stack::OutputUnits;

use common::{gaussian_psf, test_image, write_exposure, write_psf};

const KEYS: HeaderKeys<'static> = HeaderKeys {
    zero_point: "ZEROPT",
    sky_sigma: "SKYSIG",
};

#[test]
fn test_write_read_roundtrip_non_square() {
    let data = Array2::from_shape_fn((3, 5), |(r, c)| r as f64 * 10.0 + c as f64 - 7.25);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.fits");

    write_image(&path, &data, &[]).unwrap();
    let loaded = read_image(&path).unwrap();

    assert_eq!(loaded.dim(), (3, 5));
    // Row order is preserved, not flipped
    assert_eq!(loaded[[0, 4]], data[[0, 4]]);
    assert_eq!(loaded[[2, 0]], data[[2, 0]]);
    for (a, b) in loaded.iter().zip(data.iter()) {
        approx::assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn test_header_keys_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_exposure(dir.path(), "exp.fits", &test_image(4, 4, 0), 25.5, 0.75);

    approx::assert_abs_diff_eq!(read_header_f64(&path, "ZEROPT").unwrap(), 25.5, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(read_header_f64(&path, "SKYSIG").unwrap(), 0.75, epsilon = 1e-12);
    assert_eq!(read_header_f64_optional(&path, "NOTHERE").unwrap(), None);
}

#[test]
fn test_missing_keyword() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nokeys.fits");
    write_image(&path, &test_image(4, 4, 0), &[("ZEROPT", 1.0)]).unwrap();

    match read_header_f64(&path, "SKYSIG") {
        Err(CoaddError::MissingKeyword { key, .. }) => assert_eq!(key, "SKYSIG"),
        other => panic!("expected MissingKeyword, got {other:?}"),
    }
}

#[test]
fn test_load_exposure() {
    let dir = tempfile::tempdir().unwrap();
    let image = test_image(6, 8, 2);
    let psf = gaussian_psf(8, 1.5);
    let image_path = write_exposure(dir.path(), "img.fits", &image, 2.0, 0.5);
    let psf_path = write_psf(dir.path(), "psf.fits", &psf);

    let exposure = load_exposure(&image_path, &psf_path, &KEYS).unwrap();

    assert_eq!(exposure.path, image_path);
    assert_eq!(exposure.image.dim(), (6, 8));
    assert_eq!((exposure.width(), exposure.height()), (8, 6));
    assert_eq!(exposure.psf.dim(), (8, 8));
    approx::assert_abs_diff_eq!(exposure.flux_zp, 2.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(exposure.variance(), 0.25, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(exposure.psf[[0, 0]], psf[[0, 0]], epsilon = 1e-12);
}

#[test]
fn test_load_exposure_reads_keys_from_image_not_psf() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("bare.fits");
    write_image(&image_path, &test_image(4, 4, 0), &[]).unwrap();
    let psf_path = write_exposure(dir.path(), "psf.fits", &gaussian_psf(4, 1.0), 1.0, 1.0);

    let result = load_exposure(&image_path, &psf_path, &KEYS);
    assert!(matches!(result, Err(CoaddError::MissingKeyword { .. })));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_image(&dir.path().join("absent.fits")).is_err());
}

#[test]
fn test_write_coadd_sets_bunit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coadd.fits");

    write_coadd(&path, &test_image(4, 4, 1), OutputUnits::Flux).unwrap();
    assert_eq!(read_header_string(&path, "BUNIT").unwrap().trim(), "FLUX");

    // Overwrites the existing file
    write_coadd(&path, &test_image(4, 4, 1), OutputUnits::StdDev).unwrap();
    assert_eq!(read_header_string(&path, "BUNIT").unwrap().trim(), "SIGMA");
}

/// Primary header carries `primary_keys`; one image extension carries `data` and `ext_keys`.
fn write_with_primary_keys(
    path: &std::path::Path,
    data: &Array2<f64>,
    primary_keys: &[(&str, f64)],
    ext_keys: &[(&str, f64)],
) {
    let mut fptr = FitsFile::create(path).overwrite().open().unwrap();
    let primary = fptr.primary_hdu().unwrap();
    for (key, value) in primary_keys {
        primary.write_key(&mut fptr, *key, value).unwrap();
    }

    let (height, width) = data.dim();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: vec![width, height],
    };
    let hdu = fptr.create_image("SCI", &description).unwrap();
    let flat: Vec<f64> = data.iter().copied().collect();
    f64::write_image(&mut fptr, &hdu, &flat).unwrap();
    for (key, value) in ext_keys {
        hdu.write_key(&mut fptr, *key, value).unwrap();
    }
    fptr.flush().unwrap();
}

#[test]
fn test_image_written_here_is_read_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ext.fits");
    let data = test_image(4, 6, 3);
    write_image(&path, &data, &[("ZEROPT", 3.5)]).unwrap();

    // Empty primary HDU, pixels and keys in HDU 1
    let fptr = FitsFile::open(&path).unwrap();
    assert_eq!(fptr.num_hdus().unwrap(), 2);

    assert_eq!(read_image(&path).unwrap(), data);
    approx::assert_abs_diff_eq!(read_header_f64(&path, "ZEROPT").unwrap(), 3.5, epsilon = 1e-12);
}

#[test]
fn test_keys_fall_back_to_primary_header() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("survey.fits");
    write_with_primary_keys(
        &image_path,
        &test_image(4, 4, 0),
        &[("ZEROPT", 27.0), ("SKYSIG", 2.0)],
        &[],
    );
    let psf_path = write_psf(dir.path(), "psf.fits", &gaussian_psf(4, 1.0));

    let exposure = load_exposure(&image_path, &psf_path, &KEYS).unwrap();
    approx::assert_abs_diff_eq!(exposure.flux_zp, 27.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(exposure.variance(), 4.0, epsilon = 1e-12);
}

#[test]
fn test_extension_keys_override_primary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("both.fits");
    write_with_primary_keys(&path, &test_image(4, 4, 0), &[("ZEROPT", 1.0)], &[("ZEROPT", 2.0)]);

    approx::assert_abs_diff_eq!(read_header_f64(&path, "ZEROPT").unwrap(), 2.0, epsilon = 1e-12);
}

#[test]
fn test_three_axis_image_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.fits");
    let mut fptr = FitsFile::create(&path).overwrite().open().unwrap();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: vec![2, 2, 2],
    };
    let hdu = fptr.create_image("CUBE", &description).unwrap();
    f64::write_image(&mut fptr, &hdu, &[1.0; 8]).unwrap();
    fptr.flush().unwrap();
    drop(fptr);

    assert!(matches!(
        read_image(&path),
        Err(CoaddError::InvalidDimensions { naxis: 3, .. })
    ));
}

#[test]
fn test_file_without_image_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.fits");
    drop(FitsFile::create(&path).overwrite().open().unwrap());

    assert!(matches!(
        read_image(&path),
        Err(CoaddError::InvalidDimensions { naxis: 0, .. })
    ));
}
