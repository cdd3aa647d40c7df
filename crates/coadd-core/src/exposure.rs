use ndarray::Array2;
use std::path::PathBuf;

/// One calibrated exposure ready for coaddition.
///
/// The image is assumed to be registered to the common pixel grid already.
#[derive(Clone, Debug)]
pub struct Exposure {
    /// Source image file, kept for logging and summaries.
    pub path: PathBuf,
    /// Pixel data, row-major, shape = (height, width)
    pub image: Array2<f64>,
    /// Point-spread function sampled on the same grid as `image`.
    pub psf: Array2<f64>,
    /// Photometric flux zero point.
    pub flux_zp: f64,
    /// Standard deviation of the sky background.
    pub sky_sigma: f64,
}

impl Exposure {
    pub fn new(image: Array2<f64>, psf: Array2<f64>, flux_zp: f64, sky_sigma: f64) -> Self {
        Self {
            path: PathBuf::new(),
            image,
            psf,
            flux_zp,
            sky_sigma,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Sky background variance (`sky_sigma²`).
    pub fn variance(&self) -> f64 {
        self.sky_sigma * self.sky_sigma
    }

    pub fn width(&self) -> usize {
        self.image.ncols()
    }

    pub fn height(&self) -> usize {
        self.image.nrows()
    }
}

/// Parallel per-index slices of a set of exposures, the layout the stacker consumes.
#[derive(Clone, Debug, Default)]
pub struct ExposureSet {
    pub images: Vec<Array2<f64>>,
    pub psfs: Vec<Array2<f64>>,
    pub variances: Vec<f64>,
    pub flux_zps: Vec<f64>,
}

impl ExposureSet {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl FromIterator<Exposure> for ExposureSet {
    fn from_iter<I: IntoIterator<Item = Exposure>>(iter: I) -> Self {
        let mut set = ExposureSet::default();
        for exposure in iter {
            set.variances.push(exposure.variance());
            set.flux_zps.push(exposure.flux_zp);
            set.images.push(exposure.image);
            set.psfs.push(exposure.psf);
        }
        set
    }
}
