/// Minimum pixel count (h*w) to use row/column-level Rayon parallelism in the 2-D FFT.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum exposure count to transform exposures in parallel.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Default FITS header keyword holding the photometric flux zero point.
pub const DEFAULT_ZP_KEY: &str = "ZEROPT";

/// Default FITS header keyword holding the sky background standard deviation.
pub const DEFAULT_SKY_SIGMA_KEY: &str = "SKYSIG";

/// `BUNIT` value written for significance-calibrated output.
pub const BUNIT_STDDEV: &str = "SIGMA";

/// `BUNIT` value written for flux-calibrated output.
pub const BUNIT_FLUX: &str = "FLUX";
