use std::sync::Arc;

use ndarray::{Array2, ArrayViewMut1, Axis};
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// 2D forward FFT of a real array, with parallel row/column processing for large images.
pub fn fft2d_forward(data: &Array2<f64>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    let mut result = data.mapv(|v| Complex::new(v, 0.0));
    let parallel = h * w >= PARALLEL_PIXEL_THRESHOLD;

    process_lanes(&mut result, Axis(0), &fft_row, parallel);
    process_lanes(&mut result, Axis(1), &fft_col, parallel);

    result
}

/// 2D inverse FFT normalized by `1/(h*w)`.
///
/// The full complex result is kept: callers that need a real image take
/// the real part themselves.
pub fn ifft2d_inverse(data: &Array2<Complex<f64>>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    let mut work = data.clone();
    let parallel = h * w >= PARALLEL_PIXEL_THRESHOLD;

    process_lanes(&mut work, Axis(1), &ifft_col, parallel);
    process_lanes(&mut work, Axis(0), &ifft_row, parallel);

    let scale = 1.0 / (h * w) as f64;
    work.mapv_inplace(|v| v * scale);
    work
}

/// Run `fft` over every lane of `work` obtained by iterating along `axis`.
///
/// `Axis(0)` visits rows (length `w`), `Axis(1)` visits columns (length `h`).
fn process_lanes(
    work: &mut Array2<Complex<f64>>,
    axis: Axis,
    fft: &Arc<dyn Fft<f64>>,
    parallel: bool,
) {
    let apply = |mut lane: ArrayViewMut1<Complex<f64>>| {
        let mut buf: Vec<Complex<f64>> = lane.to_vec();
        fft.process(&mut buf);
        for (dst, src) in lane.iter_mut().zip(buf) {
            *dst = src;
        }
    };

    if parallel {
        work.axis_iter_mut(axis).into_par_iter().for_each(apply);
    } else {
        work.axis_iter_mut(axis).for_each(apply);
    }
}
