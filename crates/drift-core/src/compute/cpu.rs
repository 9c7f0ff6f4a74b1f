use std::sync::Arc;

use ndarray::{Array2, Zip};
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

use super::interpolate::bicubic_sample_f64;
use super::{SpectralBackend, Spectrum};

/// CPU backend using rustfft, with Rayon for parallelism on large patches.
pub struct CpuBackend;

impl SpectralBackend for CpuBackend {
    fn name(&self) -> &str {
        "CPU/Rayon"
    }

    fn forward(&self, data: &Array2<f64>) -> Spectrum {
        Spectrum::from_array(fft2d_forward(data))
    }

    fn conjugate_multiply(&self, a: &Spectrum, b: &Spectrum) -> Spectrum {
        let product = Zip::from(a.data())
            .and(b.data())
            .map_collect(|&av, &bv| av * bv.conj());
        Spectrum::from_array(product)
    }

    fn inverse(&self, spectrum: &Spectrum) -> Array2<f64> {
        ifft2d_inverse(spectrum.data())
    }

    fn swap_quadrants(&self, data: &mut Array2<f64>) {
        swap_quadrants(data);
    }

    fn bicubic_sample(&self, data: &Array2<f64>, y: f64, x: f64) -> f64 {
        bicubic_sample_f64(data, y, x)
    }
}

// ---------------------------------------------------------------------------
// FFT helpers
// ---------------------------------------------------------------------------

/// 2D forward FFT with parallel row/column processing for large patches.
pub fn fft2d_forward(data: &Array2<f64>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    let mut result = data.mapv(|v| Complex::new(v, 0.0));
    transform_rows(&mut result, &fft_row, h * w >= PARALLEL_PIXEL_THRESHOLD);
    transform_cols(&mut result, &fft_col, h * w >= PARALLEL_PIXEL_THRESHOLD);
    result
}

/// 2D inverse FFT, returning real part normalized by `1/(h*w)`.
pub fn ifft2d_inverse(data: &Array2<Complex<f64>>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    let mut work = data.clone();
    transform_cols(&mut work, &ifft_col, h * w >= PARALLEL_PIXEL_THRESHOLD);
    transform_rows(&mut work, &ifft_row, h * w >= PARALLEL_PIXEL_THRESHOLD);

    let scale = 1.0 / (h * w) as f64;
    work.mapv(|v| v.re * scale)
}

fn transform_rows(data: &mut Array2<Complex<f64>>, fft: &Arc<dyn Fft<f64>>, parallel: bool) {
    if parallel {
        data.axis_iter_mut(ndarray::Axis(0))
            .into_par_iter()
            .for_each(|mut row| {
                let mut buf: Vec<Complex<f64>> = row.to_vec();
                fft.process(&mut buf);
                row.iter_mut().zip(buf).for_each(|(dst, v)| *dst = v);
            });
    } else {
        for mut row in data.axis_iter_mut(ndarray::Axis(0)) {
            let mut buf: Vec<Complex<f64>> = row.to_vec();
            fft.process(&mut buf);
            row.iter_mut().zip(buf).for_each(|(dst, v)| *dst = v);
        }
    }
}

fn transform_cols(data: &mut Array2<Complex<f64>>, fft: &Arc<dyn Fft<f64>>, parallel: bool) {
    if parallel {
        data.axis_iter_mut(ndarray::Axis(1))
            .into_par_iter()
            .for_each(|mut col| {
                let mut buf: Vec<Complex<f64>> = col.to_vec();
                fft.process(&mut buf);
                col.iter_mut().zip(buf).for_each(|(dst, v)| *dst = v);
            });
    } else {
        for mut col in data.axis_iter_mut(ndarray::Axis(1)) {
            let mut buf: Vec<Complex<f64>> = col.to_vec();
            fft.process(&mut buf);
            col.iter_mut().zip(buf).for_each(|(dst, v)| *dst = v);
        }
    }
}

/// Circularly roll a surface by half its size in each axis, moving cell
/// `(0, 0)` to `(h/2, w/2)`.
pub fn swap_quadrants(data: &mut Array2<f64>) {
    let (h, w) = data.dim();
    let (half_h, half_w) = (h / 2, w / 2);
    let src = data.clone();
    for row in 0..h {
        for col in 0..w {
            data[[(row + half_h) % h, (col + half_w) % w]] = src[[row, col]];
        }
    }
}
