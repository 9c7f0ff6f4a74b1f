use ndarray::{Array2, Axis};
use rayon::prelude::*;

use crate::compute::interpolate::{bicubic_sample, bilinear_sample, nearest_sample};
use crate::config::Interpolation;
use crate::consts::{INTEGER_SHIFT_TOLERANCE, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::{Frame, SampleKind};

/// Translate a frame by `(dx, dy)`: output pixel `p` reads source `p - d`.
///
/// Whole-pixel shifts are copied without interpolation. Pixels sourced from
/// outside the image become 0. With `clip_output`, interpolation overshoot is
/// clamped to the source maximum; indexed frames are never clipped and are
/// always sampled nearest.
pub fn translate_frame(
    frame: &Frame,
    dx: f64,
    dy: f64,
    interpolation: Interpolation,
    clip_output: bool,
) -> Frame {
    let data = translate_array(&frame.data, dx, dy, effective_method(frame, interpolation));

    let mut result = Frame {
        data,
        kind: frame.kind,
    };
    if clip_output && frame.kind == SampleKind::Intensity && !is_integer_shift(dx, dy) {
        clip_to_max(&mut result.data, max_value(&frame.data));
    }
    result
}

/// In-place variant of [`translate_frame`].
pub fn translate_in_place(
    frame: &mut Frame,
    dx: f64,
    dy: f64,
    interpolation: Interpolation,
    clip_output: bool,
) {
    let translated = translate_frame(frame, dx, dy, interpolation, clip_output);
    frame.data = translated.data;
}

pub fn is_integer_shift(dx: f64, dy: f64) -> bool {
    (dx - dx.round()).abs() < INTEGER_SHIFT_TOLERANCE
        && (dy - dy.round()).abs() < INTEGER_SHIFT_TOLERANCE
}

fn effective_method(frame: &Frame, interpolation: Interpolation) -> Interpolation {
    match frame.kind {
        SampleKind::Indexed => Interpolation::Nearest,
        SampleKind::Intensity => interpolation,
    }
}

/// Shift a raw array. See [`translate_frame`].
pub fn translate_array(
    data: &Array2<f32>,
    dx: f64,
    dy: f64,
    interpolation: Interpolation,
) -> Array2<f32> {
    if is_integer_shift(dx, dy) {
        return shift_integer(data, dx.round() as i64, dy.round() as i64);
    }

    let (h, w) = data.dim();
    let sample = |row: usize, col: usize| -> f32 {
        let src_y = row as f64 - dy;
        let src_x = col as f64 - dx;
        if src_y < -0.5 || src_x < -0.5 || src_y > h as f64 - 0.5 || src_x > w as f64 - 0.5 {
            return 0.0;
        }
        match interpolation {
            Interpolation::Nearest => nearest_sample(data, src_y, src_x),
            Interpolation::Bilinear => bilinear_sample(data, src_y, src_x),
            Interpolation::Bicubic => bicubic_sample(data, src_y, src_x),
        }
    };

    let mut result = Array2::<f32>::zeros((h, w));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut lane)| {
                for (col, dst) in lane.iter_mut().enumerate() {
                    *dst = sample(row, col);
                }
            });
    } else {
        for ((row, col), dst) in result.indexed_iter_mut() {
            *dst = sample(row, col);
        }
    }
    result
}

fn shift_integer(data: &Array2<f32>, dx: i64, dy: i64) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));
    for ((row, col), dst) in result.indexed_iter_mut() {
        let src_y = row as i64 - dy;
        let src_x = col as i64 - dx;
        if src_y >= 0 && src_y < h as i64 && src_x >= 0 && src_x < w as i64 {
            *dst = data[[src_y as usize, src_x as usize]];
        }
    }
    result
}

fn max_value(data: &Array2<f32>) -> f32 {
    data.iter().cloned().fold(f32::NEG_INFINITY, f32::max)
}

fn clip_to_max(data: &mut Array2<f32>, max: f32) {
    data.mapv_inplace(|v| if v > max { max } else { v });
}
