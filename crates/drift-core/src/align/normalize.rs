//! Local normalization of a raw correlation surface.
//!
//! The target patch is zero-mean with unit energy, so a Pearson-style score
//! only needs the variance of the reference pixels under the target footprint
//! at each shift. The rolling sums make that O(1) per cell.
//!
//! Once the target footprint exceeds about half the reference the zero-mean
//! assumption no longer holds over the overlap, and scores can leave
//! `[-1, 1]`. They are left unclipped.
//!
//! The denominator is a step function of the shift: it only changes when a
//! whole row or column enters or leaves the overlap. Interpolating the
//! normalized surface between cells therefore mixes neighbouring
//! denominators and pulls a sub-pixel maximum off an integral shift by about
//! 0.01 px. Sub-pixel refinement runs on the raw surface instead and
//! rescales its value by the integer peak's [`local_deviation`].

use ndarray::{Array2, Axis};
use rayon::prelude::*;

use crate::consts::{FLAT_TOLERANCE, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::InsertRect;

use super::rolling_sum::RollingSums;

/// Divide every cell by the standard deviation term of the overlapping
/// reference region. Cells with no overlap or with non-positive residuals
/// keep their raw value.
pub fn normalize_scores(
    surface: &mut Array2<f64>,
    sums: &RollingSums,
    reference: &InsertRect,
    target: &InsertRect,
) {
    let (h, w) = surface.dim();
    let centre_y = (h / 2) as i64;
    let centre_x = (w / 2) as i64;

    let normalize_row = |row: usize, values: &mut [f64]| {
        let sy = row as i64 - centre_y;
        for (col, value) in values.iter_mut().enumerate() {
            let sx = col as i64 - centre_x;
            if let Some(denominator) = local_deviation(sums, reference, target, sx, sy) {
                *value /= denominator;
            }
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        surface
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut lane)| {
                let mut values = lane.to_vec();
                normalize_row(row, &mut values);
                lane.iter_mut().zip(values).for_each(|(dst, v)| *dst = v);
            });
    } else {
        for (row, mut lane) in surface.axis_iter_mut(Axis(0)).enumerate() {
            let mut values = lane.to_vec();
            normalize_row(row, &mut values);
            lane.iter_mut().zip(values).for_each(|(dst, v)| *dst = v);
        }
    }
}

/// `sqrt(sumSq - sum^2 / n)` over the reference pixels covered by the target
/// footprint shifted by `(sx, sy)`. `None` when the cell is left raw.
pub fn local_deviation(
    sums: &RollingSums,
    reference: &InsertRect,
    target: &InsertRect,
    sx: i64,
    sy: i64,
) -> Option<f64> {
    let x0 = (target.x as i64 + sx).max(reference.x as i64);
    let x1 = (target.right() as i64 - 1 + sx).min(reference.right() as i64 - 1);
    let y0 = (target.y as i64 + sy).max(reference.y as i64);
    let y1 = (target.bottom() as i64 - 1 + sy).min(reference.bottom() as i64 - 1);

    if x1 < x0 || y1 < y0 {
        return None;
    }
    let n = ((x1 - x0 + 1) * (y1 - y0 + 1)) as f64;
    if n < 1.0 {
        return None;
    }

    let (sum, sum_sq) = sums.region(x0, y0, x1, y1);
    let residuals = sum_sq - sum * sum / n;
    // Residuals within rounding noise of zero come from flat regions.
    if residuals > FLAT_TOLERANCE * sum_sq {
        Some(residuals.sqrt())
    } else {
        None
    }
}
