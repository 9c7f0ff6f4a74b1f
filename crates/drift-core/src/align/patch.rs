//! Padding of an image into a windowed, zero-mean square transform patch.

use ndarray::{s, Array2};

use crate::config::{WindowMethod, WindowShape};
use crate::consts::FLAT_TOLERANCE;
use crate::error::{DriftError, Result};
use crate::frame::InsertRect;

use super::window::weights_2d;

/// A padded, windowed, zero-mean square buffer ready for transforming.
#[derive(Clone, Debug)]
pub struct Patch {
    pub data: Array2<f64>,
    /// Where the source content sits inside `data`.
    pub insert: InsertRect,
}

impl Patch {
    pub fn size(&self) -> usize {
        self.data.nrows()
    }

    /// Sum of squared samples.
    pub fn energy(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Scale the patch to unit energy. Returns `false` (and leaves the patch
    /// untouched) when it has no energy to scale.
    pub fn normalize_to_unit_length(&mut self) -> bool {
        let energy = self.energy();
        if energy <= 0.0 || !energy.is_finite() {
            return false;
        }
        let inv = 1.0 / energy.sqrt();
        self.data.mapv_inplace(|v| v * inv);
        true
    }
}

/// Smallest power of two covering every given `(width, height)`.
pub fn working_size(dims: &[(usize, usize)]) -> usize {
    dims.iter()
        .map(|&(w, h)| w.max(h))
        .max()
        .unwrap_or(0)
        .max(1)
        .next_power_of_two()
}

/// Offset placing `dim` samples inside `size`, rounded up when the slack is
/// odd so content stays centred on the transform's `size/2` zero-frequency
/// convention.
pub fn insert_offset(size: usize, dim: usize) -> usize {
    let slack = size.saturating_sub(dim);
    slack / 2 + slack % 2
}

/// Window `data`, subtract its window-weighted mean and insert it, centred,
/// into a `size`x`size` zero buffer.
///
/// The mean is `sum(w*v) / sum(w)` and the inserted samples are `w*(v - mean)`,
/// so the inserted content sums to zero for every window.
pub fn prepare_patch(
    data: &Array2<f32>,
    size: usize,
    method: WindowMethod,
    shape: WindowShape,
) -> Result<Patch> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 || h > size || w > size {
        return Err(DriftError::InvalidDimensions {
            width: w,
            height: h,
        });
    }

    let weights = weights_2d(method, shape, h, w);
    let windowed = data.mapv(|v| v as f64) * &weights;
    let mean = windowed.sum() / weights.sum();

    let mut centred = &windowed - &(&weights * mean);

    // Flat input leaves only rounding noise after mean removal.
    let scale = windowed.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if centred.iter().all(|v| v.abs() <= FLAT_TOLERANCE * scale) {
        centred.fill(0.0);
    }

    let insert = InsertRect {
        x: insert_offset(size, w),
        y: insert_offset(size, h),
        width: w,
        height: h,
    };

    let mut padded = Array2::<f64>::zeros((size, size));
    padded
        .slice_mut(s![insert.y..insert.bottom(), insert.x..insert.right()])
        .assign(&centred);

    Ok(Patch {
        data: padded,
        insert,
    })
}
