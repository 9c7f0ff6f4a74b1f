//! Tapering windows applied before transforming to suppress edge artifacts.
//!
//! Every profile is defined on a normalized position `x` in `[0, 1]`, with the
//! peak at `x = 0.5`. Profiles whose weights would sum to (numerically) zero,
//! e.g. Hanning over one or two samples, are replaced by a uniform profile, so the
//! weighted mean used by the patch preparer is always defined.

use std::f64::consts::PI;

use ndarray::Array2;

use crate::config::{WindowMethod, WindowShape};
use crate::consts::{FLAT_TOLERANCE, TUKEY_ALPHA};

/// Weight of `method` at normalized position `x`.
pub fn weight(method: WindowMethod, x: f64) -> f64 {
    match method {
        WindowMethod::None => 1.0,
        WindowMethod::Hanning => 0.5 * (1.0 - (2.0 * PI * x).cos()),
        WindowMethod::Cosine => (PI * x).sin(),
        WindowMethod::Tukey => tukey(x, TUKEY_ALPHA),
    }
}

fn tukey(x: f64, alpha: f64) -> f64 {
    if alpha <= 0.0 {
        return 1.0;
    }
    if x < alpha / 2.0 {
        0.5 * (1.0 + (PI * (2.0 * x / alpha - 1.0)).cos())
    } else if x > 1.0 - alpha / 2.0 {
        0.5 * (1.0 + (PI * (2.0 * x / alpha - 2.0 / alpha + 1.0)).cos())
    } else {
        1.0
    }
}

/// Length-`len` 1D weight sequence with a strictly positive sum.
pub fn profile(method: WindowMethod, len: usize) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    if method == WindowMethod::None {
        return vec![1.0; len];
    }

    let weights: Vec<f64> = if len == 1 {
        vec![weight(method, 0.5)]
    } else {
        let last = (len - 1) as f64;
        (0..len).map(|i| weight(method, i as f64 / last)).collect()
    };

    if weights.iter().sum::<f64>() > FLAT_TOLERANCE * len as f64 {
        weights
    } else {
        vec![1.0; len]
    }
}

/// Full `h`x`w` weight grid for the given method and shape.
pub fn weights_2d(method: WindowMethod, shape: WindowShape, h: usize, w: usize) -> Array2<f64> {
    if method == WindowMethod::None {
        return Array2::ones((h, w));
    }

    let weights = match shape {
        WindowShape::Separable => {
            let wy = profile(method, h);
            let wx = profile(method, w);
            Array2::from_shape_fn((h, w), |(r, c)| wy[r] * wx[c])
        }
        WindowShape::Radial => radial(method, h, w),
    };

    if weights.sum() > FLAT_TOLERANCE * (h * w) as f64 {
        weights
    } else {
        Array2::ones((h, w))
    }
}

/// Isotropic window: the centre takes the profile peak and the corners take
/// its edge value.
fn radial(method: WindowMethod, h: usize, w: usize) -> Array2<f64> {
    let cy = h.saturating_sub(1) as f64 / 2.0;
    let cx = w.saturating_sub(1) as f64 / 2.0;
    let max_distance = (cx * cx + cy * cy).sqrt();

    Array2::from_shape_fn((h, w), |(r, c)| {
        if max_distance == 0.0 {
            return weight(method, 0.5);
        }
        let dy = r as f64 - cy;
        let dx = c as f64 - cx;
        let distance = (dx * dx + dy * dy).sqrt();
        weight(method, 0.5 - distance / (2.0 * max_distance))
    })
}
