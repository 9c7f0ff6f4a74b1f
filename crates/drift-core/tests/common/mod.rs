#![allow(dead_code)]

use ndarray::Array2;

/// Blob centres (row, col) and amplitudes of the synthetic test scene. Every
/// quadrant holds at least one blob and all blobs sit at least 12 px from the
/// edges of a 64x64 frame.
pub const SCENE_BLOBS: [(f64, f64, f32); 7] = [
    (14.0, 18.0, 1.0),
    (18.0, 44.0, 0.8),
    (28.0, 30.0, 0.6),
    (36.0, 50.0, 0.9),
    (46.0, 16.0, 0.7),
    (50.0, 38.0, 0.5),
    (40.0, 26.0, 0.75),
];

pub const SCENE_SIGMA: f64 = 2.5;

/// Sum of Gaussian blobs, each shifted by `(dy, dx)`.
pub fn scene_shifted(h: usize, w: usize, dy: f64, dx: f64) -> Array2<f32> {
    Array2::from_shape_fn((h, w), |(r, c)| {
        SCENE_BLOBS
            .iter()
            .map(|&(by, bx, amp)| {
                let y = r as f64 - (by + dy);
                let x = c as f64 - (bx + dx);
                amp * (-(x * x + y * y) / (2.0 * SCENE_SIGMA * SCENE_SIGMA)).exp() as f32
            })
            .sum()
    })
}

pub fn scene(h: usize, w: usize) -> Array2<f32> {
    scene_shifted(h, w, 0.0, 0.0)
}

/// Deterministic pseudo-random values in [0, 1).
pub fn noise(h: usize, w: usize, seed: u64) -> Array2<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    Array2::from_shape_fn((h, w), |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    })
}
