use ndarray::Array2;

use crate::compute::SpectralBackend;
use crate::consts::{SUBPIXEL_INITIAL_RANGE, SUBPIXEL_ITERATIONS};

use super::peak::Peak;

/// Refined peak position (surface coordinates) and interpolated score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubPixelPeak {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Refine an integer peak on the bicubic surface by repeated 3x3 grid search.
///
/// Each iteration samples the 8 neighbours at `±range` around the current
/// estimate, moves to the highest one if it beats the current value, then
/// halves `range`. Samples further than the initial range from the integer
/// peak are ignored, so the estimate never leaves that pixel's cell.
pub fn refine_peak_cubic(
    backend: &dyn SpectralBackend,
    surface: &Array2<f64>,
    peak: &Peak,
) -> SubPixelPeak {
    let origin_x = peak.x as f64;
    let origin_y = peak.y as f64;

    let mut best = SubPixelPeak {
        x: origin_x,
        y: origin_y,
        value: backend.bicubic_sample(surface, origin_y, origin_x),
    };
    let mut range = SUBPIXEL_INITIAL_RANGE;

    for _ in 0..SUBPIXEL_ITERATIONS {
        let (cx, cy) = (best.x, best.y);
        for dy in [-range, 0.0, range] {
            let y = cy + dy;
            if (y - origin_y).abs() > SUBPIXEL_INITIAL_RANGE {
                continue;
            }
            for dx in [-range, 0.0, range] {
                if dx == 0.0 && dy == 0.0 {
                    continue;
                }
                let x = cx + dx;
                if (x - origin_x).abs() > SUBPIXEL_INITIAL_RANGE {
                    continue;
                }
                let value = backend.bicubic_sample(surface, y, x);
                if value > best.value {
                    best = SubPixelPeak { x, y, value };
                }
            }
        }
        range /= 2.0;
    }

    best
}
