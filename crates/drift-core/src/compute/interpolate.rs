//! Sampling of 2D rasters at fractional coordinates.
//!
//! Neighbour lookups are clamped to the raster edge, so every sampler is
//! defined over the whole plane. Callers that want a background value outside
//! the image (the translator) test the source coordinate first.

use ndarray::Array2;

use crate::consts::BICUBIC_A;

/// Cubic convolution kernel (Keys, a = 0.5). Equals 1 at 0 and 0 at every
/// other integer, so sampling at whole-pixel positions is exact.
pub fn cubic_weight(t: f64) -> f64 {
    let a = BICUBIC_A;
    let t = t.abs();
    if t <= 1.0 {
        t * t * (t * (2.0 - a) + (a - 3.0)) + 1.0
    } else if t < 2.0 {
        -a * t * t * t + 5.0 * a * t * t - 8.0 * a * t + 4.0 * a
    } else {
        0.0
    }
}

fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

/// Bicubic interpolation over an `h`x`w` raster accessed through `fetch(row, col)`.
pub fn bicubic_with<F>(h: usize, w: usize, y: f64, x: f64, fetch: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    if h == 0 || w == 0 {
        return 0.0;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = 0.0;
    for j in -1..=2 {
        let row = y0 + j;
        let wy = cubic_weight(y - row as f64);
        if wy == 0.0 {
            continue;
        }
        let r = clamp_index(row, h);
        let mut row_sum = 0.0;
        for i in -1..=2 {
            let col = x0 + i;
            let wx = cubic_weight(x - col as f64);
            if wx != 0.0 {
                row_sum += wx * fetch(r, clamp_index(col, w));
            }
        }
        sum += wy * row_sum;
    }
    sum
}

/// Bicubic sample of a correlation surface.
pub fn bicubic_sample_f64(data: &Array2<f64>, y: f64, x: f64) -> f64 {
    let (h, w) = data.dim();
    bicubic_with(h, w, y, x, |r, c| data[[r, c]])
}

/// Bicubic sample of an image.
pub fn bicubic_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();
    bicubic_with(h, w, y, x, |r, c| data[[r, c]] as f64) as f32
}

pub fn bilinear_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let sample = |r: i64, c: i64| -> f32 { data[[clamp_index(r, h), clamp_index(c, w)]] };

    let v00 = sample(y0, x0);
    let v10 = sample(y0, x0 + 1);
    let v01 = sample(y0 + 1, x0);
    let v11 = sample(y0 + 1, x0 + 1);

    v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
}

pub fn nearest_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }
    data[[clamp_index(y.round() as i64, h), clamp_index(x.round() as i64, w)]]
}
