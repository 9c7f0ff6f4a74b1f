use ndarray::Array2;

use crate::config::SearchBounds;

/// Integer location and value of a correlation maximum, in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub x: usize,
    pub y: usize,
    pub value: f64,
}

/// Inclusive rectangle of surface cells, `(x0, y0, x1, y1)`.
pub type SurfaceRect = (usize, usize, usize, usize);

/// Translate shift bounds into surface cells (zero shift at `size/2`) and
/// intersect them with the surface. `None` when the intersection is empty.
pub fn search_rect(height: usize, width: usize, bounds: &SearchBounds) -> Option<SurfaceRect> {
    if height == 0 || width == 0 {
        return None;
    }
    let cy = (height / 2) as i64;
    let cx = (width / 2) as i64;

    let x0 = (cx + bounds.min_x).max(0);
    let x1 = (cx + bounds.max_x).min(width as i64 - 1);
    let y0 = (cy + bounds.min_y).max(0);
    let y1 = (cy + bounds.max_y).min(height as i64 - 1);

    if x1 < x0 || y1 < y0 {
        return None;
    }
    Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
}

/// Maximum of `surface` within `bounds`. Ties resolve to the first cell in
/// row-major order.
pub fn find_peak(surface: &Array2<f64>, bounds: &SearchBounds) -> Option<Peak> {
    let (h, w) = surface.dim();
    let (x0, y0, x1, y1) = search_rect(h, w, bounds)?;

    let mut best = Peak {
        x: x0,
        y: y0,
        value: surface[[y0, x0]],
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            let value = surface[[y, x]];
            if value > best.value || (best.value.is_nan() && !value.is_nan()) {
                best = Peak { x, y, value };
            }
        }
    }
    Some(best)
}
