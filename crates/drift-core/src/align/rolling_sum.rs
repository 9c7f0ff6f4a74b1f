//! 2D prefix sums of value and value² for O(1) rectangle statistics.

use ndarray::Array2;

/// Inclusive prefix sums over a patch: `sum[[y, x]]` holds the sum of every
/// sample in rows `0..=y` and columns `0..=x`.
#[derive(Clone, Debug)]
pub struct RollingSums {
    sum: Array2<f64>,
    sum_sq: Array2<f64>,
}

impl RollingSums {
    pub fn new(data: &Array2<f64>) -> Self {
        let (h, w) = data.dim();
        let mut sum = Array2::<f64>::zeros((h, w));
        let mut sum_sq = Array2::<f64>::zeros((h, w));

        for y in 0..h {
            let mut row_sum = 0.0;
            let mut row_sum_sq = 0.0;
            for x in 0..w {
                let v = data[[y, x]];
                row_sum += v;
                row_sum_sq += v * v;
                let (above, above_sq) = if y > 0 {
                    (sum[[y - 1, x]], sum_sq[[y - 1, x]])
                } else {
                    (0.0, 0.0)
                };
                sum[[y, x]] = above + row_sum;
                sum_sq[[y, x]] = above_sq + row_sum_sq;
            }
        }

        Self { sum, sum_sq }
    }

    pub fn width(&self) -> usize {
        self.sum.ncols()
    }

    pub fn height(&self) -> usize {
        self.sum.nrows()
    }

    /// `(sum, sum of squares)` over columns `x0..=x1` and rows `y0..=y1`.
    ///
    /// Corners past the last row/column read the table edge, corners before
    /// the first read zero, so partially outside rectangles are clipped to
    /// the table. An empty or fully outside rectangle yields `(0, 0)`.
    pub fn region(&self, x0: i64, y0: i64, x1: i64, y1: i64) -> (f64, f64) {
        let (h, w) = (self.height() as i64, self.width() as i64);
        if h == 0 || w == 0 || x1 < x0 || y1 < y0 || x1 < 0 || y1 < 0 || x0 >= w || y0 >= h {
            return (0.0, 0.0);
        }

        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(w - 1);
        let y1 = y1.min(h - 1);

        let corner = |table: &Array2<f64>, x: i64, y: i64| -> f64 {
            if x < 0 || y < 0 {
                0.0
            } else {
                table[[y as usize, x as usize]]
            }
        };

        let rect = |table: &Array2<f64>| -> f64 {
            corner(table, x1, y1) - corner(table, x0 - 1, y1) - corner(table, x1, y0 - 1)
                + corner(table, x0 - 1, y0 - 1)
        };

        (rect(&self.sum), rect(&self.sum_sq))
    }
}
