use ndarray::Array2;

/// How the samples of a frame should be interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleKind {
    /// Continuous intensities. Interpolation and output clipping apply.
    #[default]
    Intensity,
    /// Categorical values (labels, colour-table indices). Only nearest
    /// sampling makes sense and output is never clipped.
    Indexed,
}

/// A single grayscale image frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    pub kind: SampleKind,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self {
            data,
            kind: SampleKind::Intensity,
        }
    }

    pub fn indexed(data: Array2<f32>) -> Self {
        Self {
            data,
            kind: SampleKind::Indexed,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Estimated translation of a target relative to the reference.
///
/// `dx`/`dy` are the shift to apply to the target so that it overlays the
/// reference. `score` is the correlation value at the peak: a Pearson-like
/// coefficient when normalized scoring is enabled, the raw correlation
/// otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AlignmentResult {
    pub dx: f64,
    pub dy: f64,
    pub score: f64,
}

/// Placement of an image's original content inside a padded square buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl InsertRect {
    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}
