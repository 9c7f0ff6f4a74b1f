use serde::{Deserialize, Serialize};

/// Tapering applied to an image before it is transformed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowMethod {
    None,
    Hanning,
    Cosine,
    #[default]
    Tukey,
}

impl std::fmt::Display for WindowMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Hanning => write!(f, "Hanning"),
            Self::Cosine => write!(f, "Cosine"),
            Self::Tukey => write!(f, "Tukey"),
        }
    }
}

/// How a window profile is spread over two dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowShape {
    /// Product of a row profile and a column profile.
    #[default]
    Separable,
    /// One profile driven by the distance from the image centre.
    Radial,
}

/// Sub-pixel refinement of the integer correlation peak.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubPixelMethod {
    None,
    #[default]
    Cubic,
}

impl std::fmt::Display for SubPixelMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Cubic => write!(f, "Cubic"),
        }
    }
}

/// Resampling used when translating a frame by a fractional offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    Nearest,
    Bilinear,
    #[default]
    Bicubic,
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "Nearest"),
            Self::Bilinear => write!(f, "Bilinear"),
            Self::Bicubic => write!(f, "Bicubic"),
        }
    }
}

/// Inclusive limits on the shift (in pixels) the peak search may report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl SearchBounds {
    /// Symmetric bounds of `±max_shift` in both axes.
    pub fn symmetric(max_shift: i64) -> Self {
        Self {
            min_x: -max_shift,
            max_x: max_shift,
            min_y: -max_shift,
            max_y: max_shift,
        }
    }

    /// Default bounds: half of the larger width and half of the larger
    /// height of the two images, independently per axis.
    pub fn half_max(reference: (usize, usize), target: (usize, usize)) -> Self {
        let (ref_w, ref_h) = reference;
        let (tgt_w, tgt_h) = target;
        let half_x = (ref_w.max(tgt_w) / 2) as i64;
        let half_y = (ref_h.max(tgt_h) / 2) as i64;
        Self {
            min_x: -half_x,
            max_x: half_x,
            min_y: -half_y,
            max_y: half_y,
        }
    }
}

/// Options for a single alignment (or every slice of a batch).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub window: WindowMethod,
    pub window_shape: WindowShape,
    /// Convert raw correlation into locally normalized scores.
    pub normalized: bool,
    /// Explicit shift limits; `None` means half-max bounds.
    pub bounds: Option<SearchBounds>,
    pub subpixel: SubPixelMethod,
    pub interpolation: Interpolation,
    /// Clamp interpolation overshoot to the input maximum when translating.
    pub clip_output: bool,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            window: WindowMethod::default(),
            window_shape: WindowShape::default(),
            normalized: true,
            bounds: None,
            subpixel: SubPixelMethod::default(),
            interpolation: Interpolation::default(),
            clip_output: true,
        }
    }
}

/// Diagnostic surfaces a batch run can emit per slice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOutputs {
    /// Translate each slice by its estimated offset.
    pub aligned: bool,
    /// Emit the (optionally normalized) correlation surface.
    pub correlation: bool,
    /// Emit the prepared, unit-energy target patch.
    pub normalized_target: bool,
}
