/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum slice count to use slice-level Rayon parallelism in batch mode.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Fraction of the window given to each cosine taper of the Tukey window.
pub const TUKEY_ALPHA: f64 = 0.25;

/// Number of grid-halving iterations performed by the cubic sub-pixel refiner.
/// 10 iterations bring the estimate to within 0.5 / 2^9 px of the local maximum.
pub const SUBPIXEL_ITERATIONS: usize = 10;

/// Initial half-range (in pixels) of the cubic sub-pixel search grid.
pub const SUBPIXEL_INITIAL_RANGE: f64 = 0.5;

/// Coefficient of the cubic convolution kernel used for bicubic sampling.
pub const BICUBIC_A: f64 = 0.5;

/// Tolerance used when deciding whether an offset is a whole number of pixels.
pub const INTEGER_SHIFT_TOLERANCE: f64 = 1e-9;

/// Relative magnitude below which mean-subtracted content is treated as flat.
pub const FLAT_TOLERANCE: f64 = 1e-12;
