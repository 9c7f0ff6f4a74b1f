pub mod correlate;
mod engine;
pub mod normalize;
pub mod patch;
pub mod peak;
pub mod rolling_sum;
pub mod subpixel;
pub mod translate;
pub mod window;

pub use engine::{
    align_pair, AlignEngine, Alignment, PreparedReference, PreparedTarget, SliceAlignment,
};
pub use translate::{translate_frame, translate_in_place};
