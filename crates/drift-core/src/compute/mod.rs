mod backend;
pub mod cpu;
pub mod interpolate;

pub use backend::{SpectralBackend, Spectrum};
