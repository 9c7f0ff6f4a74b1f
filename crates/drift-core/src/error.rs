use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Alignment cancelled after {completed} of {total} slices")]
    Cancelled { completed: usize, total: usize },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DriftError>;
