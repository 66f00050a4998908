use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkystackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Star table serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("Duplicate star id {0} in star table")]
    DuplicateStarId(u32),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, SkystackError>;
