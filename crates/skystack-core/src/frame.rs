use ndarray::Array2;

use crate::error::{Result, SkystackError};

/// A single grayscale exposure.
/// Pixel values are raw detector counts stored as f32.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    /// Same as `new`, but carries over the metadata of `source`.
    pub fn derived(data: Array2<f32>, source: &Frame) -> Self {
        Self {
            data,
            metadata: source.metadata.clone(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
    /// File name or other label the frame was loaded from.
    pub source: Option<String>,
}

/// Check that every frame in the set has the shape of the first one.
pub fn ensure_same_shape(frames: &[Frame]) -> Result<(usize, usize)> {
    let first = frames.first().ok_or(SkystackError::EmptySequence)?;
    let (h, w) = first.data.dim();
    for (index, frame) in frames.iter().enumerate().skip(1) {
        let (fh, fw) = frame.data.dim();
        if fh != h || fw != w {
            return Err(SkystackError::DimensionMismatch {
                index,
                width: fw,
                height: fh,
                expected_width: w,
                expected_height: h,
            });
        }
    }
    Ok((h, w))
}
