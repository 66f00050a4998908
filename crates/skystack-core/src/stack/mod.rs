pub mod median;
pub mod sigma_clip;

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::Result;
use crate::frame::{ensure_same_shape, Frame};

use self::median::median_stack;
use self::sigma_clip::{sigma_clip_median_stack, StackClipParams};

/// How aligned frames are combined into one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StackMethod {
    /// Plain per-pixel median.
    Median,
    /// Per-pixel sigma clipping followed by the median of the survivors.
    SigmaClippedMedian(StackClipParams),
}

impl Default for StackMethod {
    fn default() -> Self {
        Self::SigmaClippedMedian(StackClipParams::default())
    }
}

impl std::fmt::Display for StackMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Median => write!(f, "Median"),
            Self::SigmaClippedMedian(_) => write!(f, "Sigma-Clipped Median"),
        }
    }
}

/// Combine aligned frames with the given method.
pub fn stack_frames(frames: &[Frame], method: &StackMethod) -> Result<Frame> {
    match method {
        StackMethod::Median => median_stack(frames),
        StackMethod::SigmaClippedMedian(params) => sigma_clip_median_stack(frames, params),
    }
}

/// Reduce the stack of values at every pixel position to one value.
///
/// Frames must share a shape. Parallelizes at the row level for large frames;
/// each row owns its scratch buffer.
pub(crate) fn combine_pixelwise<F>(frames: &[Frame], reduce: F) -> Result<Frame>
where
    F: Fn(&mut [f32]) -> f32 + Sync,
{
    let (h, w) = ensure_same_shape(frames)?;
    let n = frames.len();

    let row_values = |row: usize| -> Vec<f32> {
        let mut pixel_values = vec![0.0f32; n];
        let mut row_result = vec![0.0f32; w];
        for (col, result) in row_result.iter_mut().enumerate() {
            for (i, frame) in frames.iter().enumerate() {
                pixel_values[i] = frame.data[[row, col]];
            }
            *result = reduce(&mut pixel_values);
        }
        row_result
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
        (0..h).into_par_iter().map(&row_values).collect()
    } else {
        (0..h).map(&row_values).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    Ok(Frame::derived(result, &frames[0]))
}
