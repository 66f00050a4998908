use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_STACK_CLIP_SIGMA;
use crate::error::Result;
use crate::frame::Frame;
use crate::stats::median_f32;

use super::combine_pixelwise;

/// Parameters for sigma-clipped median stacking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SigmaClipParams {
    /// Values below median - low_sigma*stddev are rejected (default: 3.0).
    pub low_sigma: f32,
    /// Values above median + high_sigma*stddev are rejected (default: 3.0).
    pub high_sigma: f32,
    /// Number of rejection passes (default: 1).
    pub iterations: usize,
}

/// Alias used by the stacking configuration.
pub type StackClipParams = SigmaClipParams;

impl Default for SigmaClipParams {
    fn default() -> Self {
        Self {
            low_sigma: DEFAULT_STACK_CLIP_SIGMA,
            high_sigma: DEFAULT_STACK_CLIP_SIGMA,
            iterations: 1,
        }
    }
}

/// Stack frames using a sigma-clipped median.
///
/// Per pixel: take the median and standard deviation across the stack, reject
/// values outside the clipping band, then return the median of what remains.
/// A single extreme frame cannot drag the result. A pass that would reject
/// every value is ignored.
pub fn sigma_clip_median_stack(frames: &[Frame], params: &SigmaClipParams) -> Result<Frame> {
    combine_pixelwise(frames, |values| clipped_median(values, params))
}

/// Sigma-clipped median of one pixel stack. Reorders `values`.
pub fn clipped_median(values: &mut [f32], params: &SigmaClipParams) -> f32 {
    let mut kept = values.len();

    for _ in 0..params.iterations {
        let stddev = stddev(&values[..kept]);
        if !(stddev > 0.0) {
            break;
        }
        let center = median_f32(&mut values[..kept]) as f64;
        let lo = center - params.low_sigma as f64 * stddev;
        let hi = center + params.high_sigma as f64 * stddev;

        // Move survivors to the front
        let mut write = 0;
        for read in 0..kept {
            let v = values[read] as f64;
            if v >= lo && v <= hi {
                values.swap(write, read);
                write += 1;
            }
        }
        if write == 0 || write == kept {
            break;
        }
        kept = write;
    }

    median_f32(&mut values[..kept])
}

/// Population standard deviation, accumulated in f64.
fn stddev(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    var.sqrt()
}
