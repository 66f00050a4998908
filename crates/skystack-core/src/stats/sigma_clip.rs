//! Iterative sigma-clipped statistics.
//!
//! Every "background level" and "noise floor" in the pipeline comes from here:
//! values further than `sigma` standard deviations from the median are rejected
//! and the statistics recomputed, until nothing changes or the iteration cap is hit.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CLIP_MAX_ITERS, DEFAULT_CLIP_SIGMA};
use crate::frame::Frame;

use super::median::median_f64;

/// Parameters for iterative sigma clipping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipParams {
    /// Rejection threshold in standard deviations (default: 3.0).
    pub sigma: f64,
    /// Maximum clipping iterations (default: 5).
    pub max_iters: usize,
}

impl Default for ClipParams {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_CLIP_SIGMA,
            max_iters: DEFAULT_CLIP_MAX_ITERS,
        }
    }
}

impl ClipParams {
    pub fn with_sigma(sigma: f64) -> Self {
        Self {
            sigma,
            ..Default::default()
        }
    }
}

/// Mean, median and standard deviation of the values surviving sigma clipping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClippedStats {
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
}

/// Sigma-clipped statistics of `values`. Non-finite values are ignored.
///
/// Returns `None` when no finite values are present.
pub fn sigma_clipped_stats(values: &[f64], params: &ClipParams) -> Option<ClippedStats> {
    let mut kept: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if kept.is_empty() {
        return None;
    }

    for _ in 0..params.max_iters {
        let center = median_f64(&mut kept);
        let (_, stddev) = mean_stddev(&kept);
        if stddev <= 0.0 {
            break;
        }
        let lo = center - params.sigma * stddev;
        let hi = center + params.sigma * stddev;

        let before = kept.len();
        let survivors: Vec<f64> = kept
            .iter()
            .copied()
            .filter(|&v| v >= lo && v <= hi)
            .collect();
        if survivors.is_empty() || survivors.len() == before {
            break;
        }
        kept = survivors;
    }

    let (mean, stddev) = mean_stddev(&kept);
    let median = median_f64(&mut kept);
    Some(ClippedStats {
        mean,
        median,
        stddev,
    })
}

/// Sigma-clipped statistics over every pixel of a frame.
pub fn frame_stats(frame: &Frame, params: &ClipParams) -> Option<ClippedStats> {
    let values: Vec<f64> = frame.data.iter().map(|&v| v as f64).collect();
    sigma_clipped_stats(&values, params)
}

/// Mean and population standard deviation.
fn mean_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
