use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND_CLIP_SIGMA, DEFAULT_DETECTION_PEAK_MAX, DEFAULT_DETECTION_THRESHOLD_SIGMA,
    GAUSSIAN_SIGMA_TO_FWHM,
};
use crate::stats::ClippedStats;

/// How frames are searched for stars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Detections with a peak above this count are rejected as saturated.
    #[serde(default = "default_peak_max")]
    pub peak_max: f64,
    /// Threshold = background median + `threshold_sigma` * background stddev.
    #[serde(default = "default_threshold_sigma")]
    pub threshold_sigma: f64,
    /// Sigma used for the frame background statistics.
    #[serde(default = "default_clip_sigma")]
    pub clip_sigma: f64,
    /// Drop detections whose footprint touches the image border.
    #[serde(default = "default_exclude_border")]
    pub exclude_border: bool,
}

fn default_peak_max() -> f64 {
    DEFAULT_DETECTION_PEAK_MAX
}
fn default_threshold_sigma() -> f64 {
    DEFAULT_DETECTION_THRESHOLD_SIGMA
}
fn default_clip_sigma() -> f64 {
    DEFAULT_BACKGROUND_CLIP_SIGMA
}
fn default_exclude_border() -> bool {
    true
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            peak_max: DEFAULT_DETECTION_PEAK_MAX,
            threshold_sigma: DEFAULT_DETECTION_THRESHOLD_SIGMA,
            clip_sigma: DEFAULT_BACKGROUND_CLIP_SIGMA,
            exclude_border: true,
        }
    }
}

impl DetectionConfig {
    /// Build a detector request for a frame with the given background
    /// statistics, searching for stars of Gaussian width `sigma`.
    pub fn request(&self, sigma: f64, background: &ClippedStats) -> DetectionRequest {
        DetectionRequest {
            fwhm: sigma * GAUSSIAN_SIGMA_TO_FWHM,
            threshold: background.median + self.threshold_sigma * background.stddev,
            sky: background.median,
            peak_max: self.peak_max,
            exclude_border: self.exclude_border,
        }
    }
}

/// Parameters handed to a [`super::StarDetector`] for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionRequest {
    /// Expected stellar FWHM in pixels.
    pub fwhm: f64,
    /// Minimum fitted amplitude of a detection.
    pub threshold: f64,
    /// Background level subtracted before measuring peaks and fluxes.
    pub sky: f64,
    /// Maximum allowed background-subtracted peak.
    pub peak_max: f64,
    pub exclude_border: bool,
}
