use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND_CLIP_SIGMA, DEFAULT_FWHM_CUTOUT_HALF_SIZE, DEFAULT_FWHM_MAX_ATTEMPTS,
    DEFAULT_FWHM_NOISE_FLOOR, DEFAULT_FWHM_SATURATION, DEFAULT_FWHM_SEARCH_BORDER,
    DEFAULT_MIN_FWHM,
};

/// Tuning for the reference-star FWHM search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FwhmConfig {
    /// Half-size of the square cutout fitted around each candidate peak.
    pub cutout_half_size: usize,
    /// Pixels excluded from the peak search along every edge.
    pub search_border: usize,
    /// Peaks at or above this count are saturated and skipped.
    pub saturation: f32,
    /// Search stops once the brightest peak left after masking is below this count.
    pub noise_floor: f32,
    /// Rejected fits allowed before giving up; one extra fit is tried past this.
    pub max_attempts: usize,
    /// A fit is accepted only if its FWHM exceeds this (pixels).
    pub min_fwhm: f64,
    /// Clip sigma for the frame background used as the fit offset guess.
    pub background_clip_sigma: f64,
}

impl Default for FwhmConfig {
    fn default() -> Self {
        Self {
            cutout_half_size: DEFAULT_FWHM_CUTOUT_HALF_SIZE,
            search_border: DEFAULT_FWHM_SEARCH_BORDER,
            saturation: DEFAULT_FWHM_SATURATION,
            noise_floor: DEFAULT_FWHM_NOISE_FLOOR,
            max_attempts: DEFAULT_FWHM_MAX_ATTEMPTS,
            min_fwhm: DEFAULT_MIN_FWHM,
            background_clip_sigma: DEFAULT_BACKGROUND_CLIP_SIGMA,
        }
    }
}
