use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_ANNULUS_INNER_RADIUS, DEFAULT_ANNULUS_OUTER_RADIUS, DEFAULT_CROWDING_FWHM_FACTOR,
    DEFAULT_SELECTION_CUTOUT_SIZE, DEFAULT_SIGNIFICANCE_SIGMA, DEFAULT_TRIM_COUNT,
    DEFAULT_TRIM_MIN_SURVIVORS, DEFAULT_WINDOW_FWHM_FACTOR,
};
use crate::stats::ClipParams;

/// Rules for picking PSF candidate stars out of a detection table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Side of the cutout later extracted around each star; stars within half
    /// of it from any border are dropped.
    pub cutout_size: f64,
    /// Stars with a neighbour within this many FWHM are dropped, both of them.
    pub crowding_fwhm_factor: f64,
    /// Minimum peak, in background stddev above the background level.
    pub significance_sigma: f64,
    /// Number of brightest and of faintest stars removed after sorting.
    pub trim_count: usize,
    /// Trimming only happens when more than this many stars survive.
    pub trim_min_survivors: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cutout_size: DEFAULT_SELECTION_CUTOUT_SIZE,
            crowding_fwhm_factor: DEFAULT_CROWDING_FWHM_FACTOR,
            significance_sigma: DEFAULT_SIGNIFICANCE_SIGMA,
            trim_count: DEFAULT_TRIM_COUNT,
            trim_min_survivors: DEFAULT_TRIM_MIN_SURVIVORS,
        }
    }
}

/// Annulus and window geometry for per-star background removal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalBackgroundConfig {
    pub annulus_inner_radius: f64,
    pub annulus_outer_radius: f64,
    /// Side of the square window flattened around each star, in FWHM.
    pub window_fwhm_factor: f64,
    /// Clipping applied to annulus pixels before taking their median.
    pub clip: ClipParams,
}

impl Default for LocalBackgroundConfig {
    fn default() -> Self {
        Self {
            annulus_inner_radius: DEFAULT_ANNULUS_INNER_RADIUS,
            annulus_outer_radius: DEFAULT_ANNULUS_OUTER_RADIUS,
            window_fwhm_factor: DEFAULT_WINDOW_FWHM_FACTOR,
            clip: ClipParams::default(),
        }
    }
}
