//! Reference-star width estimation.
//!
//! Walks the brightest peaks of a frame from the top down, skipping saturated
//! ones, and fits a 2D Gaussian to each candidate until one yields a plausible
//! FWHM. Every rejected candidate has its cutout zeroed in a private working
//! copy so the next search finds a different star.

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::consts::{FWHM_FIT_INITIAL_AMPLITUDE, FWHM_FIT_INITIAL_SIGMA, GAUSSIAN_SIGMA_TO_FWHM};
use crate::frame::Frame;
use crate::stats::{frame_stats, ClipParams};

use super::config::FwhmConfig;
use super::gaussian_fit::{fit_gaussian_2d, GaussianGuess};

/// Effective point-source width of a frame. Both fields are zero when no
/// usable star was found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FwhmEstimate {
    /// Full width at half maximum, pixels.
    pub fwhm: f64,
    /// Gaussian sigma, pixels.
    pub sigma: f64,
}

impl FwhmEstimate {
    pub fn is_valid(&self) -> bool {
        self.fwhm > 0.0 && self.sigma > 0.0
    }
}

/// Row/column bounds of a cutout, half-open.
#[derive(Clone, Copy, Debug)]
struct Window {
    row_start: usize,
    row_end: usize,
    col_start: usize,
    col_end: usize,
}

impl Window {
    fn around(row: usize, col: usize, half: usize, height: usize, width: usize) -> Self {
        Self {
            row_start: row.saturating_sub(half),
            row_end: (row + half).min(height),
            col_start: col.saturating_sub(half),
            col_end: (col + half).min(width),
        }
    }
}

/// Estimate the FWHM of a typical unsaturated star in `frame`.
///
/// Saturated peaks are masked and skipped without counting as an attempt.
/// Each Gaussian fit counts as an attempt; a failed fit or one below
/// `config.min_fwhm` masks the candidate and moves on. Returns a zero estimate
/// once more than `config.max_attempts` fits have been rejected, when the
/// brightest peak left after masking falls below the noise floor, or when the
/// frame has no search interior. Callers must check
/// [`FwhmEstimate::is_valid`] before using the result as a scale.
pub fn estimate_fwhm(frame: &Frame, config: &FwhmConfig) -> FwhmEstimate {
    let (h, w) = frame.data.dim();
    let border = config.search_border;
    if h <= 2 * border || w <= 2 * border {
        warn!(
            width = w,
            height = h,
            border,
            "Frame too small for FWHM search"
        );
        return FwhmEstimate::default();
    }

    let background = frame_stats(frame, &ClipParams::with_sigma(config.background_clip_sigma))
        .map(|s| s.median)
        .unwrap_or(0.0);

    let mut work = frame.data.clone();
    let mut attempts = 0usize;
    let mut saturated = 0usize;
    let mut masked = false;

    loop {
        let Some((row, col, peak)) = interior_peak(&work, border) else {
            warn!("No finite pixels left in FWHM search region");
            return FwhmEstimate::default();
        };
        // The noise floor only applies once a candidate has been masked out
        if peak <= 0.0 || (masked && peak < config.noise_floor) {
            warn!(
                peak,
                noise_floor = config.noise_floor,
                attempts,
                saturated,
                "Brightest remaining peak is below the noise floor, no FWHM estimate"
            );
            return FwhmEstimate::default();
        }

        let window = Window::around(row, col, config.cutout_half_size.max(1), h, w);

        if peak >= config.saturation {
            saturated += 1;
            debug!(row, col, peak, "Skipping saturated peak");
            zero_window(&mut work, window);
            masked = true;
            continue;
        }

        attempts += 1;
        let fwhm = fit_candidate(&work, window, row, col, background);
        if fwhm > config.min_fwhm {
            let sigma = fwhm / GAUSSIAN_SIGMA_TO_FWHM;
            info!(row, col, peak, fwhm, sigma, attempts, "FWHM estimated");
            return FwhmEstimate { fwhm, sigma };
        }

        debug!(row, col, peak, fwhm, "Rejected FWHM candidate");
        if attempts > config.max_attempts {
            warn!(
                max_attempts = config.max_attempts,
                "FWHM attempt budget exhausted"
            );
            return FwhmEstimate::default();
        }
        zero_window(&mut work, window);
        masked = true;
    }
}

/// Fit the cutout around (row, col); 0 on fit failure.
fn fit_candidate(work: &Array2<f32>, window: Window, row: usize, col: usize, background: f64) -> f64 {
    let cutout = work.slice(s![
        window.row_start..window.row_end,
        window.col_start..window.col_end
    ]);
    let width = cutout.ncols();
    let values: Vec<f64> = cutout.iter().map(|&v| v as f64).collect();

    let guess = GaussianGuess {
        x0: (col - window.col_start) as f64,
        y0: (row - window.row_start) as f64,
        sigma: FWHM_FIT_INITIAL_SIGMA,
        amplitude: FWHM_FIT_INITIAL_AMPLITUDE,
        offset: background,
    };

    match fit_gaussian_2d(&values, width, &guess) {
        Some(fit) => fit.mean_sigma() * GAUSSIAN_SIGMA_TO_FWHM,
        None => 0.0,
    }
}

/// Brightest finite pixel inside the border, first in row-major order on ties.
fn interior_peak(data: &Array2<f32>, border: usize) -> Option<(usize, usize, f32)> {
    let (h, w) = data.dim();
    let mut best: Option<(usize, usize, f32)> = None;
    for row in border..h - border {
        for col in border..w - border {
            let v = data[[row, col]];
            if !v.is_finite() {
                continue;
            }
            match best {
                Some((_, _, b)) if v <= b => {}
                _ => best = Some((row, col, v)),
            }
        }
    }
    best
}

fn zero_window(data: &mut Array2<f32>, window: Window) {
    data.slice_mut(s![
        window.row_start..window.row_end,
        window.col_start..window.col_end
    ])
    .fill(0.0);
}
