//! Matched-filter star detector in the spirit of DAOFIND.
//!
//! The frame is correlated with a zero-sum Gaussian kernel normalised so that
//! the response at a star's centre estimates its Gaussian amplitude above the
//! local background. Local maxima of that response above the threshold become
//! detections, measured on the background-subtracted pixels around them.

use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use crate::consts::{GAUSSIAN_SIGMA_TO_FWHM, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::Frame;
use crate::star::{StarRecord, StarTable};

use super::config::DetectionRequest;
use super::StarDetector;

/// Default detector used by the pipeline and CLI.
#[derive(Clone, Debug)]
pub struct PeakFinder {
    /// Smallest kernel radius in pixels, regardless of FWHM.
    pub min_radius: usize,
}

impl Default for PeakFinder {
    fn default() -> Self {
        Self { min_radius: 2 }
    }
}

impl StarDetector for PeakFinder {
    fn detect(&self, frame: &Frame, request: &DetectionRequest) -> StarTable {
        let (h, w) = frame.data.dim();
        if h == 0 || w == 0 || !(request.fwhm > 0.0) {
            return StarTable::default();
        }

        let kernel = MatchedKernel::new(request.fwhm, self.min_radius);
        if request.exclude_border && (h <= 2 * kernel.radius || w <= 2 * kernel.radius) {
            return StarTable::default();
        }

        let amplitude = correlate(&frame.data, &kernel);
        let peaks = local_maxima(
            &amplitude,
            kernel.radius,
            request.threshold,
            request.exclude_border,
        );

        let mut records = Vec::with_capacity(peaks.len());
        let mut saturated = 0usize;
        for (row, col) in peaks {
            match measure(&frame.data, row, col, kernel.radius, amplitude[[row, col]], request) {
                Some(m) if m.peak > request.peak_max => saturated += 1,
                Some(m) => {
                    let id = records.len() as u32 + 1;
                    records.push(StarRecord {
                        id,
                        x: m.x,
                        y: m.y,
                        peak: m.peak,
                        flux: m.flux,
                        sharpness: Some(m.sharpness),
                        roundness: Some(m.roundness),
                    });
                }
                None => {}
            }
        }

        debug!(
            frame = frame.metadata.frame_index,
            detected = records.len(),
            saturated,
            threshold = request.threshold,
            "Star detection"
        );
        StarTable::from_unique(records)
    }
}

/// Zero-sum Gaussian kernel, flattened row-major.
struct MatchedKernel {
    radius: usize,
    size: usize,
    weights: Vec<f64>,
    /// Sum of squared weights; dividing the correlation by this yields amplitude.
    norm: f64,
}

impl MatchedKernel {
    fn new(fwhm: f64, min_radius: usize) -> Self {
        let sigma = fwhm / GAUSSIAN_SIGMA_TO_FWHM;
        let radius = ((2.0 * sigma).ceil() as usize).max(min_radius).max(1);
        let size = 2 * radius + 1;
        let inv_2s2 = 1.0 / (2.0 * sigma * sigma);

        let mut weights = Vec::with_capacity(size * size);
        for ky in 0..size {
            for kx in 0..size {
                let dy = ky as f64 - radius as f64;
                let dx = kx as f64 - radius as f64;
                weights.push((-(dx * dx + dy * dy) * inv_2s2).exp());
            }
        }
        let mean = weights.iter().sum::<f64>() / weights.len() as f64;
        for v in weights.iter_mut() {
            *v -= mean;
        }
        let norm = weights.iter().map(|v| v * v).sum::<f64>().max(f64::EPSILON);

        Self {
            radius,
            size,
            weights,
            norm,
        }
    }
}

/// Correlate with the kernel, replicating edge pixels outside the frame.
/// Row-parallel for large frames.
fn correlate(data: &Array2<f32>, kernel: &MatchedKernel) -> Array2<f64> {
    let (h, w) = data.dim();
    let r = kernel.radius as isize;

    let row_response = |row: usize| -> Vec<f64> {
        (0..w)
            .map(|col| {
                let mut sum = 0.0f64;
                for ky in 0..kernel.size {
                    let iy = (row as isize + ky as isize - r).clamp(0, h as isize - 1) as usize;
                    let k_row = &kernel.weights[ky * kernel.size..(ky + 1) * kernel.size];
                    for (kx, &k) in k_row.iter().enumerate() {
                        let ix =
                            (col as isize + kx as isize - r).clamp(0, w as isize - 1) as usize;
                        sum += k * data[[iy, ix]] as f64;
                    }
                }
                sum / kernel.norm
            })
            .collect()
    };

    let rows: Vec<Vec<f64>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(&row_response).collect()
    } else {
        (0..h).map(&row_response).collect()
    };

    let mut result = Array2::<f64>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

/// Pixels above `threshold` that dominate their `radius` neighbourhood, in
/// row-major order. On plateaus the first pixel in row-major order wins.
fn local_maxima(
    response: &Array2<f64>,
    radius: usize,
    threshold: f64,
    exclude_border: bool,
) -> Vec<(usize, usize)> {
    let (h, w) = response.dim();
    let (row_lo, row_hi, col_lo, col_hi) = if exclude_border {
        (radius, h - radius, radius, w - radius)
    } else {
        (0, h, 0, w)
    };

    let mut peaks = Vec::new();
    for row in row_lo..row_hi {
        for col in col_lo..col_hi {
            let c = response[[row, col]];
            if c > threshold && dominates(response, row, col, radius) {
                peaks.push((row, col));
            }
        }
    }
    peaks
}

fn dominates(response: &Array2<f64>, row: usize, col: usize, radius: usize) -> bool {
    let (h, w) = response.dim();
    let c = response[[row, col]];
    for nr in row.saturating_sub(radius)..=(row + radius).min(h - 1) {
        for nc in col.saturating_sub(radius)..=(col + radius).min(w - 1) {
            if nr == row && nc == col {
                continue;
            }
            let v = response[[nr, nc]];
            let earlier = (nr, nc) < (row, col);
            if v > c || (earlier && v == c) {
                return false;
            }
        }
    }
    true
}

struct Measurement {
    x: f64,
    y: f64,
    peak: f64,
    flux: f64,
    sharpness: f64,
    roundness: f64,
}

/// Centroid, peak, flux and shape of the box of `radius` around a peak,
/// measured on background-subtracted pixels.
fn measure(
    data: &Array2<f32>,
    row: usize,
    col: usize,
    radius: usize,
    amplitude: f64,
    request: &DetectionRequest,
) -> Option<Measurement> {
    let (h, w) = data.dim();
    let rows = row.saturating_sub(radius)..=(row + radius).min(h - 1);
    let cols = col.saturating_sub(radius)..=(col + radius).min(w - 1);

    let mut peak = f64::NEG_INFINITY;
    let mut flux = 0.0f64;
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut neighbour_sum = 0.0f64;
    let mut neighbour_count = 0usize;

    for r in rows.clone() {
        for c in cols.clone() {
            let v = data[[r, c]] as f64 - request.sky;
            peak = peak.max(v);
            if v > 0.0 {
                flux += v;
                sum_x += v * c as f64;
                sum_y += v * r as f64;
            }
            if r != row || c != col {
                neighbour_sum += v;
                neighbour_count += 1;
            }
        }
    }

    if flux <= 0.0 {
        return None;
    }
    let x = sum_x / flux;
    let y = sum_y / flux;

    let mut mxx = 0.0f64;
    let mut myy = 0.0f64;
    for r in rows {
        for c in cols.clone() {
            let v = data[[r, c]] as f64 - request.sky;
            if v > 0.0 {
                mxx += v * (c as f64 - x).powi(2);
                myy += v * (r as f64 - y).powi(2);
            }
        }
    }
    let roundness = if mxx + myy > 0.0 {
        (mxx - myy) / (mxx + myy)
    } else {
        0.0
    };

    let centre = data[[row, col]] as f64 - request.sky;
    let sharpness = if amplitude > 0.0 && neighbour_count > 0 {
        (centre - neighbour_sum / neighbour_count as f64) / amplitude
    } else {
        0.0
    };

    Some(Measurement {
        x,
        y,
        peak,
        flux,
        sharpness,
        roundness,
    })
}
