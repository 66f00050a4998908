//! PSF candidate selection.
//!
//! Stars are rejected for sitting near a border, for having a close
//! neighbour, or for peaking too little above the background. Survivors are
//! ranked by flux and, when there are enough of them, the brightest and
//! faintest few are dropped to keep blended, saturated and marginal stars
//! out of PSF construction.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::star::{StarRecord, StarTable};

use super::config::SelectionConfig;

/// Survivor counts after each selection stage. Counts never increase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub detected: usize,
    pub after_edge: usize,
    pub after_crowding: usize,
    pub after_significance: usize,
    pub selected: usize,
    /// Whether the brightest/faintest trim was applied.
    pub trimmed: bool,
}

/// Filter a detection table down to isolated, well-exposed stars.
///
/// `shape` is the (height, width) of the image the stars were detected on.
/// `background` and `background_std` are used as given; they are expected to
/// come from the statistics of the whole raw image. The returned table is
/// sorted by descending flux and carries id, position, peak and flux only.
pub fn select_stars(
    table: &StarTable,
    shape: (usize, usize),
    fwhm: f64,
    background: f64,
    background_std: f64,
    config: &SelectionConfig,
) -> (StarTable, SelectionReport) {
    let (h, w) = shape;
    let half = (config.cutout_size - 1.0) / 2.0;
    let x_max = w as f64 - 1.0 - half;
    let y_max = h as f64 - 1.0 - half;

    let candidates: Vec<&StarRecord> = table
        .iter()
        .filter(|s| s.x > half && s.x < x_max && s.y > half && s.y < y_max)
        .collect();
    let n = candidates.len();
    let mut rejected = vec![false; n];

    let crowding_radius = config.crowding_fwhm_factor * fwhm;
    for i in 0..n {
        for j in (i + 1)..n {
            if candidates[i].distance_to(candidates[j]) <= crowding_radius {
                rejected[i] = true;
                rejected[j] = true;
            }
        }
    }
    let after_crowding = rejected.iter().filter(|r| !**r).count();

    let min_peak = background + config.significance_sigma * background_std;
    for (flag, star) in rejected.iter_mut().zip(&candidates) {
        if star.peak <= min_peak {
            *flag = true;
        }
    }

    let mut survivors: Vec<StarRecord> = candidates
        .iter()
        .zip(&rejected)
        .filter(|(_, r)| !**r)
        .map(|(s, _)| StarRecord::new(s.id, s.x, s.y, s.peak, s.flux))
        .collect();
    let after_significance = survivors.len();

    survivors.sort_by(|a, b| b.flux.total_cmp(&a.flux));

    let trim = config.trim_count;
    let trimmed = survivors.len() > config.trim_min_survivors && survivors.len() > 2 * trim;
    if trimmed {
        survivors.truncate(survivors.len() - trim);
        survivors.drain(..trim);
    } else {
        debug!(
            survivors = survivors.len(),
            "Too few stars to trim brightest and faintest"
        );
    }

    let report = SelectionReport {
        detected: table.len(),
        after_edge: n,
        after_crowding,
        after_significance,
        selected: survivors.len(),
        trimmed,
    };
    info!(
        detected = report.detected,
        after_edge = report.after_edge,
        after_crowding = report.after_crowding,
        after_significance = report.after_significance,
        selected = report.selected,
        "Star selection"
    );

    (StarTable::from_unique(survivors), report)
}
