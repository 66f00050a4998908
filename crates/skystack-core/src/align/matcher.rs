//! Nearest-neighbour star matching between two detections of the same field.

use serde::{Deserialize, Serialize};

use crate::star::StarTable;

/// Offset of one reference star to its nearest target star.
///
/// Unmatched stars carry NaN in every field so that median-based aggregation
/// can skip them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// Euclidean separation in pixels.
    pub distance: f64,
    /// Reference x minus target x.
    pub dx: f64,
    /// Reference y minus target y.
    pub dy: f64,
}

impl ShiftRecord {
    pub const UNMATCHED: ShiftRecord = ShiftRecord {
        distance: f64::NAN,
        dx: f64::NAN,
        dy: f64::NAN,
    };

    pub fn is_matched(&self) -> bool {
        !self.distance.is_nan()
    }
}

/// Pair every reference star with its nearest target star.
///
/// The result has one record per reference star, in reference order. A star
/// is matched only if its nearest neighbour lies strictly closer than
/// `tolerance`; otherwise it gets [`ShiftRecord::UNMATCHED`]. When several
/// target stars share the minimum distance the lowest target index wins.
pub fn match_stars(reference: &StarTable, target: &StarTable, tolerance: f64) -> Vec<ShiftRecord> {
    reference
        .iter()
        .map(|star| {
            let mut best: Option<(f64, f64, f64)> = None;
            for candidate in target {
                let dx = star.x - candidate.x;
                let dy = star.y - candidate.y;
                let distance = (dx * dx + dy * dy).sqrt();
                match best {
                    Some((d, _, _)) if distance >= d => {}
                    _ => best = Some((distance, dx, dy)),
                }
            }
            match best {
                Some((distance, dx, dy)) if distance < tolerance => ShiftRecord { distance, dx, dy },
                _ => ShiftRecord::UNMATCHED,
            }
        })
        .collect()
}
