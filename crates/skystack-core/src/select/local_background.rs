use ndarray::Array2;
use tracing::debug;

use crate::frame::Frame;
use crate::star::StarTable;
use crate::stats::sigma_clipped_stats;

use super::config::LocalBackgroundConfig;

/// Remove a flat local background around each star.
///
/// For every star the sigma-clipped median of an annulus in the input frame
/// is subtracted from a square window of side `window_fwhm_factor * fwhm`
/// centred on the rounded star position. Window pixels are set to the input
/// value minus that star's background, so where windows overlap the later
/// star in table order wins. Pixels outside all windows are untouched. The
/// input frame is not modified.
pub fn subtract_local_background(
    frame: &Frame,
    stars: &StarTable,
    fwhm: f64,
    config: &LocalBackgroundConfig,
) -> Frame {
    let source = &frame.data;
    let (h, w) = source.dim();
    let mut result = source.clone();
    if h == 0 || w == 0 {
        return Frame::derived(result, frame);
    }

    let half = config.window_fwhm_factor * fwhm / 2.0;

    for star in stars {
        let Some(background) = annulus_background(source, star.x, star.y, config) else {
            debug!(id = star.id, x = star.x, y = star.y, "No annulus pixels, star skipped");
            continue;
        };

        let cx = star.x.round_ties_even();
        let cy = star.y.round_ties_even();
        let (row_lo, row_hi) = span(cy, half, h);
        let (col_lo, col_hi) = span(cx, half, w);

        for row in row_lo..row_hi {
            if !((row as f64) > cy - half && (row as f64) < cy + half) {
                continue;
            }
            for col in col_lo..col_hi {
                if (col as f64) > cx - half && (col as f64) < cx + half {
                    result[[row, col]] = (source[[row, col]] as f64 - background) as f32;
                }
            }
        }
    }

    Frame::derived(result, frame)
}

/// Sigma-clipped median of the in-bounds pixels whose centres lie at a
/// distance d from (x, y) with inner <= d < outer.
pub fn annulus_background(
    data: &Array2<f32>,
    x: f64,
    y: f64,
    config: &LocalBackgroundConfig,
) -> Option<f64> {
    let (h, w) = data.dim();
    let inner = config.annulus_inner_radius;
    let outer = config.annulus_outer_radius;
    let (row_lo, row_hi) = span(y, outer, h);
    let (col_lo, col_hi) = span(x, outer, w);

    let mut values = Vec::new();
    for row in row_lo..row_hi {
        let dy = row as f64 - y;
        for col in col_lo..col_hi {
            let dx = col as f64 - x;
            let d = (dx * dx + dy * dy).sqrt();
            if d >= inner && d < outer {
                values.push(data[[row, col]] as f64);
            }
        }
    }

    sigma_clipped_stats(&values, &config.clip).map(|s| s.median)
}

/// Index range [lo, hi) covering centre +/- radius, clamped to [0, len).
fn span(centre: f64, radius: f64, len: usize) -> (usize, usize) {
    let lo = (centre - radius).floor().max(0.0);
    let hi = ((centre + radius).ceil() + 1.0).min(len as f64);
    if !(hi > lo) {
        return (0, 0);
    }
    (lo as usize, hi as usize)
}
