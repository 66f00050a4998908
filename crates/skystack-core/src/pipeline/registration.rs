use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::align::{match_stars, resolve_shift, roll_frame};
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::detection::{DetectionConfig, StarDetector};
use crate::error::Result;
use crate::frame::{ensure_same_shape, Frame};
use crate::stack::stack_frames;
use crate::star::StarTable;
use crate::stats::{frame_stats, ClipParams};

use super::config::RegistrationConfig;
use super::types::{NoOpReporter, PipelineStage, ProgressReporter};

/// Detect stars on one frame, thresholding against its own clipped background.
///
/// `sigma` is the expected Gaussian width of a star. A frame with no finite
/// pixels yields an empty table.
pub fn detect_frame_stars(
    frame: &Frame,
    sigma: f64,
    detector: &dyn StarDetector,
    detection: &DetectionConfig,
) -> StarTable {
    let Some(stats) = frame_stats(frame, &ClipParams::with_sigma(detection.clip_sigma)) else {
        warn!(
            frame = frame.metadata.frame_index,
            "Frame has no finite pixels, skipping detection"
        );
        return StarTable::default();
    };
    let request = detection.request(sigma, &stats);
    detector.detect(frame, &request)
}

/// Align every frame to frame 0 by star matching and combine them.
///
/// Returns `Ok(None)` when frame 0 has no detections. Frames without
/// detections of their own, or without any match, are stacked unshifted.
pub fn register_frames(
    frames: &[Frame],
    sigma: f64,
    detector: &dyn StarDetector,
    detection: &DetectionConfig,
    config: &RegistrationConfig,
) -> Result<Option<Frame>> {
    register_frames_reported(frames, sigma, detector, detection, config, &NoOpReporter)
}

/// [`register_frames`] with progress reporting.
pub fn register_frames_reported(
    frames: &[Frame],
    sigma: f64,
    detector: &dyn StarDetector,
    detection: &DetectionConfig,
    config: &RegistrationConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Option<Frame>> {
    let (h, w) = ensure_same_shape(frames)?;
    let n = frames.len();
    let parallel = n >= PARALLEL_FRAME_THRESHOLD;
    info!(frames = n, width = w, height = h, sigma, "Registering frames");

    reporter.begin_stage(PipelineStage::Detecting, Some(n));
    let done = AtomicUsize::new(0);
    let detect = |frame: &Frame| {
        let table = detect_frame_stars(frame, sigma, detector, detection);
        reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
        table
    };
    let tables: Vec<StarTable> = if parallel {
        frames.par_iter().map(detect).collect()
    } else {
        frames.iter().map(detect).collect()
    };
    reporter.finish_stage();

    let reference = &tables[0];
    if reference.is_empty() {
        warn!("No stars detected on the reference frame");
        return Ok(None);
    }

    reporter.begin_stage(PipelineStage::Aligning, Some(n));
    let done = AtomicUsize::new(0);
    let align = |(i, frame): (usize, &Frame)| {
        let records = match_stars(reference, &tables[i], config.match_tolerance);
        let matched = records.iter().filter(|r| r.is_matched()).count();
        let shifted = match resolve_shift(&records, config.min_shift) {
            Some(shift) => {
                info!(frame = i, matched, dx = shift.dx, dy = shift.dy, "Frame offset");
                roll_frame(frame, shift)
            }
            None => {
                debug!(frame = i, matched, "Frame left in place");
                frame.clone()
            }
        };
        reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
        shifted
    };
    let aligned: Vec<Frame> = if parallel {
        frames.par_iter().enumerate().map(align).collect()
    } else {
        frames.iter().enumerate().map(align).collect()
    };
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Stacking, None);
    let combined = stack_frames(&aligned, &config.stacking)?;
    reporter.finish_stage();
    info!(method = %config.stacking, "Stacking complete");

    Ok(Some(combined))
}
