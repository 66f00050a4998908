use tracing::{info, warn};

use crate::detection::{PeakFinder, StarDetector};
use crate::error::Result;
use crate::frame::{ensure_same_shape, Frame};
use crate::fwhm::estimate_fwhm;
use crate::select::{select_stars, subtract_local_background};
use crate::stats::{frame_stats, ClipParams};

use super::config::PipelineConfig;
use super::registration::{detect_frame_stars, register_frames_reported};
use super::types::{
    NoOpReporter, PipelineOutput, PipelineStage, PreparedField, ProgressReporter, SkipReason,
};

/// Run the full preparation pipeline with a thread-safe progress reporter.
///
/// 1. Estimates the FWHM on frame 0 (shared by the whole set)
/// 2. Registers and stacks the frames with that width
/// 3. Detects stars on the combined frame
/// 4. Selects isolated, well-exposed PSF candidates
/// 5. Flattens the local background around each candidate
pub fn prepare_field_reported(
    frames: &[Frame],
    config: &PipelineConfig,
    detector: &dyn StarDetector,
    reporter: &dyn ProgressReporter,
) -> Result<PipelineOutput> {
    ensure_same_shape(frames)?;

    reporter.begin_stage(PipelineStage::EstimatingFwhm, None);
    let fwhm = estimate_fwhm(&frames[0], &config.fwhm);
    reporter.finish_stage();
    if !fwhm.is_valid() {
        warn!("FWHM estimation failed on the reference frame");
        return Ok(PipelineOutput::Skipped(SkipReason::NoFwhm));
    }

    let Some(combined) = register_frames_reported(
        frames,
        fwhm.sigma,
        detector,
        &config.detection,
        &config.registration,
        reporter,
    )?
    else {
        return Ok(PipelineOutput::Skipped(SkipReason::NoDetection));
    };

    let Some(background) =
        frame_stats(&combined, &ClipParams::with_sigma(config.detection.clip_sigma))
    else {
        return Ok(PipelineOutput::Skipped(SkipReason::NoBackground));
    };
    info!(
        median = background.median,
        stddev = background.stddev,
        "Combined frame background"
    );

    reporter.begin_stage(PipelineStage::Selecting, None);
    let detections = detect_frame_stars(&combined, fwhm.sigma, detector, &config.detection);
    let (stars, selection) = select_stars(
        &detections,
        combined.data.dim(),
        fwhm.fwhm,
        background.median,
        background.stddev,
        &config.selection,
    );
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::SubtractingBackground, Some(stars.len()));
    let flattened = subtract_local_background(&combined, &stars, fwhm.fwhm, &config.background);
    reporter.finish_stage();

    Ok(PipelineOutput::Prepared(PreparedField {
        combined,
        background,
        fwhm,
        detections,
        stars,
        selection,
        flattened,
    }))
}

/// Run the full preparation pipeline with the built-in detector.
pub fn prepare_field(frames: &[Frame], config: &PipelineConfig) -> Result<PipelineOutput> {
    prepare_field_reported(frames, config, &PeakFinder::default(), &NoOpReporter)
}
