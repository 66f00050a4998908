use crate::frame::Frame;
use crate::fwhm::FwhmEstimate;
use crate::select::SelectionReport;
use crate::star::StarTable;
use crate::stats::ClippedStats;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    EstimatingFwhm,
    Detecting,
    Aligning,
    Stacking,
    Selecting,
    SubtractingBackground,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading frames"),
            Self::EstimatingFwhm => write!(f, "Estimating FWHM"),
            Self::Detecting => write!(f, "Detecting stars"),
            Self::Aligning => write!(f, "Aligning frames"),
            Self::Stacking => write!(f, "Stacking"),
            Self::Selecting => write!(f, "Selecting PSF stars"),
            Self::SubtractingBackground => write!(f, "Subtracting local background"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Why the pipeline stopped without producing a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No unsaturated star could be fitted on the reference frame.
    NoFwhm,
    /// The reference frame yielded no detections.
    NoDetection,
    /// The combined frame has no finite pixels.
    NoBackground,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFwhm => write!(f, "no usable star for FWHM estimation"),
            Self::NoDetection => write!(f, "no stars detected on the reference frame"),
            Self::NoBackground => write!(f, "combined frame has no finite pixels"),
        }
    }
}

/// A registered, stacked and flattened field, ready for PSF construction.
#[derive(Clone, Debug)]
pub struct PreparedField {
    /// Sigma-clipped combination of the aligned frames.
    pub combined: Frame,
    /// Background statistics of the combined frame.
    pub background: ClippedStats,
    pub fwhm: FwhmEstimate,
    /// Every star detected on the combined frame.
    pub detections: StarTable,
    /// PSF candidates, sorted by descending flux.
    pub stars: StarTable,
    pub selection: SelectionReport,
    /// Combined frame with local background removed around each PSF star.
    pub flattened: Frame,
}

/// Result of the pipeline.
#[derive(Clone, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum PipelineOutput {
    Prepared(PreparedField),
    Skipped(SkipReason),
}

impl PipelineOutput {
    pub fn prepared(&self) -> Option<&PreparedField> {
        match self {
            Self::Prepared(field) => Some(field),
            Self::Skipped(_) => None,
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Progress reporter that ignores everything.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
