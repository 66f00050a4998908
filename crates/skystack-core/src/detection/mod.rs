pub mod config;
pub mod peak_finder;

pub use config::{DetectionConfig, DetectionRequest};
pub use peak_finder::PeakFinder;

use crate::frame::Frame;
use crate::star::StarTable;

/// Source of star detections for a frame.
///
/// Implementations must skip detections whose peak exceeds
/// `request.peak_max`, and detections whose footprint touches the image
/// border when `request.exclude_border` is set. An empty table means nothing
/// was found.
pub trait StarDetector: Send + Sync {
    fn detect(&self, frame: &Frame, request: &DetectionRequest) -> StarTable;
}
