use crate::error::Result;
use crate::frame::Frame;
use crate::stats::median_f32;

use super::combine_pixelwise;

/// Stack frames by computing the median at each pixel position.
///
/// Uses `select_nth_unstable` for O(n) median without full sort.
pub fn median_stack(frames: &[Frame]) -> Result<Frame> {
    combine_pixelwise(frames, median_f32)
}
