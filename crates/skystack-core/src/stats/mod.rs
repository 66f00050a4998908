pub mod median;
pub mod sigma_clip;

pub use median::{median, median_f32, median_f64, MedianSample};
pub use sigma_clip::{frame_stats, sigma_clipped_stats, ClipParams, ClippedStats};
