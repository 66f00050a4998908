pub mod config;
mod orchestrator;
mod registration;
mod types;

pub use orchestrator::{prepare_field, prepare_field_reported};
pub use registration::{detect_frame_stars, register_frames, register_frames_reported};
pub use types::{
    NoOpReporter, PipelineOutput, PipelineStage, PreparedField, ProgressReporter, SkipReason,
};
