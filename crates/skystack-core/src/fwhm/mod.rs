pub mod config;
pub mod estimator;
pub mod gaussian_fit;

pub use config::FwhmConfig;
pub use estimator::{estimate_fwhm, FwhmEstimate};
