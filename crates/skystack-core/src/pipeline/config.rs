use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MATCH_TOLERANCE, DEFAULT_MIN_SHIFT};
use crate::detection::DetectionConfig;
use crate::fwhm::FwhmConfig;
use crate::select::{LocalBackgroundConfig, SelectionConfig};
use crate::stack::StackMethod;

/// Everything needed to turn a set of exposures into a combined, flattened
/// image and a PSF star list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input frames; the first one is the registration reference.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    /// Directory receiving the combined image, flattened image and star table.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub fwhm: FwhmConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub background: LocalBackgroundConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("skystack-output")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: default_output_dir(),
            fwhm: FwhmConfig::default(),
            detection: DetectionConfig::default(),
            registration: RegistrationConfig::default(),
            selection: SelectionConfig::default(),
            background: LocalBackgroundConfig::default(),
        }
    }
}

/// Star matching, shifting and stacking parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Stars further apart than this (pixels) are never paired.
    pub match_tolerance: f64,
    /// Frames whose median star offset is below this (pixels) are left in place.
    pub min_shift: f64,
    pub stacking: StackMethod,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            match_tolerance: DEFAULT_MATCH_TOLERANCE,
            min_shift: DEFAULT_MIN_SHIFT,
            stacking: StackMethod::default(),
        }
    }
}
