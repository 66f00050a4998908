/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Conversion factor from Gaussian sigma to full width at half maximum: 2*sqrt(2*ln 2).
pub const GAUSSIAN_SIGMA_TO_FWHM: f64 = 2.354_820_045_030_949;

/// Half-size of the square cutout fitted by the FWHM estimator.
pub const DEFAULT_FWHM_CUTOUT_HALF_SIZE: usize = 100;

/// Border excluded from the FWHM peak search to avoid edge artifacts.
pub const DEFAULT_FWHM_SEARCH_BORDER: usize = 100;

/// Peaks at or above this count are treated as saturated by the FWHM estimator.
pub const DEFAULT_FWHM_SATURATION: f32 = 50_000.0;

/// FWHM search gives up once the brightest remaining peak falls below this count.
pub const DEFAULT_FWHM_NOISE_FLOOR: f32 = 1_000.0;

/// Maximum number of Gaussian fits attempted before the FWHM search gives up.
pub const DEFAULT_FWHM_MAX_ATTEMPTS: usize = 100;

/// Fitted FWHM (pixels) must exceed this to be accepted as a real star.
pub const DEFAULT_MIN_FWHM: f64 = 2.0;

/// Initial sigma guess for the Gaussian fit.
pub const FWHM_FIT_INITIAL_SIGMA: f64 = 3.0;

/// Initial amplitude guess for the Gaussian fit.
pub const FWHM_FIT_INITIAL_AMPLITUDE: f64 = 10_000.0;

/// Clip sigma for whole-frame background statistics.
pub const DEFAULT_BACKGROUND_CLIP_SIGMA: f64 = 2.0;

/// Default clip sigma for robust statistics.
pub const DEFAULT_CLIP_SIGMA: f64 = 3.0;

/// Default iteration cap for robust statistics.
pub const DEFAULT_CLIP_MAX_ITERS: usize = 5;

/// Star detector rejects detections whose peak exceeds this count.
pub const DEFAULT_DETECTION_PEAK_MAX: f64 = 100_000.0;

/// Detection threshold in units of background stddev above the background median.
pub const DEFAULT_DETECTION_THRESHOLD_SIGMA: f64 = 10.0;

/// Maximum separation (pixels) for two detections to be considered the same star.
pub const DEFAULT_MATCH_TOLERANCE: f64 = 20.0;

/// Frames whose median star offset is below this (pixels) are not shifted.
pub const DEFAULT_MIN_SHIFT: f64 = 0.5;

/// Lower/upper rejection thresholds for sigma-clipped stacking.
pub const DEFAULT_STACK_CLIP_SIGMA: f32 = 3.0;

/// Side length of the PSF cutout; stars closer than half of it to a border are dropped.
pub const DEFAULT_SELECTION_CUTOUT_SIZE: f64 = 100.0;

/// Stars closer than this many FWHM to a neighbour are dropped as crowded.
pub const DEFAULT_CROWDING_FWHM_FACTOR: f64 = 5.0;

/// Stars must peak above background + this many stddev to be selected.
pub const DEFAULT_SIGNIFICANCE_SIGMA: f64 = 10.0;

/// Number of brightest and faintest stars trimmed from a selection.
pub const DEFAULT_TRIM_COUNT: usize = 5;

/// Trimming only happens when more than this many stars survive.
pub const DEFAULT_TRIM_MIN_SURVIVORS: usize = 10;

/// Inner radius (pixels) of the local background annulus.
pub const DEFAULT_ANNULUS_INNER_RADIUS: f64 = 20.0;

/// Outer radius (pixels) of the local background annulus.
pub const DEFAULT_ANNULUS_OUTER_RADIUS: f64 = 30.0;

/// Side of the background-subtracted window, in FWHM.
pub const DEFAULT_WINDOW_FWHM_FACTOR: f64 = 5.0;
