use approx::assert_abs_diff_eq;

use skystack_core::consts::GAUSSIAN_SIGMA_TO_FWHM;
use skystack_core::frame::Frame;
use skystack_core::fwhm::{estimate_fwhm, FwhmConfig, FwhmEstimate};

mod common;

fn small_config() -> FwhmConfig {
    FwhmConfig {
        cutout_half_size: 15,
        search_border: 20,
        ..Default::default()
    }
}

#[test]
fn test_fwhm_single_star_default_config() {
    let frame = common::star_field(300, 300, 500.0, &[(150.0, 150.0, 10_000.0)], 2.0, 0.0, 0);
    let estimate = estimate_fwhm(&frame, &FwhmConfig::default());
    assert!(estimate.is_valid());
    assert_abs_diff_eq!(estimate.sigma, 2.0, epsilon = 0.02);
    assert_abs_diff_eq!(estimate.fwhm, 2.0 * GAUSSIAN_SIGMA_TO_FWHM, epsilon = 0.05);
}

#[test]
fn test_fwhm_with_noise() {
    let frame = common::star_field(
        200,
        200,
        1000.0,
        &[(100.3, 99.6, 8000.0)],
        2.5,
        20.0,
        11,
    );
    let estimate = estimate_fwhm(&frame, &small_config());
    assert!(estimate.is_valid());
    assert_abs_diff_eq!(estimate.sigma, 2.5, epsilon = 0.1);
}

#[test]
fn test_fwhm_skips_saturated_star() {
    let frame = common::star_field(
        200,
        200,
        500.0,
        &[(60.0, 60.0, 80_000.0), (140.0, 140.0, 6000.0)],
        2.0,
        0.0,
        0,
    );
    let config = FwhmConfig {
        max_attempts: 1,
        ..small_config()
    };
    // The saturated star does not use up the single allowed fit
    let estimate = estimate_fwhm(&frame, &config);
    assert!(estimate.is_valid());
    assert_abs_diff_eq!(estimate.sigma, 2.0, epsilon = 0.02);
}

/// A single-pixel spike far brighter than the real star at (140, 140).
fn hot_pixel_field() -> Frame {
    let mut frame = common::star_field(
        200,
        200,
        500.0,
        &[(140.0, 140.0, 6000.0)],
        2.5,
        0.0,
        0,
    );
    frame.data[[60, 60]] = 20_000.0;
    frame
}

#[test]
fn test_fwhm_rejected_fit_moves_to_next_star() {
    let estimate = estimate_fwhm(&hot_pixel_field(), &small_config());
    assert!(estimate.is_valid());
    assert_abs_diff_eq!(estimate.sigma, 2.5, epsilon = 0.02);
}

#[test]
fn test_fwhm_one_extra_fit_past_budget() {
    // Fit 1 rejects the hot pixel, fit 2 is still allowed
    let config = FwhmConfig {
        max_attempts: 1,
        ..small_config()
    };
    let estimate = estimate_fwhm(&hot_pixel_field(), &config);
    assert!(estimate.is_valid());
    assert_abs_diff_eq!(estimate.sigma, 2.5, epsilon = 0.02);
}

#[test]
fn test_fwhm_attempt_budget_exhausted() {
    let config = FwhmConfig {
        max_attempts: 0,
        ..small_config()
    };
    assert_eq!(estimate_fwhm(&hot_pixel_field(), &config), FwhmEstimate::default());
}

#[test]
fn test_fwhm_budget_zero_still_fits_first_candidate() {
    let frame = common::star_field(200, 200, 500.0, &[(100.0, 100.0, 6000.0)], 2.0, 0.0, 0);
    let config = FwhmConfig {
        max_attempts: 0,
        ..small_config()
    };
    assert_abs_diff_eq!(estimate_fwhm(&frame, &config).sigma, 2.0, epsilon = 0.02);
}

#[test]
fn test_fwhm_faint_field_first_candidate_fitted() {
    // Brightest star peaks near 900 counts, under the noise floor
    let frame = common::star_field(200, 200, 100.0, &[(100.0, 100.0, 800.0)], 2.0, 0.0, 0);
    let estimate = estimate_fwhm(&frame, &small_config());
    assert!(estimate.is_valid());
    assert_abs_diff_eq!(estimate.sigma, 2.0, epsilon = 0.02);
}

#[test]
fn test_fwhm_below_noise_floor_after_masking() {
    let mut frame = common::star_field(200, 200, 500.0, &[(140.0, 140.0, 300.0)], 2.0, 0.0, 0);
    frame.data[[60, 60]] = 20_000.0;
    let estimate = estimate_fwhm(&frame, &small_config());
    assert!(!estimate.is_valid());
    assert_eq!(estimate.fwhm, 0.0);
    assert_eq!(estimate.sigma, 0.0);
}

#[test]
fn test_fwhm_only_saturated_stars() {
    let frame = common::star_field(200, 200, 500.0, &[(100.0, 100.0, 90_000.0)], 2.0, 0.0, 0);
    assert!(!estimate_fwhm(&frame, &small_config()).is_valid());
}

#[test]
fn test_fwhm_frame_smaller_than_border() {
    let frame = common::star_field(150, 300, 500.0, &[(150.0, 75.0, 10_000.0)], 2.0, 0.0, 0);
    assert!(!estimate_fwhm(&frame, &FwhmConfig::default()).is_valid());
}

#[test]
fn test_fwhm_leaves_input_untouched() {
    let frame = common::star_field(
        200,
        200,
        500.0,
        &[(60.0, 60.0, 80_000.0), (140.0, 140.0, 6000.0)],
        2.0,
        0.0,
        0,
    );
    let before = frame.data.clone();
    estimate_fwhm(&frame, &small_config());
    assert_eq!(frame.data, before);
}
