use approx::assert_abs_diff_eq;
use ndarray::Array2;

use skystack_core::frame::Frame;
use skystack_core::select::{annulus_background, subtract_local_background, LocalBackgroundConfig};
use skystack_core::star::StarTable;

mod common;

const FWHM: f64 = 4.0;

#[test]
fn test_flat_window_removed() {
    let frame = common::flat_frame(100, 100, 100.0);
    let stars = common::table_at(&[(50.0, 50.0)]);
    let result = subtract_local_background(&frame, &stars, FWHM, &LocalBackgroundConfig::default());

    // Window side 5 * 4 = 20: |index - 50| < 10
    for ((row, col), &v) in result.data.indexed_iter() {
        let inside = row.abs_diff(50) < 10 && col.abs_diff(50) < 10;
        let expected = if inside { 0.0 } else { 100.0 };
        assert_eq!(v, expected, "pixel ({row}, {col})");
    }
}

#[test]
fn test_star_flux_kept_above_local_sky() {
    let frame = common::star_field(120, 120, 800.0, &[(60.0, 60.0, 5000.0)], 2.0, 5.0, 9);
    let stars = common::table_at(&[(60.0, 60.0)]);
    let result = subtract_local_background(&frame, &stars, FWHM, &LocalBackgroundConfig::default());

    let centre = result.data[[60, 60]];
    assert_abs_diff_eq!(centre, frame.data[[60, 60]] - 800.0, epsilon = 2.0);
    assert_abs_diff_eq!(result.data[[5, 5]], frame.data[[5, 5]]);
}

#[test]
fn test_overlapping_windows_last_writer_wins() {
    let frame = common::flat_frame(100, 100, 100.0);
    let stars = common::table_at(&[(50.0, 50.0), (55.0, 50.0)]);
    let result = subtract_local_background(&frame, &stars, FWHM, &LocalBackgroundConfig::default());
    // Overlap is replaced once, not subtracted twice
    assert_eq!(result.data[[50, 52]], 0.0);
    assert_eq!(result.data[[50, 64]], 0.0);
    assert_eq!(result.data[[50, 65]], 100.0);
}

#[test]
fn test_per_star_background() {
    // Left half at 100, right half at 300
    let data = Array2::from_shape_fn((100, 200), |(_, c)| if c < 100 { 100.0 } else { 300.0 });
    let frame = Frame::new(data);
    let stars = common::table_at(&[(40.0, 50.0), (160.0, 50.0)]);
    let result = subtract_local_background(&frame, &stars, FWHM, &LocalBackgroundConfig::default());
    assert_eq!(result.data[[50, 40]], 0.0);
    assert_eq!(result.data[[50, 160]], 0.0);
    assert_eq!(result.data[[50, 100]], 300.0);
}

#[test]
fn test_input_unchanged() {
    let frame = common::star_field(80, 80, 500.0, &[(40.0, 40.0, 3000.0)], 2.0, 5.0, 3);
    let before = frame.data.clone();
    let stars = common::table_at(&[(40.0, 40.0)]);
    subtract_local_background(&frame, &stars, FWHM, &LocalBackgroundConfig::default());
    assert_eq!(frame.data, before);
}

#[test]
fn test_star_without_annulus_is_skipped() {
    let frame = common::flat_frame(8, 8, 100.0);
    let stars = common::table_at(&[(4.0, 4.0)]);
    let result = subtract_local_background(&frame, &stars, FWHM, &LocalBackgroundConfig::default());
    assert_eq!(result.data, frame.data);
}

#[test]
fn test_empty_star_table() {
    let frame = common::flat_frame(16, 16, 7.0);
    let result =
        subtract_local_background(&frame, &StarTable::default(), FWHM, &LocalBackgroundConfig::default());
    assert_eq!(result.data, frame.data);
}

#[test]
fn test_annulus_near_corner_uses_in_bounds_pixels() {
    let frame = common::flat_frame(64, 64, 250.0);
    let bkg = annulus_background(&frame.data, 2.0, 3.0, &LocalBackgroundConfig::default()).unwrap();
    assert_eq!(bkg, 250.0);
}

#[test]
fn test_annulus_ignores_star_core() {
    let frame = common::star_field(100, 100, 400.0, &[(50.0, 50.0, 20_000.0)], 2.0, 0.0, 0);
    let bkg = annulus_background(&frame.data, 50.0, 50.0, &LocalBackgroundConfig::default()).unwrap();
    assert_abs_diff_eq!(bkg, 400.0, epsilon = 1e-3);
}
