use approx::assert_abs_diff_eq;

use skystack_core::detection::PeakFinder;
use skystack_core::fwhm::FwhmConfig;
use skystack_core::pipeline::config::PipelineConfig;
use skystack_core::pipeline::{
    prepare_field, prepare_field_reported, NoOpReporter, PipelineOutput, SkipReason,
};
use skystack_core::select::SelectionConfig;

mod common;

const SIGMA: f64 = 2.0;
const BACKGROUND: f32 = 1000.0;

/// Reference star positions (x, y) on a 160x160 field.
fn truth() -> Vec<(f64, f64)> {
    common::grid(40.3, 40.0, 3)
}

fn small_field_config() -> PipelineConfig {
    PipelineConfig {
        fwhm: FwhmConfig {
            cutout_half_size: 15,
            search_border: 20,
            ..Default::default()
        },
        selection: SelectionConfig {
            cutout_size: 21.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// The same field observed with integer pointing offsets and fresh noise.
fn dithered_frames(offsets: &[(f64, f64)]) -> Vec<skystack_core::frame::Frame> {
    offsets
        .iter()
        .enumerate()
        .map(|(i, &(dx, dy))| {
            let stars: Vec<(f64, f64, f64)> = truth()
                .into_iter()
                .map(|(x, y)| (x + dx, y + dy, 8000.0))
                .collect();
            let mut frame =
                common::star_field(160, 160, BACKGROUND, &stars, SIGMA, 20.0, 100 + i as u64);
            frame.metadata.frame_index = i;
            frame
        })
        .collect()
}

#[test]
fn test_prepare_field_end_to_end() {
    let frames = dithered_frames(&[(0.0, 0.0), (3.0, -2.0), (-2.0, 1.0), (1.0, 3.0)]);
    let output = prepare_field(&frames, &small_field_config()).unwrap();
    let field = output.prepared().expect("field should be prepared");

    assert_abs_diff_eq!(field.fwhm.sigma, SIGMA, epsilon = 0.1);
    assert_abs_diff_eq!(field.background.median, BACKGROUND as f64, epsilon = 3.0);
    assert_eq!(field.combined.data.dim(), (160, 160));

    assert_eq!(field.selection.detected, 9);
    assert_eq!(field.selection.selected, 9);
    assert!(!field.selection.trimmed);

    // Every selected star sits on a reference position
    for &(x, y) in &truth() {
        let nearest = field
            .stars
            .iter()
            .map(|s| ((s.x - x).powi(2) + (s.y - y).powi(2)).sqrt())
            .fold(f64::INFINITY, f64::min);
        assert!(nearest < 0.5, "no star near ({x}, {y}): {nearest}");
    }

    // Local sky removed around stars only
    let (row, col) = (40usize, 40usize);
    assert_abs_diff_eq!(
        field.flattened.data[[row, col]],
        field.combined.data[[row, col]] - BACKGROUND,
        epsilon = 10.0
    );
    assert_eq!(field.flattened.data[[0, 0]], field.combined.data[[0, 0]]);
}

#[test]
fn test_prepare_field_sorted_by_flux() {
    let frames = dithered_frames(&[(0.0, 0.0), (2.0, 2.0)]);
    let output = prepare_field_reported(
        &frames,
        &small_field_config(),
        &PeakFinder::default(),
        &NoOpReporter,
    )
    .unwrap();
    let field = output.prepared().unwrap();
    let fluxes: Vec<f64> = field.stars.iter().map(|s| s.flux).collect();
    assert!(fluxes.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_prepare_field_without_stars_is_skipped() {
    let frames = vec![common::flat_frame(160, 160, 500.0), common::flat_frame(160, 160, 500.0)];
    let output = prepare_field(&frames, &small_field_config()).unwrap();
    assert!(matches!(output, PipelineOutput::Skipped(SkipReason::NoFwhm)));
    assert!(output.prepared().is_none());
}

#[test]
fn test_prepare_field_rejects_empty_input() {
    assert!(prepare_field(&[], &small_field_config()).is_err());
}
