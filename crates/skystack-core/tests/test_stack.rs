use ndarray::Array2;

use skystack_core::error::SkystackError;
use skystack_core::frame::Frame;
use skystack_core::stack::median::median_stack;
use skystack_core::stack::sigma_clip::{clipped_median, sigma_clip_median_stack, SigmaClipParams};
use skystack_core::stack::{stack_frames, StackMethod};

mod common;

fn make_frame(h: usize, w: usize, fill: f32) -> Frame {
    Frame::new(Array2::from_elem((h, w), fill))
}

/// Six frames at 10, five at 12 and one at 10000.
fn outlier_stack(h: usize, w: usize) -> Vec<Frame> {
    let mut frames: Vec<Frame> = (0..6).map(|_| make_frame(h, w, 10.0)).collect();
    frames.extend((0..5).map(|_| make_frame(h, w, 12.0)));
    frames.push(make_frame(h, w, 10_000.0));
    frames
}

// ---------------------------------------------------------------------------
// Median
// ---------------------------------------------------------------------------

#[test]
fn test_median_single_frame() {
    let frame = common::star_field(16, 16, 100.0, &[(8.0, 8.0, 500.0)], 1.5, 3.0, 1);
    let result = median_stack(std::slice::from_ref(&frame)).unwrap();
    assert_eq!(result.data, frame.data);
}

#[test]
fn test_median_even_count() {
    let frames: Vec<Frame> = [1.0f32, 3.0, 7.0, 9.0]
        .iter()
        .map(|&v| make_frame(8, 8, v))
        .collect();
    let result = median_stack(&frames).unwrap();
    assert!(result.data.iter().all(|&v| v == 5.0));
}

#[test]
fn test_median_empty_error() {
    assert!(matches!(median_stack(&[]), Err(SkystackError::EmptySequence)));
}

// ---------------------------------------------------------------------------
// Sigma-clipped median
// ---------------------------------------------------------------------------

#[test]
fn test_sigma_clip_single_frame_is_exact() {
    let frame = common::star_field(16, 16, 100.0, &[(8.0, 8.0, 500.0)], 1.5, 3.0, 2);
    let result =
        sigma_clip_median_stack(std::slice::from_ref(&frame), &SigmaClipParams::default()).unwrap();
    assert_eq!(result.data, frame.data);
}

#[test]
fn test_sigma_clip_identical_frames() {
    let frame = common::star_field(16, 16, 100.0, &[(8.0, 8.0, 500.0)], 1.5, 3.0, 3);
    let frames = vec![frame.clone(), frame.clone(), frame.clone()];
    let result = sigma_clip_median_stack(&frames, &SigmaClipParams::default()).unwrap();
    assert_eq!(result.data, frame.data);
}

#[test]
fn test_sigma_clip_rejects_outlier_frame() {
    let frames = outlier_stack(8, 8);

    // The plain median is pulled between the two populations by the outlier
    let plain = median_stack(&frames).unwrap();
    assert!(plain.data.iter().all(|&v| v == 11.0));

    let clipped = sigma_clip_median_stack(&frames, &SigmaClipParams::default()).unwrap();
    assert!(clipped.data.iter().all(|&v| v == 10.0));
}

#[test]
fn test_sigma_clip_large_frame_parallel_path() {
    let frames = outlier_stack(256, 256);
    let clipped = sigma_clip_median_stack(&frames, &SigmaClipParams::default()).unwrap();
    assert_eq!(clipped.data.dim(), (256, 256));
    assert!(clipped.data.iter().all(|&v| v == 10.0));
}

#[test]
fn test_sigma_clip_empty_error() {
    let result = sigma_clip_median_stack(&[], &SigmaClipParams::default());
    assert!(matches!(result, Err(SkystackError::EmptySequence)));
}

#[test]
fn test_sigma_clip_dimension_mismatch() {
    let frames = vec![make_frame(8, 8, 1.0), make_frame(8, 8, 1.0), make_frame(8, 9, 1.0)];
    match sigma_clip_median_stack(&frames, &SigmaClipParams::default()) {
        Err(SkystackError::DimensionMismatch {
            index,
            width,
            expected_width,
            ..
        }) => {
            assert_eq!(index, 2);
            assert_eq!(width, 9);
            assert_eq!(expected_width, 8);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn test_clipped_median_values() {
    let params = SigmaClipParams::default();
    assert_eq!(clipped_median(&mut [5.0], &params), 5.0);
    assert_eq!(clipped_median(&mut [2.0, 2.0, 2.0], &params), 2.0);

    let mut values = vec![10.0f32; 6];
    values.extend([12.0; 5]);
    values.push(10_000.0);
    assert_eq!(clipped_median(&mut values, &params), 10.0);
}

#[test]
fn test_clipped_median_zero_iterations_is_median() {
    let params = SigmaClipParams {
        iterations: 0,
        ..Default::default()
    };
    let mut values = vec![10.0f32; 6];
    values.extend([12.0; 5]);
    values.push(10_000.0);
    assert_eq!(clipped_median(&mut values, &params), 11.0);
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[test]
fn test_stack_frames_dispatch() {
    let frames = outlier_stack(4, 4);
    let median = stack_frames(&frames, &StackMethod::Median).unwrap();
    assert_eq!(median.data[[0, 0]], 11.0);
    let clipped = stack_frames(&frames, &StackMethod::default()).unwrap();
    assert_eq!(clipped.data[[0, 0]], 10.0);
}

#[test]
fn test_stack_keeps_reference_metadata() {
    let mut frames = outlier_stack(4, 4);
    frames[0].metadata.source = Some("ref.tiff".into());
    let result = stack_frames(&frames, &StackMethod::default()).unwrap();
    assert_eq!(result.metadata.source.as_deref(), Some("ref.tiff"));
}
