//! Whole-pixel, wrap-around frame translation.

use ndarray::{s, Array2};
use tracing::debug;

use crate::frame::Frame;
use crate::stats::median_f64;

use super::matcher::ShiftRecord;

/// Integer translation applied to a frame, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelShift {
    pub dx: isize,
    pub dy: isize,
}

/// Reduce per-star offsets to a single whole-pixel shift.
///
/// Only matched records take part. Returns `None` (leave the frame alone) when
/// nothing matched or the median separation is below `threshold`; otherwise
/// the medians of dx and dy rounded half-to-even.
pub fn resolve_shift(records: &[ShiftRecord], threshold: f64) -> Option<PixelShift> {
    let matched: Vec<&ShiftRecord> = records.iter().filter(|r| r.is_matched()).collect();
    if matched.is_empty() {
        return None;
    }

    let mut distances: Vec<f64> = matched.iter().map(|r| r.distance).collect();
    let offset = median_f64(&mut distances);
    if offset < threshold {
        return None;
    }

    let mut dxs: Vec<f64> = matched.iter().map(|r| r.dx).collect();
    let mut dys: Vec<f64> = matched.iter().map(|r| r.dy).collect();
    Some(PixelShift {
        dx: median_f64(&mut dxs).round_ties_even() as isize,
        dy: median_f64(&mut dys).round_ties_even() as isize,
    })
}

/// Shift a frame according to its matches against the reference frame.
pub fn shift_by_records(frame: &Frame, records: &[ShiftRecord], threshold: f64) -> Frame {
    match resolve_shift(records, threshold) {
        Some(shift) => {
            debug!(
                frame = frame.metadata.frame_index,
                dx = shift.dx,
                dy = shift.dy,
                "Rolling frame"
            );
            roll_frame(frame, shift)
        }
        None => frame.clone(),
    }
}

pub fn roll_frame(frame: &Frame, shift: PixelShift) -> Frame {
    Frame::derived(roll_array(&frame.data, shift.dy, shift.dx), frame)
}

/// Circularly shift an array: the value at (r, c) moves to
/// ((r + dy) mod h, (c + dx) mod w). Nothing is cropped.
pub fn roll_array(data: &Array2<f32>, dy: isize, dx: isize) -> Array2<f32> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 {
        return data.clone();
    }
    let sy = dy.rem_euclid(h as isize) as usize;
    let sx = dx.rem_euclid(w as isize) as usize;

    let mut result = Array2::<f32>::zeros((h, w));
    result
        .slice_mut(s![sy.., sx..])
        .assign(&data.slice(s![..h - sy, ..w - sx]));
    result
        .slice_mut(s![sy.., ..sx])
        .assign(&data.slice(s![..h - sy, w - sx..]));
    result
        .slice_mut(s![..sy, sx..])
        .assign(&data.slice(s![h - sy.., ..w - sx]));
    result
        .slice_mut(s![..sy, ..sx])
        .assign(&data.slice(s![h - sy.., w - sx..]));
    result
}
