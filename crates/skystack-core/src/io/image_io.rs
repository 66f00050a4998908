use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, SkystackError};
use crate::frame::Frame;

/// Load a grayscale image file as raw counts.
///
/// 8- and 16-bit grayscale data keep their integer values; anything else
/// (color, float) is converted to floating-point luminance.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);

    let values: Vec<f32> = match img {
        DynamicImage::ImageLuma8(gray) => gray.into_raw().into_iter().map(f32::from).collect(),
        DynamicImage::ImageLuma16(gray) => gray.into_raw().into_iter().map(f32::from).collect(),
        other => other.to_luma32f().into_raw(),
    };
    let data = Array2::from_shape_vec((h, w), values)?;

    let mut frame = Frame::new(data);
    frame.metadata.source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(frame)
}

/// Load a frame set in order; `frame_index` follows the input order.
pub fn load_frames(paths: &[PathBuf]) -> Result<Vec<Frame>> {
    if paths.is_empty() {
        return Err(SkystackError::EmptySequence);
    }
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let mut frame = load_image(path)?;
            frame.metadata.frame_index = i;
            debug!(
                index = i,
                path = %path.display(),
                width = frame.width(),
                height = frame.height(),
                "Loaded frame"
            );
            Ok(frame)
        })
        .collect()
}

/// Save a frame as 16-bit grayscale; counts are rounded and clamped to [0, 65535].
///
/// The format follows the file extension (`png`, otherwise TIFF).
pub fn save_image(frame: &Frame, path: &Path) -> Result<()> {
    let h = frame.height();
    let w = frame.width();

    let pixels: Vec<u16> = frame
        .data
        .iter()
        .map(|&v| {
            if v.is_finite() {
                v.round().clamp(0.0, 65535.0) as u16
            } else {
                0
            }
        })
        .collect();

    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| {
            SkystackError::InvalidParameter(format!("cannot build {w}x{h} image buffer"))
        })?;

    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => ImageFormat::Png,
        _ => ImageFormat::Tiff,
    };
    img.save_with_format(path, format)?;
    Ok(())
}
