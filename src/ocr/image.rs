//! Image preparation for the model servers.

use crate::error::Result;
use crate::model::BBox;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Downscale `image` so its longest side is at most `max_side`.
///
/// Returns the (possibly unchanged) image and the factor that maps
/// coordinates in the returned image back to the input, i.e. `>= 1.0`.
pub fn fit_within(image: &DynamicImage, max_side: u32) -> (DynamicImage, f64) {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if max_side == 0 || longest <= max_side {
        return (image.clone(), 1.0);
    }

    let ratio = f64::from(max_side) / f64::from(longest);
    let new_width = ((f64::from(width) * ratio) as u32).max(1);
    let new_height = ((f64::from(height) * ratio) as u32).max(1);
    log::debug!(
        "Resizing image from {}x{} to {}x{}",
        width,
        height,
        new_width,
        new_height
    );

    let resized = image.resize_exact(new_width, new_height, FilterType::Lanczos3);
    (resized, f64::from(width) / f64::from(new_width))
}

/// Upscale `image` so both sides are at least `min_side`, keeping aspect ratio.
pub fn ensure_min_size(image: DynamicImage, min_side: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || (width >= min_side && height >= min_side) {
        return image;
    }

    let factor = (f64::from(min_side) / f64::from(width)).max(f64::from(min_side) / f64::from(height));
    let new_width = ((f64::from(width) * factor).round() as u32).max(min_side);
    let new_height = ((f64::from(height) * factor).round() as u32).max(min_side);
    log::debug!(
        "Upscaling crop from {}x{} to {}x{}",
        width,
        height,
        new_width,
        new_height
    );
    image.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Crop the region `bbox` out of `image`.
///
/// The box is clamped to the image first; `None` if nothing is left.
pub fn crop_block(image: &DynamicImage, bbox: BBox) -> Option<DynamicImage> {
    let (width, height) = image.dimensions();
    let clamped = bbox.clamp_to(width, height);
    if clamped.is_empty() {
        return None;
    }
    Some(image.crop_imm(clamped.x1, clamped.y1, clamped.width(), clamped.height()))
}

/// Encode as PNG and wrap in a `data:` URL.
pub fn to_data_url(image: &DynamicImage) -> Result<String> {
    let mut png_data = Vec::new();
    image.write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png_data)))
}
