//! Measuring and cover-cropping images to platform presets

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::MediaError;
use crate::platforms::{optimal_image_type, target_dimensions, ImageType};
use crate::types::{Dimensions, MediaMimeType, Platform};

/// Pixel size of an encoded image, read from its header
pub fn measure(bytes: &[u8]) -> Result<Dimensions, MediaError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MediaError::Image(image::ImageError::IoError(e)))?
        .into_dimensions()?;
    Ok(Dimensions::new(width, height))
}

/// Scale to cover `target` and crop the overflow evenly from both sides
pub fn cover_crop(image: &DynamicImage, target: Dimensions) -> DynamicImage {
    let (width, height) = image.dimensions();
    let target_w = target.width.max(1);
    let target_h = target.height.max(1);

    let scale = f64::max(
        target_w as f64 / width.max(1) as f64,
        target_h as f64 / height.max(1) as f64,
    );
    let scaled_w = ((width as f64 * scale).round() as u32).max(target_w);
    let scaled_h = ((height as f64 * scale).round() as u32).max(target_h);

    let scaled = image.resize_exact(scaled_w, scaled_h, FilterType::Lanczos3);
    let x = (scaled_w - target_w) / 2;
    let y = (scaled_h - target_h) / 2;
    scaled.crop_imm(x, y, target_w, target_h)
}

fn image_format(mime: MediaMimeType) -> Option<ImageFormat> {
    match mime {
        MediaMimeType::Jpeg => Some(ImageFormat::Jpeg),
        MediaMimeType::Png => Some(ImageFormat::Png),
        MediaMimeType::Gif => Some(ImageFormat::Gif),
        MediaMimeType::Webp => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// An image re-encoded to a platform preset
#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub image_type: ImageType,
    pub dimensions: Dimensions,
}

/// Resize an encoded image to the preset its shape suits best on `platform`.
///
/// Returns `Ok(None)` when the image already has the preset's exact size or
/// the format is not one that can be re-encoded.
pub fn auto_resize(
    bytes: &[u8],
    mime: MediaMimeType,
    platform: Platform,
) -> Result<Option<ResizedImage>, MediaError> {
    let Some(format) = image_format(mime) else {
        return Ok(None);
    };

    let image = image::load_from_memory_with_format(bytes, format)?;
    let (width, height) = image.dimensions();
    let image_type = optimal_image_type(width, height, platform);
    let Some(target) = target_dimensions(platform, image_type) else {
        return Ok(None);
    };
    if target == Dimensions::new(width, height) {
        return Ok(None);
    }

    tracing::debug!(
        platform = %platform,
        image_type = %image_type,
        from = %format!("{}x{}", width, height),
        to = %format!("{}x{}", target.width, target.height),
        "Resizing image"
    );

    let resized = cover_crop(&image, target);
    // JPEG has no alpha channel
    let resized = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    let mut out = Cursor::new(Vec::new());
    resized.write_to(&mut out, format)?;

    Ok(Some(ResizedImage {
        bytes: out.into_inner(),
        image_type,
        dimensions: target,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([10u8, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_measure() {
        let bytes = png_bytes(30, 20);
        assert_eq!(measure(&bytes).unwrap(), Dimensions::new(30, 20));
        assert!(measure(b"not an image").is_err());
    }

    #[test]
    fn test_cover_crop_fills_target() {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            300,
            100,
            Rgba([0u8, 0, 0, 255]),
        ));
        let cropped = cover_crop(&img, Dimensions::new(50, 50));
        assert_eq!(cropped.dimensions(), (50, 50));

        let tall = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            10,
            40,
            Rgba([0u8, 0, 0, 255]),
        ));
        assert_eq!(cover_crop(&tall, Dimensions::new(64, 36)).dimensions(), (64, 36));
    }

    #[test]
    fn test_auto_resize_to_preset() {
        // 2:1 on twitter is "standard", 1200x675
        let bytes = png_bytes(400, 200);
        let resized = auto_resize(&bytes, MediaMimeType::Png, Platform::Twitter)
            .unwrap()
            .unwrap();
        assert_eq!(resized.image_type, ImageType::Standard);
        assert_eq!(resized.dimensions, Dimensions::new(1200, 675));
        assert_eq!(measure(&resized.bytes).unwrap(), Dimensions::new(1200, 675));
    }

    #[test]
    fn test_auto_resize_skips_exact_and_video() {
        let bytes = png_bytes(1080, 1080);
        assert!(auto_resize(&bytes, MediaMimeType::Png, Platform::Twitter)
            .unwrap()
            .is_none());
        assert!(auto_resize(&bytes, MediaMimeType::Mp4, Platform::Twitter)
            .unwrap()
            .is_none());
        assert!(auto_resize(b"garbage", MediaMimeType::Png, Platform::Twitter).is_err());
    }
}
