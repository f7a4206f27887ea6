use super::interface::RawFrame;
use crate::config::CameraConfig;
use crate::error::CameraError;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use std::fs;
use tracing::debug;

/// Load the watermark font, or `None` when the file is missing or unparsable
pub(crate) fn load_watermark_font(path: &str) -> Option<Font<'static>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!(
                "Watermark font '{}' unavailable ({}); drawing band only",
                path, e
            );
            return None;
        }
    };

    let font = Font::try_from_vec(data);
    if font.is_none() {
        debug!("Failed to parse watermark font '{}'; drawing band only", path);
    }
    font
}

/// Darken a band along the bottom edge, draw the watermark text on it and
/// encode the result as JPEG
pub(crate) fn watermark_and_encode(
    frame: RawFrame,
    config: &CameraConfig,
    font: Option<&Font<'static>>,
) -> Result<Vec<u8>, CameraError> {
    let (width, height) = (frame.width, frame.height);
    let mut img = RgbImage::from_raw(width, height, frame.rgb).ok_or_else(|| {
        CameraError::Encode {
            details: format!("frame buffer does not match {}x{} RGB", width, height),
        }
    })?;

    let band_height = ((config.watermark_font_size * 1.5) as u32).min(height);
    let band_top = height - band_height;

    for y in band_top..height {
        for x in 0..width {
            let pixel = img.get_pixel(x, y);
            img.put_pixel(x, y, Rgb([pixel[0] / 3, pixel[1] / 3, pixel[2] / 3]));
        }
    }

    if let Some(font) = font {
        let scale = Scale::uniform(config.watermark_font_size);
        let (text_width, _) = text_size(scale, font, &config.watermark_text);
        let x = (width as i32 - text_width - 10).max(0);
        let y = band_top as i32 + (band_height as i32 / 6);

        draw_text_mut(
            &mut img,
            Rgb([255, 255, 255]),
            x,
            y,
            scale,
            font,
            &config.watermark_text,
        );
    }

    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, config.jpeg_quality)
        .encode(img.as_raw(), width, height, ColorType::Rgb8)
        .map_err(|e| CameraError::Encode {
            details: e.to_string(),
        })?;

    debug!(
        "Encoded {}x{} still with watermark '{}' ({} bytes)",
        width,
        height,
        config.watermark_text,
        output.len()
    );
    Ok(output)
}
