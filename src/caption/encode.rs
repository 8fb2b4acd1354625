use anyhow::{Context, Result};
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, RgbaImage};

/// Encodes `image` as a baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb: RgbImage = image.convert();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .with_context(|| "failed to encode image as JPEG")?;
    Ok(bytes)
}
