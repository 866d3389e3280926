use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use std::io::Cursor;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .context("encode pad image as png")?;
    Ok(bytes)
}

pub fn png_data_uri(image: &RgbaImage) -> Result<String> {
    let bytes = encode_png(image)?;
    Ok(format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(bytes)))
}

/// Inverse of [`png_data_uri`]: returns the raw PNG bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or_else(|| anyhow!("not a png data uri"))?;
    STANDARD
        .decode(payload)
        .context("decode base64 image payload")
}

/// Grayscale then hard threshold at 128. Alpha is kept so untouched areas
/// stay transparent.
pub fn binarize(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0;
        let gray = r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114;
        let level = if gray < 128.0 { 0 } else { 255 };
        px.0 = [level, level, level, a];
    }
    out
}
