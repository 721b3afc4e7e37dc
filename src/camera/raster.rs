//! Rasterization of live frames into lossless stills
//!
//! A still is a PNG embedded as a base64 `data:` URL so it can be stored
//! and moved around as plain text.

use crate::camera::frame::Frame;
use crate::error::{CamaraError, CamaraResult};
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};

/// Prefix of every still payload
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A rasterized, PNG-encoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Still {
    /// Still width in pixels
    pub width: u32,
    /// Still height in pixels
    pub height: u32,
    /// `data:image/png;base64,...` payload
    pub data_url: String,
}

/// Render `frame` into a `width` x `height` still, mirrored when requested
///
/// The frame is only resampled when its size differs from the target size;
/// otherwise pixels are copied unchanged.
pub fn rasterize(frame: &Frame, width: u32, height: u32, mirror: bool) -> CamaraResult<Still> {
    if width == 0 || height == 0 {
        return Err(CamaraError::Image(format!(
            "cannot rasterize into {width}x{height}"
        )));
    }

    let source = RgbaImage::from_raw(frame.width(), frame.height(), frame.rgba().to_vec())
        .ok_or_else(|| CamaraError::Image("frame buffer does not match its size".to_string()))?;

    let mut canvas = if (frame.width(), frame.height()) == (width, height) {
        source
    } else {
        imageops::resize(&source, width, height, FilterType::Triangle)
    };

    if mirror {
        canvas = imageops::flip_horizontal(&canvas);
    }

    let png = encode_png(&canvas)?;
    Ok(Still {
        width,
        height,
        data_url: to_data_url(&png),
    })
}

/// Lossless PNG encoding of an RGBA image
pub fn encode_png(image: &RgbaImage) -> CamaraResult<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| CamaraError::Image(format!("png encoding failed: {e}")))?;
    Ok(png)
}

/// Wrap PNG bytes as a data URL
pub fn to_data_url(png: &[u8]) -> String {
    format!(
        "{}{}",
        PNG_DATA_URL_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Extract the PNG bytes from a data URL
pub fn png_from_data_url(data_url: &str) -> CamaraResult<Vec<u8>> {
    let encoded = data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| CamaraError::Image("payload is not a PNG data URL".to_string()))?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| CamaraError::Image(format!("invalid base64 payload: {e}")))
}

/// Decode a data URL back into pixels
pub fn decode_data_url(data_url: &str) -> CamaraResult<RgbaImage> {
    let png = png_from_data_url(data_url)?;
    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
        .map_err(|e| CamaraError::Image(format!("png decoding failed: {e}")))?;
    Ok(decoded.to_rgba8())
}
