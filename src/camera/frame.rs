//! Raw video frames produced by camera streams

use crate::error::{CamaraError, CamaraResult};

/// One frame from a live stream
///
/// Pixels are RGBA8 in row-major order (`width * height * 4` bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Frame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CamaraError::Image`] when the buffer length is not exactly
    /// `width * height * 4` or the dimensions are zero.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> CamaraResult<Self> {
        if width == 0 || height == 0 {
            return Err(CamaraError::Image(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let expected = required_rgba_len(width, height)?;
        if rgba.len() != expected {
            return Err(CamaraError::Image(format!(
                "invalid frame shape: expected {expected} bytes, got {}",
                rgba.len()
            )));
        }

        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel buffer
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA value of the pixel at `(x, y)`, `None` outside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.rgba.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Returns a horizontally mirrored copy
    pub fn mirrored(&self) -> Self {
        let row_len = self.width as usize * 4;
        let mut rgba = Vec::with_capacity(self.rgba.len());

        for row in self.rgba.chunks_exact(row_len) {
            for pixel in row.chunks_exact(4).rev() {
                rgba.extend_from_slice(pixel);
            }
        }

        Self {
            width: self.width,
            height: self.height,
            rgba,
        }
    }
}

fn required_rgba_len(width: u32, height: u32) -> CamaraResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| CamaraError::Image("frame dimensions overflow".to_string()))
}
