use crate::error::RenderError;

/// Bytes per pixel: R, G, B, A at 8 bits each.
pub const BYTES_PER_PIXEL: usize = 4;

/// An RGBA pixel buffer, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a buffer filled with opaque black.
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn try_new(width: u32, height: u32) -> crate::Result<Self> {
        let bytes = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(RenderError::Allocation {
                what: "pixel buffer",
                bytes: usize::MAX,
            })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| RenderError::Allocation {
                what: "pixel buffer",
                bytes,
            })?;
        pixels.extend(std::iter::repeat([0, 0, 0, 255]).take(bytes / BYTES_PER_PIXEL).flatten());
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, ready for texture upload or encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Bytes in one row.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Color at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = y as usize * self.stride() + x as usize * BYTES_PER_PIXEL;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn dimensions_match(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}
