use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::Complex;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Plane window
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle on the complex plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneWindow {
    pub re_min: f64,
    pub re_max: f64,
    pub im_min: f64,
    pub im_max: f64,
}

impl PlaneWindow {
    /// `[-2, 2] × [-1.5, 1.5]`, before aspect correction.
    pub const DEFAULT: Self = Self {
        re_min: -2.0,
        re_max: 2.0,
        im_min: -1.5,
        im_max: 1.5,
    };

    pub fn new(re_min: f64, re_max: f64, im_min: f64, im_max: f64) -> crate::Result<Self> {
        let window = Self {
            re_min,
            re_max,
            im_min,
            im_max,
        };
        window.validate()?;
        Ok(window)
    }

    /// Reject non-finite, inverted, or zero-area windows.
    pub fn validate(&self) -> crate::Result<()> {
        let bounds = [self.re_min, self.re_max, self.im_min, self.im_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(CoreError::InvalidWindow {
                reason: format!("bounds must be finite, got {bounds:?}"),
            });
        }
        if self.re_max <= self.re_min {
            return Err(CoreError::InvalidWindow {
                reason: format!(
                    "real axis must satisfy min < max, got [{}, {}]",
                    self.re_min, self.re_max
                ),
            });
        }
        if self.im_max <= self.im_min {
            return Err(CoreError::InvalidWindow {
                reason: format!(
                    "imaginary axis must satisfy min < max, got [{}, {}]",
                    self.im_min, self.im_max
                ),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn real_range(&self) -> f64 {
        self.re_max - self.re_min
    }

    #[inline]
    pub fn imag_range(&self) -> f64 {
        self.im_max - self.im_min
    }

    pub fn center(&self) -> Complex {
        Complex::new(
            (self.re_min + self.re_max) / 2.0,
            (self.im_min + self.im_max) / 2.0,
        )
    }

    fn centered(center: Complex, real_range: f64, imag_range: f64) -> Self {
        Self {
            re_min: center.re - real_range / 2.0,
            re_max: center.re + real_range / 2.0,
            im_min: center.im - imag_range / 2.0,
            im_max: center.im + imag_range / 2.0,
        }
    }
}

impl Default for PlaneWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ---------------------------------------------------------------------------
// Cache key
// ---------------------------------------------------------------------------

/// Bit-exact snapshot of the four window bounds.
///
/// Equality is on the raw bit patterns, so two windows only match when every
/// bound is the very same `f64`; no tolerance is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u64; 4]);

impl CacheKey {
    pub fn of(window: &PlaneWindow) -> Self {
        Self([
            window.re_min.to_bits(),
            window.re_max.to_bits(),
            window.im_min.to_bits(),
            window.im_max.to_bits(),
        ])
    }
}

// ---------------------------------------------------------------------------
// Zoom factors
// ---------------------------------------------------------------------------

/// Per-notch scale factors applied to the plane window on scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomFactors {
    /// Applied on scroll-in; must lie in `(0, 1)`.
    pub zoom_in: f64,
    /// Applied on scroll-out; must be `> 1`.
    pub zoom_out: f64,
}

impl ZoomFactors {
    pub const DEFAULT_ZOOM_IN: f64 = 0.9;
    pub const DEFAULT_ZOOM_OUT: f64 = 1.1;

    pub fn new(zoom_in: f64, zoom_out: f64) -> crate::Result<Self> {
        let factors = Self { zoom_in, zoom_out };
        factors.validate()?;
        Ok(factors)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if !(self.zoom_in > 0.0 && self.zoom_in < 1.0) {
            return Err(CoreError::InvalidZoomFactor {
                name: "zoom_in",
                value: self.zoom_in,
                reason: "must lie in (0, 1)",
            });
        }
        if !(self.zoom_out > 1.0 && self.zoom_out.is_finite()) {
            return Err(CoreError::InvalidZoomFactor {
                name: "zoom_out",
                value: self.zoom_out,
                reason: "must be finite and > 1",
            });
        }
        Ok(())
    }
}

impl Default for ZoomFactors {
    fn default() -> Self {
        Self {
            zoom_in: Self::DEFAULT_ZOOM_IN,
            zoom_out: Self::DEFAULT_ZOOM_OUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible region of the complex plane and the pixel grid it maps onto.
///
/// Pixel `(0, 0)` is the top-left corner and maps to `(re_min, im_max)`;
/// pixel `(width - 1, height - 1)` maps to `(re_max, im_min)`. The imaginary
/// extent always follows `height / width` times the real extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    window: PlaneWindow,
    width: u32,
    height: u32,
    zoom_level: f64,
}

impl Viewport {
    /// Create a viewport at zoom level 1.0.
    ///
    /// The real axis of `window` is kept as-is; the imaginary axis is rebuilt
    /// around its centre to match the pixel aspect ratio.
    pub fn new(window: PlaneWindow, width: u32, height: u32) -> crate::Result<Self> {
        window.validate()?;
        check_dimensions(width, height)?;
        let mut viewport = Self {
            window,
            width,
            height,
            zoom_level: 1.0,
        };
        viewport.match_aspect();
        Ok(viewport)
    }

    /// Change the pixel dimensions, preserving the real window and the
    /// imaginary centre. On error the viewport is left untouched.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        check_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        self.match_aspect();
        debug!(width, height, "Viewport resized");
        Ok(())
    }

    /// Restore `window` at zoom level 1.0, keeping the current dimensions.
    pub fn reset(&mut self, window: PlaneWindow) -> crate::Result<()> {
        window.validate()?;
        self.window = window;
        self.zoom_level = 1.0;
        self.match_aspect();
        Ok(())
    }

    fn match_aspect(&mut self) {
        let aspect = self.height as f64 / self.width as f64;
        let imag_range = self.window.real_range() * aspect;
        let imag_center = (self.window.im_min + self.window.im_max) / 2.0;
        self.window.im_min = imag_center - imag_range / 2.0;
        self.window.im_max = imag_center + imag_range / 2.0;
    }

    #[inline]
    pub fn window(&self) -> &PlaneWindow {
        &self.window
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Multiplicative zoom relative to the initial window (1.0 = initial).
    #[inline]
    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Apply one scroll event. Positive deltas zoom in.
    ///
    /// Returns `false` (and changes nothing) when `scroll_delta` is zero.
    pub fn apply_zoom(&mut self, scroll_delta: f64, factors: &ZoomFactors) -> bool {
        if scroll_delta == 0.0 || scroll_delta.is_nan() {
            return false;
        }
        let factor = if scroll_delta > 0.0 {
            factors.zoom_in
        } else {
            factors.zoom_out
        };
        self.zoom_by(factor);
        true
    }

    /// Scale both axes about the view centre by `factor`.
    ///
    /// `zoom_level` becomes `zoom_level / factor`, unless that would not be
    /// positive and finite (underflow after many zoom-outs, overflow after
    /// many zoom-ins), in which case it is kept.
    fn zoom_by(&mut self, factor: f64) {
        let next = self.zoom_level / factor;
        if next > 0.0 && next.is_finite() {
            self.zoom_level = next;
        }
        let center = self.window.center();
        self.window = PlaneWindow::centered(
            center,
            self.window.real_range() * factor,
            self.window.imag_range() * factor,
        );
        debug!(factor, zoom_level = self.zoom_level, "Zoom applied");
    }

    /// Translate the window by a pixel-space drag delta.
    ///
    /// The content follows the pointer: dragging right moves the window
    /// towards smaller real values, dragging down towards larger imaginary
    /// values. Returns `false` for a zero delta.
    pub fn apply_pan(&mut self, dx: f64, dy: f64) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let real_range = self.window.real_range();
        let imag_range = self.window.imag_range();
        let re_offset = dx * (real_range / self.width as f64);
        let im_offset = dy * (imag_range / self.height as f64);
        let center = self.window.center();
        self.window = PlaneWindow::centered(
            Complex::new(center.re - re_offset, center.im + im_offset),
            real_range,
            imag_range,
        );
        true
    }

    /// Real coordinate of pixel column `px`.
    #[inline]
    pub fn real_at(&self, px: u32) -> f64 {
        let w = &self.window;
        if self.width > 1 && px == self.width - 1 {
            return w.re_max;
        }
        w.re_min + px as f64 * axis_step(w.re_min, w.re_max, self.width)
    }

    /// Imaginary coordinate of pixel row `py` (row 0 is the top).
    #[inline]
    pub fn imag_at(&self, py: u32) -> f64 {
        let w = &self.window;
        if self.height > 1 && py == self.height - 1 {
            return w.im_min;
        }
        w.im_max - py as f64 * axis_step(w.im_min, w.im_max, self.height)
    }

    /// Map a pixel coordinate to a point on the complex plane.
    #[inline]
    pub fn pixel_to_plane(&self, px: u32, py: u32) -> Complex {
        Complex::new(self.real_at(px), self.imag_at(py))
    }

    /// Real coordinate of every column, left to right.
    pub fn column_reals(&self) -> Vec<f64> {
        (0..self.width).map(|px| self.real_at(px)).collect()
    }

    /// Imaginary coordinate of every row, top to bottom.
    pub fn row_imags(&self) -> Vec<f64> {
        (0..self.height).map(|py| self.imag_at(py)).collect()
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::of(&self.window)
    }

    /// `true` unless every bound is bit-identical to the one in `key`.
    pub fn has_changed_since(&self, key: &CacheKey) -> bool {
        self.key() != *key
    }
}

fn check_dimensions(width: u32, height: u32) -> crate::Result<()> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidDimensions { width, height });
    }
    Ok(())
}

#[inline]
fn axis_step(min: f64, max: f64, samples: u32) -> f64 {
    if samples > 1 {
        (max - min) / (samples - 1) as f64
    } else {
        0.0
    }
}
