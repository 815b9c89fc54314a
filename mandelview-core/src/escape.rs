use crate::complex::Complex;

/// Squared escape radius. `|z| > 2` guarantees divergence for `z² + c`.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Escape-time evaluation of a single plane point.
///
/// Designed for **static dispatch**: the renderer is generic over
/// `E: EscapeTime` so the hot loop can be inlined.
pub trait EscapeTime {
    /// Iterations taken before the orbit of `c` left the escape radius, or
    /// `budget` if it stayed bounded for the whole budget.
    fn escape_iterations(&self, c: Complex, budget: u32) -> u32;
}

/// The Mandelbrot map `z ← z² + c`, starting from `z = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mandelbrot {
    /// Answer points inside the main cardioid and the period-2 bulb in
    /// closed form instead of iterating them to the budget.
    pub interior_check: bool,
}

impl Mandelbrot {
    pub fn new(interior_check: bool) -> Self {
        Self { interior_check }
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EscapeTime for Mandelbrot {
    #[inline]
    fn escape_iterations(&self, c: Complex, budget: u32) -> u32 {
        if self.interior_check && (in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im)) {
            return budget;
        }
        escape_iterations(c, budget)
    }
}

/// Count iterations of `z ← z² + c` from `z = 0` until `|z|² > 4` or the
/// count reaches `budget`.
///
/// Works on the squared components directly so there is no square root and
/// `re²`/`im²` are reused between the bailout test and the next step.
#[inline]
pub fn escape_iterations(c: Complex, budget: u32) -> u32 {
    let (mut re, mut im) = (0.0f64, 0.0f64);
    let (mut re2, mut im2) = (0.0f64, 0.0f64);
    let mut n = 0;
    while n < budget && re2 + im2 <= ESCAPE_RADIUS_SQ {
        im = 2.0 * re * im + c.im;
        re = re2 - im2 + c.re;
        re2 = re * re;
        im2 = im * im;
        n += 1;
    }
    n
}

/// Relative shrink applied to the closed-form regions so that rounding near
/// their boundary never claims a point that plain iteration would see escape.
const INTERIOR_MARGIN: f64 = 1e-9;

/// Returns `true` if `c` lies strictly inside the main cardioid.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let x = re - 0.25;
    let im2 = im * im;
    let q = x * x + im2;
    q * (q + x) < 0.25 * im2 * (1.0 - INTERIOR_MARGIN)
}

/// Returns `true` if `c` lies strictly inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im < 0.0625 * (1.0 - INTERIOR_MARGIN)
}
