use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// A point on the complex plane as two `f64` components.
///
/// `Copy` and arithmetic-only; the escape-time loop works on the raw
/// components, everything else (mapping, tests, telemetry) uses this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

impl Add for Complex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Mul for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl std::fmt::Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.im >= 0.0 {
            write!(f, "{} + {}i", self.re, self.im)
        } else {
            write!(f, "{} - {}i", self.re, -self.im)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn multiplication() {
        // (1 + 2i)(3 + 4i) = 3 + 4i + 6i + 8i² = -5 + 10i
        let c = Complex::new(1.0, 2.0) * Complex::new(3.0, 4.0);
        assert!((c.re - (-5.0)).abs() < EPSILON);
        assert!((c.im - 10.0).abs() < EPSILON);
    }

    #[test]
    fn square_plus_c_matches_map() {
        // One step of z ← z² + c from z = 1 + i with c = -1: (2i) - 1
        let z = Complex::new(1.0, 1.0);
        let next = z * z + Complex::new(-1.0, 0.0);
        assert_eq!(next, Complex::new(-1.0, 2.0));
    }

    #[test]
    fn norm_sq() {
        assert!((Complex::new(3.0, 4.0).norm_sq() - 25.0).abs() < EPSILON);
    }

    #[test]
    fn display_sign() {
        assert_eq!(Complex::new(1.5, -0.5).to_string(), "1.5 - 0.5i");
        assert_eq!(Complex::new(-2.0, 0.25).to_string(), "-2 + 0.25i");
    }
}
