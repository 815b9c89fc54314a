pub mod complex;
pub mod detail;
pub mod error;
pub mod escape;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use detail::{compute_budget, DetailConfig, DetailPolicy};
pub use error::CoreError;
pub use escape::{escape_iterations, EscapeTime, Mandelbrot};
pub use viewport::{CacheKey, PlaneWindow, Viewport, ZoomFactors};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
