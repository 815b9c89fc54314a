use thiserror::Error;

/// Errors originating from the core engine.
///
/// All of these are configuration errors: they are raised when a viewport,
/// zoom setting, or detail policy is constructed, never mid-frame.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid dimensions: {width}×{height} (both must be > 0)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid plane window: {reason}")]
    InvalidWindow { reason: String },

    #[error("invalid zoom factor: {name} = {value} ({reason})")]
    InvalidZoomFactor {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid detail budget: {reason}")]
    InvalidBudget { reason: String },
}
