pub mod buffer;
pub mod config;
pub mod error;
pub mod export;
pub mod palette;
pub mod renderer;
pub mod state;

pub use buffer::PixelBuffer;
pub use config::ExplorerConfig;
pub use error::RenderError;
pub use export::{export_png, ExportMetadata};
pub use palette::{Palette, PaletteGenerator, PaletteStrategy};
pub use renderer::{FrameRenderer, RenderCancel, RenderStats};
pub use state::{RenderState, Telemetry};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
