use serde::{Deserialize, Serialize};

use mandelview_core::{DetailConfig, DetailPolicy, PlaneWindow, ZoomFactors};

use crate::palette::PaletteStrategy;

/// Tunables for a [`RenderState`](crate::RenderState).
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Window shown at startup and after a reset (real axis kept, imaginary
    /// axis re-fit to the aspect ratio).
    pub initial_window: PlaneWindow,
    pub zoom: ZoomFactors,
    pub detail: DetailConfig,
    pub palette: PaletteStrategy,
    /// Evaluate rows on the rayon pool.
    pub parallel: bool,
    /// Skip iteration for the main cardioid and period-2 bulb.
    pub interior_check: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            initial_window: PlaneWindow::DEFAULT,
            zoom: ZoomFactors::default(),
            detail: DetailConfig::default(),
            palette: PaletteStrategy::default(),
            parallel: true,
            interior_check: true,
        }
    }
}

impl ExplorerConfig {
    /// Reject configurations that would produce undefined geometry.
    pub fn validate(&self) -> crate::Result<()> {
        self.initial_window.validate()?;
        self.zoom.validate()?;
        // Budget bounds do not depend on the dimensions.
        DetailPolicy::new(&self.detail, 1, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ExplorerConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "palette": "modular", "zoom": { "zoom_in": 0.5 } }"#;
        let config: ExplorerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.palette, PaletteStrategy::Modular);
        assert_eq!(config.zoom.zoom_in, 0.5);
        assert_eq!(config.zoom.zoom_out, ZoomFactors::DEFAULT_ZOOM_OUT);
        assert_eq!(config.initial_window, PlaneWindow::DEFAULT);
        assert!(config.parallel);
        config.validate().unwrap();
    }

    #[test]
    fn inverted_window_is_rejected() {
        let config = ExplorerConfig {
            initial_window: PlaneWindow {
                re_min: 1.0,
                re_max: -1.0,
                im_min: -1.0,
                im_max: 1.0,
            },
            ..ExplorerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_zoom_factor_is_rejected() {
        let config = ExplorerConfig {
            zoom: ZoomFactors {
                zoom_in: 1.2,
                zoom_out: 1.1,
            },
            ..ExplorerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
