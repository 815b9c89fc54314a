use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use mandelview_core::{DetailPolicy, Mandelbrot, PlaneWindow, Viewport};

use crate::buffer::PixelBuffer;
use crate::config::ExplorerConfig;
use crate::palette::{Palette, PaletteGenerator, PaletteStrategy};
use crate::renderer::{FrameRenderer, RenderCancel, RenderStats};

/// Snapshot of the view for an overlay or a log line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    pub width: u32,
    pub height: u32,
    pub aspect: f64,
    pub zoom_level: f64,
    pub budget: u32,
    pub window: PlaneWindow,
    pub real_range: f64,
    pub imag_range: f64,
    pub last_render_ms: f64,
    pub evaluations: u64,
    pub cache_hit: bool,
}

/// Everything the explorer needs between frames.
///
/// The surrounding application owns one of these, feeds it input through
/// [`pan`](Self::pan) and [`zoom`](Self::zoom), and calls
/// [`render_frame`](Self::render_frame) once per display frame.
#[derive(Debug)]
pub struct RenderState {
    config: ExplorerConfig,
    viewport: Viewport,
    detail: DetailPolicy,
    budget: u32,
    palettes: PaletteGenerator,
    renderer: FrameRenderer,
    evaluator: Mandelbrot,
}

impl RenderState {
    /// Build the state for a `width × height` surface.
    ///
    /// Fails on invalid configuration or dimensions, or if the pixel buffer
    /// or palette cannot be allocated.
    pub fn initialize(config: ExplorerConfig, width: u32, height: u32) -> crate::Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(config.initial_window, width, height)?;
        let detail = DetailPolicy::new(&config.detail, width, height)?;
        let budget = detail.budget_for(viewport.zoom_level());
        let palettes = PaletteGenerator::new(config.palette, budget)?;
        let renderer = FrameRenderer::new(width, height, config.parallel)?;
        let evaluator = Mandelbrot::new(config.interior_check);
        info!(
            width,
            height,
            budget,
            palette = config.palette.name(),
            "Render state initialized"
        );
        Ok(Self {
            config,
            viewport,
            detail,
            budget,
            palettes,
            renderer,
            evaluator,
        })
    }

    /// Adapt to a resized display surface.
    ///
    /// The real window and imaginary centre are kept; on error nothing
    /// changes.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        let mut viewport = self.viewport;
        viewport.resize(width, height)?;
        let detail = DetailPolicy::new(&self.config.detail, width, height)?;
        self.renderer.resize(width, height)?;
        self.viewport = viewport;
        self.detail = detail;
        self.refresh_budget();
        Ok(())
    }

    /// Apply a pixel-space drag delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if self.viewport.apply_pan(dx, dy) {
            debug!(dx, dy, "Pan applied");
        }
    }

    /// Apply one scroll event; positive deltas zoom in.
    pub fn zoom(&mut self, scroll_delta: f64) {
        if self.viewport.apply_zoom(scroll_delta, &self.config.zoom) {
            self.refresh_budget();
        }
    }

    /// Back to the configured initial window at zoom level 1.0.
    pub fn reset(&mut self) -> crate::Result<()> {
        self.viewport.reset(self.config.initial_window)?;
        self.refresh_budget();
        info!("View reset");
        Ok(())
    }

    /// Switch palette strategy; the next frame is fully re-rendered.
    pub fn set_palette_strategy(&mut self, strategy: PaletteStrategy) -> crate::Result<()> {
        if self.palettes.set_strategy(strategy)? {
            self.config.palette = strategy;
            self.renderer.invalidate();
        }
        Ok(())
    }

    fn refresh_budget(&mut self) {
        let budget = self.detail.budget_for(self.viewport.zoom_level());
        if budget != self.budget {
            debug!(from = self.budget, to = budget, "Detail budget changed");
            self.budget = budget;
        }
    }

    /// Produce the frame for the current view.
    ///
    /// The palette is brought up to the current budget first; the pixel pass
    /// is skipped if the view has not moved since the last completed frame.
    pub fn render_frame(&mut self) -> crate::Result<&PixelBuffer> {
        self.palettes.ensure(self.budget)?;
        self.renderer.render(
            &self.evaluator,
            &self.viewport,
            self.palettes.palette(),
        )?;
        Ok(self.renderer.buffer())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn palette(&self) -> &Palette {
        self.palettes.palette()
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// The most recently rendered buffer, without rendering.
    pub fn buffer(&self) -> &PixelBuffer {
        self.renderer.buffer()
    }

    pub fn last_stats(&self) -> RenderStats {
        self.renderer.last_stats()
    }

    pub fn cancel_handle(&self) -> Arc<RenderCancel> {
        self.renderer.cancel_handle()
    }

    pub fn telemetry(&self) -> Telemetry {
        let window = *self.viewport.window();
        let stats = self.renderer.last_stats();
        Telemetry {
            width: self.viewport.width(),
            height: self.viewport.height(),
            aspect: self.viewport.width() as f64 / self.viewport.height() as f64,
            zoom_level: self.viewport.zoom_level(),
            budget: self.budget,
            window,
            real_range: window.real_range(),
            imag_range: window.imag_range(),
            last_render_ms: stats.elapsed.as_secs_f64() * 1000.0,
            evaluations: stats.evaluations,
            cache_hit: stats.cache_hit,
        }
    }
}
