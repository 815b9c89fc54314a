//! Navigation commands standing in for window input events.
//!
//! Each command maps onto one call into [`RenderState`], the same way a
//! windowing front end would forward a drag, a scroll notch, or a resize.

use std::str::FromStr;

use tracing::{debug, info};

use mandelview_render::{PaletteStrategy, RenderState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavCommand {
    /// Scroll delta; positive zooms in. `zoom:+1`, `zoom:-2`.
    Zoom(f64),
    /// Drag delta in pixels. `pan:12,-4`.
    Pan { dx: f64, dy: f64 },
    /// `resize:1920x1080`.
    Resize { width: u32, height: u32 },
    /// `palette:modular`.
    Palette(PaletteStrategy),
    Reset,
    /// Render a frame and log its telemetry.
    Render,
}

impl FromStr for NavCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        match (name, arg) {
            ("zoom", Some(arg)) => parse_f64(arg).map(NavCommand::Zoom),
            ("pan", Some(arg)) => {
                let (dx, dy) = arg
                    .split_once(',')
                    .ok_or_else(|| format!("expected pan:DX,DY, got {s:?}"))?;
                Ok(NavCommand::Pan {
                    dx: parse_f64(dx)?,
                    dy: parse_f64(dy)?,
                })
            }
            ("resize", Some(arg)) => {
                let (w, h) = arg
                    .split_once('x')
                    .ok_or_else(|| format!("expected resize:WxH, got {s:?}"))?;
                Ok(NavCommand::Resize {
                    width: parse_u32(w)?,
                    height: parse_u32(h)?,
                })
            }
            ("palette", Some(arg)) => parse_palette(arg).map(NavCommand::Palette),
            ("reset", None) => Ok(NavCommand::Reset),
            ("render", None) => Ok(NavCommand::Render),
            _ => Err(format!("unknown command {s:?}")),
        }
    }
}

fn parse_f64(s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    s.trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid size {s:?}: {e}"))
}

pub fn parse_palette(s: &str) -> Result<PaletteStrategy, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "spectral" => Ok(PaletteStrategy::Spectral),
        "modular" => Ok(PaletteStrategy::Modular),
        other => Err(format!("unknown palette {other:?} (spectral|modular)")),
    }
}

/// Apply one command. `Render` produces a frame and logs it.
pub fn apply(state: &mut RenderState, command: NavCommand) -> mandelview_render::Result<()> {
    debug!(?command, "Applying command");
    match command {
        NavCommand::Zoom(delta) => state.zoom(delta),
        NavCommand::Pan { dx, dy } => state.pan(dx, dy),
        NavCommand::Resize { width, height } => state.resize(width, height)?,
        NavCommand::Palette(strategy) => state.set_palette_strategy(strategy)?,
        NavCommand::Reset => state.reset()?,
        NavCommand::Render => {
            state.render_frame()?;
            log_telemetry(state);
        }
    }
    Ok(())
}

pub fn log_telemetry(state: &RenderState) {
    let t = state.telemetry();
    info!(
        resolution = %format!("{}x{}", t.width, t.height),
        zoom = t.zoom_level,
        budget = t.budget,
        real = %format!("[{}, {}]", t.window.re_min, t.window.re_max),
        imag = %format!("[{}, {}]", t.window.im_min, t.window.im_max),
        render_ms = t.last_render_ms,
        cache_hit = t.cache_hit,
        "Frame"
    );
}
