mod app_dir;
mod input;
mod preferences;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mandelview_render::{export_png, ExportMetadata, PaletteStrategy, RenderState};

use crate::input::NavCommand;
use crate::preferences::AppPreferences;

/// Drive the Mandelbrot explorer from a navigation script and export the
/// final frame as PNG.
#[derive(Parser, Debug)]
#[command(name = "mandelview", version)]
struct Cli {
    /// Surface width in pixels (defaults to the preferences file).
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels (defaults to the preferences file).
    #[arg(long)]
    height: Option<u32>,

    /// Palette strategy: spectral or modular.
    #[arg(long, value_parser = input::parse_palette)]
    palette: Option<PaletteStrategy>,

    /// Preferences file (defaults to preferences.json next to the binary).
    #[arg(long)]
    preferences: Option<PathBuf>,

    /// Write the effective preferences back to the preferences file.
    #[arg(long, default_value_t = false)]
    save_preferences: bool,

    /// Where to write the final frame.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the final telemetry as JSON on stdout.
    #[arg(long, default_value_t = false)]
    telemetry_json: bool,

    /// Commands applied in order: zoom:N, pan:DX,DY, resize:WxH,
    /// palette:NAME, reset, render.
    commands: Vec<NavCommand>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Starting Mandelview");

    let prefs_path = cli.preferences.clone().unwrap_or_else(preferences::default_path);
    let mut prefs = AppPreferences::load(&prefs_path);
    if let Some(width) = cli.width {
        prefs.width = width;
    }
    if let Some(height) = cli.height {
        prefs.height = height;
    }
    if let Some(palette) = cli.palette {
        prefs.explorer.palette = palette;
    }
    if cli.save_preferences {
        prefs.save(&prefs_path);
    }

    let mut state = RenderState::initialize(prefs.explorer.clone(), prefs.width, prefs.height)
        .context("failed to initialize render state")?;

    for command in cli.commands {
        input::apply(&mut state, command)
            .with_context(|| format!("command {command:?} failed"))?;
    }

    state.render_frame().context("failed to render final frame")?;
    input::log_telemetry(&state);

    let output = match cli.output {
        Some(path) => path,
        None => {
            let dir = prefs.images_directory();
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            dir.join("mandelview.png")
        }
    };
    let metadata = ExportMetadata {
        palette_name: state.palette().strategy().name().to_string(),
        telemetry: state.telemetry(),
    };
    export_png(state.buffer(), &output, &metadata)
        .with_context(|| format!("failed to export {}", output.display()))?;
    info!("Saved frame to {}", output.display());

    if cli.telemetry_json {
        println!("{}", serde_json::to_string_pretty(&state.telemetry())?);
    }
    Ok(())
}
