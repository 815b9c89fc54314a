//! PNG export with embedded view metadata (tEXt chunks).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::state::Telemetry;

/// View description embedded in an exported PNG.
pub struct ExportMetadata {
    pub palette_name: String,
    pub telemetry: Telemetry,
}

impl ExportMetadata {
    fn description(&self) -> String {
        let t = &self.telemetry;
        format!(
            "Mandelbrot - Real: [{}, {}], Imag: [{}, {}], Zoom: {}, Budget: {}",
            t.window.re_min, t.window.re_max, t.window.im_min, t.window.im_max, t.zoom_level, t.budget,
        )
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let t = &self.telemetry;
        vec![
            ("Mandelview.RealMin".into(), t.window.re_min.to_string()),
            ("Mandelview.RealMax".into(), t.window.re_max.to_string()),
            ("Mandelview.ImagMin".into(), t.window.im_min.to_string()),
            ("Mandelview.ImagMax".into(), t.window.im_max.to_string()),
            ("Mandelview.Zoom".into(), t.zoom_level.to_string()),
            ("Mandelview.Budget".into(), t.budget.to_string()),
            ("Mandelview.Palette".into(), self.palette_name.clone()),
            (
                "Mandelview.Resolution".into(),
                format!("{}x{}", t.width, t.height),
            ),
        ]
    }
}

/// Write `buffer` as an 8-bit RGBA PNG with the view metadata attached.
///
/// Uses the `png` crate directly to inject tEXt chunks readable by
/// exiftool and most image viewers.
pub fn export_png(
    buffer: &PixelBuffer,
    path: &Path,
    metadata: &ExportMetadata,
) -> crate::Result<()> {
    let writer = BufWriter::new(File::create(path)?);

    let mut encoder = png::Encoder::new(writer, buffer.width(), buffer.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder.add_text_chunk("Software".to_string(), "Mandelview".to_string())?;
    encoder.add_text_chunk("Description".to_string(), metadata.description())?;
    for (key, value) in metadata.pairs() {
        encoder.add_text_chunk(key, value)?;
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(buffer.as_bytes())?;
    png_writer.finish()?;

    debug!(
        width = buffer.width(),
        height = buffer.height(),
        "Exported PNG to {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExplorerConfig, RenderState};
    use std::io::Read;

    fn rendered(width: u32, height: u32) -> RenderState {
        let mut state =
            RenderState::initialize(ExplorerConfig::default(), width, height).unwrap();
        state.render_frame().unwrap();
        state
    }

    fn metadata(state: &RenderState) -> ExportMetadata {
        ExportMetadata {
            palette_name: state.palette().strategy().name().to_string(),
            telemetry: state.telemetry(),
        }
    }

    #[test]
    fn export_creates_valid_png() {
        let state = rendered(8, 6);
        let dir = std::env::temp_dir().join("mandelview_test_export");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("frame.png");

        export_png(state.buffer(), &path, &metadata(&state)).expect("export should succeed");

        let mut file = File::open(&path).expect("file should exist");
        let mut header = [0u8; 8];
        file.read_exact(&mut header).expect("should read header");
        assert_eq!(&header, b"\x89PNG\r\n\x1a\n", "valid PNG signature");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_embeds_text_chunks_and_pixels() {
        let state = rendered(5, 4);
        let dir = std::env::temp_dir().join("mandelview_test_export_meta");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("meta.png");

        export_png(state.buffer(), &path, &metadata(&state)).expect("export should succeed");

        let decoder = png::Decoder::new(File::open(&path).expect("file should exist"));
        let mut reader = decoder.read_info().expect("should read info");
        {
            let texts = &reader.info().uncompressed_latin1_text;
            assert!(texts
                .iter()
                .any(|t| t.keyword == "Software" && t.text == "Mandelview"));
            assert!(texts
                .iter()
                .any(|t| t.keyword == "Mandelview.Palette" && t.text == "Spectral"));
            assert!(texts
                .iter()
                .any(|t| t.keyword == "Mandelview.Budget" && t.text == "50"));
        }
        let mut pixels = vec![0u8; reader.output_buffer_size()];
        reader.next_frame(&mut pixels).expect("should decode frame");
        assert_eq!(&pixels[..], state.buffer().as_bytes());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
