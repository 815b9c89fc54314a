use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use mandelview_core::{CacheKey, Complex, EscapeTime, Viewport};

use crate::buffer::{PixelBuffer, BYTES_PER_PIXEL};
use crate::error::RenderError;
use crate::palette::Palette;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Tracks the current render generation for cancellation and progress.
///
/// Advancing the generation makes an in-flight pass skip its remaining rows.
/// Progress is counted in completed rows.
#[derive(Debug)]
pub struct RenderCancel {
    generation: AtomicU64,
    rows_done: AtomicUsize,
    rows_total: AtomicUsize,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            rows_done: AtomicUsize::new(0),
            rows_total: AtomicUsize::new(0),
        }
    }

    /// Cancel the current render by advancing the generation.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn reset_progress(&self, total: usize) {
        self.rows_total.store(total, Ordering::Relaxed);
        self.rows_done.store(0, Ordering::Relaxed);
    }

    fn inc_progress(&self) {
        self.rows_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Current progress as `(rows done, rows total)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.rows_done.load(Ordering::Relaxed),
            self.rows_total.load(Ordering::Relaxed),
        )
    }
}

impl Default for RenderCancel {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// What the last call to [`FrameRenderer::render`] did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderStats {
    /// The viewport matched the cache key; the buffer was left as-is.
    pub cache_hit: bool,
    /// Escape-time evaluations performed (one per pixel on a full pass).
    pub evaluations: u64,
    pub budget: u32,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Frame renderer
// ---------------------------------------------------------------------------

/// Fills a [`PixelBuffer`] from a viewport, skipping passes whose window is
/// bit-identical to the last completed one.
#[derive(Debug)]
pub struct FrameRenderer {
    buffer: PixelBuffer,
    last_key: Option<CacheKey>,
    parallel: bool,
    cancel: Arc<RenderCancel>,
    last_stats: RenderStats,
}

impl FrameRenderer {
    pub fn new(width: u32, height: u32, parallel: bool) -> crate::Result<Self> {
        Ok(Self {
            buffer: PixelBuffer::try_new(width, height)?,
            last_key: None,
            parallel,
            cancel: Arc::new(RenderCancel::new()),
            last_stats: RenderStats::default(),
        })
    }

    /// Handle that can cancel an in-flight pass from another thread.
    pub fn cancel_handle(&self) -> Arc<RenderCancel> {
        Arc::clone(&self.cancel)
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Force the next [`render`](Self::render) to run a full pass.
    pub fn invalidate(&mut self) {
        self.last_key = None;
    }

    /// Reallocate the buffer if the dimensions changed.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        if !self.buffer.dimensions_match(width, height) {
            self.buffer = PixelBuffer::try_new(width, height)?;
            self.last_key = None;
            debug!(width, height, "Pixel buffer reallocated");
        }
        Ok(())
    }

    /// Render `viewport` into the buffer. The iteration budget is the one
    /// `palette` was built for.
    ///
    /// Does nothing if the viewport bounds equal those of the last completed
    /// pass. On cancellation the partially written buffer is kept but the
    /// cache key is cleared, so the next call renders again.
    pub fn render<E: EscapeTime + Sync>(
        &mut self,
        evaluator: &E,
        viewport: &Viewport,
        palette: &Palette,
    ) -> crate::Result<RenderStats> {
        let budget = palette.budget();
        self.resize(viewport.width(), viewport.height())?;

        if let Some(key) = self.last_key {
            if !viewport.has_changed_since(&key) {
                self.last_stats = RenderStats {
                    cache_hit: true,
                    evaluations: 0,
                    budget,
                    elapsed: Duration::ZERO,
                };
                debug!("Viewport unchanged, reusing frame");
                return Ok(self.last_stats);
            }
        }
        self.last_key = None;

        let start = Instant::now();
        let reals = viewport.column_reals();
        let imags = viewport.row_imags();
        let stride = self.buffer.stride();
        let cancel = &*self.cancel;
        let gen = cancel.generation();
        cancel.reset_progress(imags.len());

        let render_one = |row: &mut [u8], im: f64| -> u64 {
            if cancel.generation() != gen {
                return 0;
            }
            let n = render_row(evaluator, &reals, im, palette, budget, row);
            cancel.inc_progress();
            n
        };

        let rows = self.buffer.as_bytes_mut();
        let evaluations: u64 = if self.parallel {
            rows.par_chunks_mut(stride)
                .zip(imags.par_iter())
                .map(|(row, &im)| render_one(row, im))
                .sum()
        } else {
            rows.chunks_mut(stride)
                .zip(imags.iter())
                .map(|(row, &im)| render_one(row, im))
                .sum()
        };

        if cancel.generation() != gen {
            let (done, total) = cancel.progress();
            debug!(done, total, "Render cancelled");
            return Err(RenderError::Cancelled);
        }

        self.last_key = Some(viewport.key());
        let elapsed = start.elapsed();
        self.last_stats = RenderStats {
            cache_hit: false,
            evaluations,
            budget,
            elapsed,
        };
        info!(
            elapsed_ms = elapsed.as_millis(),
            evaluations,
            budget,
            width = viewport.width(),
            height = viewport.height(),
            "Render complete"
        );
        Ok(self.last_stats)
    }
}

/// Evaluate and color one row. Returns the number of evaluations.
#[inline]
fn render_row<E: EscapeTime>(
    evaluator: &E,
    reals: &[f64],
    im: f64,
    palette: &Palette,
    budget: u32,
    row: &mut [u8],
) -> u64 {
    for (pixel, &re) in row.chunks_exact_mut(BYTES_PER_PIXEL).zip(reals) {
        let n = evaluator.escape_iterations(Complex::new(re, im), budget);
        pixel.copy_from_slice(&palette.color(n));
    }
    reals.len() as u64
}
