use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenderError;

/// Color of the "did not escape within budget" entry.
pub const SENTINEL: [u8; 4] = [0, 0, 0, 255];

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How iteration counts are turned into colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteStrategy {
    /// Iteration count mapped onto a 400–700 nm wavelength and through a
    /// piecewise-quadratic approximation of the visible spectrum.
    #[default]
    Spectral,
    /// Cheap modular channels: `(5i mod 256, 3i mod 256, 255 - i mod 256)`.
    Modular,
}

impl PaletteStrategy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Spectral => "Spectral",
            Self::Modular => "Modular",
        }
    }

    /// Color for an escaped count `iteration < budget`.
    fn color(self, iteration: u32, budget: u32) -> [u8; 4] {
        match self {
            Self::Spectral => spectral_color(iteration, budget),
            Self::Modular => modular_color(iteration),
        }
    }

    /// Whether entry `i` is the same for every budget greater than `i`.
    /// Such tables can be grown or shrunk in place.
    fn budget_independent(self) -> bool {
        matches!(self, Self::Modular)
    }
}

// ---------------------------------------------------------------------------
// Spectral segments
// ---------------------------------------------------------------------------

/// `value = c[0] + c[1]·t + c[2]·t²` with `t` the position within
/// `[start, end)` in nanometres.
struct Segment {
    start: f64,
    end: f64,
    c: [f64; 3],
}

const fn seg(start: f64, end: f64, c: [f64; 3]) -> Segment {
    Segment { start, end, c }
}

// First matching segment wins.
const RED: &[Segment] = &[
    seg(400.0, 410.0, [0.0, 0.33, -0.20]),
    seg(410.0, 475.0, [0.14, 0.0, -0.13]),
    seg(545.0, 595.0, [0.0, 1.98, -1.0]),
    seg(595.0, 650.0, [0.98, 0.06, -0.40]),
    seg(650.0, 700.0, [0.65, -0.84, 0.20]),
];

const GREEN: &[Segment] = &[
    seg(415.0, 475.0, [0.0, 0.0, 0.80]),
    seg(475.0, 590.0, [0.8, 0.76, -0.80]),
    seg(585.0, 639.0, [0.84, -0.84, 0.0]),
];

const BLUE: &[Segment] = &[
    seg(400.0, 475.0, [0.0, 2.20, -1.50]),
    seg(475.0, 560.0, [0.7, -1.0, 0.30]),
];

fn channel(segments: &[Segment], wavelength: f64) -> u8 {
    let value = segments
        .iter()
        .find(|s| wavelength >= s.start && wavelength < s.end)
        .map_or(0.0, |s| {
            let t = (wavelength - s.start) / (s.end - s.start);
            s.c[0] + s.c[1] * t + s.c[2] * t * t
        });
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

fn spectral_color(iteration: u32, budget: u32) -> [u8; 4] {
    let wavelength = 400.0 + 300.0 * iteration as f64 / budget as f64;
    [
        channel(RED, wavelength),
        channel(GREEN, wavelength),
        channel(BLUE, wavelength),
        255,
    ]
}

fn modular_color(iteration: u32) -> [u8; 4] {
    let i = iteration as u64;
    [
        ((i * 5) % 256) as u8,
        ((i * 3) % 256) as u8,
        (255 - i % 256) as u8,
        255,
    ]
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Lookup table with one RGBA entry per iteration count `0..=budget`.
///
/// Entry `budget` is always [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    strategy: PaletteStrategy,
    budget: u32,
    colors: Vec<[u8; 4]>,
}

impl Palette {
    pub fn build(strategy: PaletteStrategy, budget: u32) -> crate::Result<Self> {
        let len = budget as usize + 1;
        let mut colors = Vec::new();
        colors
            .try_reserve_exact(len)
            .map_err(|_| RenderError::Allocation {
                what: "palette",
                bytes: len * 4,
            })?;
        colors.extend((0..budget).map(|i| strategy.color(i, budget)));
        colors.push(SENTINEL);
        Ok(Self {
            strategy,
            budget,
            colors,
        })
    }

    /// Resize a budget-independent table in place, reusing the entries
    /// below both the old and new budget.
    fn resize_in_place(&mut self, budget: u32) -> crate::Result<()> {
        debug_assert!(self.strategy.budget_independent());
        let old = self.budget as usize;
        let new = budget as usize;
        if new > old {
            self.colors
                .try_reserve_exact(new - old)
                .map_err(|_| RenderError::Allocation {
                    what: "palette",
                    bytes: (new + 1) * 4,
                })?;
            self.colors[old] = self.strategy.color(self.budget, budget);
            self.colors
                .extend((self.budget + 1..budget).map(|i| self.strategy.color(i, budget)));
            self.colors.push(SENTINEL);
        } else {
            self.colors.truncate(new + 1);
            self.colors[new] = SENTINEL;
        }
        self.budget = budget;
        Ok(())
    }

    pub fn strategy(&self) -> PaletteStrategy {
        self.strategy
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Color for an iteration count. Counts above the budget are treated as
    /// "did not escape".
    #[inline]
    pub fn color(&self, iterations: u32) -> [u8; 4] {
        self.colors[iterations.min(self.budget) as usize]
    }

    /// `len` evenly spaced escaped colors, low counts first (for a legend bar).
    pub fn strip(&self, len: usize) -> Vec<[u8; 4]> {
        if self.budget == 0 {
            return vec![SENTINEL; len];
        }
        let budget = self.budget as usize;
        (0..len)
            .map(|i| self.colors[(i * budget / len).min(budget - 1)])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Owns the current palette and rebuilds it only when the budget or the
/// strategy changes.
#[derive(Debug, Clone)]
pub struct PaletteGenerator {
    palette: Palette,
}

impl PaletteGenerator {
    pub fn new(strategy: PaletteStrategy, budget: u32) -> crate::Result<Self> {
        Ok(Self {
            palette: Palette::build(strategy, budget)?,
        })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Bring the table up to `budget`. Returns `true` if it changed.
    pub fn ensure(&mut self, budget: u32) -> crate::Result<bool> {
        if budget == self.palette.budget {
            return Ok(false);
        }
        let previous = self.palette.budget;
        let strategy = self.palette.strategy;
        if strategy.budget_independent() {
            self.palette.resize_in_place(budget)?;
        } else {
            self.palette = Palette::build(strategy, budget)?;
        }
        debug!(
            previous,
            budget,
            strategy = strategy.name(),
            "Palette rebuilt"
        );
        Ok(true)
    }

    /// Switch strategy, rebuilding at the current budget. Returns `true` if
    /// the strategy changed.
    pub fn set_strategy(&mut self, strategy: PaletteStrategy) -> crate::Result<bool> {
        if strategy == self.palette.strategy {
            return Ok(false);
        }
        self.palette = Palette::build(strategy, self.palette.budget)?;
        debug!(strategy = strategy.name(), "Palette strategy switched");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_budget_plus_one_entries() {
        for strategy in [PaletteStrategy::Spectral, PaletteStrategy::Modular] {
            for budget in [0, 1, 50, 777] {
                let p = Palette::build(strategy, budget).unwrap();
                assert_eq!(p.colors().len(), budget as usize + 1);
                assert_eq!(p.color(budget), SENTINEL);
            }
        }
    }

    #[test]
    fn counts_past_budget_are_sentinel() {
        let p = Palette::build(PaletteStrategy::Modular, 10).unwrap();
        assert_eq!(p.color(11), SENTINEL);
        assert_eq!(p.color(u32::MAX), SENTINEL);
    }

    #[test]
    fn modular_formula() {
        let p = Palette::build(PaletteStrategy::Modular, 300).unwrap();
        assert_eq!(p.color(0), [0, 0, 255, 255]);
        assert_eq!(p.color(1), [5, 3, 254, 255]);
        assert_eq!(p.color(100), [244, 44, 155, 255]);
        assert_eq!(p.color(256), [0, 0, 255, 255]);
    }

    #[test]
    fn spectral_mid_range_is_green() {
        // i / budget = 0.5 → 550 nm.
        let p = Palette::build(PaletteStrategy::Spectral, 300).unwrap();
        let [r, g, b, a] = p.color(150);
        assert_eq!(a, 255);
        assert!(g > r && g > b, "550 nm should be green-dominant, got {r},{g},{b}");
    }

    #[test]
    fn spectral_low_end_is_violet() {
        // 20 % of the way → 460 nm: blue strongest, with a little red.
        let p = Palette::build(PaletteStrategy::Spectral, 100).unwrap();
        let [r, g, b, _] = p.color(20);
        assert!(b > r && b > g);
        assert!(r > 0);
    }

    #[test]
    fn spectral_channels_are_clamped() {
        for budget in [7, 64, 1000] {
            let p = Palette::build(PaletteStrategy::Spectral, budget).unwrap();
            assert!(p.colors().iter().all(|c| c[3] == 255));
        }
        // Segment evaluation below zero must clamp to 0, not wrap.
        assert_eq!(channel(&[seg(0.0, 1.0, [-5.0, 0.0, 0.0])], 0.5), 0);
        assert_eq!(channel(&[seg(0.0, 1.0, [5.0, 0.0, 0.0])], 0.5), 255);
    }

    #[test]
    fn overlapping_segments_use_first_match() {
        // 587 nm falls in both green segments; the 475–590 one wins.
        let t: f64 = (587.0 - 475.0) / (590.0 - 475.0);
        let expected = ((0.8 + 0.76 * t - 0.80 * t * t).clamp(0.0, 1.0) * 255.0) as u8;
        assert_eq!(channel(GREEN, 587.0), expected);
    }

    #[test]
    fn unchanged_budget_does_not_rebuild() {
        let mut gen = PaletteGenerator::new(PaletteStrategy::Spectral, 100).unwrap();
        let ptr = gen.palette().colors().as_ptr();
        assert!(!gen.ensure(100).unwrap());
        assert_eq!(gen.palette().colors().as_ptr(), ptr);
    }

    #[test]
    fn spectral_rebuild_matches_fresh_build() {
        let mut gen = PaletteGenerator::new(PaletteStrategy::Spectral, 100).unwrap();
        assert!(gen.ensure(180).unwrap());
        assert_eq!(
            *gen.palette(),
            Palette::build(PaletteStrategy::Spectral, 180).unwrap()
        );
    }

    #[test]
    fn modular_incremental_matches_fresh_build() {
        let mut gen = PaletteGenerator::new(PaletteStrategy::Modular, 50).unwrap();
        for budget in [51, 400, 120, 10, 10, 5000, 1] {
            gen.ensure(budget).unwrap();
            assert_eq!(
                *gen.palette(),
                Palette::build(PaletteStrategy::Modular, budget).unwrap(),
                "after growing/shrinking to {budget}"
            );
        }
    }

    #[test]
    fn strategy_switch_rebuilds() {
        let mut gen = PaletteGenerator::new(PaletteStrategy::Spectral, 64).unwrap();
        assert!(gen.set_strategy(PaletteStrategy::Modular).unwrap());
        assert!(!gen.set_strategy(PaletteStrategy::Modular).unwrap());
        assert_eq!(gen.palette().strategy(), PaletteStrategy::Modular);
        assert_eq!(gen.palette().budget(), 64);
    }

    #[test]
    fn strip_samples_escaped_entries() {
        let p = Palette::build(PaletteStrategy::Modular, 10).unwrap();
        let strip = p.strip(20);
        assert_eq!(strip.len(), 20);
        assert_eq!(strip[0], p.color(0));
        assert_eq!(strip[19], p.color(9));
    }

    #[test]
    fn strategy_names_roundtrip_through_json() {
        let json = serde_json::to_string(&PaletteStrategy::Modular).unwrap();
        assert_eq!(json, "\"modular\"");
        let back: PaletteStrategy = serde_json::from_str("\"spectral\"").unwrap();
        assert_eq!(back, PaletteStrategy::Spectral);
    }
}
