use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Tunables for the zoom-dependent iteration budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailConfig {
    /// Budget at zoom level 1.0 (before clamping).
    pub base_budget: u32,
    pub min_budget: u32,
    pub max_budget: u32,
    /// Budget added per decade of zoom. `None` derives it from the pixel
    /// dimensions as `(width + height) / 100`.
    pub scale_per_decade: Option<f64>,
}

impl DetailConfig {
    pub const DEFAULT_BASE_BUDGET: u32 = 50;
    pub const DEFAULT_MIN_BUDGET: u32 = 10;
    pub const DEFAULT_MAX_BUDGET: u32 = 5000;
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            base_budget: Self::DEFAULT_BASE_BUDGET,
            min_budget: Self::DEFAULT_MIN_BUDGET,
            max_budget: Self::DEFAULT_MAX_BUDGET,
            scale_per_decade: None,
        }
    }
}

/// Maps a zoom level to an iteration budget.
///
/// `budget = clamp(base + round(log10(zoom) * scale), min, max)`. The log
/// keeps the cost growth sub-linear in the zoom factor while still adding
/// iterations as the boundary detail gets finer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailPolicy {
    base_budget: u32,
    min_budget: u32,
    max_budget: u32,
    scale: f64,
}

impl DetailPolicy {
    pub fn new(config: &DetailConfig, width: u32, height: u32) -> crate::Result<Self> {
        if config.min_budget < 1 {
            return Err(CoreError::InvalidBudget {
                reason: format!("min_budget must be >= 1, got {}", config.min_budget),
            });
        }
        if config.min_budget > config.max_budget {
            return Err(CoreError::InvalidBudget {
                reason: format!(
                    "min_budget ({}) exceeds max_budget ({})",
                    config.min_budget, config.max_budget
                ),
            });
        }
        let scale = config
            .scale_per_decade
            .unwrap_or_else(|| (width as f64 + height as f64) / 100.0);
        if !(scale >= 0.0 && scale.is_finite()) {
            return Err(CoreError::InvalidBudget {
                reason: format!("scale_per_decade must be finite and >= 0, got {scale}"),
            });
        }
        Ok(Self {
            base_budget: config.base_budget,
            min_budget: config.min_budget,
            max_budget: config.max_budget,
            scale,
        })
    }

    /// Budget for `zoom_level`, always within `[min_budget, max_budget]`.
    pub fn budget_for(&self, zoom_level: f64) -> u32 {
        compute_budget(
            zoom_level,
            self.base_budget,
            self.min_budget,
            self.max_budget,
            self.scale,
        )
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn min_budget(&self) -> u32 {
        self.min_budget
    }

    pub fn max_budget(&self) -> u32 {
        self.max_budget
    }
}

/// Pure form of [`DetailPolicy::budget_for`].
///
/// A zero `scale` pins the budget to `base` (clamped) for every zoom level.
pub fn compute_budget(zoom_level: f64, base: u32, min: u32, max: u32, scale: f64) -> u32 {
    let bonus = if scale == 0.0 {
        0.0
    } else {
        (zoom_level.log10() * scale).round()
    };
    let raw = base as f64 + bonus;
    if raw.is_nan() {
        return min;
    }
    raw.clamp(min as f64, max as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DetailPolicy {
        DetailPolicy::new(&DetailConfig::default(), 800, 600).unwrap()
    }

    #[test]
    fn base_budget_at_unit_zoom() {
        assert_eq!(policy().budget_for(1.0), 50);
    }

    #[test]
    fn scale_derived_from_dimensions() {
        assert!((policy().scale() - 14.0).abs() < 1e-12);
        // One decade of zoom adds `scale` iterations.
        assert_eq!(policy().budget_for(10.0), 64);
        assert_eq!(policy().budget_for(1000.0), 92);
    }

    #[test]
    fn explicit_scale_overrides_dimensions() {
        let config = DetailConfig {
            scale_per_decade: Some(100.0),
            ..DetailConfig::default()
        };
        let p = DetailPolicy::new(&config, 800, 600).unwrap();
        assert_eq!(p.budget_for(100.0), 250);
    }

    #[test]
    fn clamped_to_bounds() {
        let p = policy();
        assert_eq!(p.budget_for(1e-30), 10);
        assert_eq!(p.budget_for(1e300), 4250);
        assert_eq!(p.budget_for(f64::INFINITY), 5000);
        assert_eq!(p.budget_for(0.0), 10);
        assert_eq!(p.budget_for(f64::NAN), 10);
    }

    #[test]
    fn monotone_in_zoom() {
        let p = policy();
        let mut zoom = 1e-6;
        let mut prev = p.budget_for(zoom);
        while zoom.is_finite() {
            zoom *= 1.0 / 0.9;
            let budget = p.budget_for(zoom);
            assert!(budget >= prev, "budget fell from {prev} to {budget} at zoom {zoom}");
            assert!((10..=5000).contains(&budget));
            prev = budget;
        }
        assert_eq!(prev, 5000);
    }

    #[test]
    fn zero_scale_keeps_base_budget() {
        let config = DetailConfig {
            scale_per_decade: Some(0.0),
            ..DetailConfig::default()
        };
        let p = DetailPolicy::new(&config, 800, 600).unwrap();
        for zoom in [1e-300, 1.0, 1e12, f64::MAX, f64::INFINITY] {
            assert_eq!(p.budget_for(zoom), 50, "zoom {zoom}");
        }
    }

    #[test]
    fn invalid_configs() {
        let zero_min = DetailConfig {
            min_budget: 0,
            ..DetailConfig::default()
        };
        assert!(DetailPolicy::new(&zero_min, 10, 10).is_err());

        let inverted = DetailConfig {
            min_budget: 100,
            max_budget: 50,
            ..DetailConfig::default()
        };
        assert!(DetailPolicy::new(&inverted, 10, 10).is_err());

        let negative = DetailConfig {
            scale_per_decade: Some(-1.0),
            ..DetailConfig::default()
        };
        assert!(DetailPolicy::new(&negative, 10, 10).is_err());
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let c: DetailConfig = serde_json::from_str(r#"{ "max_budget": 2000 }"#).unwrap();
        assert_eq!(c.max_budget, 2000);
        assert_eq!(c.base_budget, 50);
        assert_eq!(c.scale_per_decade, None);
    }
}
