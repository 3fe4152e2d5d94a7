//! Model calibration constants
//!
//! Every coefficient the return models use lives here so it can be injected
//! (e.g. from a JSON file) instead of being hardcoded inline. Each section is
//! `#[serde(default)]`, so a config file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inputs::{Region, RegionMap};

/// Macro forecast calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroParams {
    /// Weight on the current reading when blending toward the long-term anchor
    pub current_weight: f64,
    /// Hard floor on the long-term t-bill anchor
    pub tbill_floor: f64,
    pub developed_adjustment: f64,
    pub emerging_adjustment: f64,
    pub demographic: DemographicCurve,
}

impl Default for MacroParams {
    fn default() -> Self {
        Self {
            current_weight: 0.30,
            tbill_floor: -0.0075,
            developed_adjustment: -0.003,
            emerging_adjustment: -0.005, // larger skewness correction
            demographic: DemographicCurve::default(),
        }
    }
}

impl MacroParams {
    pub fn long_term_weight(&self) -> f64 {
        1.0 - self.current_weight
    }

    pub fn adjustment(&self, region: Region) -> f64 {
        if region.is_emerging() {
            self.emerging_adjustment
        } else {
            self.developed_adjustment
        }
    }
}

/// Saturating map from the middle-aged/young ratio to a growth effect.
///
/// `effect = (1 / (1 + exp(-steepness * (midpoint - my_ratio))) - 0.5) * scale`,
/// bounded to `(-scale/2, scale/2)`. A ratio above the midpoint (older
/// population) drags growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicCurve {
    pub midpoint: f64,
    pub steepness: f64,
    pub scale: f64,
}

impl Default for DemographicCurve {
    fn default() -> Self {
        Self {
            midpoint: 2.0,
            steepness: 2.0,
            scale: 0.02,
        }
    }
}

impl DemographicCurve {
    pub fn effect(&self, my_ratio: f64) -> f64 {
        if !my_ratio.is_finite() {
            return 0.0;
        }
        let z = self.steepness * (self.midpoint - my_ratio);
        let sigmoid = 1.0 / (1.0 + (-z).exp());
        (sigmoid - 0.5) * self.scale
    }
}

/// Weights for the global real GDP aggregate, normalized at use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpWeights(pub RegionMap<f64>);

impl Default for GdpWeights {
    fn default() -> Self {
        Self(RegionMap {
            us: 0.26,
            eurozone: 0.15,
            japan: 0.05,
            em: 0.40,
        })
    }
}

impl GdpWeights {
    /// Weighted average of per-region values. Zero total weight gives 0.
    pub fn weighted_average(&self, values: &RegionMap<f64>) -> f64 {
        let total: f64 = self.0.iter().map(|(_, w)| *w).sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.0
            .iter()
            .map(|(region, w)| w * values.get(region))
            .sum::<f64>()
            / total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BondParams {
    pub horizon_years: f64,
    /// Share of the credit-spread gap assumed to close over the horizon
    pub spread_reversion_fraction: f64,
}

impl Default for BondParams {
    fn default() -> Self {
        Self {
            horizon_years: 10.0,
            spread_reversion_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquityParams {
    /// Weight on country EPS growth; the rest goes to the regional figure
    pub country_eps_weight: f64,
    pub full_reversion_years: f64,
    pub pe_horizon_years: f64,
}

impl Default for EquityParams {
    fn default() -> Self {
        Self {
            country_eps_weight: 0.5,
            full_reversion_years: 20.0,
            pe_horizon_years: 10.0,
        }
    }
}

/// Long-run factor premia for the absolute-return model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorPremia {
    pub size: f64,
    pub value: f64,
    pub profitability: f64,
    pub investment: f64,
    pub momentum: f64,
    /// Haircut applied to historical premia (0.5 = half survives)
    pub historical_discount: f64,
}

impl Default for FactorPremia {
    fn default() -> Self {
        Self {
            size: 0.02,
            value: 0.03,
            profitability: 0.025,
            investment: 0.025,
            momentum: 0.06,
            historical_discount: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxParams {
    pub rate_weight: f64,
    pub inflation_weight: f64,
}

impl Default for FxParams {
    fn default() -> Self {
        Self {
            rate_weight: 0.30,
            inflation_weight: 0.70,
        }
    }
}

/// All model calibration in one place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    #[serde(rename = "macro")]
    pub macro_params: MacroParams,
    pub gdp_weights: GdpWeights,
    pub bonds: BondParams,
    pub equity: EquityParams,
    pub factor_premia: FactorPremia,
    pub fx: FxParams,
}

impl ModelConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
