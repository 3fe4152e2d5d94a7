//! Equity return model with two interchangeable strategies
//!
//! - RA (CAEY): dividend yield + blended real EPS growth + CAEY reversion,
//!   a real return with inflation added for nominal
//! - Grinold-Kroner (P/E): income + nominal earnings growth + repricing,
//!   a nominal return with inflation removed for real
//!
//! The strategy is picked by [`EquityModelKind`] and applies to every region
//! at once. Both input sets stay stored side by side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EquityParams;
use crate::error::CmeError;
use crate::inputs::{EquityInputs, GkEquityInputs, RaEquityInputs};

/// Selected equity strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityModelKind {
    #[default]
    Ra,
    GrinoldKroner,
}

impl EquityModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquityModelKind::Ra => "ra",
            EquityModelKind::GrinoldKroner => "grinold_kroner",
        }
    }
}

impl fmt::Display for EquityModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquityModelKind {
    type Err = CmeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ra" | "caey" => Ok(EquityModelKind::Ra),
            "grinold_kroner" | "gk" => Ok(EquityModelKind::GrinoldKroner),
            _ => Err(CmeError::UnknownEquityModel(s.to_string())),
        }
    }
}

/// Macro context for one equity region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityEnvironment {
    pub inflation: f64,
    pub rgdp_growth: f64,
    /// Ceiling on blended real EPS growth
    pub global_rgdp_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaReturn {
    pub dividend_yield: f64,
    pub blended_eps_growth: f64,
    pub eps_capped: bool,
    pub valuation_change: f64,
    pub real_return: f64,
    pub nominal_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GkReturn {
    pub dividend_yield: f64,
    pub net_buyback_yield: f64,
    /// Revenue growth actually used
    pub revenue_growth: f64,
    /// What macro implies, kept for comparison when overridden
    pub revenue_growth_computed: f64,
    pub revenue_overridden: bool,
    pub margin_change: f64,
    pub valuation_change: f64,
    pub nominal_return: f64,
    pub real_return: f64,
}

/// Output of either strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum EquityReturn {
    Ra(RaReturn),
    GrinoldKroner(GkReturn),
}

impl EquityReturn {
    pub fn nominal_return(&self) -> f64 {
        match self {
            EquityReturn::Ra(r) => r.nominal_return,
            EquityReturn::GrinoldKroner(r) => r.nominal_return,
        }
    }

    pub fn real_return(&self) -> f64 {
        match self {
            EquityReturn::Ra(r) => r.real_return,
            EquityReturn::GrinoldKroner(r) => r.real_return,
        }
    }

    pub fn components(&self) -> Vec<(&'static str, f64)> {
        match self {
            EquityReturn::Ra(r) => vec![
                ("dividend_yield", r.dividend_yield),
                ("eps_growth", r.blended_eps_growth),
                ("valuation_change", r.valuation_change),
            ],
            EquityReturn::GrinoldKroner(r) => vec![
                ("dividend_yield", r.dividend_yield),
                ("net_buyback_yield", r.net_buyback_yield),
                ("revenue_growth", r.revenue_growth),
                ("revenue_growth_computed", r.revenue_growth_computed),
                ("margin_change", r.margin_change),
                ("valuation_change", r.valuation_change),
            ],
        }
    }
}

/// `(fair_caey / current_caey)^(reversion_speed / full_reversion_years) - 1`.
/// Non-positive earnings yields give 0.
pub fn caey_valuation_change(current_caey: f64, fair_caey: f64, reversion_speed: f64, params: &EquityParams) -> f64 {
    if current_caey <= 0.0 || fair_caey <= 0.0 || params.full_reversion_years <= 0.0 {
        return 0.0;
    }
    let speed = reversion_speed.clamp(0.0, 1.0);
    let change = (fair_caey / current_caey).powf(speed / params.full_reversion_years) - 1.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

/// `(target_pe / current_pe)^(1 / horizon) - 1`. Non-positive P/E gives 0.
pub fn pe_valuation_change(current_pe: f64, target_pe: f64, params: &EquityParams) -> f64 {
    if current_pe <= 0.0 || target_pe <= 0.0 || params.pe_horizon_years <= 0.0 {
        return 0.0;
    }
    let change = (target_pe / current_pe).powf(1.0 / params.pe_horizon_years) - 1.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

pub fn ra_return(inputs: &RaEquityInputs, env: &EquityEnvironment, params: &EquityParams) -> RaReturn {
    let w = params.country_eps_weight;
    let blended = w * inputs.real_eps_growth + (1.0 - w) * inputs.regional_eps_growth;
    let eps_capped = blended > env.global_rgdp_growth;
    let blended_eps_growth = blended.min(env.global_rgdp_growth);

    let valuation_change =
        caey_valuation_change(inputs.current_caey, inputs.fair_caey, inputs.reversion_speed, params);

    let real_return = inputs.dividend_yield + blended_eps_growth + valuation_change;

    RaReturn {
        dividend_yield: inputs.dividend_yield,
        blended_eps_growth,
        eps_capped,
        valuation_change,
        real_return,
        nominal_return: real_return + env.inflation,
    }
}

/// Grinold-Kroner return. `revenue_override` breaks the macro linkage and is
/// used verbatim.
pub fn gk_return(
    inputs: &GkEquityInputs,
    env: &EquityEnvironment,
    revenue_override: Option<f64>,
    params: &EquityParams,
) -> GkReturn {
    let revenue_growth_computed = env.inflation + env.rgdp_growth + inputs.revenue_gdp_wedge;
    let revenue_growth = revenue_override.unwrap_or(revenue_growth_computed);
    let valuation_change = pe_valuation_change(inputs.current_pe, inputs.target_pe, params);

    let nominal_return = inputs.dividend_yield
        + inputs.net_buyback_yield
        + revenue_growth
        + inputs.margin_change
        + valuation_change;

    GkReturn {
        dividend_yield: inputs.dividend_yield,
        net_buyback_yield: inputs.net_buyback_yield,
        revenue_growth,
        revenue_growth_computed,
        revenue_overridden: revenue_override.is_some(),
        margin_change: inputs.margin_change,
        valuation_change,
        nominal_return,
        real_return: nominal_return - env.inflation,
    }
}

/// Run the selected strategy for one region
pub fn equity_return(
    kind: EquityModelKind,
    inputs: &EquityInputs,
    env: &EquityEnvironment,
    revenue_override: Option<f64>,
    params: &EquityParams,
) -> EquityReturn {
    match kind {
        EquityModelKind::Ra => EquityReturn::Ra(ra_return(&inputs.ra, env, params)),
        EquityModelKind::GrinoldKroner => {
            EquityReturn::GrinoldKroner(gk_return(&inputs.gk, env, revenue_override, params))
        }
    }
}
