//! Response structures for a compute request

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::inputs::{AssetClass, Region};
use crate::models::{BaseCurrency, Currency, EquityModelKind, FxForecast};

/// Where a value used in a calculation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Default,
    Override,
    Computed,
    /// Computed, but from inputs that include an override
    AffectedByOverride,
}

impl InputSource {
    pub fn is_default(&self) -> bool {
        matches!(self, InputSource::Default)
    }

    /// Source of a value derived from several others
    pub fn derived_from(sources: &[InputSource]) -> InputSource {
        if sources.iter().all(InputSource::is_default) {
            InputSource::Computed
        } else {
            InputSource::AffectedByOverride
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedValue {
    pub value: f64,
    pub source: InputSource,
}

/// A macro value consumed by an asset model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDependency {
    /// e.g. `us.tbill_forecast`, `global.rgdp_growth`, `fx.eur`
    pub macro_input: String,
    pub value_used: f64,
    pub source: InputSource,
    /// Components of the result this value feeds
    pub affects: Vec<String>,
    pub impact: String,
}

impl MacroDependency {
    pub fn new(
        macro_input: impl Into<String>,
        value_used: f64,
        source: InputSource,
        affects: &[&str],
        impact: impl Into<String>,
    ) -> Self {
        Self {
            macro_input: macro_input.into(),
            value_used,
            source,
            affects: affects.iter().map(|s| s.to_string()).collect(),
            impact: impact.into(),
        }
    }
}

/// Expected return of one asset class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetResult {
    pub asset_class: AssetClass,
    pub name: String,
    pub expected_return_nominal: f64,
    pub expected_return_real: f64,
    pub expected_volatility: f64,
    pub components: BTreeMap<String, f64>,
    pub inputs_used: BTreeMap<String, TrackedValue>,
    pub macro_dependencies: Vec<MacroDependency>,
}

impl AssetResult {
    pub fn new(asset_class: AssetClass, nominal: f64, real: f64) -> Self {
        Self {
            asset_class,
            name: asset_class.display_name().to_string(),
            expected_return_nominal: nominal,
            expected_return_real: real,
            expected_volatility: asset_class.expected_volatility(),
            components: BTreeMap::new(),
            inputs_used: BTreeMap::new(),
            macro_dependencies: Vec::new(),
        }
    }

    pub fn with_components(mut self, components: Vec<(&'static str, f64)>) -> Self {
        self.components
            .extend(components.into_iter().map(|(k, v)| (k.to_string(), v)));
        self
    }

    pub fn component(&self, name: &str) -> Option<f64> {
        self.components.get(name).copied()
    }

    pub fn dependency(&self, macro_input: &str) -> Option<&MacroDependency> {
        self.macro_dependencies.iter().find(|d| d.macro_input == macro_input)
    }
}

/// Where each resolved direct forecast came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSources {
    pub rgdp_growth: InputSource,
    pub inflation: InputSource,
    pub tbill: InputSource,
}

/// Resolved macro forecasts for one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSummary {
    pub rgdp_growth: f64,
    pub inflation: f64,
    pub tbill_rate: f64,
    pub nominal_gdp_growth: f64,
    pub sources: MacroSources,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub scenario_name: String,
    pub base_currency: BaseCurrency,
    pub equity_model: EquityModelKind,
    pub results: BTreeMap<AssetClass, AssetResult>,
    pub macro_forecasts: BTreeMap<Region, MacroSummary>,
    pub global_rgdp_growth: TrackedValue,
    pub fx_forecasts: BTreeMap<Currency, FxForecast>,
}

impl CalculateResponse {
    pub fn result(&self, asset: AssetClass) -> Option<&AssetResult> {
        self.results.get(&asset)
    }

    pub fn nominal(&self, asset: AssetClass) -> Option<f64> {
        self.result(asset).map(|r| r.expected_return_nominal)
    }
}

/// A scenario alongside the all-defaults baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub current: CalculateResponse,
    pub baseline: CalculateResponse,
}

impl ScenarioComparison {
    /// Nominal return change versus baseline per asset class
    pub fn nominal_differences(&self) -> BTreeMap<AssetClass, f64> {
        self.current
            .results
            .iter()
            .filter_map(|(asset, result)| {
                self.baseline
                    .nominal(*asset)
                    .map(|base| (*asset, result.expected_return_nominal - base))
            })
            .collect()
    }
}
