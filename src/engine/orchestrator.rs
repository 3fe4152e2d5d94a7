//! Compute engine: resolves macro, runs every asset model, applies FX and
//! assembles attributed results

use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::resolve::{resolve_macro, ResolvedMacro};
use super::results::{
    AssetResult, CalculateResponse, InputSource, MacroDependency, ScenarioComparison, TrackedValue,
};
use crate::config::ModelConfig;
use crate::error::{CmeError, Result};
use crate::inputs::{
    AllInputs, AssetClass, AssetField, BuildingBlocks, EquityRegion, FieldKey, MacroField, Overrides, Region,
};
use crate::models::bonds::{bond_return, inflation_linked_return, linker_regime, yield_shift, BondKind, RateEnvironment};
use crate::models::equity::{equity_return, EquityEnvironment, EquityModelKind};
use crate::models::fx::{fx_exposure, fx_forecast, BaseCurrency, Currency, CurrencyMacro, FxForecast};
use crate::models::macro_forecast::{forecast, MacroForecast};
use crate::models::alternatives::{alternatives_return, FactorPremiumSet};

/// Name given to the all-defaults comparison pass
pub const BASELINE_SCENARIO_NAME: &str = "Default";

fn default_scenario_name() -> String {
    "Current Scenario".to_string()
}

/// One compute request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    #[serde(default)]
    pub overrides: Option<Overrides>,
    #[serde(default)]
    pub base_currency: BaseCurrency,
    #[serde(default = "default_scenario_name")]
    pub scenario_name: String,
    #[serde(default)]
    pub equity_model: EquityModelKind,
}

impl Default for ComputeRequest {
    fn default() -> Self {
        Self {
            overrides: None,
            base_currency: BaseCurrency::default(),
            scenario_name: default_scenario_name(),
            equity_model: EquityModelKind::default(),
        }
    }
}

impl ComputeRequest {
    pub fn new(scenario_name: impl Into<String>) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            ..Self::default()
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_base_currency(mut self, base_currency: BaseCurrency) -> Self {
        self.base_currency = base_currency;
        self
    }

    pub fn with_equity_model(mut self, equity_model: EquityModelKind) -> Self {
        self.equity_model = equity_model;
        self
    }

    /// Same settings, no overrides
    pub fn baseline(&self) -> Self {
        Self {
            overrides: None,
            scenario_name: BASELINE_SCENARIO_NAME.to_string(),
            ..self.clone()
        }
    }
}

/// Per-request context shared by the asset builders
struct Pass<'a> {
    engine: &'a CmeEngine,
    request: &'a ComputeRequest,
    overrides: &'a Overrides,
    inputs: AllInputs,
    resolved: ResolvedMacro,
}

impl Pass<'_> {
    fn base(&self) -> BaseCurrency {
        self.request.base_currency
    }

    fn input_source(&self, key: FieldKey) -> InputSource {
        if self.overrides.contains(key) {
            InputSource::Override
        } else {
            InputSource::Default
        }
    }

    fn record_inputs(&self, result: &mut AssetResult, asset: AssetClass, fields: &[AssetField]) {
        for &field in fields {
            let key = FieldKey::Asset(asset, field);
            if let Ok(value) = self.inputs.get(key) {
                result.inputs_used.insert(
                    field.to_string(),
                    TrackedValue { value, source: self.input_source(key) },
                );
            }
        }
    }

    fn tbill_dependency(&self, region: Region, affects: &[&str], impact: &str) -> MacroDependency {
        let r = self.resolved.region(region);
        MacroDependency::new(format!("{}.tbill_forecast", region), r.tbill, r.sources.tbill, affects, impact)
    }

    fn inflation_dependency(&self, region: Region, affects: &[&str], impact: &str) -> MacroDependency {
        let r = self.resolved.region(region);
        MacroDependency::new(
            format!("{}.inflation_forecast", region),
            r.inflation,
            r.sources.inflation,
            affects,
            impact,
        )
    }

    fn rgdp_dependency(&self, region: Region, affects: &[&str], impact: &str) -> MacroDependency {
        let r = self.resolved.region(region);
        MacroDependency::new(
            format!("{}.rgdp_growth", region),
            r.rgdp_growth,
            r.sources.rgdp_growth,
            affects,
            impact,
        )
    }

    fn currency_macro(&self, currency: Currency) -> CurrencyMacro {
        let r = self.resolved.region(currency.macro_region());
        CurrencyMacro { tbill: r.tbill, inflation: r.inflation }
    }

    fn fx_forecasts(&self) -> BTreeMap<Currency, FxForecast> {
        let home = self.currency_macro(self.base().currency());
        Currency::ALL
            .into_iter()
            .filter(|&c| c != self.base().currency())
            .map(|c| (c, fx_forecast(c, home, self.currency_macro(c), &self.engine.config.fx)))
            .collect()
    }

    fn liquidity(&self) -> AssetResult {
        let region = self.base().macro_region();
        let r = self.resolved.region(region);
        let mut result = AssetResult::new(AssetClass::Liquidity, r.tbill, r.tbill - r.inflation)
            .with_components(vec![("tbill", r.tbill)]);
        result.macro_dependencies = vec![
            self.tbill_dependency(region, &["tbill"], "Cash earns the base-currency t-bill forecast"),
            self.inflation_dependency(region, &["real_return"], "Real return is the t-bill less inflation"),
        ];
        result
    }

    fn nominal_bond(&self, asset: AssetClass, kind: BondKind) -> AssetResult {
        let (inputs, reference) = match asset {
            AssetClass::BondsHy => (&self.inputs.bonds_hy, &self.engine.defaults.bonds_hy),
            AssetClass::BondsEm => (&self.inputs.bonds_em, &self.engine.defaults.bonds_em),
            _ => (&self.inputs.bonds_global, &self.engine.defaults.bonds_global),
        };
        let region = kind.macro_region();
        let r = self.resolved.region(region);
        let rates = RateEnvironment { tbill: r.tbill, inflation: r.inflation };
        let b = bond_return(kind, inputs, yield_shift(inputs, reference), rates, &self.engine.config.bonds);

        let mut result = AssetResult::new(asset, b.nominal_return, b.real_return).with_components(b.components());
        let mut fields = vec![
            AssetField::CurrentYield,
            AssetField::Duration,
            AssetField::CurrentTermPremium,
            AssetField::FairTermPremium,
            AssetField::AssumedMaturity,
        ];
        if kind.carries_credit() {
            fields.extend([
                AssetField::CreditSpread,
                AssetField::FairCreditSpread,
                AssetField::DefaultRate,
                AssetField::RecoveryRate,
            ]);
        }
        self.record_inputs(&mut result, asset, &fields);

        let tbill_impact = match kind {
            BondKind::EmergingHardCurrency => "USD-denominated: average yield builds on the US t-bill",
            _ => "Average yield builds on the t-bill forecast",
        };
        result.macro_dependencies = vec![
            self.tbill_dependency(region, &["avg_yield"], tbill_impact),
            self.inflation_dependency(region, &["real_return"], "Real return is nominal less inflation"),
        ];
        result
    }

    fn inflation_linked(&self) -> AssetResult {
        let il = &self.inputs.bonds_inflation_linked;
        let (regime, region) = linker_regime(il, self.base());
        let r = self.resolved.region(region);
        let b = inflation_linked_return(regime, il.assumed_maturity, r.inflation, &self.engine.config.bonds);

        let mut result = AssetResult::new(AssetClass::BondsInflationLinked, b.nominal_return, b.real_return)
            .with_components(b.components());
        let fields: &[AssetField] = match self.base() {
            BaseCurrency::Usd => &[
                AssetField::UsdRealYield,
                AssetField::UsdFairRealYield,
                AssetField::UsdRealTermPremium,
                AssetField::UsdDuration,
                AssetField::UsdLiquidityAdjustment,
                AssetField::UsdIndexLagDrag,
                AssetField::AssumedMaturity,
            ],
            BaseCurrency::Eur => &[
                AssetField::EurRealYield,
                AssetField::EurFairRealYield,
                AssetField::EurRealTermPremium,
                AssetField::EurDuration,
                AssetField::EurLiquidityAdjustment,
                AssetField::EurIndexLagDrag,
                AssetField::AssumedMaturity,
            ],
        };
        self.record_inputs(&mut result, AssetClass::BondsInflationLinked, fields);
        result.macro_dependencies = vec![self.inflation_dependency(
            region,
            &["inflation_indexation"],
            "Principal indexation adds inflation to the real return",
        )];
        result
    }

    fn equity(&self, region: EquityRegion) -> AssetResult {
        let asset = region.asset_class();
        let macro_region = region.macro_region();
        let r = self.resolved.region(macro_region);
        let env = EquityEnvironment {
            inflation: r.inflation,
            rgdp_growth: r.rgdp_growth,
            global_rgdp_growth: self.resolved.global_rgdp_growth,
        };
        let revenue_key = FieldKey::Asset(asset, AssetField::RevenueGrowth);
        let revenue_override = self.overrides.get(revenue_key);
        let model = self.request.equity_model;
        let e = equity_return(model, self.inputs.equity(region), &env, revenue_override, &self.engine.config.equity);

        let mut result = AssetResult::new(asset, e.nominal_return(), e.real_return()).with_components(e.components());
        match model {
            EquityModelKind::Ra => {
                self.record_inputs(
                    &mut result,
                    asset,
                    &[
                        AssetField::DividendYield,
                        AssetField::RealEpsGrowth,
                        AssetField::RegionalEpsGrowth,
                        AssetField::CurrentCaey,
                        AssetField::FairCaey,
                        AssetField::ReversionSpeed,
                    ],
                );
                result.macro_dependencies = vec![
                    self.inflation_dependency(
                        macro_region,
                        &["nominal_return"],
                        "Nominal return is the real return plus inflation",
                    ),
                    MacroDependency::new(
                        "global.rgdp_growth",
                        self.resolved.global_rgdp_growth,
                        self.resolved.global_source,
                        &["eps_growth"],
                        "Caps blended real EPS growth",
                    ),
                ];
            }
            EquityModelKind::GrinoldKroner => {
                let mut fields = vec![
                    AssetField::GkDividendYield,
                    AssetField::NetBuybackYield,
                    AssetField::RevenueGdpWedge,
                    AssetField::MarginChange,
                    AssetField::CurrentPe,
                    AssetField::TargetPe,
                ];
                if revenue_override.is_some() {
                    fields.push(AssetField::RevenueGrowth);
                }
                self.record_inputs(&mut result, asset, &fields);

                let mut deps = Vec::new();
                if revenue_override.is_none() {
                    deps.push(self.inflation_dependency(
                        macro_region,
                        &["revenue_growth", "real_return"],
                        "Revenue growth is inflation plus real GDP plus the wedge",
                    ));
                    deps.push(self.rgdp_dependency(
                        macro_region,
                        &["revenue_growth"],
                        "Revenue growth tracks real GDP growth",
                    ));
                } else {
                    deps.push(self.inflation_dependency(
                        macro_region,
                        &["real_return"],
                        "Revenue growth overridden; inflation only converts to real",
                    ));
                }
                result.macro_dependencies = deps;
            }
        }
        result
    }

    fn absolute_return(&self, us_equity_nominal: f64, us_equity_source: InputSource) -> AssetResult {
        let region = self.base().macro_region();
        let r = self.resolved.region(region);
        let premia = FactorPremiumSet::new(us_equity_nominal, r.tbill, &self.engine.config.factor_premia);
        let a = alternatives_return(&self.inputs.absolute_return, r.tbill, r.inflation, &premia);

        let mut result = AssetResult::new(AssetClass::AbsoluteReturn, a.nominal_return, a.real_return)
            .with_components(a.components());
        result.components.insert("market_premium".to_string(), premia.market);
        self.record_inputs(&mut result, AssetClass::AbsoluteReturn, AssetClass::AbsoluteReturn.fields());
        result.macro_dependencies = vec![
            self.tbill_dependency(region, &["tbill", "market"], "Cash return plus the hurdle for the market premium"),
            self.inflation_dependency(region, &["real_return"], "Real return is nominal less inflation"),
            MacroDependency::new(
                "equity_us.nominal_return",
                us_equity_nominal,
                us_equity_source,
                &["market"],
                "Market premium is the US equity return over the t-bill",
            ),
        ];
        result
    }

    fn apply_fx(&self, result: &mut AssetResult, fx: &BTreeMap<Currency, FxForecast>) {
        let Some(currency) = fx_exposure(result.asset_class, self.base()) else {
            return;
        };
        let Some(forecast) = fx.get(&currency) else {
            return;
        };
        result.expected_return_nominal += forecast.fx_change;
        result.expected_return_real += forecast.fx_change;
        result.components.insert("fx_return".to_string(), forecast.fx_change);

        let home = self.resolved.region(self.base().macro_region()).sources;
        let foreign = self.resolved.region(currency.macro_region()).sources;
        result.macro_dependencies.push(MacroDependency::new(
            format!("fx.{}", currency),
            forecast.fx_change,
            InputSource::derived_from(&[home.tbill, home.inflation, foreign.tbill, foreign.inflation]),
            &["fx_return"],
            format!("{} exposure converted to {}", currency.as_str().to_uppercase(), self.base().as_str().to_uppercase()),
        ));
    }

    fn run(&self) -> CalculateResponse {
        let fx_forecasts = self.fx_forecasts();
        let mut results = BTreeMap::new();

        results.insert(AssetClass::Liquidity, self.liquidity());
        results.insert(AssetClass::BondsGlobal, self.nominal_bond(AssetClass::BondsGlobal, BondKind::Government));
        results.insert(AssetClass::BondsHy, self.nominal_bond(AssetClass::BondsHy, BondKind::HighYield));
        results.insert(AssetClass::BondsEm, self.nominal_bond(AssetClass::BondsEm, BondKind::EmergingHardCurrency));
        results.insert(AssetClass::BondsInflationLinked, self.inflation_linked());
        for region in EquityRegion::ALL {
            results.insert(region.asset_class(), self.equity(region));
        }

        // Local-currency US equity drives the market factor
        let (us_nominal, us_source) = results
            .get(&AssetClass::EquityUs)
            .map(|r| {
                let sources: Vec<InputSource> = r
                    .macro_dependencies
                    .iter()
                    .map(|d| d.source)
                    .chain(r.inputs_used.values().map(|t| t.source))
                    .map(|s| if s == InputSource::Computed { InputSource::Default } else { s })
                    .collect();
                (r.expected_return_nominal, InputSource::derived_from(&sources))
            })
            .unwrap_or((0.0, InputSource::Computed));
        results.insert(AssetClass::AbsoluteReturn, self.absolute_return(us_nominal, us_source));

        for result in results.values_mut() {
            self.apply_fx(result, &fx_forecasts);
        }

        CalculateResponse {
            scenario_name: self.request.scenario_name.clone(),
            base_currency: self.base(),
            equity_model: self.request.equity_model,
            results,
            macro_forecasts: self.resolved.regions.iter().map(|(region, r)| (region, r.summary())).collect(),
            global_rgdp_growth: TrackedValue {
                value: self.resolved.global_rgdp_growth,
                source: self.resolved.global_source,
            },
            fx_forecasts,
        }
    }
}

/// Main CME engine: an active default table plus calibration
#[derive(Debug, Clone)]
pub struct CmeEngine {
    defaults: AllInputs,
    config: ModelConfig,
}

impl CmeEngine {
    pub fn new(defaults: AllInputs, config: ModelConfig) -> Self {
        Self { defaults, config }
    }

    pub fn defaults(&self) -> &AllInputs {
        &self.defaults
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Forecast for arbitrary building blocks. Pure and cheap.
    pub fn preview_macro(&self, region: Region, blocks: &BuildingBlocks) -> MacroForecast {
        forecast(region, blocks, &self.config.macro_params)
    }

    /// Preview with a partial set of building blocks (model units) laid over
    /// the region's defaults
    pub fn preview_partial(&self, region: Region, blocks: &BTreeMap<MacroField, f64>) -> Result<MacroForecast> {
        let mut merged = self.defaults.macro_for(region).building_blocks;
        for (&field, &value) in blocks {
            if !value.is_finite() {
                return Err(CmeError::NonFiniteValue {
                    field: FieldKey::Macro(region, field).to_string(),
                    value,
                });
            }
            let slot = merged
                .field_mut(field)
                .ok_or_else(|| CmeError::UnknownField(format!("{} is not a building block", field)))?;
            *slot = value;
        }
        Ok(self.preview_macro(region, &merged))
    }

    /// Full set of expected returns for one scenario
    pub fn compute(&self, request: &ComputeRequest) -> Result<CalculateResponse> {
        let start = Instant::now();
        let empty = Overrides::new();
        let overrides = request.overrides.as_ref().unwrap_or(&empty);

        let mut inputs = self.defaults.clone();
        overrides.apply_to(&mut inputs)?;
        info!(
            "Computing '{}' ({} overrides, base {}, {} equity)",
            request.scenario_name,
            overrides.len(),
            request.base_currency,
            request.equity_model
        );

        let resolved = resolve_macro(&inputs, overrides, &self.config);
        let pass = Pass {
            engine: self,
            request,
            overrides,
            inputs,
            resolved,
        };
        let response = pass.run();
        debug!("Computed '{}' in {:?}", request.scenario_name, start.elapsed());
        Ok(response)
    }

    /// Scenario plus the all-defaults baseline, computed in parallel
    pub fn compute_with_baseline(&self, request: &ComputeRequest) -> Result<ScenarioComparison> {
        let baseline_request = request.baseline();
        let (current, baseline) =
            rayon::join(|| self.compute(request), || self.compute(&baseline_request));
        Ok(ScenarioComparison {
            current: current?,
            baseline: baseline?,
        })
    }
}

impl Default for CmeEngine {
    fn default() -> Self {
        Self::new(AllInputs::fallback(), ModelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn compute(request: &ComputeRequest) -> CalculateResponse {
        CmeEngine::default().compute(request).unwrap()
    }

    #[test]
    fn test_all_asset_classes_present() {
        let response = compute(&ComputeRequest::default());
        assert_eq!(response.results.len(), AssetClass::ALL.len());
        let order: Vec<AssetClass> = response.results.keys().copied().collect();
        assert_eq!(order, AssetClass::ALL.to_vec());
        for result in response.results.values() {
            assert!(result.expected_return_nominal.is_finite());
            assert!(result.expected_return_real.is_finite());
        }
    }

    #[test]
    fn test_liquidity_is_base_tbill() {
        let response = compute(&ComputeRequest::default());
        let liquidity = response.result(AssetClass::Liquidity).unwrap();
        assert_abs_diff_eq!(liquidity.expected_return_nominal, 0.035442, epsilon = 1e-6);
        assert_abs_diff_eq!(liquidity.expected_return_real, 0.035442 - 0.0229, epsilon = 1e-6);

        let eur = compute(&ComputeRequest::default().with_base_currency(BaseCurrency::Eur));
        assert_abs_diff_eq!(eur.nominal(AssetClass::Liquidity).unwrap(), 0.024101, epsilon = 1e-6);
    }

    #[test]
    fn test_em_bonds_use_us_macro() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Macro(Region::Em, MacroField::TbillForecast), 0.15);
        let base = compute(&ComputeRequest::default());
        let shocked = compute(&ComputeRequest::default().with_overrides(overrides));
        assert_eq!(base.nominal(AssetClass::BondsEm), shocked.nominal(AssetClass::BondsEm));
        let dep = shocked.result(AssetClass::BondsEm).unwrap().dependency("us.tbill_forecast");
        assert!(dep.is_some());
    }

    #[test]
    fn test_us_tbill_override_moves_bonds() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Macro(Region::Us, MacroField::TbillForecast), 0.05);
        let base = compute(&ComputeRequest::default());
        let shocked = compute(&ComputeRequest::default().with_overrides(overrides));
        let diff = shocked.nominal(AssetClass::BondsGlobal).unwrap() - base.nominal(AssetClass::BondsGlobal).unwrap();
        assert_abs_diff_eq!(diff, 0.05 - 0.0354423, epsilon = 1e-6);
        let dep = shocked.result(AssetClass::BondsGlobal).unwrap().dependency("us.tbill_forecast").unwrap();
        assert_eq!(dep.source, InputSource::Override);
    }

    #[test]
    fn test_gdp_override_marks_tbill_affected() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Macro(Region::Us, MacroField::RgdpGrowth), 0.025);
        let response = compute(&ComputeRequest::default().with_overrides(overrides));
        let dep = response.result(AssetClass::Liquidity).unwrap().dependency("us.tbill_forecast").unwrap();
        assert_eq!(dep.source, InputSource::AffectedByOverride);
        assert_eq!(response.global_rgdp_growth.source, InputSource::AffectedByOverride);
    }

    #[test]
    fn test_fx_applied_only_to_foreign_assets() {
        let usd = compute(&ComputeRequest::default());
        assert!(usd.result(AssetClass::EquityUs).unwrap().component("fx_return").is_none());
        let europe = usd.result(AssetClass::EquityEurope).unwrap();
        let fx = usd.fx_forecasts[&Currency::Eur].fx_change;
        assert_eq!(europe.component("fx_return"), Some(fx));
        assert!(europe.dependency("fx.eur").is_some());
        assert!(!usd.fx_forecasts.contains_key(&Currency::Usd));
        assert_eq!(usd.fx_forecasts.len(), 3);

        let eur = compute(&ComputeRequest::default().with_base_currency(BaseCurrency::Eur));
        assert!(eur.result(AssetClass::EquityUs).unwrap().component("fx_return").is_some());
        assert!(eur.result(AssetClass::BondsGlobal).unwrap().component("fx_return").is_some());
        assert!(eur.result(AssetClass::BondsInflationLinked).unwrap().component("fx_return").is_none());
        assert!(eur.result(AssetClass::Liquidity).unwrap().component("fx_return").is_none());
    }

    #[test]
    fn test_equity_model_switch() {
        let ra = compute(&ComputeRequest::default());
        let gk = compute(&ComputeRequest::default().with_equity_model(EquityModelKind::GrinoldKroner));
        let us_ra = ra.result(AssetClass::EquityUs).unwrap();
        let us_gk = gk.result(AssetClass::EquityUs).unwrap();
        assert!(us_ra.component("eps_growth").is_some());
        assert!(us_gk.component("revenue_growth").is_some());
        assert!(us_gk.inputs_used.contains_key("current_pe"));
        assert!(!us_ra.inputs_used.contains_key("current_pe"));
        // Bonds do not depend on the equity strategy
        assert_eq!(ra.nominal(AssetClass::BondsHy), gk.nominal(AssetClass::BondsHy));
    }

    #[test]
    fn test_revenue_override_breaks_macro_link() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Asset(AssetClass::EquityUs, AssetField::RevenueGrowth), 0.07);
        overrides.insert(FieldKey::Macro(Region::Us, MacroField::RgdpGrowth), 0.04);
        let request = ComputeRequest::default()
            .with_equity_model(EquityModelKind::GrinoldKroner)
            .with_overrides(overrides);
        let response = compute(&request);
        let us = response.result(AssetClass::EquityUs).unwrap();
        assert_eq!(us.component("revenue_growth"), Some(0.07));
        assert!(us.dependency("us.rgdp_growth").is_none());
        assert_eq!(us.inputs_used["revenue_growth"].source, InputSource::Override);
    }

    #[test]
    fn test_market_premium_from_us_equity() {
        let response = compute(&ComputeRequest::default());
        let us_equity = response.nominal(AssetClass::EquityUs).unwrap();
        let tbill = response.nominal(AssetClass::Liquidity).unwrap();
        let ar = response.result(AssetClass::AbsoluteReturn).unwrap();
        assert_abs_diff_eq!(ar.component("market_premium").unwrap(), us_equity - tbill, epsilon = 1e-12);
        assert_abs_diff_eq!(ar.component("market").unwrap(), 0.30 * (us_equity - tbill), epsilon = 1e-12);
    }

    #[test]
    fn test_inputs_tagged_with_source() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Asset(AssetClass::BondsHy, AssetField::DefaultRate), 0.08);
        let response = compute(&ComputeRequest::default().with_overrides(overrides));
        let hy = response.result(AssetClass::BondsHy).unwrap();
        assert_eq!(hy.inputs_used["default_rate"].source, InputSource::Override);
        assert_eq!(hy.inputs_used["duration"].source, InputSource::Default);
        assert_abs_diff_eq!(hy.component("credit_loss").unwrap(), 0.08 * 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_malformed_overrides_rejected() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Macro(Region::Us, MacroField::CurrentTbill), f64::NAN);
        let err = CmeEngine::default()
            .compute(&ComputeRequest::default().with_overrides(overrides))
            .unwrap_err();
        assert!(matches!(err, CmeError::InvalidOverrides(_)));
    }

    #[test]
    fn test_baseline_comparison() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Asset(AssetClass::EquityJapan, AssetField::FairCaey), 0.06);
        let request = ComputeRequest::new("Cheap Japan").with_overrides(overrides);
        let comparison = CmeEngine::default().compute_with_baseline(&request).unwrap();
        assert_eq!(comparison.baseline.scenario_name, BASELINE_SCENARIO_NAME);
        assert_eq!(comparison.current.scenario_name, "Cheap Japan");
        let diffs = comparison.nominal_differences();
        assert!(diffs[&AssetClass::EquityJapan] > 0.0);
        assert_eq!(diffs[&AssetClass::BondsGlobal], 0.0);
    }

    #[test]
    fn test_preview_partial_over_defaults() {
        let engine = CmeEngine::default();
        let unchanged = engine.preview_partial(Region::Us, &BTreeMap::new()).unwrap();
        assert_abs_diff_eq!(unchanged.tbill, 0.035442, epsilon = 1e-6);

        let mut blocks = BTreeMap::new();
        blocks.insert(MacroField::CurrentHeadlineInflation, 0.035);
        let hot = engine.preview_partial(Region::Us, &blocks).unwrap();
        assert_abs_diff_eq!(hot.inflation, 0.3 * 0.035 + 0.7 * 0.022, epsilon = 1e-12);

        blocks.insert(MacroField::RgdpGrowth, 0.02);
        assert!(matches!(
            engine.preview_partial(Region::Us, &blocks),
            Err(CmeError::UnknownField(_))
        ));
    }

    #[test]
    fn test_compute_is_deterministic() {
        let a = compute(&ComputeRequest::default());
        let b = compute(&ComputeRequest::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: ComputeRequest = serde_json::from_str(r#"{"base_currency": "eur"}"#).unwrap();
        assert_eq!(request.base_currency, BaseCurrency::Eur);
        assert_eq!(request.equity_model, EquityModelKind::Ra);
        assert!(request.overrides.is_none());
    }
}
