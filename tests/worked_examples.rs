//! End-to-end checks against hand-worked figures

use approx::assert_abs_diff_eq;
use cme_engine::engine::{CmeEngine, ComputeRequest, InputSource};
use cme_engine::inputs::{AssetClass, FieldKey, MacroField, Overrides, Region};
use cme_engine::models::Currency;
use cme_engine::reconcile::FieldState;
use cme_engine::{BaseCurrency, CmeSession, ComputeStatus, EquityModelKind};

#[test]
fn test_us_macro_worked_example() {
    let response = CmeEngine::default().compute(&ComputeRequest::default()).unwrap();
    let us = &response.macro_forecasts[&Region::Us];
    // 0.30 * 2.50% + 0.70 * 2.20%
    assert_abs_diff_eq!(us.inflation, 0.0229, epsilon = 1e-12);
    // 0.30 * 3.67% + 0.70 * (1.20% + 2.29%)
    assert_abs_diff_eq!(us.tbill_rate, 0.0354, epsilon = 1e-4);
    assert_abs_diff_eq!(us.nominal_gdp_growth, us.rgdp_growth + us.inflation, epsilon = 1e-12);
    assert_eq!(us.sources.tbill, InputSource::Default);
}

#[test]
fn test_us_equity_ra_worked_example() {
    let response = CmeEngine::default().compute(&ComputeRequest::default()).unwrap();
    let us = response.result(AssetClass::EquityUs).unwrap();
    let valuation = (0.050_f64 / 0.0248).powf(1.0 / 20.0) - 1.0;
    assert_abs_diff_eq!(valuation, 0.0357, epsilon = 1e-4);
    assert_abs_diff_eq!(us.component("valuation_change").unwrap(), valuation, epsilon = 1e-12);
    // dividend + blended EPS (below the global cap) + valuation
    let real = 0.0113 + 0.017 + valuation;
    assert_abs_diff_eq!(us.expected_return_real, real, epsilon = 1e-12);
    assert_abs_diff_eq!(us.expected_return_nominal, real + 0.0229, epsilon = 1e-12);
}

#[test]
fn test_us_equity_gk_worked_example() {
    let request = ComputeRequest::default().with_equity_model(EquityModelKind::GrinoldKroner);
    let response = CmeEngine::default().compute(&request).unwrap();
    let us = response.result(AssetClass::EquityUs).unwrap();
    assert_abs_diff_eq!(us.component("valuation_change").unwrap(), -0.0095, epsilon = 1e-4);
    assert_abs_diff_eq!(
        us.component("revenue_growth").unwrap(),
        0.0229 + 0.012003 + 0.020,
        epsilon = 1e-5
    );
}

#[test]
fn test_eur_investor_sees_fx_on_us_assets() {
    let engine = CmeEngine::default();
    let usd = engine.compute(&ComputeRequest::default()).unwrap();
    let eur = engine
        .compute(&ComputeRequest::default().with_base_currency(BaseCurrency::Eur))
        .unwrap();

    let fx = eur.fx_forecasts[&Currency::Usd];
    let eur_macro = &eur.macro_forecasts[&Region::Eurozone];
    let us_macro = &eur.macro_forecasts[&Region::Us];
    let expected = 0.30 * (eur_macro.tbill_rate - us_macro.tbill_rate)
        + 0.70 * (eur_macro.inflation - us_macro.inflation);
    assert_abs_diff_eq!(fx.fx_change, expected, epsilon = 1e-12);

    let diff = eur.nominal(AssetClass::EquityUs).unwrap() - usd.nominal(AssetClass::EquityUs).unwrap();
    assert_abs_diff_eq!(diff, fx.fx_change, epsilon = 1e-12);

    // Cash and alternatives follow the base currency
    assert_abs_diff_eq!(
        eur.nominal(AssetClass::Liquidity).unwrap(),
        eur_macro.tbill_rate,
        epsilon = 1e-12
    );
    assert!(eur
        .result(AssetClass::AbsoluteReturn)
        .unwrap()
        .component("fx_return")
        .is_none());
}

#[test]
fn test_sticky_override_survives_building_block_edits() {
    let mut session = CmeSession::default();
    session
        .state_mut()
        .set_direct(Region::Us, MacroField::InflationForecast, 3.0)
        .unwrap();
    session
        .state_mut()
        .set_building_block(Region::Us, MacroField::CurrentHeadlineInflation, 4.0)
        .unwrap();
    session.preview_now(Region::Us);

    let key = FieldKey::Macro(Region::Us, MacroField::InflationForecast);
    assert_eq!(session.state().value(key), Some(3.0));
    assert_eq!(session.state().field_state(key), FieldState::Override);
    assert!(session.state().conflict(Region::Us, MacroField::InflationForecast));

    session.compute_now();
    let comparison = session.last_result().unwrap();
    let us = &comparison.current.macro_forecasts[&Region::Us];
    assert_abs_diff_eq!(us.inflation, 0.03, epsilon = 1e-12);
    assert_eq!(us.sources.inflation, InputSource::Override);
    assert_abs_diff_eq!(comparison.baseline.macro_forecasts[&Region::Us].inflation, 0.0229, epsilon = 1e-12);
}

#[test]
fn test_failed_compute_keeps_last_result() {
    let mut session = CmeSession::default();
    session.compute_now();
    let before = session.last_result().cloned();

    let mut bad = Overrides::new();
    bad.insert(FieldKey::Macro(Region::Japan, MacroField::RgdpGrowth), f64::INFINITY);
    let outcome = session
        .engine()
        .compute_with_baseline(&ComputeRequest::default().with_overrides(bad));
    session.apply_compute(outcome);

    assert!(matches!(session.status(), ComputeStatus::Failed(_)));
    assert_eq!(session.last_result().cloned(), before);
}
