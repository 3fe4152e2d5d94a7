//! Bond return model
//!
//! Nominal bonds decompose into average yield, roll-down, valuation and
//! credit loss. Inflation-linked bonds build a real return and add
//! indexation. Degenerate maturities, durations or horizons zero the affected
//! component instead of dividing by them.

use serde::{Deserialize, Serialize};

use super::fx::BaseCurrency;
use crate::config::BondParams;
use crate::inputs::{BondInputs, InflationLinkedInputs, RealYieldRegime, Region};

/// Which variant of the nominal bond model applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondKind {
    /// Developed government bonds, no credit terms
    Government,
    HighYield,
    /// USD-denominated sovereign debt, priced off US rates
    EmergingHardCurrency,
}

impl BondKind {
    pub fn carries_credit(&self) -> bool {
        !matches!(self, BondKind::Government)
    }

    /// Macro region whose t-bill and inflation price the bond.
    /// EM hard-currency debt is a USD instrument, so it uses US macro.
    pub fn macro_region(&self) -> Region {
        Region::Us
    }
}

/// Short rate and inflation the bond is priced against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEnvironment {
    pub tbill: f64,
    pub inflation: f64,
}

/// Decomposed nominal bond return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondReturn {
    pub avg_yield: f64,
    pub roll_return: f64,
    pub valuation_return: f64,
    pub credit_loss: f64,
    pub nominal_return: f64,
    pub real_return: f64,
    /// Current term premium after any yield shift
    pub term_premium_used: f64,
}

impl BondReturn {
    pub fn components(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("avg_yield", self.avg_yield),
            ("roll_return", self.roll_return),
            ("valuation_return", self.valuation_return),
            ("credit_loss", self.credit_loss),
            ("term_premium_used", self.term_premium_used),
        ]
    }
}

/// Term premium shift implied by a current yield away from its default.
/// A yield change is attributed entirely to the term premium.
pub fn yield_shift(inputs: &BondInputs, reference: &BondInputs) -> f64 {
    inputs.current_yield - reference.current_yield
}

fn mean(a: f64, b: f64) -> f64 {
    0.5 * (a + b)
}

/// Gap-closing valuation effect: `-duration * gap / horizon`
fn valuation(duration: f64, gap: f64, horizon_years: f64) -> f64 {
    if duration <= 0.0 || horizon_years <= 0.0 {
        return 0.0;
    }
    -duration * gap / horizon_years
}

/// Roll-down: `term_premium / maturity * duration`
fn roll(term_premium: f64, maturity: f64, duration: f64) -> f64 {
    if maturity <= 0.0 || duration <= 0.0 {
        return 0.0;
    }
    term_premium / maturity * duration
}

/// Expected 10-year return of a nominal bond class
pub fn bond_return(
    kind: BondKind,
    inputs: &BondInputs,
    shift: f64,
    rates: RateEnvironment,
    params: &BondParams,
) -> BondReturn {
    let current_tp = inputs.current_term_premium + shift;

    let mut avg_yield = rates.tbill + mean(current_tp, inputs.fair_term_premium);
    let roll_return = roll(current_tp, inputs.assumed_maturity, inputs.duration);
    let mut valuation_return = valuation(
        inputs.duration,
        inputs.fair_term_premium - current_tp,
        params.horizon_years,
    );

    let credit_loss = if kind.carries_credit() {
        avg_yield += mean(inputs.credit_spread, inputs.fair_credit_spread);
        valuation_return += valuation(
            inputs.duration,
            (inputs.fair_credit_spread - inputs.credit_spread) * params.spread_reversion_fraction,
            params.horizon_years,
        );
        inputs.default_rate * (1.0 - inputs.recovery_rate)
    } else {
        0.0
    };

    let nominal_return = avg_yield + roll_return + valuation_return - credit_loss;

    BondReturn {
        avg_yield,
        roll_return,
        valuation_return,
        credit_loss,
        nominal_return,
        real_return: nominal_return - rates.inflation,
        term_premium_used: current_tp,
    }
}

/// Decomposed inflation-linked return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflationLinkedReturn {
    pub real_carry: f64,
    pub real_roll: f64,
    pub real_valuation: f64,
    pub liquidity_adjustment: f64,
    pub inflation_indexation: f64,
    pub index_lag_drag: f64,
    pub real_return: f64,
    pub nominal_return: f64,
}

impl InflationLinkedReturn {
    pub fn components(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("real_carry", self.real_carry),
            ("real_roll", self.real_roll),
            ("real_valuation", self.real_valuation),
            ("liquidity_adjustment", self.liquidity_adjustment),
            ("inflation_indexation", self.inflation_indexation),
            ("index_lag_drag", self.index_lag_drag),
        ]
    }
}

/// The parameter regime follows the base currency: USD linkers for a USD
/// investor, EUR linkers for a EUR investor. Returns the regime and the
/// macro region supplying indexation.
pub fn linker_regime(inputs: &InflationLinkedInputs, base: BaseCurrency) -> (&RealYieldRegime, Region) {
    match base {
        BaseCurrency::Usd => (&inputs.usd, Region::Us),
        BaseCurrency::Eur => (&inputs.eur, Region::Eurozone),
    }
}

pub fn inflation_linked_return(
    regime: &RealYieldRegime,
    assumed_maturity: f64,
    inflation: f64,
    params: &BondParams,
) -> InflationLinkedReturn {
    let real_carry = regime.real_yield;
    let real_roll = roll(regime.real_term_premium, assumed_maturity, regime.duration);
    let real_valuation = valuation(
        regime.duration,
        regime.fair_real_yield - regime.real_yield,
        params.horizon_years,
    );
    let real_return = real_carry + real_roll + real_valuation + regime.liquidity_adjustment;
    let nominal_return = real_return + inflation - regime.index_lag_drag;

    InflationLinkedReturn {
        real_carry,
        real_roll,
        real_valuation,
        liquidity_adjustment: regime.liquidity_adjustment,
        inflation_indexation: inflation,
        index_lag_drag: regime.index_lag_drag,
        real_return,
        nominal_return,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::AllInputs;
    use approx::assert_abs_diff_eq;

    fn us_rates() -> RateEnvironment {
        RateEnvironment { tbill: 0.0354, inflation: 0.0229 }
    }

    #[test]
    fn test_global_bond_decomposition() {
        let inputs = AllInputs::fallback().bonds_global;
        let r = bond_return(BondKind::Government, &inputs, 0.0, us_rates(), &BondParams::default());
        assert_abs_diff_eq!(r.avg_yield, 0.0354 + 0.0125, epsilon = 1e-12);
        assert_abs_diff_eq!(r.roll_return, 0.010 / 10.0 * 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.valuation_return, -7.0 * 0.005 / 10.0, epsilon = 1e-12);
        assert_eq!(r.credit_loss, 0.0);
        assert_abs_diff_eq!(r.nominal_return, 0.0479 + 0.007 - 0.0035, epsilon = 1e-12);
        assert_abs_diff_eq!(r.real_return, r.nominal_return - 0.0229, epsilon = 1e-12);
    }

    #[test]
    fn test_government_ignores_credit_inputs() {
        let mut inputs = AllInputs::fallback().bonds_global;
        inputs.default_rate = 0.10;
        inputs.credit_spread = 0.05;
        let r = bond_return(BondKind::Government, &inputs, 0.0, us_rates(), &BondParams::default());
        assert_eq!(r.credit_loss, 0.0);
        assert_abs_diff_eq!(r.avg_yield, 0.0354 + 0.0125, epsilon = 1e-12);
    }

    #[test]
    fn test_high_yield_credit_terms() {
        let inputs = AllInputs::fallback().bonds_hy;
        let r = bond_return(BondKind::HighYield, &inputs, 0.0, us_rates(), &BondParams::default());
        assert_abs_diff_eq!(r.credit_loss, 0.055 * 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(r.avg_yield, 0.0354 + 0.015 + (0.0271 + 0.04) / 2.0, epsilon = 1e-12);
        // Spread widening toward fair value is a loss
        assert_abs_diff_eq!(r.valuation_return, -4.0 * (0.04 - 0.0271) * 0.5 / 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_yield_shift_moves_term_premium() {
        let defaults = AllInputs::fallback().bonds_global;
        let mut inputs = defaults;
        inputs.current_yield += 0.01;
        let shift = yield_shift(&inputs, &defaults);
        assert_abs_diff_eq!(shift, 0.01, epsilon = 1e-12);
        let base = bond_return(BondKind::Government, &defaults, 0.0, us_rates(), &BondParams::default());
        let shifted = bond_return(BondKind::Government, &inputs, shift, us_rates(), &BondParams::default());
        assert_abs_diff_eq!(shifted.term_premium_used, 0.02, epsilon = 1e-12);
        assert!(shifted.avg_yield > base.avg_yield);
    }

    #[test]
    fn test_degenerate_maturity_and_duration() {
        let mut inputs = AllInputs::fallback().bonds_global;
        inputs.assumed_maturity = 0.0;
        let r = bond_return(BondKind::Government, &inputs, 0.0, us_rates(), &BondParams::default());
        assert_eq!(r.roll_return, 0.0);
        assert!(r.nominal_return.is_finite());

        inputs.assumed_maturity = 10.0;
        inputs.duration = -1.0;
        let r = bond_return(BondKind::Government, &inputs, 0.0, us_rates(), &BondParams::default());
        assert_eq!(r.roll_return, 0.0);
        assert_eq!(r.valuation_return, 0.0);
    }

    #[test]
    fn test_em_bonds_priced_off_us() {
        assert_eq!(BondKind::EmergingHardCurrency.macro_region(), Region::Us);
    }

    #[test]
    fn test_linker_regime_follows_base_currency() {
        let inputs = AllInputs::fallback().bonds_inflation_linked;
        let (usd, region) = linker_regime(&inputs, BaseCurrency::Usd);
        assert_eq!(region, Region::Us);
        assert_eq!(usd.real_yield, 0.020);
        let (eur, region) = linker_regime(&inputs, BaseCurrency::Eur);
        assert_eq!(region, Region::Eurozone);
        assert_eq!(eur.real_yield, 0.008);
    }

    #[test]
    fn test_inflation_linked_decomposition() {
        let inputs = AllInputs::fallback().bonds_inflation_linked;
        let r = inflation_linked_return(&inputs.usd, 10.0, 0.0229, &BondParams::default());
        assert_abs_diff_eq!(r.real_carry, 0.020, epsilon = 1e-12);
        assert_abs_diff_eq!(r.real_roll, 0.005 / 10.0 * 7.0, epsilon = 1e-12);
        // Real yield above fair: yields fall, prices rise
        assert_abs_diff_eq!(r.real_valuation, 7.0 * 0.005 / 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.real_return, 0.020 + 0.0035 + 0.0035 - 0.001, epsilon = 1e-12);
        assert_abs_diff_eq!(r.nominal_return, r.real_return + 0.0229 - 0.0005, epsilon = 1e-12);
    }
}
