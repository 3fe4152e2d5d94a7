//! Absolute-return (factor) model
//!
//! `nominal = tbill + sum(beta_i * premium_i) + trading_alpha`. The market
//! premium is live (equity return over the t-bill); the style premia are
//! configured historical values after a haircut.

use serde::{Deserialize, Serialize};

use crate::config::FactorPremia;
use crate::inputs::AlternativesInputs;

/// Premium per factor actually used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorPremiumSet {
    pub market: f64,
    pub size: f64,
    pub value: f64,
    pub profitability: f64,
    pub investment: f64,
    pub momentum: f64,
}

impl FactorPremiumSet {
    pub fn new(equity_return: f64, tbill: f64, premia: &FactorPremia) -> Self {
        let d = premia.historical_discount;
        Self {
            market: equity_return - tbill,
            size: premia.size * d,
            value: premia.value * d,
            profitability: premia.profitability * d,
            investment: premia.investment * d,
            momentum: premia.momentum * d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlternativesReturn {
    pub tbill: f64,
    pub market_contribution: f64,
    pub size_contribution: f64,
    pub value_contribution: f64,
    pub profitability_contribution: f64,
    pub investment_contribution: f64,
    pub momentum_contribution: f64,
    pub trading_alpha: f64,
    pub nominal_return: f64,
    pub real_return: f64,
}

impl AlternativesReturn {
    pub fn factor_total(&self) -> f64 {
        self.market_contribution
            + self.size_contribution
            + self.value_contribution
            + self.profitability_contribution
            + self.investment_contribution
            + self.momentum_contribution
    }

    pub fn components(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("tbill", self.tbill),
            ("market", self.market_contribution),
            ("size", self.size_contribution),
            ("value", self.value_contribution),
            ("profitability", self.profitability_contribution),
            ("investment", self.investment_contribution),
            ("momentum", self.momentum_contribution),
            ("trading_alpha", self.trading_alpha),
        ]
    }
}

pub fn alternatives_return(
    inputs: &AlternativesInputs,
    tbill: f64,
    inflation: f64,
    premia: &FactorPremiumSet,
) -> AlternativesReturn {
    let b = &inputs.betas;
    let mut result = AlternativesReturn {
        tbill,
        market_contribution: b.market * premia.market,
        size_contribution: b.size * premia.size,
        value_contribution: b.value * premia.value,
        profitability_contribution: b.profitability * premia.profitability,
        investment_contribution: b.investment * premia.investment,
        momentum_contribution: b.momentum * premia.momentum,
        trading_alpha: inputs.trading_alpha,
        nominal_return: 0.0,
        real_return: 0.0,
    };
    result.nominal_return = tbill + result.factor_total() + inputs.trading_alpha;
    result.real_return = result.nominal_return - inflation;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::AllInputs;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_premia_from_config() {
        let premia = FactorPremiumSet::new(0.09, 0.035, &FactorPremia::default());
        assert_abs_diff_eq!(premia.market, 0.055, epsilon = 1e-12);
        assert_abs_diff_eq!(premia.size, 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(premia.momentum, 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_default_absolute_return() {
        let inputs = AllInputs::fallback().absolute_return;
        let premia = FactorPremiumSet::new(0.09, 0.035, &FactorPremia::default());
        let r = alternatives_return(&inputs, 0.035, 0.0229, &premia);
        // 0.30*5.5% + 0.10*1% + 0.05*1.5% + 0.05*1.25% + 0.05*1.25% + 0.10*3%
        let factors = 0.0165 + 0.001 + 0.00075 + 0.000625 + 0.000625 + 0.003;
        assert_abs_diff_eq!(r.factor_total(), factors, epsilon = 1e-12);
        assert_abs_diff_eq!(r.nominal_return, 0.035 + factors + 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(r.real_return, r.nominal_return - 0.0229, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_betas_collapse_to_cash_plus_alpha() {
        let mut inputs = AllInputs::fallback().absolute_return;
        inputs.betas.market = 0.0;
        inputs.betas.size = 0.0;
        inputs.betas.value = 0.0;
        inputs.betas.profitability = 0.0;
        inputs.betas.investment = 0.0;
        inputs.betas.momentum = 0.0;
        let premia = FactorPremiumSet::new(0.09, 0.035, &FactorPremia::default());
        let r = alternatives_return(&inputs, 0.035, 0.02, &premia);
        assert_abs_diff_eq!(r.nominal_return, 0.045, epsilon = 1e-12);
    }
}
