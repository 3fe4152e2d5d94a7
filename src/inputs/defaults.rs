//! Hardcoded fallback input table
//!
//! Used whenever a fetched default table is unavailable. Values are in model
//! units (decimal fractions for rates). Direct macro forecasts are set to what
//! the building blocks imply under the default calibration.

use super::data::{
    AllInputs, AlternativesInputs, BondInputs, BuildingBlocks, EquityInputs, FactorBetas,
    GkEquityInputs, InflationLinkedInputs, MacroInputs, RaEquityInputs, RealYieldRegime, RegionMap,
};

impl AllInputs {
    /// Built-in default table
    pub fn fallback() -> Self {
        Self {
            macro_inputs: RegionMap {
                us: MacroInputs {
                    inflation_forecast: 0.0229,
                    rgdp_growth: 0.012003,
                    tbill_forecast: 0.035442,
                    building_blocks: BuildingBlocks {
                        population_growth: 0.004,
                        productivity_growth: 0.012,
                        my_ratio: 2.1,
                        current_headline_inflation: 0.025,
                        long_term_inflation: 0.022,
                        current_tbill: 0.0367,
                        country_factor: 0.0,
                    },
                },
                eurozone: MacroInputs {
                    inflation_forecast: 0.0206,
                    rgdp_growth: 0.005087,
                    tbill_forecast: 0.024101,
                    building_blocks: BuildingBlocks {
                        population_growth: 0.001,
                        productivity_growth: 0.010,
                        my_ratio: 2.3,
                        current_headline_inflation: 0.022,
                        long_term_inflation: 0.020,
                        current_tbill: 0.0204,
                        country_factor: 0.0,
                    },
                },
                japan: MacroInputs {
                    inflation_forecast: 0.0165,
                    rgdp_growth: -0.004621,
                    tbill_forecast: 0.010565,
                    building_blocks: BuildingBlocks {
                        population_growth: -0.005,
                        productivity_growth: 0.008,
                        my_ratio: 2.5,
                        current_headline_inflation: 0.020,
                        long_term_inflation: 0.015,
                        current_tbill: 0.0075,
                        country_factor: 0.0,
                    },
                },
                em: MacroInputs {
                    inflation_forecast: 0.038,
                    rgdp_growth: 0.034621,
                    tbill_forecast: 0.068835,
                    building_blocks: BuildingBlocks {
                        population_growth: 0.010,
                        productivity_growth: 0.025,
                        my_ratio: 1.5,
                        current_headline_inflation: 0.045,
                        long_term_inflation: 0.035,
                        current_tbill: 0.060,
                        country_factor: 0.0,
                    },
                },
            },
            bonds_global: BondInputs {
                current_yield: 0.035,
                duration: 7.0,
                current_term_premium: 0.010,
                fair_term_premium: 0.015,
                credit_spread: 0.0,
                fair_credit_spread: 0.0,
                default_rate: 0.0,
                recovery_rate: 0.0,
                assumed_maturity: 10.0,
            },
            bonds_hy: BondInputs {
                current_yield: 0.075,
                duration: 4.0,
                current_term_premium: 0.015,
                fair_term_premium: 0.015,
                credit_spread: 0.0271,
                fair_credit_spread: 0.040,
                default_rate: 0.055,
                recovery_rate: 0.40,
                assumed_maturity: 10.0,
            },
            bonds_em: BondInputs {
                current_yield: 0.0577,
                duration: 5.5,
                current_term_premium: 0.015,
                fair_term_premium: 0.020,
                credit_spread: 0.020, // sovereign spread over US
                fair_credit_spread: 0.020,
                default_rate: 0.028,
                recovery_rate: 0.55,
                assumed_maturity: 10.0,
            },
            bonds_inflation_linked: InflationLinkedInputs {
                usd: RealYieldRegime {
                    real_yield: 0.020,
                    fair_real_yield: 0.015,
                    real_term_premium: 0.005,
                    duration: 7.0,
                    liquidity_adjustment: -0.001,
                    index_lag_drag: 0.0005,
                },
                eur: RealYieldRegime {
                    real_yield: 0.008,
                    fair_real_yield: 0.005,
                    real_term_premium: 0.004,
                    duration: 8.0,
                    liquidity_adjustment: -0.0015,
                    index_lag_drag: 0.0005,
                },
                assumed_maturity: 10.0,
            },
            equity_us: EquityInputs {
                ra: RaEquityInputs {
                    dividend_yield: 0.0113,
                    real_eps_growth: 0.018,
                    regional_eps_growth: 0.016,
                    current_caey: 0.0248,
                    fair_caey: 0.050,
                    reversion_speed: 1.0,
                },
                gk: GkEquityInputs {
                    dividend_yield: 0.013,
                    net_buyback_yield: 0.015,
                    revenue_gdp_wedge: 0.020,
                    revenue_growth: 0.055,
                    margin_change: -0.005,
                    current_pe: 22.0,
                    target_pe: 20.0,
                },
            },
            equity_europe: EquityInputs {
                ra: RaEquityInputs {
                    dividend_yield: 0.030,
                    real_eps_growth: 0.012,
                    regional_eps_growth: 0.016,
                    current_caey: 0.055,
                    fair_caey: 0.055,
                    reversion_speed: 1.0,
                },
                gk: GkEquityInputs {
                    dividend_yield: 0.030,
                    net_buyback_yield: 0.005,
                    revenue_gdp_wedge: 0.005,
                    revenue_growth: 0.034,
                    margin_change: 0.0,
                    current_pe: 14.0,
                    target_pe: 14.0,
                },
            },
            equity_japan: EquityInputs {
                ra: RaEquityInputs {
                    dividend_yield: 0.022,
                    real_eps_growth: 0.008,
                    regional_eps_growth: 0.016,
                    current_caey: 0.055,
                    fair_caey: 0.050,
                    reversion_speed: 1.0,
                },
                gk: GkEquityInputs {
                    dividend_yield: 0.022,
                    net_buyback_yield: 0.008,
                    revenue_gdp_wedge: 0.005,
                    revenue_growth: 0.025,
                    margin_change: 0.003,
                    current_pe: 15.0,
                    target_pe: 14.5,
                },
            },
            equity_em: EquityInputs {
                ra: RaEquityInputs {
                    dividend_yield: 0.030,
                    real_eps_growth: 0.030,
                    regional_eps_growth: 0.028,
                    current_caey: 0.065,
                    fair_caey: 0.060,
                    reversion_speed: 1.0,
                },
                gk: GkEquityInputs {
                    dividend_yield: 0.030,
                    net_buyback_yield: -0.015, // net issuance
                    revenue_gdp_wedge: 0.005,
                    revenue_growth: 0.073,
                    margin_change: 0.0,
                    current_pe: 12.0,
                    target_pe: 12.0,
                },
            },
            absolute_return: AlternativesInputs {
                betas: FactorBetas {
                    market: 0.30,
                    size: 0.10,
                    value: 0.05,
                    profitability: 0.05,
                    investment: 0.05,
                    momentum: 0.10,
                },
                trading_alpha: 0.01,
            },
        }
    }
}

impl Default for AllInputs {
    fn default() -> Self {
        Self::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Region;

    #[test]
    fn test_fallback_macro_values() {
        let inputs = AllInputs::fallback();
        let us = inputs.macro_for(Region::Us);
        assert!((us.inflation_forecast - 0.0229).abs() < 1e-12);
        assert!((us.building_blocks.current_tbill - 0.0367).abs() < 1e-12);
        assert!((inputs.macro_for(Region::Japan).building_blocks.population_growth + 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_global_bonds_carry_no_credit_terms() {
        let inputs = AllInputs::fallback();
        assert_eq!(inputs.bonds_global.default_rate, 0.0);
        assert_eq!(inputs.bonds_global.credit_spread, 0.0);
    }
}
