//! Regional macro forecast from building blocks
//!
//! Closed-form, side-effect free. All rates are decimal fractions.

use serde::{Deserialize, Serialize};

use crate::config::MacroParams;
use crate::inputs::{BuildingBlocks, MacroField, Region};

/// Forecast for one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroForecast {
    pub region: Region,
    pub rgdp_growth: f64,
    pub inflation: f64,
    pub tbill: f64,
    pub nominal_gdp_growth: f64,
    pub intermediate: MacroIntermediate,
}

/// Every intermediate quantity behind a forecast, for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroIntermediate {
    pub population_growth: f64,
    pub productivity_growth: f64,
    pub my_ratio: f64,
    pub demographic_effect: f64,
    pub adjustment: f64,
    pub output_per_capita_growth: f64,
    pub current_headline_inflation: f64,
    pub long_term_inflation: f64,
    pub current_tbill: f64,
    pub country_factor: f64,
    pub long_term_tbill: f64,
}

impl MacroForecast {
    /// Value of a direct forecast field; building-block fields yield `None`
    pub fn direct(&self, field: MacroField) -> Option<f64> {
        match field {
            MacroField::InflationForecast => Some(self.inflation),
            MacroField::RgdpGrowth => Some(self.rgdp_growth),
            MacroField::TbillForecast => Some(self.tbill),
            _ => None,
        }
    }
}

/// Blend current headline inflation toward its long-term anchor
pub fn blend_inflation(params: &MacroParams, current_headline: f64, long_term: f64) -> f64 {
    params.current_weight * current_headline + params.long_term_weight() * long_term
}

/// Long-term t-bill anchor: country factor plus nominal growth, floored
pub fn long_term_tbill(params: &MacroParams, country_factor: f64, rgdp_growth: f64, inflation: f64) -> f64 {
    (country_factor + rgdp_growth + inflation).max(params.tbill_floor)
}

/// Blend the current t-bill toward the long-term anchor
pub fn blend_tbill(params: &MacroParams, current_tbill: f64, long_term: f64) -> f64 {
    params.current_weight * current_tbill + params.long_term_weight() * long_term
}

/// Forecast real GDP growth, inflation and the t-bill rate for a region
pub fn forecast(region: Region, blocks: &BuildingBlocks, params: &MacroParams) -> MacroForecast {
    let demographic_effect = params.demographic.effect(blocks.my_ratio);
    let adjustment = params.adjustment(region);
    let output_per_capita_growth = blocks.productivity_growth + demographic_effect + adjustment;
    let rgdp_growth = output_per_capita_growth + blocks.population_growth;

    let inflation = blend_inflation(params, blocks.current_headline_inflation, blocks.long_term_inflation);

    let lt_tbill = long_term_tbill(params, blocks.country_factor, rgdp_growth, inflation);
    let tbill = blend_tbill(params, blocks.current_tbill, lt_tbill);

    MacroForecast {
        region,
        rgdp_growth,
        inflation,
        tbill,
        nominal_gdp_growth: rgdp_growth + inflation,
        intermediate: MacroIntermediate {
            population_growth: blocks.population_growth,
            productivity_growth: blocks.productivity_growth,
            my_ratio: blocks.my_ratio,
            demographic_effect,
            adjustment,
            output_per_capita_growth,
            current_headline_inflation: blocks.current_headline_inflation,
            long_term_inflation: blocks.long_term_inflation,
            current_tbill: blocks.current_tbill,
            country_factor: blocks.country_factor,
            long_term_tbill: lt_tbill,
        },
    }
}
