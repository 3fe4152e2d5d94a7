//! Effective macro forecasts for a compute request
//!
//! A direct forecast present in the override payload is used verbatim.
//! Otherwise it is computed from the (possibly overridden) building blocks.
//! The t-bill anchor uses the resolved growth and inflation, so an rgdp
//! override flows into a computed t-bill.

use super::results::{InputSource, MacroSources, MacroSummary};
use crate::config::ModelConfig;
use crate::inputs::{AllInputs, MacroField, Overrides, Region, RegionMap};
use crate::models::macro_forecast::{blend_tbill, forecast, long_term_tbill, MacroForecast};

/// Resolved forecasts for one region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRegion {
    pub rgdp_growth: f64,
    pub inflation: f64,
    pub tbill: f64,
    pub sources: MacroSources,
    /// Pure building-block forecast, before direct overrides
    pub forecast: MacroForecast,
}

impl ResolvedRegion {
    pub fn summary(&self) -> MacroSummary {
        MacroSummary {
            rgdp_growth: self.rgdp_growth,
            inflation: self.inflation,
            tbill_rate: self.tbill,
            nominal_gdp_growth: self.rgdp_growth + self.inflation,
            sources: self.sources,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMacro {
    pub regions: RegionMap<ResolvedRegion>,
    pub global_rgdp_growth: f64,
    pub global_source: InputSource,
}

impl ResolvedMacro {
    pub fn region(&self, region: Region) -> &ResolvedRegion {
        self.regions.get(region)
    }
}

fn source_for(overrides: &Overrides, region: Region, direct: MacroField, upstream: &[MacroField]) -> InputSource {
    if overrides.has_macro(region, direct) {
        InputSource::Override
    } else if upstream.iter().any(|&f| overrides.has_macro(region, f)) {
        InputSource::AffectedByOverride
    } else {
        InputSource::Default
    }
}

fn resolve_region(region: Region, inputs: &AllInputs, overrides: &Overrides, config: &ModelConfig) -> ResolvedRegion {
    let params = &config.macro_params;
    let m = inputs.macro_for(region);
    let computed = forecast(region, &m.building_blocks, params);

    let rgdp_source = source_for(
        overrides,
        region,
        MacroField::RgdpGrowth,
        &[MacroField::PopulationGrowth, MacroField::ProductivityGrowth, MacroField::MyRatio],
    );
    let inflation_source = source_for(
        overrides,
        region,
        MacroField::InflationForecast,
        &[MacroField::CurrentHeadlineInflation, MacroField::LongTermInflation],
    );
    let mut tbill_source = source_for(
        overrides,
        region,
        MacroField::TbillForecast,
        &[MacroField::CurrentTbill, MacroField::CountryFactor],
    );
    if tbill_source.is_default() && !(rgdp_source.is_default() && inflation_source.is_default()) {
        tbill_source = InputSource::AffectedByOverride;
    }

    let rgdp_growth = if rgdp_source == InputSource::Override { m.rgdp_growth } else { computed.rgdp_growth };
    let inflation = if inflation_source == InputSource::Override { m.inflation_forecast } else { computed.inflation };
    let tbill = if tbill_source == InputSource::Override {
        m.tbill_forecast
    } else {
        let anchor = long_term_tbill(params, m.building_blocks.country_factor, rgdp_growth, inflation);
        blend_tbill(params, m.building_blocks.current_tbill, anchor)
    };

    ResolvedRegion {
        rgdp_growth,
        inflation,
        tbill,
        sources: MacroSources {
            rgdp_growth: rgdp_source,
            inflation: inflation_source,
            tbill: tbill_source,
        },
        forecast: computed,
    }
}

/// Resolve every region plus the global growth aggregate
pub fn resolve_macro(inputs: &AllInputs, overrides: &Overrides, config: &ModelConfig) -> ResolvedMacro {
    let regions = RegionMap::from_fn(|region| resolve_region(region, inputs, overrides, config));
    let rgdp = RegionMap::from_fn(|region| regions.get(region).rgdp_growth);
    let global_rgdp_growth = config.gdp_weights.weighted_average(&rgdp);
    let global_source = if regions.iter().all(|(_, r)| r.sources.rgdp_growth.is_default()) {
        InputSource::Computed
    } else {
        InputSource::AffectedByOverride
    };

    ResolvedMacro {
        regions,
        global_rgdp_growth,
        global_source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::FieldKey;
    use approx::assert_abs_diff_eq;

    fn resolve_with(overrides: &Overrides) -> ResolvedMacro {
        let mut inputs = AllInputs::fallback();
        overrides.apply_to(&mut inputs).unwrap();
        resolve_macro(&inputs, overrides, &ModelConfig::default())
    }

    #[test]
    fn test_defaults_resolve_to_building_block_forecast() {
        let resolved = resolve_with(&Overrides::new());
        let us = resolved.region(Region::Us);
        assert_abs_diff_eq!(us.inflation, 0.0229, epsilon = 1e-12);
        assert_abs_diff_eq!(us.tbill, 0.035442, epsilon = 1e-6);
        assert_eq!(us.sources.tbill, InputSource::Default);
        assert_eq!(resolved.global_source, InputSource::Computed);
        assert_abs_diff_eq!(resolved.global_rgdp_growth, 0.02035, epsilon = 1e-4);
    }

    #[test]
    fn test_direct_override_used_verbatim() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Macro(Region::Japan, MacroField::TbillForecast), 0.02);
        let resolved = resolve_with(&overrides);
        let jp = resolved.region(Region::Japan);
        assert_eq!(jp.tbill, 0.02);
        assert_eq!(jp.sources.tbill, InputSource::Override);
        assert_eq!(jp.sources.rgdp_growth, InputSource::Default);
    }

    #[test]
    fn test_rgdp_override_flows_into_tbill() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Macro(Region::Us, MacroField::RgdpGrowth), 0.03);
        let resolved = resolve_with(&overrides);
        let us = resolved.region(Region::Us);
        assert_eq!(us.rgdp_growth, 0.03);
        assert_eq!(us.sources.tbill, InputSource::AffectedByOverride);
        // 0.3 * 3.67% + 0.7 * (0 + 3% + 2.29%)
        assert_abs_diff_eq!(us.tbill, 0.3 * 0.0367 + 0.7 * 0.0529, epsilon = 1e-12);
        assert_eq!(resolved.global_source, InputSource::AffectedByOverride);
    }

    #[test]
    fn test_building_block_override_marks_affected() {
        let mut overrides = Overrides::new();
        overrides.insert(FieldKey::Macro(Region::Em, MacroField::MyRatio), 2.0);
        let resolved = resolve_with(&overrides);
        let em = resolved.region(Region::Em);
        assert_eq!(em.sources.rgdp_growth, InputSource::AffectedByOverride);
        assert_eq!(em.sources.inflation, InputSource::Default);
        assert_eq!(em.sources.tbill, InputSource::AffectedByOverride);
        assert_eq!(em.forecast.intermediate.demographic_effect, 0.0);
    }
}
