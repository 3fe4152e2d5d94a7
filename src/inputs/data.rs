//! Typed input sets consumed by the macro and asset models

use serde::{Deserialize, Serialize};

use super::fields::{AssetClass, AssetField, EquityRegion, FieldKey, MacroField, Region};
use crate::error::{CmeError, Result};

/// Generates by-name accessors so generic code (reconciliation, overrides,
/// CSV loading) can address typed struct fields.
macro_rules! field_access {
    ($ty:ty, $key:ident, { $($variant:ident => $($path:ident).+),+ $(,)? }) => {
        impl $ty {
            pub fn field(&self, key: $key) -> Option<f64> {
                match key {
                    $($key::$variant => Some(self.$($path).+),)+
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            pub fn field_mut(&mut self, key: $key) -> Option<&mut f64> {
                match key {
                    $($key::$variant => Some(&mut self.$($path).+),)+
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

/// One value per macro region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMap<T> {
    pub us: T,
    pub eurozone: T,
    pub japan: T,
    pub em: T,
}

impl<T> RegionMap<T> {
    pub fn from_fn(mut f: impl FnMut(Region) -> T) -> Self {
        Self {
            us: f(Region::Us),
            eurozone: f(Region::Eurozone),
            japan: f(Region::Japan),
            em: f(Region::Em),
        }
    }

    pub fn get(&self, region: Region) -> &T {
        match region {
            Region::Us => &self.us,
            Region::Eurozone => &self.eurozone,
            Region::Japan => &self.japan,
            Region::Em => &self.em,
        }
    }

    pub fn get_mut(&mut self, region: Region) -> &mut T {
        match region {
            Region::Us => &mut self.us,
            Region::Eurozone => &mut self.eurozone,
            Region::Japan => &mut self.japan,
            Region::Em => &mut self.em,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, &T)> {
        Region::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

/// Granular macro inputs that drive a regional forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingBlocks {
    pub population_growth: f64,
    pub productivity_growth: f64,
    /// Middle-aged to young population ratio
    pub my_ratio: f64,
    pub current_headline_inflation: f64,
    pub long_term_inflation: f64,
    pub current_tbill: f64,
    pub country_factor: f64,
}

field_access!(BuildingBlocks, MacroField, {
    PopulationGrowth => population_growth,
    ProductivityGrowth => productivity_growth,
    MyRatio => my_ratio,
    CurrentHeadlineInflation => current_headline_inflation,
    LongTermInflation => long_term_inflation,
    CurrentTbill => current_tbill,
    CountryFactor => country_factor,
});

/// Full macro input set for one region: direct forecasts plus building blocks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroInputs {
    pub inflation_forecast: f64,
    pub rgdp_growth: f64,
    pub tbill_forecast: f64,
    #[serde(flatten)]
    pub building_blocks: BuildingBlocks,
}

impl MacroInputs {
    pub fn field(&self, key: MacroField) -> Option<f64> {
        match key {
            MacroField::InflationForecast => Some(self.inflation_forecast),
            MacroField::RgdpGrowth => Some(self.rgdp_growth),
            MacroField::TbillForecast => Some(self.tbill_forecast),
            other => self.building_blocks.field(other),
        }
    }

    pub fn field_mut(&mut self, key: MacroField) -> Option<&mut f64> {
        match key {
            MacroField::InflationForecast => Some(&mut self.inflation_forecast),
            MacroField::RgdpGrowth => Some(&mut self.rgdp_growth),
            MacroField::TbillForecast => Some(&mut self.tbill_forecast),
            other => self.building_blocks.field_mut(other),
        }
    }
}

/// Nominal bond inputs (global government, high yield, EM hard currency)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondInputs {
    pub current_yield: f64,
    pub duration: f64,
    pub current_term_premium: f64,
    pub fair_term_premium: f64,
    pub credit_spread: f64,
    pub fair_credit_spread: f64,
    pub default_rate: f64,
    pub recovery_rate: f64,
    pub assumed_maturity: f64,
}

field_access!(BondInputs, AssetField, {
    CurrentYield => current_yield,
    Duration => duration,
    CurrentTermPremium => current_term_premium,
    FairTermPremium => fair_term_premium,
    CreditSpread => credit_spread,
    FairCreditSpread => fair_credit_spread,
    DefaultRate => default_rate,
    RecoveryRate => recovery_rate,
    AssumedMaturity => assumed_maturity,
});

/// Real-yield parameters for one currency regime of the inflation-linked sleeve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealYieldRegime {
    pub real_yield: f64,
    pub fair_real_yield: f64,
    pub real_term_premium: f64,
    pub duration: f64,
    /// Usually negative: linkers trade cheap to nominals
    pub liquidity_adjustment: f64,
    pub index_lag_drag: f64,
}

/// Inflation-linked bonds. Only the regime matching the base currency is used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflationLinkedInputs {
    pub usd: RealYieldRegime,
    pub eur: RealYieldRegime,
    pub assumed_maturity: f64,
}

field_access!(InflationLinkedInputs, AssetField, {
    UsdRealYield => usd.real_yield,
    UsdFairRealYield => usd.fair_real_yield,
    UsdRealTermPremium => usd.real_term_premium,
    UsdDuration => usd.duration,
    UsdLiquidityAdjustment => usd.liquidity_adjustment,
    UsdIndexLagDrag => usd.index_lag_drag,
    EurRealYield => eur.real_yield,
    EurFairRealYield => eur.fair_real_yield,
    EurRealTermPremium => eur.real_term_premium,
    EurDuration => eur.duration,
    EurLiquidityAdjustment => eur.liquidity_adjustment,
    EurIndexLagDrag => eur.index_lag_drag,
    AssumedMaturity => assumed_maturity,
});

/// Inputs for the CAEY-based (RA) equity strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaEquityInputs {
    pub dividend_yield: f64,
    /// Country real EPS growth
    pub real_eps_growth: f64,
    pub regional_eps_growth: f64,
    pub current_caey: f64,
    pub fair_caey: f64,
    /// Fraction of the 20-year full-reversion horizon assumed, in [0, 1]
    pub reversion_speed: f64,
}

/// Inputs for the Grinold-Kroner (P/E) equity strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GkEquityInputs {
    pub dividend_yield: f64,
    pub net_buyback_yield: f64,
    pub revenue_gdp_wedge: f64,
    /// Only used when explicitly overridden; otherwise derived from macro
    pub revenue_growth: f64,
    pub margin_change: f64,
    pub current_pe: f64,
    pub target_pe: f64,
}

/// Both strategies' inputs for one equity region, kept side by side so
/// switching strategy never discards either set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityInputs {
    pub ra: RaEquityInputs,
    pub gk: GkEquityInputs,
}

field_access!(EquityInputs, AssetField, {
    DividendYield => ra.dividend_yield,
    RealEpsGrowth => ra.real_eps_growth,
    RegionalEpsGrowth => ra.regional_eps_growth,
    CurrentCaey => ra.current_caey,
    FairCaey => ra.fair_caey,
    ReversionSpeed => ra.reversion_speed,
    GkDividendYield => gk.dividend_yield,
    NetBuybackYield => gk.net_buyback_yield,
    RevenueGdpWedge => gk.revenue_gdp_wedge,
    RevenueGrowth => gk.revenue_growth,
    MarginChange => gk.margin_change,
    CurrentPe => gk.current_pe,
    TargetPe => gk.target_pe,
});

/// Factor exposures of the absolute-return sleeve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBetas {
    pub market: f64,
    pub size: f64,
    pub value: f64,
    pub profitability: f64,
    pub investment: f64,
    pub momentum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlternativesInputs {
    pub betas: FactorBetas,
    /// Net of any decay haircut
    pub trading_alpha: f64,
}

field_access!(AlternativesInputs, AssetField, {
    BetaMarket => betas.market,
    BetaSize => betas.size,
    BetaValue => betas.value,
    BetaProfitability => betas.profitability,
    BetaInvestment => betas.investment,
    BetaMomentum => betas.momentum,
    TradingAlpha => trading_alpha,
});

/// Complete input set, in model units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllInputs {
    #[serde(rename = "macro")]
    pub macro_inputs: RegionMap<MacroInputs>,
    pub bonds_global: BondInputs,
    pub bonds_hy: BondInputs,
    pub bonds_em: BondInputs,
    pub bonds_inflation_linked: InflationLinkedInputs,
    pub equity_us: EquityInputs,
    pub equity_europe: EquityInputs,
    pub equity_japan: EquityInputs,
    pub equity_em: EquityInputs,
    pub absolute_return: AlternativesInputs,
}

impl AllInputs {
    pub fn macro_for(&self, region: Region) -> &MacroInputs {
        self.macro_inputs.get(region)
    }

    pub fn equity(&self, region: EquityRegion) -> &EquityInputs {
        match region {
            EquityRegion::Us => &self.equity_us,
            EquityRegion::Europe => &self.equity_europe,
            EquityRegion::Japan => &self.equity_japan,
            EquityRegion::Em => &self.equity_em,
        }
    }

    fn equity_mut(&mut self, region: EquityRegion) -> &mut EquityInputs {
        match region {
            EquityRegion::Us => &mut self.equity_us,
            EquityRegion::Europe => &mut self.equity_europe,
            EquityRegion::Japan => &mut self.equity_japan,
            EquityRegion::Em => &mut self.equity_em,
        }
    }

    /// Read one field by key
    pub fn get(&self, key: FieldKey) -> Result<f64> {
        match key {
            FieldKey::Macro(region, field) => self
                .macro_for(region)
                .field(field)
                .ok_or_else(|| CmeError::UnknownField(field.to_string())),
            FieldKey::Asset(asset, field) => {
                let value = match asset {
                    AssetClass::Liquidity => None,
                    AssetClass::BondsGlobal => self.bonds_global.field(field),
                    AssetClass::BondsHy => self.bonds_hy.field(field),
                    AssetClass::BondsEm => self.bonds_em.field(field),
                    AssetClass::BondsInflationLinked => self.bonds_inflation_linked.field(field),
                    AssetClass::AbsoluteReturn => self.absolute_return.field(field),
                    AssetClass::EquityUs
                    | AssetClass::EquityEurope
                    | AssetClass::EquityJapan
                    | AssetClass::EquityEm => asset
                        .equity_region()
                        .and_then(|region| self.equity(region).field(field)),
                };
                value.ok_or(CmeError::FieldNotApplicable { asset, field })
            }
        }
    }

    /// Write one field by key. Non-finite values are rejected and the stored
    /// value is left unchanged.
    pub fn set(&mut self, key: FieldKey, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(CmeError::NonFiniteValue { field: key.to_string(), value });
        }
        let slot = match key {
            FieldKey::Macro(region, field) => self
                .macro_inputs
                .get_mut(region)
                .field_mut(field)
                .ok_or_else(|| CmeError::UnknownField(field.to_string()))?,
            FieldKey::Asset(asset, field) => {
                let slot = match asset {
                    AssetClass::Liquidity => None,
                    AssetClass::BondsGlobal => self.bonds_global.field_mut(field),
                    AssetClass::BondsHy => self.bonds_hy.field_mut(field),
                    AssetClass::BondsEm => self.bonds_em.field_mut(field),
                    AssetClass::BondsInflationLinked => self.bonds_inflation_linked.field_mut(field),
                    AssetClass::AbsoluteReturn => self.absolute_return.field_mut(field),
                    AssetClass::EquityUs
                    | AssetClass::EquityEurope
                    | AssetClass::EquityJapan
                    | AssetClass::EquityEm => match asset.equity_region() {
                        Some(region) => self.equity_mut(region).field_mut(field),
                        None => None,
                    },
                };
                slot.ok_or(CmeError::FieldNotApplicable { asset, field })?
            }
        };
        *slot = value;
        Ok(())
    }

    /// Every addressable field, macro first then assets in class order
    pub fn keys() -> Vec<FieldKey> {
        let mut keys = Vec::new();
        for region in Region::ALL {
            for field in MacroField::ALL {
                keys.push(FieldKey::Macro(region, field));
            }
        }
        for asset in AssetClass::ALL {
            for &field in asset.fields() {
                keys.push(FieldKey::Asset(asset, field));
            }
        }
        keys
    }
}
