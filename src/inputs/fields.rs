//! Field catalogue: regions, asset classes and the named inputs each carries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CmeError;

/// Tolerance used to decide whether a displayed value differs from another,
/// applied in display units (percentage points for percent fields).
pub const DISPLAY_TOLERANCE: f64 = 0.001;

/// Macro-economic region
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Us,
    Eurozone,
    Japan,
    Em,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Us, Region::Eurozone, Region::Japan, Region::Em];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eurozone => "eurozone",
            Region::Japan => "japan",
            Region::Em => "em",
        }
    }

    /// Developed markets get a smaller skewness correction than EM
    pub fn is_emerging(&self) -> bool {
        matches!(self, Region::Em)
    }
}

/// Equity region key. Europe equities are driven by the eurozone macro region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityRegion {
    Us,
    Europe,
    Japan,
    Em,
}

impl EquityRegion {
    pub const ALL: [EquityRegion; 4] = [
        EquityRegion::Us,
        EquityRegion::Europe,
        EquityRegion::Japan,
        EquityRegion::Em,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquityRegion::Us => "us",
            EquityRegion::Europe => "europe",
            EquityRegion::Japan => "japan",
            EquityRegion::Em => "em",
        }
    }

    pub fn macro_region(&self) -> Region {
        match self {
            EquityRegion::Us => Region::Us,
            EquityRegion::Europe => Region::Eurozone,
            EquityRegion::Japan => Region::Japan,
            EquityRegion::Em => Region::Em,
        }
    }

    pub fn asset_class(&self) -> AssetClass {
        match self {
            EquityRegion::Us => AssetClass::EquityUs,
            EquityRegion::Europe => AssetClass::EquityEurope,
            EquityRegion::Japan => AssetClass::EquityJapan,
            EquityRegion::Em => AssetClass::EquityEm,
        }
    }
}

/// Asset classes with a 10-year expected return
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Liquidity,
    BondsGlobal,
    BondsHy,
    BondsEm,
    BondsInflationLinked,
    EquityUs,
    EquityEurope,
    EquityJapan,
    EquityEm,
    AbsoluteReturn,
}

impl AssetClass {
    pub const ALL: [AssetClass; 10] = [
        AssetClass::Liquidity,
        AssetClass::BondsGlobal,
        AssetClass::BondsHy,
        AssetClass::BondsEm,
        AssetClass::BondsInflationLinked,
        AssetClass::EquityUs,
        AssetClass::EquityEurope,
        AssetClass::EquityJapan,
        AssetClass::EquityEm,
        AssetClass::AbsoluteReturn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Liquidity => "liquidity",
            AssetClass::BondsGlobal => "bonds_global",
            AssetClass::BondsHy => "bonds_hy",
            AssetClass::BondsEm => "bonds_em",
            AssetClass::BondsInflationLinked => "bonds_inflation_linked",
            AssetClass::EquityUs => "equity_us",
            AssetClass::EquityEurope => "equity_europe",
            AssetClass::EquityJapan => "equity_japan",
            AssetClass::EquityEm => "equity_em",
            AssetClass::AbsoluteReturn => "absolute_return",
        }
    }

    /// Human-readable label for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            AssetClass::Liquidity => "Liquidity",
            AssetClass::BondsGlobal => "Bonds Global",
            AssetClass::BondsHy => "Bonds High Yield",
            AssetClass::BondsEm => "Bonds EM Hard Currency",
            AssetClass::BondsInflationLinked => "Bonds Inflation-Linked",
            AssetClass::EquityUs => "Equity US",
            AssetClass::EquityEurope => "Equity Europe",
            AssetClass::EquityJapan => "Equity Japan",
            AssetClass::EquityEm => "Equity EM",
            AssetClass::AbsoluteReturn => "Absolute Return",
        }
    }

    /// Long-run annualized volatility assumption
    pub fn expected_volatility(&self) -> f64 {
        match self {
            AssetClass::Liquidity => 0.01,
            AssetClass::BondsGlobal => 0.06,
            AssetClass::BondsHy => 0.10,
            AssetClass::BondsEm => 0.12,
            AssetClass::BondsInflationLinked => 0.06,
            AssetClass::EquityUs => 0.16,
            AssetClass::EquityEurope => 0.18,
            AssetClass::EquityJapan => 0.18,
            AssetClass::EquityEm => 0.24,
            AssetClass::AbsoluteReturn => 0.08,
        }
    }

    pub fn equity_region(&self) -> Option<EquityRegion> {
        match self {
            AssetClass::EquityUs => Some(EquityRegion::Us),
            AssetClass::EquityEurope => Some(EquityRegion::Europe),
            AssetClass::EquityJapan => Some(EquityRegion::Japan),
            AssetClass::EquityEm => Some(EquityRegion::Em),
            _ => None,
        }
    }

    /// Input fields carried by this asset class
    pub fn fields(&self) -> &'static [AssetField] {
        use AssetField::*;
        match self {
            AssetClass::Liquidity => &[],
            AssetClass::BondsGlobal | AssetClass::BondsHy | AssetClass::BondsEm => &[
                CurrentYield,
                Duration,
                CurrentTermPremium,
                FairTermPremium,
                CreditSpread,
                FairCreditSpread,
                DefaultRate,
                RecoveryRate,
                AssumedMaturity,
            ],
            AssetClass::BondsInflationLinked => &[
                UsdRealYield,
                UsdFairRealYield,
                UsdRealTermPremium,
                UsdDuration,
                UsdLiquidityAdjustment,
                UsdIndexLagDrag,
                EurRealYield,
                EurFairRealYield,
                EurRealTermPremium,
                EurDuration,
                EurLiquidityAdjustment,
                EurIndexLagDrag,
                AssumedMaturity,
            ],
            AssetClass::EquityUs
            | AssetClass::EquityEurope
            | AssetClass::EquityJapan
            | AssetClass::EquityEm => &[
                DividendYield,
                RealEpsGrowth,
                RegionalEpsGrowth,
                CurrentCaey,
                FairCaey,
                ReversionSpeed,
                GkDividendYield,
                NetBuybackYield,
                RevenueGdpWedge,
                RevenueGrowth,
                MarginChange,
                CurrentPe,
                TargetPe,
            ],
            AssetClass::AbsoluteReturn => &[
                BetaMarket,
                BetaSize,
                BetaValue,
                BetaProfitability,
                BetaInvestment,
                BetaMomentum,
                TradingAlpha,
            ],
        }
    }
}

/// Per-region macro input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroField {
    // Direct forecasts
    InflationForecast,
    RgdpGrowth,
    TbillForecast,
    // Building blocks
    PopulationGrowth,
    ProductivityGrowth,
    MyRatio,
    CurrentHeadlineInflation,
    LongTermInflation,
    CurrentTbill,
    CountryFactor,
}

impl MacroField {
    pub const ALL: [MacroField; 10] = [
        MacroField::InflationForecast,
        MacroField::RgdpGrowth,
        MacroField::TbillForecast,
        MacroField::PopulationGrowth,
        MacroField::ProductivityGrowth,
        MacroField::MyRatio,
        MacroField::CurrentHeadlineInflation,
        MacroField::LongTermInflation,
        MacroField::CurrentTbill,
        MacroField::CountryFactor,
    ];

    pub const DIRECT: [MacroField; 3] = [
        MacroField::InflationForecast,
        MacroField::RgdpGrowth,
        MacroField::TbillForecast,
    ];

    /// Direct forecasts can be overridden wholesale and carry a dirty flag
    pub fn is_direct(&self) -> bool {
        matches!(
            self,
            MacroField::InflationForecast | MacroField::RgdpGrowth | MacroField::TbillForecast
        )
    }

    pub fn unit(&self) -> FieldUnit {
        match self {
            MacroField::MyRatio => FieldUnit::Ratio,
            _ => FieldUnit::Percent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MacroField::InflationForecast => "inflation_forecast",
            MacroField::RgdpGrowth => "rgdp_growth",
            MacroField::TbillForecast => "tbill_forecast",
            MacroField::PopulationGrowth => "population_growth",
            MacroField::ProductivityGrowth => "productivity_growth",
            MacroField::MyRatio => "my_ratio",
            MacroField::CurrentHeadlineInflation => "current_headline_inflation",
            MacroField::LongTermInflation => "long_term_inflation",
            MacroField::CurrentTbill => "current_tbill",
            MacroField::CountryFactor => "country_factor",
        }
    }
}

/// Asset-level input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetField {
    // Bonds
    CurrentYield,
    Duration,
    CurrentTermPremium,
    FairTermPremium,
    CreditSpread,
    FairCreditSpread,
    DefaultRate,
    RecoveryRate,
    AssumedMaturity,
    // Inflation-linked, one regime per currency
    UsdRealYield,
    UsdFairRealYield,
    UsdRealTermPremium,
    UsdDuration,
    UsdLiquidityAdjustment,
    UsdIndexLagDrag,
    EurRealYield,
    EurFairRealYield,
    EurRealTermPremium,
    EurDuration,
    EurLiquidityAdjustment,
    EurIndexLagDrag,
    // Equity, RA (CAEY) strategy
    DividendYield,
    RealEpsGrowth,
    RegionalEpsGrowth,
    CurrentCaey,
    FairCaey,
    ReversionSpeed,
    // Equity, Grinold-Kroner strategy
    GkDividendYield,
    NetBuybackYield,
    RevenueGdpWedge,
    RevenueGrowth,
    MarginChange,
    CurrentPe,
    TargetPe,
    // Absolute return
    BetaMarket,
    BetaSize,
    BetaValue,
    BetaProfitability,
    BetaInvestment,
    BetaMomentum,
    TradingAlpha,
}

impl AssetField {
    pub const ALL: [AssetField; 41] = [
        AssetField::CurrentYield,
        AssetField::Duration,
        AssetField::CurrentTermPremium,
        AssetField::FairTermPremium,
        AssetField::CreditSpread,
        AssetField::FairCreditSpread,
        AssetField::DefaultRate,
        AssetField::RecoveryRate,
        AssetField::AssumedMaturity,
        AssetField::UsdRealYield,
        AssetField::UsdFairRealYield,
        AssetField::UsdRealTermPremium,
        AssetField::UsdDuration,
        AssetField::UsdLiquidityAdjustment,
        AssetField::UsdIndexLagDrag,
        AssetField::EurRealYield,
        AssetField::EurFairRealYield,
        AssetField::EurRealTermPremium,
        AssetField::EurDuration,
        AssetField::EurLiquidityAdjustment,
        AssetField::EurIndexLagDrag,
        AssetField::DividendYield,
        AssetField::RealEpsGrowth,
        AssetField::RegionalEpsGrowth,
        AssetField::CurrentCaey,
        AssetField::FairCaey,
        AssetField::ReversionSpeed,
        AssetField::GkDividendYield,
        AssetField::NetBuybackYield,
        AssetField::RevenueGdpWedge,
        AssetField::RevenueGrowth,
        AssetField::MarginChange,
        AssetField::CurrentPe,
        AssetField::TargetPe,
        AssetField::BetaMarket,
        AssetField::BetaSize,
        AssetField::BetaValue,
        AssetField::BetaProfitability,
        AssetField::BetaInvestment,
        AssetField::BetaMomentum,
        AssetField::TradingAlpha,
    ];

    pub fn unit(&self) -> FieldUnit {
        use AssetField::*;
        match self {
            Duration | AssumedMaturity | UsdDuration | EurDuration | ReversionSpeed | CurrentPe
            | TargetPe | BetaMarket | BetaSize | BetaValue | BetaProfitability | BetaInvestment
            | BetaMomentum => FieldUnit::Ratio,
            _ => FieldUnit::Percent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use AssetField::*;
        match self {
            CurrentYield => "current_yield",
            Duration => "duration",
            CurrentTermPremium => "current_term_premium",
            FairTermPremium => "fair_term_premium",
            CreditSpread => "credit_spread",
            FairCreditSpread => "fair_credit_spread",
            DefaultRate => "default_rate",
            RecoveryRate => "recovery_rate",
            AssumedMaturity => "assumed_maturity",
            UsdRealYield => "usd_real_yield",
            UsdFairRealYield => "usd_fair_real_yield",
            UsdRealTermPremium => "usd_real_term_premium",
            UsdDuration => "usd_duration",
            UsdLiquidityAdjustment => "usd_liquidity_adjustment",
            UsdIndexLagDrag => "usd_index_lag_drag",
            EurRealYield => "eur_real_yield",
            EurFairRealYield => "eur_fair_real_yield",
            EurRealTermPremium => "eur_real_term_premium",
            EurDuration => "eur_duration",
            EurLiquidityAdjustment => "eur_liquidity_adjustment",
            EurIndexLagDrag => "eur_index_lag_drag",
            DividendYield => "dividend_yield",
            RealEpsGrowth => "real_eps_growth",
            RegionalEpsGrowth => "regional_eps_growth",
            CurrentCaey => "current_caey",
            FairCaey => "fair_caey",
            ReversionSpeed => "reversion_speed",
            GkDividendYield => "gk_dividend_yield",
            NetBuybackYield => "net_buyback_yield",
            RevenueGdpWedge => "revenue_gdp_wedge",
            RevenueGrowth => "revenue_growth",
            MarginChange => "margin_change",
            CurrentPe => "current_pe",
            TargetPe => "target_pe",
            BetaMarket => "beta_market",
            BetaSize => "beta_size",
            BetaValue => "beta_value",
            BetaProfitability => "beta_profitability",
            BetaInvestment => "beta_investment",
            BetaMomentum => "beta_momentum",
            TradingAlpha => "trading_alpha",
        }
    }
}

/// How a field is displayed and edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUnit {
    /// Decimal fraction in the models, percentage points on screen
    Percent,
    /// Raw number in both places (ratios, durations, betas)
    Ratio,
}

impl FieldUnit {
    pub fn to_display(&self, model_value: f64) -> f64 {
        match self {
            FieldUnit::Percent => model_value * 100.0,
            FieldUnit::Ratio => model_value,
        }
    }

    pub fn to_model(&self, display_value: f64) -> f64 {
        match self {
            FieldUnit::Percent => display_value / 100.0,
            FieldUnit::Ratio => display_value,
        }
    }
}

/// Address of any input in the full input set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Macro(Region, MacroField),
    Asset(AssetClass, AssetField),
}

impl FieldKey {
    pub fn unit(&self) -> FieldUnit {
        match self {
            FieldKey::Macro(_, field) => field.unit(),
            FieldKey::Asset(_, field) => field.unit(),
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, FieldKey::Macro(_, field) if field.is_direct())
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Macro(region, field) => write!(f, "macro.{}.{}", region.as_str(), field.as_str()),
            FieldKey::Asset(asset, field) => write!(f, "{}.{}", asset.as_str(), field.as_str()),
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ty, $err:expr) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CmeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase();
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| $err(s.to_string()))
            }
        }
    };
}

display_and_parse!(Region, CmeError::UnknownRegion);
display_and_parse!(EquityRegion, CmeError::UnknownRegion);
display_and_parse!(AssetClass, CmeError::UnknownAssetClass);
display_and_parse!(MacroField, CmeError::UnknownField);
display_and_parse!(AssetField, CmeError::UnknownField);
