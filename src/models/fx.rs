//! Currency adjustment
//!
//! `fx_change = 0.30 * (home_tbill - foreign_tbill) + 0.70 * (home_inflation - foreign_inflation)`.
//! A positive value means the home currency is expected to depreciate, which
//! adds to a foreign asset's return measured in home currency.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::FxParams;
use crate::error::CmeError;
use crate::inputs::{AssetClass, Region};

/// Currencies an asset can be denominated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Usd,
    Eur,
    Jpy,
    /// EM local-currency basket
    Em,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Jpy, Currency::Em];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Jpy => "jpy",
            Currency::Em => "em",
        }
    }

    pub fn macro_region(&self) -> Region {
        match self {
            Currency::Usd => Region::Us,
            Currency::Eur => Region::Eurozone,
            Currency::Jpy => Region::Japan,
            Currency::Em => Region::Em,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Investor's reporting currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseCurrency {
    #[default]
    Usd,
    Eur,
}

impl BaseCurrency {
    pub fn currency(&self) -> Currency {
        match self {
            BaseCurrency::Usd => Currency::Usd,
            BaseCurrency::Eur => Currency::Eur,
        }
    }

    pub fn macro_region(&self) -> Region {
        self.currency().macro_region()
    }

    pub fn as_str(&self) -> &'static str {
        self.currency().as_str()
    }
}

impl fmt::Display for BaseCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseCurrency {
    type Err = CmeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usd" => Ok(BaseCurrency::Usd),
            "eur" => Ok(BaseCurrency::Eur),
            _ => Err(CmeError::UnsupportedCurrency(s.to_string())),
        }
    }
}

/// Natural denomination of an asset class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCurrency {
    /// Always held in the base currency (cash, hedged or base-switched sleeves)
    Base,
    Fixed(Currency),
}

pub fn local_currency(asset: AssetClass) -> LocalCurrency {
    match asset {
        AssetClass::Liquidity => LocalCurrency::Base,
        AssetClass::BondsGlobal => LocalCurrency::Fixed(Currency::Usd),
        AssetClass::BondsHy => LocalCurrency::Fixed(Currency::Usd),
        AssetClass::BondsEm => LocalCurrency::Fixed(Currency::Usd),
        AssetClass::BondsInflationLinked => LocalCurrency::Base,
        AssetClass::EquityUs => LocalCurrency::Fixed(Currency::Usd),
        AssetClass::EquityEurope => LocalCurrency::Fixed(Currency::Eur),
        AssetClass::EquityJapan => LocalCurrency::Fixed(Currency::Jpy),
        AssetClass::EquityEm => LocalCurrency::Fixed(Currency::Em),
        AssetClass::AbsoluteReturn => LocalCurrency::Base,
    }
}

/// Foreign currency an asset is exposed to for this base, if any
pub fn fx_exposure(asset: AssetClass, base: BaseCurrency) -> Option<Currency> {
    match local_currency(asset) {
        LocalCurrency::Base => None,
        LocalCurrency::Fixed(currency) if currency == base.currency() => None,
        LocalCurrency::Fixed(currency) => Some(currency),
    }
}

/// Short rate and inflation forecast of one currency area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyMacro {
    pub tbill: f64,
    pub inflation: f64,
}

/// Expected annual move of a foreign currency against the base
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxForecast {
    pub currency: Currency,
    pub rate_differential: f64,
    pub inflation_differential: f64,
    pub fx_change: f64,
}

pub fn fx_forecast(currency: Currency, home: CurrencyMacro, foreign: CurrencyMacro, params: &FxParams) -> FxForecast {
    let rate_differential = home.tbill - foreign.tbill;
    let inflation_differential = home.inflation - foreign.inflation;
    FxForecast {
        currency,
        rate_differential,
        inflation_differential,
        fx_change: params.rate_weight * rate_differential
            + params.inflation_weight * inflation_differential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fx_change_formula() {
        let home = CurrencyMacro { tbill: 0.0241, inflation: 0.0206 };
        let foreign = CurrencyMacro { tbill: 0.0354, inflation: 0.0229 };
        let f = fx_forecast(Currency::Usd, home, foreign, &FxParams::default());
        assert_abs_diff_eq!(f.fx_change, 0.3 * -0.0113 + 0.7 * -0.0023, epsilon = 1e-12);
        assert!(f.fx_change < 0.0);
    }

    #[test]
    fn test_same_currency_has_no_fx() {
        let m = CurrencyMacro { tbill: 0.03, inflation: 0.02 };
        let f = fx_forecast(Currency::Usd, m, m, &FxParams::default());
        assert_eq!(f.fx_change, 0.0);
    }

    #[test]
    fn test_exposure_table_usd_base() {
        let base = BaseCurrency::Usd;
        assert_eq!(fx_exposure(AssetClass::Liquidity, base), None);
        assert_eq!(fx_exposure(AssetClass::BondsHy, base), None);
        assert_eq!(fx_exposure(AssetClass::EquityUs, base), None);
        assert_eq!(fx_exposure(AssetClass::EquityEurope, base), Some(Currency::Eur));
        assert_eq!(fx_exposure(AssetClass::EquityJapan, base), Some(Currency::Jpy));
        assert_eq!(fx_exposure(AssetClass::EquityEm, base), Some(Currency::Em));
        assert_eq!(fx_exposure(AssetClass::AbsoluteReturn, base), None);
    }

    #[test]
    fn test_exposure_table_eur_base() {
        let base = BaseCurrency::Eur;
        assert_eq!(fx_exposure(AssetClass::Liquidity, base), None);
        assert_eq!(fx_exposure(AssetClass::BondsGlobal, base), Some(Currency::Usd));
        assert_eq!(fx_exposure(AssetClass::BondsEm, base), Some(Currency::Usd));
        assert_eq!(fx_exposure(AssetClass::BondsInflationLinked, base), None);
        assert_eq!(fx_exposure(AssetClass::EquityUs, base), Some(Currency::Usd));
        assert_eq!(fx_exposure(AssetClass::EquityEurope, base), None);
        assert_eq!(fx_exposure(AssetClass::AbsoluteReturn, base), None);
    }

    #[test]
    fn test_parse_base_currency() {
        assert_eq!("EUR".parse::<BaseCurrency>().unwrap(), BaseCurrency::Eur);
        assert!(matches!("gbp".parse::<BaseCurrency>(), Err(CmeError::UnsupportedCurrency(_))));
    }
}
