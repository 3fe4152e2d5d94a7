//! Pure return models. Each is a closed-form function of an input snapshot.

pub mod alternatives;
pub mod bonds;
pub mod equity;
pub mod fx;
pub mod macro_forecast;

pub use alternatives::{alternatives_return, AlternativesReturn, FactorPremiumSet};
pub use bonds::{bond_return, inflation_linked_return, BondKind, BondReturn, InflationLinkedReturn};
pub use equity::{equity_return, EquityEnvironment, EquityModelKind, EquityReturn};
pub use fx::{fx_exposure, fx_forecast, BaseCurrency, Currency, FxForecast};
pub use macro_forecast::{forecast, MacroForecast, MacroIntermediate};
