//! CME Engine - Capital market expectations for a multi-asset portfolio
//!
//! This library provides:
//! - Building-block macro forecasts (growth, inflation, t-bill) per region
//! - Expected returns for bonds, inflation-linked bonds, equities and absolute return
//! - Two equity strategies (RA valuation reversion, Grinold-Kroner)
//! - FX translation for USD and EUR investors
//! - Override reconciliation that never discards an explicit user choice
//! - Scenario comparison against the all-defaults baseline

pub mod config;
pub mod engine;
pub mod error;
pub mod inputs;
pub mod models;
pub mod reconcile;
pub mod scenario;
pub mod session;

// Re-export commonly used types
pub use config::ModelConfig;
pub use engine::{CalculateResponse, CmeEngine, ComputeRequest, InputSource, ScenarioComparison};
pub use error::{CmeError, Result};
pub use inputs::{AllInputs, AssetClass, AssetField, FieldKey, MacroField, Overrides, Region};
pub use models::{BaseCurrency, EquityModelKind};
pub use reconcile::InputState;
pub use scenario::{InMemoryScenarioStore, ScenarioRecord, ScenarioRunner, ScenarioStore};
pub use session::{CmeSession, ComputeStatus};
