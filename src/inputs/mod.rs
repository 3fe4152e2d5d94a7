//! Input catalogue, default tables and override payloads

mod data;
mod defaults;
mod fields;
pub mod loader;
mod overrides;

pub use data::{
    AllInputs, AlternativesInputs, BondInputs, BuildingBlocks, EquityInputs, FactorBetas,
    GkEquityInputs, InflationLinkedInputs, MacroInputs, RaEquityInputs, RealYieldRegime, RegionMap,
};
pub use fields::{
    AssetClass, AssetField, EquityRegion, FieldKey, FieldUnit, MacroField, Region,
    DISPLAY_TOLERANCE,
};
pub use loader::{load_defaults_or_fallback, CsvDefaults, DefaultsProvider, FallbackDefaults};
pub use overrides::Overrides;
