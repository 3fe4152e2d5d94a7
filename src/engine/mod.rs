//! Compute engine
//!
//! Takes the active defaults plus a sparse override payload and returns the
//! expected return of every asset class, with components, the inputs used and
//! the macro values each result depends on.

mod orchestrator;
mod resolve;
mod results;

pub use orchestrator::{CmeEngine, ComputeRequest, BASELINE_SCENARIO_NAME};
pub use resolve::{resolve_macro, ResolvedMacro, ResolvedRegion};
pub use results::{
    AssetResult, CalculateResponse, InputSource, MacroDependency, MacroSources, MacroSummary,
    ScenarioComparison, TrackedValue,
};
