//! Boundary state for one interactive user

use std::future::Future;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;

use super::debounce::Debouncer;
use crate::engine::{CmeEngine, ComputeRequest, ScenarioComparison};
use crate::error::{CmeError, Result};
use crate::inputs::{AllInputs, MacroField, Region};
use crate::models::{BaseCurrency, EquityModelKind, MacroForecast};
use crate::reconcile::InputState;
use crate::scenario::ScenarioRecord;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum ComputeStatus {
    #[default]
    Idle,
    /// Last compute succeeded; `last_result` matches it
    Fresh,
    /// Last compute failed; `last_result` is from an earlier success
    Failed(String),
}

/// Owns the reconciliation state plus the presentation choices of one
/// session, and the last good comparison.
#[derive(Debug)]
pub struct CmeSession {
    engine: Arc<CmeEngine>,
    state: InputState,
    base_currency: BaseCurrency,
    equity_model: EquityModelKind,
    scenario_name: String,
    last_result: Option<ScenarioComparison>,
    status: ComputeStatus,
    preview_debounce: Debouncer,
    compute_debounce: Debouncer,
}

/// Fold a blocking-thread failure into the job's own error channel
fn job_outcome<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    joined.map_err(|e| CmeError::JobFailed(e.to_string()))?
}

impl CmeSession {
    pub fn new(engine: CmeEngine) -> Self {
        let state = InputState::new(engine.defaults().clone(), engine.config().macro_params.clone());
        Self {
            engine: Arc::new(engine),
            state,
            base_currency: BaseCurrency::default(),
            equity_model: EquityModelKind::default(),
            scenario_name: ComputeRequest::default().scenario_name,
            last_result: None,
            status: ComputeStatus::Idle,
            preview_debounce: Debouncer::preview(),
            compute_debounce: Debouncer::compute(),
        }
    }

    pub fn engine(&self) -> &CmeEngine {
        &self.engine
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut InputState {
        &mut self.state
    }

    pub fn base_currency(&self) -> BaseCurrency {
        self.base_currency
    }

    pub fn set_base_currency(&mut self, base_currency: BaseCurrency) {
        self.base_currency = base_currency;
    }

    pub fn equity_model(&self) -> EquityModelKind {
        self.equity_model
    }

    pub fn set_equity_model(&mut self, equity_model: EquityModelKind) {
        self.equity_model = equity_model;
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub fn set_scenario_name(&mut self, name: impl Into<String>) {
        self.scenario_name = name.into();
    }

    pub fn status(&self) -> &ComputeStatus {
        &self.status
    }

    pub fn last_result(&self) -> Option<&ScenarioComparison> {
        self.last_result.as_ref()
    }

    /// Snapshot of the current edits as a compute request
    pub fn compute_request(&self) -> ComputeRequest {
        let overrides = self.state.get_overrides();
        let request = ComputeRequest::new(self.scenario_name.clone())
            .with_base_currency(self.base_currency)
            .with_equity_model(self.equity_model);
        if overrides.is_empty() {
            request
        } else {
            request.with_overrides(overrides)
        }
    }

    /// Record a compute outcome. Failure keeps the previous result.
    pub fn apply_compute(&mut self, outcome: Result<ScenarioComparison>) -> &ComputeStatus {
        match outcome {
            Ok(comparison) => {
                self.last_result = Some(comparison);
                self.status = ComputeStatus::Fresh;
            }
            Err(e) => {
                warn!("Compute for '{}' failed: {}", self.scenario_name, e);
                self.status = ComputeStatus::Failed(e.to_string());
            }
        }
        &self.status
    }

    pub fn compute_now(&mut self) -> &ComputeStatus {
        let outcome = self.engine.compute_with_baseline(&self.compute_request());
        self.apply_compute(outcome)
    }

    /// Debounced compute of the current snapshot. Resolves to `None` when a
    /// later call superseded it; feed `Some` into [`Self::apply_compute`].
    /// A panicked compute arrives as [`CmeError::JobFailed`].
    pub fn debounced_compute(&self) -> impl Future<Output = Option<Result<ScenarioComparison>>> + Send + 'static {
        let request = self.compute_request();
        let engine = Arc::clone(&self.engine);
        let pending = self
            .compute_debounce
            .schedule(move || engine.compute_with_baseline(&request));
        async move { pending.await.map(job_outcome) }
    }

    /// Debounced macro preview for one region's current building blocks
    pub fn debounced_preview(
        &self,
        region: Region,
    ) -> impl Future<Output = Option<Result<MacroForecast>>> + Send + 'static {
        let blocks = self.state.building_blocks(region);
        let engine = Arc::clone(&self.engine);
        let pending = self
            .preview_debounce
            .schedule(move || Ok::<_, CmeError>(engine.preview_macro(region, &blocks)));
        async move { pending.await.map(job_outcome) }
    }

    fn cancel_pending(&self) {
        self.preview_debounce.cancel();
        self.compute_debounce.cancel();
    }

    /// Push a preview into the direct fields that are not overridden
    pub fn apply_preview(&mut self, forecast: &MacroForecast) -> Vec<MacroField> {
        self.state.sync_forecast(forecast)
    }

    pub fn preview_now(&mut self, region: Region) -> Vec<MacroField> {
        let forecast = self.state.preview(region);
        self.apply_preview(&forecast)
    }

    /// Load a saved scenario over the current state. Pending debounced work
    /// was built from the old edits and is dropped.
    pub fn load_scenario(&mut self, record: &ScenarioRecord) -> usize {
        self.cancel_pending();
        let applied = self.state.load_scenario(&record.overrides);
        self.base_currency = record.base_currency;
        self.scenario_name = record.name.clone();
        info!("Loaded scenario '{}' ({} fields)", record.name, applied);
        applied
    }

    /// Current edits as a record ready for a scenario store
    pub fn to_record(&self) -> ScenarioRecord {
        ScenarioRecord::new(self.scenario_name.clone(), self.state.get_overrides(), self.base_currency)
    }

    /// Swap in a new default table; all edits and pending work are dropped
    pub fn refresh_defaults(&mut self, defaults: AllInputs) {
        self.cancel_pending();
        let config = self.engine.config().clone();
        self.engine = Arc::new(CmeEngine::new(defaults.clone(), config));
        self.state.refresh_defaults(defaults);
    }

    pub fn reset(&mut self) {
        self.state.reset_to_defaults();
        self.cancel_pending();
    }
}

impl Default for CmeSession {
    fn default() -> Self {
        Self::new(CmeEngine::default())
    }
}
