//! Scenario runner and saved-scenario store
//!
//! The runner holds one engine (defaults plus calibration) and computes any
//! number of requests against it without reloading the default table.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::{CalculateResponse, CmeEngine, ComputeRequest, ScenarioComparison};
use crate::error::{CmeError, Result};
use crate::inputs::{AllInputs, Overrides};
use crate::models::{BaseCurrency, EquityModelKind};

/// Most scenarios a single comparison may hold
pub const MAX_COMPARE_SCENARIOS: usize = 5;

/// Pre-loaded runner for batch scenario computation
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let responses = runner.compare(&[bull, base, bear])?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: CmeEngine,
}

impl ScenarioRunner {
    /// Runner over the hardcoded defaults and default calibration
    pub fn new() -> Self {
        Self {
            engine: CmeEngine::default(),
        }
    }

    pub fn with_engine(engine: CmeEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &CmeEngine {
        &self.engine
    }

    pub fn defaults(&self) -> &AllInputs {
        self.engine.defaults()
    }

    pub fn run(&self, request: &ComputeRequest) -> Result<CalculateResponse> {
        self.engine.compute(request)
    }

    pub fn run_with_baseline(&self, request: &ComputeRequest) -> Result<ScenarioComparison> {
        self.engine.compute_with_baseline(request)
    }

    /// Compute up to [`MAX_COMPARE_SCENARIOS`] requests in parallel, in input order
    pub fn compare(&self, requests: &[ComputeRequest]) -> Result<Vec<CalculateResponse>> {
        if requests.len() > MAX_COMPARE_SCENARIOS {
            return Err(CmeError::TooManyScenarios {
                requested: requests.len(),
                max: MAX_COMPARE_SCENARIOS,
            });
        }
        info!("Comparing {} scenarios", requests.len());
        requests.par_iter().map(|r| self.engine.compute(r)).collect()
    }

    /// Compute a saved scenario
    pub fn run_record(&self, record: &ScenarioRecord, equity_model: EquityModelKind) -> Result<CalculateResponse> {
        self.run(&record.to_request(equity_model))
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// A named, persisted override set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub name: String,
    pub overrides: Overrides,
    #[serde(default)]
    pub base_currency: BaseCurrency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScenarioRecord {
    pub fn new(name: impl Into<String>, overrides: Overrides, base_currency: BaseCurrency) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            overrides,
            base_currency,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_request(&self, equity_model: EquityModelKind) -> ComputeRequest {
        ComputeRequest::new(self.name.clone())
            .with_overrides(self.overrides.clone())
            .with_base_currency(self.base_currency)
            .with_equity_model(equity_model)
    }
}

/// Persistence seam for saved scenarios
pub trait ScenarioStore {
    /// Insert or replace by name. A replaced record keeps its creation time.
    fn save(&mut self, record: ScenarioRecord) -> Result<()>;
    fn load(&self, name: &str) -> Result<ScenarioRecord>;
    /// Saved scenarios ordered by name
    fn list(&self) -> Vec<ScenarioRecord>;
    fn delete(&mut self, name: &str) -> Result<ScenarioRecord>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryScenarioStore {
    records: BTreeMap<String, ScenarioRecord>,
}

impl InMemoryScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScenarioStore for InMemoryScenarioStore {
    fn save(&mut self, mut record: ScenarioRecord) -> Result<()> {
        if let Some(existing) = self.records.get(&record.name) {
            record.created_at = existing.created_at;
            record.updated_at = Utc::now();
        }
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<ScenarioRecord> {
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| CmeError::ScenarioNotFound(name.to_string()))
    }

    fn list(&self) -> Vec<ScenarioRecord> {
        self.records.values().cloned().collect()
    }

    fn delete(&mut self, name: &str) -> Result<ScenarioRecord> {
        self.records
            .remove(name)
            .ok_or_else(|| CmeError::ScenarioNotFound(name.to_string()))
    }
}
