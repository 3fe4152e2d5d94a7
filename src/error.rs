//! Error types for the CME engine

use thiserror::Error;

use crate::inputs::{AssetClass, AssetField};

/// Errors raised at the engine's boundaries.
///
/// The return models themselves never fail: degenerate inputs resolve to a
/// zero component. Errors only come from malformed payloads, unknown tags and
/// I/O while loading defaults or configuration.
#[derive(Debug, Error)]
pub enum CmeError {
    #[error("non-finite value {value} rejected for {field}")]
    NonFiniteValue { field: String, value: f64 },

    #[error("field {field} does not apply to {asset}")]
    FieldNotApplicable { asset: AssetClass, field: AssetField },

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("unknown asset class: {0}")]
    UnknownAssetClass(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unsupported base currency: {0}")]
    UnsupportedCurrency(String),

    #[error("unknown equity model: {0}")]
    UnknownEquityModel(String),

    #[error("invalid override payload: {0}")]
    InvalidOverrides(String),

    #[error("too many scenarios to compare: {requested} (max {max})")]
    TooManyScenarios { requested: usize, max: usize },

    #[error("defaults table error: {0}")]
    Defaults(String),

    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("background job failed: {0}")]
    JobFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CmeError>;
