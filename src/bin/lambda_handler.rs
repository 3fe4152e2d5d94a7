//! AWS Lambda handler for capital market expectations
//!
//! Routes (Lambda Function URL / API Gateway v2 events):
//! - `POST /calculate/full`: scenario plus all-defaults baseline
//! - `POST /calculate/macro-preview`: macro forecast for partial building blocks
//! - `POST /calculate/compare`: up to five scenarios side by side
//! - `GET /defaults`: active default table and calibration

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use aws_lambda_events::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use aws_lambda_events::encodings::Body;
use cme_engine::engine::{CmeEngine, ComputeRequest};
use cme_engine::inputs::{load_defaults_or_fallback, CsvDefaults, MacroField, Region};
use cme_engine::{CmeError, ModelConfig, ScenarioRunner};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Macro preview request; building block values in model units
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub region: Region,
    #[serde(default)]
    pub building_blocks: BTreeMap<MacroField, f64>,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub scenarios: Vec<ComputeRequest>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn status_for(error: &CmeError) -> i64 {
    match error {
        CmeError::Io(_) | CmeError::Csv(_) | CmeError::Defaults(_) | CmeError::JobFailed(_) => 500,
        _ => 400,
    }
}

fn response(status_code: i64, body: String) -> Result<ApiGatewayV2httpResponse, Error> {
    let mut response = ApiGatewayV2httpResponse {
        status_code,
        body: Some(Body::Text(body)),
        ..Default::default()
    };
    response.headers.insert("content-type", "application/json".parse()?);
    response.headers.insert("access-control-allow-origin", "*".parse()?);
    response
        .headers
        .insert("access-control-allow-methods", "GET, POST, OPTIONS".parse()?);
    response
        .headers
        .insert("access-control-allow-headers", "Content-Type".parse()?);
    Ok(response)
}

fn error_response(status: i64, message: &str) -> Result<ApiGatewayV2httpResponse, Error> {
    let body = serde_json::to_string(&ErrorBody { error: message })?;
    response(status, body)
}

fn json_response<T: Serialize>(body: &T) -> Result<ApiGatewayV2httpResponse, Error> {
    response(200, serde_json::to_string(body)?)
}

fn cme_error_response(error: CmeError) -> Result<ApiGatewayV2httpResponse, Error> {
    warn!("Request failed: {}", error);
    error_response(status_for(&error), &error.to_string())
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, String> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| format!("Invalid JSON: {}", e))
}

async fn handler(
    runner: &ScenarioRunner,
    event: LambdaEvent<ApiGatewayV2httpRequest>,
) -> Result<ApiGatewayV2httpResponse, Error> {
    let start = Instant::now();
    let request = event.payload;
    let method = request.request_context.http.method.as_str().to_string();

    // CORS preflight
    if method == "OPTIONS" {
        return response(200, String::new());
    }
    if request.is_base64_encoded {
        return error_response(400, "base64-encoded bodies are not supported");
    }

    let path = request.raw_path.as_deref().unwrap_or("/");
    let body = request.body.as_deref().unwrap_or("");
    info!("{} {}", method, path);

    let result = match (method.as_str(), path) {
        ("POST", "/calculate/full") => match parse_body::<ComputeRequest>(body) {
            Ok(compute) => match runner.run_with_baseline(&compute) {
                Ok(comparison) => json_response(&comparison),
                Err(e) => cme_error_response(e),
            },
            Err(message) => error_response(400, &message),
        },
        ("POST", "/calculate/macro-preview") => match parse_body::<PreviewRequest>(body) {
            Ok(preview) => match runner.engine().preview_partial(preview.region, &preview.building_blocks) {
                Ok(forecast) => json_response(&forecast),
                Err(e) => cme_error_response(e),
            },
            Err(message) => error_response(400, &message),
        },
        ("POST", "/calculate/compare") => match parse_body::<CompareRequest>(body) {
            Ok(compare) => match runner.compare(&compare.scenarios) {
                Ok(responses) => json_response(&responses),
                Err(e) => cme_error_response(e),
            },
            Err(message) => error_response(400, &message),
        },
        ("GET", "/defaults") => json_response(&serde_json::json!({
            "defaults": runner.defaults(),
            "config": runner.engine().config(),
        })),
        _ => error_response(404, &format!("No route for {} {}", method, path)),
    };

    info!("{} {} handled in {:?}", method, path, start.elapsed());
    result
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let defaults = load_defaults_or_fallback(&CsvDefaults::default());
    let config = match std::env::var("CME_CONFIG_PATH") {
        Ok(path) => ModelConfig::from_json_path(std::path::Path::new(&path))?,
        Err(_) => ModelConfig::default(),
    };
    let runner = Arc::new(ScenarioRunner::with_engine(CmeEngine::new(defaults, config)));

    run(service_fn(move |event| {
        let runner = Arc::clone(&runner);
        async move { handler(&runner, event).await }
    }))
    .await
}
