//! AWS Lambda handler for IPI calculations
//!
//! Accepts both registers as CSV text plus the threshold and CIN in a JSON
//! request, and returns the JSON report. Every invocation runs one isolated
//! calculation; nothing is shared between requests.

use ipi_loss_component::calculation::{CalculationConfig, IpiEngine, DEFAULT_CIN, DEFAULT_THRESHOLD};
use ipi_loss_component::register::{load_loss_register_from_reader, load_recovery_register_from_reader};
use ipi_loss_component::{IpiResult, Report};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Input for one calculation
#[derive(Debug, Deserialize)]
pub struct IpiRequest {
    /// Loss register (RERO_PERDIDA) as CSV text
    pub losses_csv: String,

    /// Recoveries register (RERO_RECUPERADO) as CSV text
    #[serde(default)]
    pub recoveries_csv: Option<String>,

    /// Monetary threshold (default: 27,470,842.66)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Capital indicator (default: 13,946,774,132.33)
    #[serde(default = "default_cin")]
    pub cin: f64,

    /// Reporting period label (YYYY-MM)
    #[serde(default)]
    pub period: Option<String>,
}

fn default_threshold() -> f64 { DEFAULT_THRESHOLD }
fn default_cin() -> f64 { DEFAULT_CIN }

/// Output of one calculation
#[derive(Debug, Serialize)]
pub struct IpiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<serde_json::Value>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn calculate(request: &IpiRequest) -> IpiResult<serde_json::Value> {
    let losses = load_loss_register_from_reader(request.losses_csv.as_bytes())?;
    // Absent register means no recoveries at all
    let recoveries = match &request.recoveries_csv {
        Some(csv) => load_recovery_register_from_reader(csv.as_bytes())?,
        None => Vec::new(),
    };

    let engine = IpiEngine::new(CalculationConfig::new(request.threshold, request.cin));
    let result = engine.calculate(&losses, &recoveries);

    Ok(serde_json::to_value(Report::new(&result, request.period.as_deref()))?)
}

/// Lambda handler function
async fn handler(event: LambdaEvent<IpiRequest>) -> Result<IpiResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    let (report, error) = match calculate(&request) {
        Ok(report) => (Some(report), None),
        Err(e) => {
            warn!("Calculation rejected: {}", e);
            (None, Some(e.to_string()))
        }
    };

    let execution_time_ms = start.elapsed().as_millis() as u64;
    info!("Request handled in {} ms", execution_time_ms);

    Ok(IpiResponse {
        report,
        execution_time_ms,
        error,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
