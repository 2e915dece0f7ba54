use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{LooseNumber, UsageRecord};

/// Decoded report payload.
#[derive(Debug, Default, Deserialize)]
pub struct Report {
    pub results: Option<Vec<UsageRecord>>,
    /// Backend-side sum of all costs, when the backend computes one.
    #[serde(default)]
    pub total_monthly: LooseNumber,
    pub error: Option<Value>,
}

pub fn fetch_report_body(endpoint: &str) -> Result<String> {
    let body = ureq::get(endpoint).call()?.body_mut().read_to_string()?;
    Ok(body)
}

/// Decode a report body.
///
/// Accepts the report object itself, a JSON string holding it, or an API
/// gateway envelope whose `body` field is that JSON string. Only one level of
/// string decoding is attempted.
pub fn parse_report(body: &str) -> Result<Report> {
    let value: Value = serde_json::from_str(body).context("Response body is not JSON")?;

    let embedded = match &value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("body").and_then(Value::as_str).map(str::to_owned),
        _ => None,
    };
    let value = match embedded {
        Some(inner) => {
            serde_json::from_str(&inner).context("Embedded report body is not JSON")?
        }
        None => value,
    };

    serde_json::from_value(value).context("Unexpected report shape")
}

/// Unwrap the records from a decoded report, logging anything odd.
pub fn into_records(report: Report) -> Vec<UsageRecord> {
    if let Some(err) = &report.error {
        tracing::warn!("Report endpoint returned an error: {err}");
    }

    let Some(records) = report.results else {
        tracing::warn!("Report has no `results` field; continuing with no records");
        return Vec::new();
    };

    if let Some(expected) = report.total_monthly.value() {
        let local: f64 = records.iter().map(|r| r.cost.or_zero()).sum();
        tracing::debug!(expected, local, "Backend total vs. local sum");
    }

    records
}

/// Single best-effort fetch. Failures are logged and yield no records.
pub fn fetch_records(endpoint: &str) -> Vec<UsageRecord> {
    let report = fetch_report_body(endpoint)
        .with_context(|| format!("GET {endpoint} failed"))
        .and_then(|body| parse_report(&body));

    match report {
        Ok(report) => into_records(report),
        Err(e) => {
            tracing::error!("Failed to load usage report: {e:#}");
            Vec::new()
        }
    }
}
