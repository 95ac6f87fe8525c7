//! Probes the service's own error contract: error responses carry a
//! readable `error`/`message` and never leak stack traces.

use super::OVERVIEW_PATH;
use crate::adapters::http::ApiResponse;
use crate::core::context::ProbeContext;
use crate::core::{Check, Verdict};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use async_trait::async_trait;
use serde_json::Value;

pub const ERROR_PROBES: [&str; 8] = [
    OVERVIEW_PATH,
    "/v1/analytics/attendance",
    "/v1/analytics/payroll",
    "/v1/reports/department-performance",
    "/v1/reports/employee-growth",
    "/v1/nonexistent/endpoint",
    "/v1/profile/invalid-user-id",
    "/v1/attendance/summary?month=invalid-date",
];

const ERROR_LEAK_KEYS: [&str; 2] = ["stack", "trace"];
const SUCCESS_LEAK_KEYS: [&str; 4] = ["stack", "trace", "error_trace", "exception"];

pub struct ErrorHandling;

#[async_trait]
impl Check for ErrorHandling {
    fn id(&self) -> &'static str {
        "error-handling"
    }

    fn title(&self) -> &'static str {
        "Error responses are structured and leak no internals"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        for path in ERROR_PROBES {
            let response = ctx.api.get(path).await?;
            tracing::debug!("🔎 {} -> {}", path, response.status);
            check_response(&response)?;
        }
        Ok(Verdict::Passed)
    }
}

/// 依狀態碼檢查單一回應
pub fn check_response(response: &ApiResponse) -> Result<()> {
    let status = response.status;
    let body: Value = response.json().map_err(|_| {
        ProbeError::assertion(format!(
            "{} response from {} did not return valid JSON",
            status, response.url
        ))
    })?;

    if status >= 400 {
        verify!(
            body.get("error").is_some() || body.get("message").is_some(),
            "{} error response from {} is missing an error message",
            status,
            response.url
        );
        if let Some(key) = ERROR_LEAK_KEYS.iter().find(|k| body.get(**k).is_some()) {
            return Err(ProbeError::assertion(format!(
                "{} error response from {} exposes internal field '{}'",
                status, response.url, key
            )));
        }
        return Ok(());
    }

    if let Some(key) = SUCCESS_LEAK_KEYS.iter().find(|k| body.get(**k).is_some()) {
        return Err(ProbeError::assertion(format!(
            "Response from {} contains raw error key '{}'",
            response.url, key
        )));
    }
    if let Some(error) = body.get("error") {
        verify!(
            error.is_string() || error.is_object() || error.is_null(),
            "'error' in response from {} should be a string, object or null",
            response.url
        );
    }
    if let Some(message) = body.get("message") {
        verify!(
            message.is_string() || message.is_null(),
            "'message' in response from {} should be a string or null",
            response.url
        );
    }
    Ok(())
}
