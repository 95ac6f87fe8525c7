//! The four dashboard graphs: employee growth, payroll trend, department
//! performance and attendance distribution.

use crate::adapters::http::FetchResult;
use crate::core::context::ProbeContext;
use crate::core::shapes::{is_non_negative_integer, non_empty_str, unwrap_list};
use crate::core::{Check, Verdict};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use async_trait::async_trait;
use serde_json::Value;

pub const EMPLOYEE_GROWTH_PATH: &str = "/v1/reports/employee-growth";
pub const PAYROLL_SUMMARY_PATH: &str = "/v1/reports/payroll-summary";
pub const DEPARTMENT_PERFORMANCE_PATH: &str = "/v1/reports/department-performance";
pub const ATTENDANCE_ANALYTICS_PATH: &str = "/v1/reports/attendance-analytics";

const GRAPH_WORKERS: usize = 4;

pub struct ReportGraphs;

#[async_trait]
impl Check for ReportGraphs {
    fn id(&self) -> &'static str {
        "report-graphs"
    }

    fn title(&self) -> &'static str {
        "Report graphs return complete trend data"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let paths: Vec<String> = [
            EMPLOYEE_GROWTH_PATH,
            PAYROLL_SUMMARY_PATH,
            DEPARTMENT_PERFORMANCE_PATH,
            ATTENDANCE_ANALYTICS_PATH,
        ]
        .iter()
        .map(|p| p.to_string())
        .collect();

        let results = ctx.api.fetch_parallel(&paths, GRAPH_WORKERS).await;
        let [growth, payroll, departments, attendance] = results.as_slice() else {
            return Err(ProbeError::assertion("Expected one result per graph endpoint"));
        };

        let months = ctx.settings.thresholds.trend_months;
        check_employee_growth(payload(growth)?, months)?;
        check_payroll_summary(payload(payroll)?, months)?;
        check_department_performance(payload(departments)?, ctx.settings.thresholds.max_departments)?;
        check_attendance_distribution(payload(attendance)?)?;

        Ok(Verdict::Passed)
    }
}

fn payload(result: &FetchResult) -> Result<&Value> {
    result
        .payload
        .as_ref()
        .map_err(|e| ProbeError::assertion(format!("Request for {} failed: {}", result.path, e)))
}

pub fn check_employee_growth(value: &Value, months: usize) -> Result<()> {
    let points = unwrap_list(value).ok_or_else(|| ProbeError::assertion("Employee growth data not found in response"))?;
    verify!(
        points.len() == months,
        "Employee growth trend should have exactly {} months of data, got {}",
        months,
        points.len()
    );

    for point in points {
        verify!(
            point.get("month").map(Value::is_string).unwrap_or(false),
            "Each employee growth point must have a 'month' string: {}",
            point
        );
        verify!(
            point.get("employeeCount").map(Value::is_number).unwrap_or(false),
            "'employeeCount' must be a number: {}",
            point
        );
    }
    Ok(())
}

pub fn check_payroll_summary(value: &Value, months: usize) -> Result<()> {
    verify!(value.is_object(), "Payroll summary data must be an object");

    let series = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| ProbeError::assertion(format!("Payroll summary must include a '{}' list", key)))
    };
    let gross = series("grossTotals")?;
    let net = series("netTotals")?;

    verify!(
        gross.len() == months && net.len() == months,
        "Payroll trend should have {} months for gross and net, got {} and {}",
        months,
        gross.len(),
        net.len()
    );

    for (g, n) in gross.iter().zip(net) {
        let month = g
            .get("month")
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::assertion(format!("Gross data point must have a 'month' string: {}", g)))?;
        verify!(
            g.get("amount").map(Value::is_number).unwrap_or(false),
            "Gross amount must be a number for {}",
            month
        );
        verify!(
            n.get("month").and_then(Value::as_str) == Some(month),
            "Months must match in gross and net: {} vs {}",
            month,
            n.get("month").unwrap_or(&Value::Null)
        );
        verify!(
            n.get("amount").map(Value::is_number).unwrap_or(false),
            "Net amount must be a number for {}",
            month
        );
    }
    Ok(())
}

pub fn check_department_performance(value: &Value, max_departments: usize) -> Result<()> {
    let departments = value
        .as_array()
        .ok_or_else(|| ProbeError::assertion("Department performance data must be a list"))?;
    verify!(
        (1..=max_departments).contains(&departments.len()),
        "Department performance should have 1 to {} departments, got {}",
        max_departments,
        departments.len()
    );

    for department in departments {
        verify!(
            department.get("departmentName").map(Value::is_string).unwrap_or(false),
            "Each department must have a 'departmentName' string: {}",
            department
        );
        verify!(
            department.get("score").map(Value::is_number).unwrap_or(false),
            "Each department must have a numeric score: {}",
            department
        );
    }
    Ok(())
}

/// 出勤分布可以是 `{status: count}` 物件，也可以是 `[{status, count}]` 清單
pub fn check_attendance_distribution(value: &Value) -> Result<()> {
    match value {
        Value::Object(obj) => {
            verify!(!obj.is_empty(), "Attendance distribution data must not be empty");
            for (status, count) in obj {
                verify!(!status.trim().is_empty(), "Attendance status must be a non-empty string");
                verify!(
                    is_non_negative_integer(count),
                    "Attendance count for '{}' must be a non-negative integer, got {}",
                    status,
                    count
                );
            }
        }
        Value::Array(entries) => {
            verify!(!entries.is_empty(), "Attendance distribution data must not be empty");
            for entry in entries {
                verify!(
                    non_empty_str(entry.get("status")).is_some(),
                    "Each attendance entry must have a status: {}",
                    entry
                );
                verify!(
                    entry.get("count").map(is_non_negative_integer).unwrap_or(false),
                    "Each attendance count must be a non-negative integer: {}",
                    entry
                );
            }
        }
        other => {
            return Err(ProbeError::assertion(format!(
                "Attendance data must be an object or list, got {}",
                crate::core::shapes::type_name(other)
            )))
        }
    }
    Ok(())
}
