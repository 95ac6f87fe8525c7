//! Every dashboard widget has data behind it and the admin page carries
//! basic accessibility markup.

use super::{expect_object, DASHBOARD_PAGE_PATH, OVERVIEW_PATH};
use crate::adapters::http::FetchResult;
use crate::core::context::ProbeContext;
use crate::core::shapes::{has_numeric_values, type_name, unwrap_list};
use crate::core::{Check, Verdict};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use async_trait::async_trait;
use serde_json::Value;

const WIDGET_SOURCES: [&str; 8] = [
    OVERVIEW_PATH,
    "/v1/reports/employee-growth",
    "/v1/reports/payroll-summary",
    "/v1/reports/department-performance",
    "/v1/analytics/attendance",
    "/v1/profile",
    "/v1/reports/leave-utilization",
    "/v1/reports/company-overview",
];

const NAME_KEYS: [&str; 3] = ["name", "fullName", "firstName"];
const DEPARTMENT_KEYS: [&str; 3] = ["department", "departmentId", "dept"];
const SUMMARY_KEYS: [&str; 4] = ["attritionRate", "newJoinees", "leavesUtilizedPercent", "averageDeductions"];

pub struct DashboardAccessibility;

#[async_trait]
impl Check for DashboardAccessibility {
    fn id(&self) -> &'static str {
        "dashboard-accessibility"
    }

    fn title(&self) -> &'static str {
        "Dashboard widgets have data and the page is accessible"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let paths: Vec<String> = WIDGET_SOURCES.iter().map(|p| p.to_string()).collect();
        let results = ctx.api.fetch_parallel(&paths, ctx.settings.workers).await;
        let payloads = results.iter().map(payload).collect::<Result<Vec<&Value>>>()?;

        let [kpis, growth, payroll, departments, attendance, profiles, leave, company] = payloads.as_slice() else {
            return Err(ProbeError::assertion("Expected one result per dashboard widget"));
        };

        check_kpis(kpis)?;
        check_non_empty(growth, "Employee growth")?;
        check_container(payroll, "Payroll summary")?;
        check_non_empty(departments, "Department performance")?;
        verify!(has_numeric_values(attendance), "Attendance distribution numbers missing");
        check_profiles(profiles, ctx.settings.thresholds.min_profiles)?;
        check_container(leave, "Leave utilization")?;
        check_company_keys(company)?;

        let page = ctx.frontend.get(DASHBOARD_PAGE_PATH).await?;
        if !page.is_success() {
            return Err(page.into_status_error());
        }
        check_accessibility_markup(&page.body)?;

        Ok(Verdict::Passed)
    }
}

fn payload(result: &FetchResult) -> Result<&Value> {
    result
        .payload
        .as_ref()
        .map_err(|e| ProbeError::assertion(format!("Dashboard source {} failed to load: {}", result.path, e)))
}

fn check_container(value: &Value, what: &str) -> Result<()> {
    verify!(
        value.is_object() || value.is_array(),
        "{} data missing or malformed: got {}",
        what,
        type_name(value)
    );
    Ok(())
}

fn check_non_empty(value: &Value, what: &str) -> Result<()> {
    let len = match value {
        Value::Object(obj) => obj.len(),
        Value::Array(items) => items.len(),
        other => {
            return Err(ProbeError::assertion(format!(
                "{} data missing or malformed: got {}",
                what,
                type_name(other)
            )))
        }
    };
    verify!(len > 0, "{} data is empty", what);
    Ok(())
}

pub fn check_kpis(value: &Value) -> Result<()> {
    let kpis = expect_object(value, "KPI overview")?;
    verify!(
        kpis.keys().any(|k| k.starts_with("total")),
        "KPIs data missing or incomplete"
    );
    for (key, metric) in kpis {
        if let Some(n) = metric.as_f64() {
            verify!(n >= 0.0, "KPI '{}' has negative value {}", key, n);
        }
    }
    Ok(())
}

pub fn check_profiles(value: &Value, min_profiles: usize) -> Result<()> {
    let profiles = unwrap_list(value).ok_or_else(|| ProbeError::assertion("Profile list missing or malformed"))?;
    verify!(
        profiles.len() >= min_profiles,
        "Insufficient profiles returned: expected at least {}, got {}",
        min_profiles,
        profiles.len()
    );

    for profile in profiles.iter().take(min_profiles) {
        verify!(
            NAME_KEYS.iter().any(|k| profile.get(*k).is_some()),
            "Employee name missing: {}",
            profile
        );
        verify!(
            DEPARTMENT_KEYS.iter().any(|k| profile.get(*k).is_some()),
            "Employee department missing: {}",
            profile
        );
    }
    Ok(())
}

/// 公司摘要至少要有一個已知欄位（不分大小寫）
pub fn check_company_keys(value: &Value) -> Result<()> {
    let summary = expect_object(value, "Company summary")?;
    let present = summary
        .keys()
        .any(|key| SUMMARY_KEYS.iter().any(|known| known.eq_ignore_ascii_case(key)));
    verify!(present, "Company summary expected keys missing");
    Ok(())
}

pub fn check_accessibility_markup(html: &str) -> Result<()> {
    let lower = html.to_lowercase();
    verify!(
        lower.contains("aria-") || lower.contains("role="),
        "Accessibility attributes missing in dashboard frontend HTML"
    );

    // `<image>` inside SVG is not an `<img>` and carries no alt text
    let images = lower
        .split("<img")
        .skip(1)
        .filter(|rest| rest.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/'));

    for (index, tag) in images.enumerate() {
        let attributes = tag.split('>').next().unwrap_or_default();
        verify!(
            attributes.contains("alt="),
            "Image #{} on the dashboard is missing an alt attribute",
            index + 1
        );
    }
    Ok(())
}
