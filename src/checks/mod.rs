//! 儀表板 API 的驗證程序，每個 check 一個模組

mod activity_edge_cases;
mod activity_logs;
mod company_summary;
mod dashboard_accessibility;
mod error_handling;
mod kpi_accuracy;
mod parallel_fetch;
mod report_graphs;
mod scoring_edge_cases;
mod top_performers;

pub use activity_edge_cases::ActivityEdgeCases;
pub use activity_logs::ActivityLogs;
pub use company_summary::CompanySummary;
pub use dashboard_accessibility::DashboardAccessibility;
pub use error_handling::ErrorHandling;
pub use kpi_accuracy::KpiAccuracy;
pub use parallel_fetch::ParallelFetch;
pub use report_graphs::ReportGraphs;
pub use scoring_edge_cases::ScoringEdgeCases;
pub use top_performers::TopPerformers;

use crate::core::Check;
use crate::utils::error::{ProbeError, Result};
use serde_json::{Map, Value};

pub const OVERVIEW_PATH: &str = "/v1/analytics/overview";
pub const DASHBOARD_PAGE_PATH: &str = "/admin/dashboard";

/// Check ids in their default execution order.
pub const CHECK_IDS: [&str; 10] = [
    "kpi-accuracy",
    "report-graphs",
    "top-performers",
    "activity-logs",
    "company-summary",
    "dashboard-accessibility",
    "parallel-fetch",
    "error-handling",
    "activity-edge-cases",
    "scoring-edge-cases",
];

pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(KpiAccuracy),
        Box::new(ReportGraphs),
        Box::new(TopPerformers),
        Box::new(ActivityLogs),
        Box::new(CompanySummary),
        Box::new(DashboardAccessibility),
        Box::new(ParallelFetch),
        Box::new(ErrorHandling),
        Box::new(ActivityEdgeCases),
        Box::new(ScoringEdgeCases),
    ]
}

/// 依 id 挑選 check；空清單代表全部。執行順序固定為預設順序
pub fn select_checks(ids: &[String]) -> Vec<Box<dyn Check>> {
    if ids.is_empty() {
        return all_checks();
    }
    all_checks()
        .into_iter()
        .filter(|check| ids.iter().any(|id| id == check.id()))
        .collect()
}

pub(crate) fn expect_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        ProbeError::assertion(format!(
            "{} should be a JSON object, got {}",
            what,
            crate::core::shapes::type_name(value)
        ))
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::settings::RunSettings;
    use crate::core::context::ProbeContext;
    use httpmock::MockServer;
    use std::time::Duration;

    /// API 與前端都指向同一個 mock server
    pub fn context_for(server: &MockServer) -> ProbeContext {
        let settings = RunSettings {
            api_base_url: server.base_url(),
            frontend_base_url: server.base_url(),
            auth_token: Some("test-token".to_string()),
            timeout: Duration::from_secs(5),
            ..RunSettings::default()
        };
        ProbeContext::new(settings).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_ids_match_registry() {
        let ids: Vec<&str> = all_checks().iter().map(|c| c.id()).collect();
        assert_eq!(ids, CHECK_IDS.to_vec());
    }

    #[test]
    fn test_select_checks_keeps_default_order() {
        let selected = select_checks(&["error-handling".to_string(), "kpi-accuracy".to_string()]);
        let ids: Vec<&str> = selected.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["kpi-accuracy", "error-handling"]);

        assert_eq!(select_checks(&[]).len(), CHECK_IDS.len());
    }
}
