use super::{expect_object, DASHBOARD_PAGE_PATH, OVERVIEW_PATH};
use crate::core::context::ProbeContext;
use crate::core::shapes::metrics_match;
use crate::core::{Check, Verdict};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use async_trait::async_trait;

pub const KPI_KEYS: [&str; 4] = ["totalEmployees", "presentToday", "onLeaveToday", "pendingLeaveRequests"];

/// 後端 analytics 的 KPI 必須與前端儀表板顯示的一致
pub struct KpiAccuracy;

#[async_trait]
impl Check for KpiAccuracy {
    fn id(&self) -> &'static str {
        "kpi-accuracy"
    }

    fn title(&self) -> &'static str {
        "Dashboard KPIs match the analytics overview"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let analytics = ctx.api.get_json(OVERVIEW_PATH).await?;
        let analytics = expect_object(&analytics, "Analytics overview")?;

        for key in KPI_KEYS {
            let value = analytics
                .get(key)
                .ok_or_else(|| ProbeError::assertion(format!("Missing KPI '{}' in analytics overview response", key)))?;
            verify!(value.is_number(), "KPI '{}' should be numeric, got {}", key, value);
        }

        let dashboard = ctx.frontend.get_json(DASHBOARD_PAGE_PATH).await?;
        let dashboard = expect_object(&dashboard, "Frontend dashboard response")?;

        for key in KPI_KEYS {
            let shown = dashboard
                .get(key)
                .ok_or_else(|| ProbeError::assertion(format!("Missing KPI '{}' in frontend dashboard response", key)))?;
            let expected = &analytics[key];
            verify!(
                metrics_match(expected, shown),
                "Frontend KPI '{}' value {} does not match backend value {}",
                key,
                shown,
                expected
            );
        }

        tracing::debug!("📊 {} KPIs consistent between API and dashboard", KPI_KEYS.len());
        Ok(Verdict::Passed)
    }
}
