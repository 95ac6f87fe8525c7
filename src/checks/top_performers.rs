use crate::core::context::ProbeContext;
use crate::core::ranking::{rank, salary_map, score_employees, verify_top_performers};
use crate::core::shapes::unwrap_list;
use crate::core::{Check, Verdict};
use crate::domain::model::{EmployeeProfile, PayrollInput, TopPerformerEntry};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use async_trait::async_trait;

pub const PROFILES_PATH: &str = "/v1/profile";
pub const PAYROLL_INPUTS_PATH: &str = "/v1/payroll/inputs";
pub const TOP_PERFORMERS_PATH: &str = "/v1/reports/top-performers";

/// 以 profile + payroll 重新計算排名，再與 top-performers 端點比對
pub struct TopPerformers;

#[async_trait]
impl Check for TopPerformers {
    fn id(&self) -> &'static str {
        "top-performers"
    }

    fn title(&self) -> &'static str {
        "Top performers match the payroll-based ranking"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let profiles = fetch_profiles(ctx).await?;
        verify!(!profiles.is_empty(), "No employee profiles returned");

        let payroll = ctx.api.get_json(PAYROLL_INPUTS_PATH).await?;
        let inputs: Vec<PayrollInput> = payroll
            .as_array()
            .ok_or_else(|| ProbeError::assertion("Payroll inputs response is not a list"))?
            .iter()
            .map(PayrollInput::from_value)
            .collect();

        let expected = rank(score_employees(&profiles, &salary_map(&inputs)));
        tracing::debug!(
            "📊 Recomputed ranking for {} employees from {} payroll inputs",
            expected.len(),
            inputs.len()
        );

        let response = ctx.api.get(TOP_PERFORMERS_PATH).await?;
        if response.status == 404 {
            return Ok(Verdict::Skipped(format!(
                "{} not found; nothing to compare against",
                TOP_PERFORMERS_PATH
            )));
        }

        let body = response.into_json()?;
        let live: Vec<TopPerformerEntry> = body
            .as_array()
            .ok_or_else(|| ProbeError::assertion("Top performers response is not a list"))?
            .iter()
            .map(TopPerformerEntry::from_value)
            .collect();

        verify_top_performers(&expected, &live, ctx.settings.thresholds.score_tolerance)?;
        Ok(Verdict::Passed)
    }
}

/// Profiles that carry an id, name and department.
pub async fn fetch_profiles(ctx: &ProbeContext) -> Result<Vec<EmployeeProfile>> {
    let body = ctx.api.get_json(PROFILES_PATH).await?;
    let rows = unwrap_list(&body)
        .ok_or_else(|| ProbeError::assertion("Profiles response is not a list or an object wrapping one"))?;
    Ok(rows.iter().filter_map(EmployeeProfile::from_value).collect())
}
