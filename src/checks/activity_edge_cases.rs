use crate::core::activity::validate_edge_cases;
use crate::core::context::ProbeContext;
use crate::core::{Check, Verdict};
use crate::utils::error::{ProbeError, Result};
use async_trait::async_trait;
use chrono::Utc;

pub const RECENT_ACTIVITIES_PATH: &str = "/v1/analytics/recent-activities";

/// 很舊的紀錄、同時發生的事件與異常稽核資料仍需保持可讀
pub struct ActivityEdgeCases;

#[async_trait]
impl Check for ActivityEdgeCases {
    fn id(&self) -> &'static str {
        "activity-edge-cases"
    }

    fn title(&self) -> &'static str {
        "Activity formatting holds for old, simultaneous and unusual entries"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let body = ctx.api.get_json(RECENT_ACTIVITIES_PATH).await?;
        let entries = body
            .as_array()
            .ok_or_else(|| ProbeError::assertion("Recent activities response is not a list"))?;

        validate_edge_cases(entries, Utc::now())?;
        Ok(Verdict::Passed)
    }
}
