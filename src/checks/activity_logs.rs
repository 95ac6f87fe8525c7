use super::{expect_object, OVERVIEW_PATH};
use crate::core::activity::validate_activity;
use crate::core::context::ProbeContext;
use crate::core::{Check, Verdict};
use crate::utils::error::{ProbeError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

const ACTIVITY_KEYS: [&str; 2] = ["recentActivities", "recent_activities"];

pub struct ActivityLogs;

#[async_trait]
impl Check for ActivityLogs {
    fn id(&self) -> &'static str {
        "activity-logs"
    }

    fn title(&self) -> &'static str {
        "Recent activity logs are human-readable"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let overview = ctx.api.get_json(OVERVIEW_PATH).await?;
        let overview = expect_object(&overview, "Analytics overview")?;

        let activities = match recent_activities(overview) {
            None => return Ok(Verdict::Passed),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(ProbeError::assertion(format!(
                    "Recent activities should be a list, got {}",
                    other
                )))
            }
        };

        for entry in activities {
            validate_activity(entry)?;
        }

        tracing::debug!("✅ {} activity entries are human-readable", activities.len());
        Ok(Verdict::Passed)
    }
}

/// 兩種命名都可能出現；null 或空清單會改看下一個鍵，都沒有時視為空清單
fn recent_activities(overview: &Map<String, Value>) -> Option<&Value> {
    ACTIVITY_KEYS
        .iter()
        .filter_map(|key| overview.get(*key))
        .find(|value| match value {
            Value::Null => false,
            Value::Array(entries) => !entries.is_empty(),
            _ => true,
        })
}
