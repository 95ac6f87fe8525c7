//! Creates throwaway employees to exercise ranking tie-breaks: equal
//! salaries, a missing salary and a recent hire.

use super::top_performers::PROFILES_PATH;
use crate::core::context::ProbeContext;
use crate::core::ranking::{position_of, rank, score_by_profile_salary};
use crate::core::shapes::unwrap_list;
use crate::core::{Check, Verdict};
use crate::domain::model::{json_to_id, EmployeeProfile};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

pub const USERS_PATH: &str = "/v1/users";

const FIXTURE_LABELS: [&str; 4] = ["A", "B", "C", "D"];

pub struct ScoringEdgeCases;

#[async_trait]
impl Check for ScoringEdgeCases {
    fn id(&self) -> &'static str {
        "scoring-edge-cases"
    }

    fn title(&self) -> &'static str {
        "Ranking handles ties, missing salaries and new hires"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let mut created = Vec::with_capacity(FIXTURE_LABELS.len());
        let outcome = exercise(ctx, &mut created).await;

        if ctx.settings.fixtures.cleanup {
            cleanup(ctx, &created).await;
        } else if !created.is_empty() {
            tracing::info!("⏭️ Leaving {} fixture users in place (cleanup disabled)", created.len());
        }

        outcome
    }
}

async fn exercise(ctx: &ProbeContext, created: &mut Vec<String>) -> Result<Verdict> {
    let fixtures = &ctx.settings.fixtures;
    let stamp = chrono::Utc::now().timestamp();

    for label in FIXTURE_LABELS {
        let payload = json!({
            "email": format!("employee{}_{}@example.com", label, stamp),
            "password": fixtures.password,
            "role": "employee",
            "name": format!("Employee {}", label),
            "department": fixtures.department,
        });

        let response = ctx.api.post_json(USERS_PATH, &payload).await?;
        verify!(
            response.status == 200 || response.status == 201,
            "Failed to create user Employee {} with status {} and body {}",
            label,
            response.status,
            response.body
        );

        let body = response.json()?;
        let id = body
            .get("id")
            .and_then(json_to_id)
            .ok_or_else(|| ProbeError::assertion(format!("No user id returned for Employee {}", label)))?;
        tracing::debug!("Created fixture user Employee {} ({})", label, id);
        created.push(id);
    }

    tokio::time::sleep(Duration::from_millis(fixtures.settle_millis)).await;

    let body = ctx.api.get_json(PROFILES_PATH).await?;
    let rows = unwrap_list(&body).ok_or_else(|| ProbeError::assertion("Profiles response should be a list"))?;
    let fixtures_found: Vec<EmployeeProfile> = rows
        .iter()
        .filter_map(EmployeeProfile::from_value)
        .filter(|profile| created.contains(&profile.id))
        .collect();
    verify!(
        fixtures_found.len() == created.len(),
        "Not all test users returned in profiles: found {} of {}",
        fixtures_found.len(),
        created.len()
    );

    let ranked = rank(score_by_profile_salary(&fixtures_found));
    let index = |i: usize| {
        position_of(&ranked, &created[i])
            .ok_or_else(|| ProbeError::assertion(format!("Employee {} missing from ranking", FIXTURE_LABELS[i])))
    };
    let (a, b, c, d) = (index(0)?, index(1)?, index(2)?, index(3)?);

    verify!(
        a < b,
        "Employee A should appear before Employee B due to hire date when scores tie (A at {}, B at {})",
        a,
        b
    );
    verify!(
        c > a.max(b).max(d),
        "Employee C with missing salary should appear last (position {})",
        c
    );
    verify!(
        d > a.max(b) && d < c,
        "Employee D (new hire) should appear after A and B but before C (position {})",
        d
    );

    Ok(Verdict::Passed)
}

/// 刪除建立的測試使用者；失敗只記錄警告
async fn cleanup(ctx: &ProbeContext, created: &[String]) {
    for id in created {
        match ctx.api.delete(&format!("{}/{}", USERS_PATH, id)).await {
            Ok(response) if response.status == 200 || response.status == 204 => {
                tracing::debug!("🧹 Deleted fixture user {}", id);
            }
            Ok(response) => {
                tracing::warn!("⚠️ Failed to delete user {}: status {}", id, response.status);
            }
            Err(e) => {
                tracing::warn!("⚠️ Error deleting user {}: {}", id, e);
            }
        }
    }
}
