use crate::core::context::ProbeContext;
use crate::core::{Check, CheckOutcome, CheckStatus, RunReport, Verdict};
use crate::domain::model::RunSummary;
use chrono::Utc;
use std::time::Instant;

/// 依序執行多個 check，單一 check 失敗不影響其他 check
pub struct ProbeRunner {
    checks: Vec<Box<dyn Check>>,
    context: ProbeContext,
}

impl ProbeRunner {
    pub fn new(context: ProbeContext) -> Self {
        Self {
            checks: Vec::new(),
            context,
        }
    }

    pub fn add_check(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    pub fn with_checks(mut self, checks: Vec<Box<dyn Check>>) -> Self {
        self.checks.extend(checks);
        self
    }

    pub fn check_ids(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.id()).collect()
    }

    pub async fn run_all(&self) -> RunReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(self.checks.len());

        tracing::info!(
            "🚀 Running {} checks against {}",
            self.checks.len(),
            self.context.settings.api_base_url
        );

        for check in &self.checks {
            let outcome = self.run_check(check.as_ref()).await;
            outcomes.push(outcome);
        }

        let summary = RunSummary::from_outcomes(&outcomes);
        tracing::info!(
            "📊 {} passed, {} failed, {} skipped ({} ms)",
            summary.passed,
            summary.failed,
            summary.skipped,
            summary.total_duration_ms
        );

        RunReport {
            started_at,
            api_base_url: self.context.settings.api_base_url.clone(),
            frontend_base_url: self.context.settings.frontend_base_url.clone(),
            outcomes,
            summary,
        }
    }

    async fn run_check(&self, check: &dyn Check) -> CheckOutcome {
        let start_time = Instant::now();
        tracing::debug!("▶️ {}: {}", check.id(), check.title());

        let (status, message) = match check.run(&self.context).await {
            Ok(Verdict::Passed) => {
                tracing::info!("✅ {} passed", check.id());
                (CheckStatus::Passed, None)
            }
            Ok(Verdict::Skipped(reason)) => {
                tracing::info!("⏭️ {} skipped: {}", check.id(), reason);
                (CheckStatus::Skipped, Some(reason))
            }
            Err(e) => {
                tracing::error!("❌ {} failed: {} (Category: {:?})", check.id(), e, e.category());
                (CheckStatus::Failed, Some(e.user_friendly_message()))
            }
        };

        CheckOutcome {
            id: check.id().to_string(),
            title: check.title().to_string(),
            status,
            message,
            duration_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}
