use super::expect_object;
use crate::core::context::ProbeContext;
use crate::core::shapes::{is_non_negative_integer, non_empty_str, number_in_range};
use crate::core::{Check, Verdict};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use async_trait::async_trait;
use serde_json::Value;

pub const COMPANY_OVERVIEW_PATH: &str = "/v1/reports/company-overview";

const SUMMARY_KEYWORDS: [&str; 4] = ["attrition", "new joinees", "leaves", "deductions"];

pub struct CompanySummary;

#[async_trait]
impl Check for CompanySummary {
    fn id(&self) -> &'static str {
        "company-summary"
    }

    fn title(&self) -> &'static str {
        "Company summary metrics are in range"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let body = ctx.api.get_json(COMPANY_OVERVIEW_PATH).await?;
        check_company_summary(&body)?;
        Ok(Verdict::Passed)
    }
}

pub fn check_company_summary(body: &Value) -> Result<()> {
    let summary = expect_object(body, "Company summary")?;
    let field = |key: &str| {
        summary
            .get(key)
            .ok_or_else(|| ProbeError::assertion(format!("Missing key '{}' in company summary response", key)))
    };

    let attrition = field("attritionRate")?;
    verify!(
        number_in_range(attrition, 0.0, 100.0),
        "attritionRate should be a number between 0 and 100, got {}",
        attrition
    );

    let joinees = field("newJoineesCount")?;
    verify!(
        is_non_negative_integer(joinees),
        "newJoineesCount should be a non-negative integer, got {}",
        joinees
    );

    let leaves = field("leavesUtilizedPercentage")?;
    verify!(
        number_in_range(leaves, 0.0, 100.0),
        "leavesUtilizedPercentage should be a number between 0 and 100, got {}",
        leaves
    );

    let deductions = field("averageDeductions")?;
    verify!(
        deductions.as_f64().map(|d| d >= 0.0).unwrap_or(false),
        "averageDeductions should be a non-negative number, got {}",
        deductions
    );

    let text = non_empty_str(Some(field("textualSummary")?))
        .ok_or_else(|| ProbeError::assertion("textualSummary should be a non-empty string"))?;
    let lower = text.to_lowercase();
    verify!(
        SUMMARY_KEYWORDS.iter().any(|keyword| lower.contains(keyword)),
        "textualSummary does not mention any of {:?}: {}",
        SUMMARY_KEYWORDS,
        text
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::context_for;
    use httpmock::prelude::*;
    use serde_json::json;

    fn summary() -> Value {
        json!({
            "attritionRate": 4.2,
            "newJoineesCount": 7,
            "leavesUtilizedPercentage": 38.5,
            "averageDeductions": 1250.75,
            "textualSummary": "Attrition stayed low this quarter while 7 new joinees started."
        })
    }

    #[test]
    fn test_valid_summary() {
        assert!(check_company_summary(&summary()).is_ok());
    }

    #[test]
    fn test_out_of_range_values() {
        let mut body = summary();
        body["attritionRate"] = json!(120);
        assert!(check_company_summary(&body).unwrap_err().to_string().contains("attritionRate"));

        let mut body = summary();
        body["newJoineesCount"] = json!(2.5);
        assert!(check_company_summary(&body).is_err());

        let mut body = summary();
        body["averageDeductions"] = json!(-1);
        assert!(check_company_summary(&body).is_err());
    }

    #[test]
    fn test_summary_text_must_mention_metrics() {
        let mut body = summary();
        body["textualSummary"] = json!("All good.");
        assert!(check_company_summary(&body).unwrap_err().to_string().contains("does not mention"));

        let mut body = summary();
        body["textualSummary"] = json!("   ");
        assert!(check_company_summary(&body).is_err());

        let mut body = summary();
        body.as_object_mut().unwrap().remove("textualSummary");
        assert!(check_company_summary(&body).unwrap_err().to_string().contains("Missing key"));
    }

    #[tokio::test]
    async fn test_run_requires_success_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(COMPANY_OVERVIEW_PATH);
            then.status(401).json_body(json!({"error": "Unauthorized"}));
        });

        let err = CompanySummary.run(&context_for(&server)).await.unwrap_err();
        assert!(matches!(err, ProbeError::UnexpectedStatus { status: 401, .. }));
    }
}
