use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 員工檔案（`/v1/profile` 的單筆資料）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub id: String,
    pub name: String,
    pub department: String,
    pub salary: Option<f64>,
    pub hire_date: Option<String>,
}

impl EmployeeProfile {
    /// Profiles without an id, name or department are not rankable and yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: json_to_id(obj.get("id")?)?,
            name: json_to_text(obj.get("name")?),
            department: json_to_text(obj.get("department")?),
            salary: obj.get("salary").and_then(Value::as_f64),
            hire_date: obj
                .get("hireDate")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

/// 薪資輸入（`/v1/payroll/inputs` 的單筆資料）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollInput {
    pub user_id: Option<String>,
    pub gross: Option<f64>,
    pub net: Option<f64>,
    pub amount: Option<f64>,
}

impl PayrollInput {
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(Value::as_f64);
        Self {
            user_id: value.get("userId").and_then(json_to_id),
            gross: field("gross"),
            net: field("net"),
            amount: field("amount"),
        }
    }
}

/// 帶分數的員工，用於排名比對
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEmployee {
    pub id: String,
    pub name: String,
    pub department: String,
    pub score: f64,
    pub hire_date: Option<String>,
}

/// `/v1/reports/top-performers` 回傳的一列
#[derive(Debug, Clone, PartialEq)]
pub struct TopPerformerEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub score: f64,
}

impl TopPerformerEntry {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: value.get("id").and_then(json_to_id),
            name: value.get("name").map(json_to_text),
            department: value.get("department").map(json_to_text),
            score: value.get("score").and_then(Value::as_f64).unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Failed => "failed",
            CheckStatus::Skipped => "skipped",
        }
    }
}

/// What a check returns when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Passed,
    Skipped(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub id: String,
    pub title: String,
    pub status: CheckStatus,
    pub message: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[CheckOutcome]) -> Self {
        let count = |status: CheckStatus| outcomes.iter().filter(|o| o.status == status).count();
        Self {
            total: outcomes.len(),
            passed: count(CheckStatus::Passed),
            failed: count(CheckStatus::Failed),
            skipped: count(CheckStatus::Skipped),
            total_duration_ms: outcomes.iter().map(|o| o.duration_ms).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub api_base_url: String,
    pub frontend_base_url: String,
    pub outcomes: Vec<CheckOutcome>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.summary.failed == 0
    }
}

pub(crate) fn json_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
