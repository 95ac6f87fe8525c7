use crate::core::ConfigProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:8081";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_WORKERS: usize = 8;
pub const OUTPUT_FORMATS: [&str; 3] = ["json", "csv", "tsv"];

/// 驗證用的門檻值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub score_tolerance: f64,
    pub parallel_speedup_ratio: f64,
    pub trend_months: usize,
    pub max_departments: usize,
    pub min_profiles: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            score_tolerance: 0.01,
            parallel_speedup_ratio: 0.6,
            trend_months: 6,
            max_departments: 5,
            min_profiles: 5,
        }
    }
}

/// 建立測試使用者時的設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
    pub password: String,
    pub department: String,
    pub settle_millis: u64,
    pub cleanup: bool,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            password: "TestPass123!".to_string(),
            department: "Engineering".to_string(),
            settle_millis: 2000,
            cleanup: true,
        }
    }
}

/// Resolved settings shared by every check during one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub api_base_url: String,
    pub frontend_base_url: String,
    pub auth_token: Option<String>,
    pub timeout: Duration,
    pub workers: usize,
    pub thresholds: Thresholds,
    pub fixtures: FixtureSettings,
}

impl RunSettings {
    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            api_base_url: config.api_base_url().to_string(),
            frontend_base_url: config.frontend_base_url().to_string(),
            auth_token: config.auth_token().map(str::to_string),
            timeout: Duration::from_secs(config.timeout_seconds()),
            workers: config.workers(),
            thresholds: config.thresholds(),
            fixtures: config.fixtures(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            frontend_base_url: DEFAULT_FRONTEND_BASE_URL.to_string(),
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            workers: DEFAULT_WORKERS,
            thresholds: Thresholds::default(),
            fixtures: FixtureSettings::default(),
        }
    }
}
