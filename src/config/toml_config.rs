use crate::checks::CHECK_IDS;
use crate::config::settings::{
    FixtureSettings, Thresholds, DEFAULT_API_BASE_URL, DEFAULT_FRONTEND_BASE_URL,
    DEFAULT_TIMEOUT_SECONDS, DEFAULT_WORKERS, OUTPUT_FORMATS,
};
use crate::core::ConfigProvider;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub target: TargetConfig,
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub fixtures: FixtureSettings,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_frontend_base_url")]
    pub frontend_base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub checks: Vec<String>,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    #[serde(default)]
    pub bundle: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            output_formats: default_output_formats(),
            bundle: false,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_frontend_base_url() -> String {
    DEFAULT_FRONTEND_BASE_URL.to_string()
}

fn default_output_path() -> String {
    "./probe-report".to_string()
}

fn default_output_formats() -> Vec<String> {
    vec!["json".to_string(), "csv".to_string()]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProbeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProbeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DASH_PROBE_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProbeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("target.api_base_url", &self.target.api_base_url)?;
        validation::validate_url("target.frontend_base_url", &self.target.frontend_base_url)?;

        if let Some(timeout) = self.target.timeout_seconds {
            validation::validate_positive_number("target.timeout_seconds", timeout as usize, 1)?;
        }

        // 有 [auth] 區段就必須給 token
        if let Some(auth) = &self.auth {
            let token = validation::validate_required_field("auth.token", &auth.token)?;
            validation::validate_non_empty_string("auth.token", token)?;
            // 未替換的 ${VAR} 代表環境變數沒有設定
            if token.starts_with("${") {
                return Err(ProbeError::MissingConfigError {
                    field: format!("auth.token (environment variable {})", token),
                });
            }
        }

        if let Some(workers) = self.run.workers {
            validation::validate_positive_number("run.workers", workers, 1)?;
        }
        validation::validate_allowed_values("run.checks", &self.run.checks, &CHECK_IDS)?;

        validation::validate_range(
            "thresholds.parallel_speedup_ratio",
            self.thresholds.parallel_speedup_ratio,
            0.0,
            1.0,
        )?;
        validation::validate_range("thresholds.score_tolerance", self.thresholds.score_tolerance, 0.0, 1.0)?;
        validation::validate_positive_number("thresholds.trend_months", self.thresholds.trend_months, 1)?;
        validation::validate_positive_number("thresholds.max_departments", self.thresholds.max_departments, 1)?;

        validation::validate_path("report.output_path", &self.report.output_path)?;
        validation::validate_allowed_values("report.output_formats", &self.report.output_formats, &OUTPUT_FORMATS)?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        &self.target.api_base_url
    }

    fn frontend_base_url(&self) -> &str {
        &self.target.frontend_base_url
    }

    fn auth_token(&self) -> Option<&str> {
        self.auth.as_ref().and_then(|a| a.token.as_deref())
    }

    fn timeout_seconds(&self) -> u64 {
        self.target.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn workers(&self) -> usize {
        self.run.workers.unwrap_or(DEFAULT_WORKERS)
    }

    fn selected_checks(&self) -> &[String] {
        &self.run.checks
    }

    fn output_path(&self) -> &str {
        &self.report.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.report.output_formats
    }

    fn bundle_output(&self) -> bool {
        self.report.bundle
    }

    fn thresholds(&self) -> Thresholds {
        self.thresholds.clone()
    }

    fn fixtures(&self) -> FixtureSettings {
        self.fixtures.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[target]
api_base_url = "http://api.internal:4000"
frontend_base_url = "http://web.internal:8081"
timeout_seconds = 10

[auth]
token = "abc.def.ghi"

[run]
checks = ["kpi-accuracy", "top-performers"]
workers = 4

[thresholds]
score_tolerance = 0.05
trend_months = 12

[fixtures]
cleanup = false

[report]
output_path = "./out"
output_formats = ["json", "tsv"]
bundle = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_base_url(), "http://api.internal:4000");
        assert_eq!(config.timeout_seconds(), 10);
        assert_eq!(config.auth_token(), Some("abc.def.ghi"));
        assert_eq!(config.selected_checks().len(), 2);
        assert_eq!(config.workers(), 4);
        assert_eq!(config.thresholds.score_tolerance, 0.05);
        assert_eq!(config.thresholds.trend_months, 12);
        // 未指定的門檻沿用預設值
        assert_eq!(config.thresholds.parallel_speedup_ratio, 0.6);
        assert!(!config.fixtures.cleanup);
        assert_eq!(config.fixtures.password, "TestPass123!");
        assert!(config.bundle_output());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("[target]\n").unwrap();

        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.frontend_base_url(), DEFAULT_FRONTEND_BASE_URL);
        assert_eq!(config.timeout_seconds(), 30);
        assert_eq!(config.workers(), 8);
        assert!(config.auth_token().is_none());
        assert_eq!(config.output_formats(), &["json".to_string(), "csv".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DASH_PROBE_TEST_TOKEN", "token-from-env");

        let toml_content = r#"
[target]

[auth]
token = "${DASH_PROBE_TEST_TOKEN}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.auth_token(), Some("token-from-env"));

        std::env::remove_var("DASH_PROBE_TEST_TOKEN");
    }

    #[test]
    fn test_unresolved_token_variable_fails_validation() {
        let toml_content = r#"
[target]

[auth]
token = "${DASH_PROBE_SURELY_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ProbeError::MissingConfigError { .. }));
    }

    #[test]
    fn test_auth_section_requires_token() {
        let config = TomlConfig::from_toml_str("[target]\n[auth]\n").unwrap();
        match config.validate() {
            Err(ProbeError::MissingConfigError { field }) => assert_eq!(field, "auth.token"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = TomlConfig::from_toml_str("[target]\napi_base_url = \"invalid-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let unknown_check = TomlConfig::from_toml_str("[target]\n[run]\nchecks = [\"no-such-check\"]\n").unwrap();
        assert!(unknown_check.validate().is_err());

        let bad_format = TomlConfig::from_toml_str("[target]\n[report]\noutput_formats = [\"xml\"]\n").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_ratio = TomlConfig::from_toml_str("[target]\n[thresholds]\nparallel_speedup_ratio = 1.5\n").unwrap();
        assert!(bad_ratio.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[target]
api_base_url = "https://hr.example.com"

[report]
output_path = "./reports"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api_base_url(), "https://hr.example.com");
        assert_eq!(config.output_path(), "./reports");
    }
}
