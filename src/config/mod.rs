pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::checks::CHECK_IDS;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "dash-probe")]
#[command(about = "Black-box verification checks for the HR admin dashboard API")]
pub struct CliConfig {
    #[arg(long, help = "Load settings from a TOML file; other flags override it")]
    pub config: Option<String>,

    #[arg(long, default_value = settings::DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, default_value = settings::DEFAULT_FRONTEND_BASE_URL)]
    pub frontend_base_url: String,

    #[arg(long, env = "DASH_PROBE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    #[arg(long, default_value = "8")]
    pub workers: usize,

    #[arg(long, value_delimiter = ',', help = "Run only these checks (default: all)")]
    pub checks: Vec<String>,

    #[arg(long, default_value = "./probe-report")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "json,csv")]
    pub formats: Vec<String>,

    #[arg(long, help = "Bundle the report files into a zip archive")]
    pub bundle: bool,

    #[arg(long, help = "List available checks and exit")]
    pub list: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    fn auth_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_secs
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn selected_checks(&self) -> &[String] {
        &self.checks
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn bundle_output(&self) -> bool {
        self.bundle
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("--api-base-url", &self.api_base_url)?;
        validation::validate_url("--frontend-base-url", &self.frontend_base_url)?;
        validation::validate_positive_number("--timeout-secs", self.timeout_secs as usize, 1)?;
        validation::validate_positive_number("--workers", self.workers, 1)?;
        validation::validate_allowed_values("--checks", &self.checks, &CHECK_IDS)?;
        validation::validate_path("--output-path", &self.output_path)?;
        validation::validate_allowed_values("--formats", &self.formats, &settings::OUTPUT_FORMATS)?;
        if let Some(token) = &self.token {
            validation::validate_non_empty_string("--token", token)?;
        }
        Ok(())
    }
}

/// 以 TOML 檔為基礎，再套用命令列上明確給定的值
#[cfg(feature = "cli")]
pub fn apply_cli_overrides(mut file: toml_config::TomlConfig, cli: &CliConfig) -> toml_config::TomlConfig {
    if let Some(token) = &cli.token {
        file.auth = Some(toml_config::AuthConfig {
            token: Some(token.clone()),
        });
    }
    if !cli.checks.is_empty() {
        file.run.checks = cli.checks.clone();
    }
    if cli.bundle {
        file.report.bundle = true;
    }
    file
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::parse_from(["dash-probe"]);
        assert_eq!(config.api_base_url(), "http://localhost:4000");
        assert_eq!(config.frontend_base_url(), "http://localhost:8081");
        assert_eq!(config.timeout_seconds(), 30);
        assert_eq!(config.output_formats(), &["json".to_string(), "csv".to_string()]);
        assert!(config.selected_checks().is_empty());
    }

    #[test]
    fn test_cli_checks_list_and_validation() {
        let config = CliConfig::parse_from(["dash-probe", "--checks", "kpi-accuracy,error-handling"]);
        assert_eq!(config.checks, vec!["kpi-accuracy", "error-handling"]);
        assert!(config.validate().is_ok());

        let config = CliConfig::parse_from(["dash-probe", "--checks", "bogus"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["dash-probe", "--workers", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = toml_config::TomlConfig::from_toml_str("[target]\n[run]\nchecks = [\"kpi-accuracy\"]\n").unwrap();
        let cli = CliConfig::parse_from(["dash-probe", "--token", "t0k", "--checks", "error-handling", "--bundle"]);

        let merged = apply_cli_overrides(file, &cli);
        assert_eq!(merged.auth_token(), Some("t0k"));
        assert_eq!(merged.selected_checks(), &["error-handling".to_string()]);
        assert!(merged.bundle_output());
    }
}
