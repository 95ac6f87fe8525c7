use dash_probe::checks::select_checks;
use dash_probe::utils::validation::Validate;
use dash_probe::{Check, ConfigProvider, ProbeContext, ProbeError, RunSettings, TomlConfig};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file_drives_run_settings() {
    std::env::set_var("DASH_PROBE_IT_TOKEN", "it-secret");
    let file = write_config(
        r#"
[target]
api_base_url = "http://127.0.0.1:4000/"
frontend_base_url = "http://127.0.0.1:8081"
timeout_seconds = 12

[auth]
token = "${DASH_PROBE_IT_TOKEN}"

[run]
checks = ["error-handling", "kpi-accuracy"]
workers = 3

[thresholds]
parallel_speedup_ratio = 0.5

[fixtures]
settle_millis = 250
"#,
    );

    let config = TomlConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();

    let settings = RunSettings::from_provider(&config);
    assert_eq!(settings.auth_token.as_deref(), Some("it-secret"));
    assert_eq!(settings.timeout, Duration::from_secs(12));
    assert_eq!(settings.workers, 3);
    assert_eq!(settings.thresholds.parallel_speedup_ratio, 0.5);
    assert_eq!(settings.fixtures.settle_millis, 250);

    let context = ProbeContext::new(settings).unwrap();
    assert_eq!(context.api.url("/v1/profile"), "http://127.0.0.1:4000/v1/profile");

    let ids: Vec<&str> = select_checks(config.selected_checks()).iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["kpi-accuracy", "error-handling"]);
}

#[test]
fn test_unset_token_variable_is_reported() {
    let file = write_config(
        r#"
[target]
api_base_url = "http://127.0.0.1:4000"

[auth]
token = "${DASH_PROBE_IT_UNSET_VARIABLE}"
"#,
    );

    let config = TomlConfig::from_file(file.path()).unwrap();
    match config.validate() {
        Err(ProbeError::MissingConfigError { field }) => assert!(field.contains("DASH_PROBE_IT_UNSET_VARIABLE")),
        other => panic!("expected a missing config error, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = TomlConfig::from_file("/nonexistent/dash-probe.toml").unwrap_err();
    assert!(matches!(err, ProbeError::IoError(_)));
}

#[cfg(feature = "cli")]
#[test]
fn test_cli_flags_override_file() {
    use clap::Parser;
    use dash_probe::config::apply_cli_overrides;
    use dash_probe::CliConfig;

    let file = write_config("[target]\n[run]\nchecks = [\"company-summary\"]\n[report]\noutput_formats = [\"tsv\"]\n");
    let cli = CliConfig::parse_from(["dash-probe", "--token", "from-cli", "--checks", "parallel-fetch"]);

    let merged = apply_cli_overrides(TomlConfig::from_file(file.path()).unwrap(), &cli);
    assert!(merged.validate().is_ok());
    assert_eq!(merged.auth_token(), Some("from-cli"));
    assert_eq!(merged.selected_checks(), &["parallel-fetch".to_string()]);
    assert_eq!(merged.output_formats(), &["tsv".to_string()]);
    assert!(!merged.bundle_output());
}
