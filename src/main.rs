use clap::Parser;
use dash_probe::checks::{all_checks, select_checks};
use dash_probe::config::apply_cli_overrides;
use dash_probe::utils::error::ErrorSeverity;
use dash_probe::utils::{logger, validation::Validate};
use dash_probe::{
    Check, CliConfig, ConfigProvider, LocalStorage, ProbeContext, ProbeError, ProbeRunner, ReportWriter, RunSettings,
    TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if cli.list {
        for check in all_checks() {
            println!("{:<24} {}", check.id(), check.title());
        }
        return Ok(());
    }

    tracing::info!("Starting dash-probe");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let settings = RunSettings::from_provider(config.as_ref());
    let context = match ProbeContext::new(settings) {
        Ok(context) => context,
        Err(e) => fail(&e),
    };

    let runner = ProbeRunner::new(context).with_checks(select_checks(config.selected_checks()));
    let report = runner.run_all().await;

    let storage = LocalStorage::new(config.output_path().to_string());
    let writer = ReportWriter::new(storage, config.output_formats().to_vec(), config.bundle_output());
    match writer.write(&report).await {
        Ok(files) => {
            tracing::info!("📁 Report saved to {}: {}", config.output_path(), files.join(", "));
        }
        Err(e) => fail(&e),
    }

    println!(
        "{} passed, {} failed, {} skipped",
        report.summary.passed, report.summary.failed, report.summary.skipped
    );
    for outcome in report.outcomes.iter().filter(|o| o.message.is_some()) {
        println!(
            "  {} [{}] {}",
            outcome.id,
            outcome.status.as_str(),
            outcome.message.as_deref().unwrap_or_default()
        );
    }

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// TOML 檔優先，命令列參數覆寫部分欄位
fn load_config(cli: &CliConfig) -> dash_probe::Result<Box<dyn ConfigProvider>> {
    match &cli.config {
        Some(path) => {
            tracing::info!("📄 Loading configuration from {}", path);
            let config = apply_cli_overrides(TomlConfig::from_file(path)?, cli);
            config.validate()?;
            Ok(Box::new(config))
        }
        None => {
            cli.validate()?;
            Ok(Box::new(cli.clone()))
        }
    }
}

fn fail(e: &ProbeError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::Medium => 2,
        ErrorSeverity::High | ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
