pub mod adapters;
pub mod checks;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, settings::RunSettings, toml_config::TomlConfig};

pub use crate::core::{context::ProbeContext, report::ReportWriter, runner::ProbeRunner};
pub use crate::core::{Check, ConfigProvider, RunReport};
pub use utils::error::{ProbeError, Result};
