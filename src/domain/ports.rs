use crate::config::settings::{FixtureSettings, Thresholds};
use crate::core::context::ProbeContext;
use crate::domain::model::Verdict;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn frontend_base_url(&self) -> &str;
    fn auth_token(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn workers(&self) -> usize;
    fn selected_checks(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn bundle_output(&self) -> bool;

    fn thresholds(&self) -> Thresholds {
        Thresholds::default()
    }

    fn fixtures(&self) -> FixtureSettings {
        FixtureSettings::default()
    }
}

/// 一個獨立的驗證程序
#[async_trait]
pub trait Check: Send + Sync {
    /// Stable kebab-case identifier used by `--checks` and in reports.
    fn id(&self) -> &'static str;
    fn title(&self) -> &'static str;
    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict>;
}
