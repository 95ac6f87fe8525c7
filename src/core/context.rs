use crate::adapters::http::ApiClient;
use crate::config::settings::RunSettings;
use crate::utils::error::Result;

/// 每個 check 執行時可用的客戶端與設定
#[derive(Debug, Clone)]
pub struct ProbeContext {
    pub api: ApiClient,
    pub frontend: ApiClient,
    pub settings: RunSettings,
}

impl ProbeContext {
    pub fn new(settings: RunSettings) -> Result<Self> {
        let token = settings.auth_token.clone();
        let api = ApiClient::new(&settings.api_base_url, token.clone(), settings.timeout)?;
        let frontend = ApiClient::new(&settings.frontend_base_url, token, settings.timeout)?;
        Ok(Self {
            api,
            frontend,
            settings,
        })
    }
}
