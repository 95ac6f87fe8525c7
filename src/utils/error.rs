use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}: {body}")]
    UnexpectedStatus { url: String, status: u16, body: String },

    #[error("Assertion failed: {message}")]
    AssertionError { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, ProbeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Verification,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProbeError {
    pub fn assertion(message: impl Into<String>) -> Self {
        ProbeError::AssertionError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ProbeError::HttpError(_) | ProbeError::UnexpectedStatus { .. } => ErrorCategory::Network,
            ProbeError::AssertionError { .. } | ProbeError::SerializationError(_) => {
                ErrorCategory::Verification
            }
            ProbeError::ConfigValidationError { .. }
            | ProbeError::InvalidConfigValueError { .. }
            | ProbeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ProbeError::ZipError(_) | ProbeError::CsvError(_) | ProbeError::IoError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Verification => ErrorSeverity::High,
            ErrorCategory::Network => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            ProbeError::HttpError(e) if e.is_timeout() => "The service did not answer in time".to_string(),
            ProbeError::HttpError(e) if e.is_connect() => "Could not connect to the service".to_string(),
            ProbeError::HttpError(_) => "An HTTP request to the service failed".to_string(),
            ProbeError::UnexpectedStatus { url, status, .. } => {
                format!("{} answered with HTTP {}", url, status)
            }
            ProbeError::AssertionError { message } => message.clone(),
            ProbeError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            ProbeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            ProbeError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the API and frontend servers are running and the base URLs are correct"
            }
            ErrorCategory::Verification => {
                "Inspect the failing endpoint's response; the service returned data that does not match expectations"
            }
            ErrorCategory::Configuration => "Fix the configuration file or command line flags and retry",
            ErrorCategory::Output => "Check that the output path exists and is writable",
        }
    }
}

/// 條件不成立時回傳 `ProbeError::AssertionError`
#[macro_export]
macro_rules! verify {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::utils::error::ProbeError::assertion(format!($($arg)+)));
        }
    };
}
