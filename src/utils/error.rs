use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 兩個外部評估服務
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    ComplianceReport,
    PrivacyMetrics,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::ComplianceReport => write!(f, "GDPR compliance service"),
            ServiceKind::PrivacyMetrics => write!(f, "Privacy metrics service"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PriEvalError {
    #[error("Missing required files. Please upload both policy and data files.")]
    MissingFiles { policy_missing: bool, data_missing: bool },

    #[error("{service} request failed: {source}")]
    TransportError {
        service: ServiceKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} API error: {status}")]
    ServiceError {
        service: ServiceKind,
        status: reqwest::StatusCode,
    },

    #[error("{service} returned a malformed response: {source}")]
    ParseError {
        service: ServiceKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, PriEvalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    Precondition,
    Transport,
    Service,
    Parse,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PriEvalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PriEvalError::MissingFiles { .. } => ErrorCategory::Precondition,
            PriEvalError::TransportError { .. } => ErrorCategory::Transport,
            PriEvalError::ServiceError { .. } => ErrorCategory::Service,
            PriEvalError::ParseError { .. } | PriEvalError::SerializationError(_) => {
                ErrorCategory::Parse
            }
            PriEvalError::IoError(_) => ErrorCategory::Io,
            PriEvalError::ConfigError { .. }
            | PriEvalError::ConfigValidationError { .. }
            | PriEvalError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Transport | ErrorCategory::Service => ErrorSeverity::Medium,
            ErrorCategory::Precondition | ErrorCategory::Parse => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 發生錯誤的服務（若有）
    pub fn service(&self) -> Option<ServiceKind> {
        match self {
            PriEvalError::TransportError { service, .. }
            | PriEvalError::ServiceError { service, .. }
            | PriEvalError::ParseError { service, .. } => Some(*service),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PriEvalError::MissingFiles {
                policy_missing,
                data_missing,
            } => match (policy_missing, data_missing) {
                (true, false) => "No policy document has been uploaded".to_string(),
                (false, true) => "No data sample has been uploaded".to_string(),
                _ => "Both a policy document and a data sample are required".to_string(),
            },
            PriEvalError::TransportError { service, .. } => {
                format!("Could not reach the {}", service)
            }
            PriEvalError::ServiceError { service, status } => {
                format!("The {} rejected the request ({})", service, status)
            }
            PriEvalError::ParseError { service, .. } => {
                format!("The {} sent back a response that could not be read", service)
            }
            PriEvalError::IoError(e) => format!("File access failed: {}", e),
            PriEvalError::SerializationError(e) => format!("Could not encode the report: {}", e),
            _ => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Precondition => "Upload both the policy document and the data sample, then retry",
            ErrorCategory::Transport => "Check that both evaluation services are running and reachable",
            ErrorCategory::Service => "Inspect the service logs; the uploaded file may be unsupported",
            ErrorCategory::Parse => "Make sure the endpoints point at the PriEval evaluation services",
            ErrorCategory::Io => "Check the file paths and permissions",
            ErrorCategory::Configuration => "Fix the configuration value and run again",
        }
    }
}

/// 保存在 session 中的錯誤：可複製，只保留類別與訊息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfacedError {
    pub category: ErrorCategory,
    pub service: Option<ServiceKind>,
    pub message: String,
}

impl From<&PriEvalError> for SurfacedError {
    fn from(err: &PriEvalError) -> Self {
        Self {
            category: err.category(),
            service: err.service(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for SurfacedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
