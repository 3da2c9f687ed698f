use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Compression error: {message}")]
    CompressionError { message: String },

    #[error("Malformed {tier} payload: {message}")]
    MalformedPayload { tier: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ShareError {
    pub fn malformed(tier: &str, message: impl Into<String>) -> Self {
        ShareError::MalformedPayload {
            tier: tier.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ShareError::IoError(_) => ErrorCategory::Io,
            ShareError::SerializationError(_)
            | ShareError::CsvError(_)
            | ShareError::Base64Error(_)
            | ShareError::CompressionError { .. }
            | ShareError::MalformedPayload { .. } => ErrorCategory::Data,
            ShareError::ConfigError { .. }
            | ShareError::ConfigValidationError { .. }
            | ShareError::InvalidConfigValueError { .. }
            | ShareError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ShareError::ValidationError { .. } | ShareError::TemplateNotFound { .. } => {
                ErrorCategory::Validation
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ShareError::IoError(e) => format!("Could not read or write a file: {}", e),
            ShareError::TemplateNotFound { id } => format!("No template with id {}", id),
            ShareError::ValidationError { message } => format!("Invalid module data: {}", message),
            ShareError::MalformedPayload { tier, .. } => {
                format!("The shared link ({} format) is damaged", tier)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the path exists and is writable",
            ErrorCategory::Data => "Ask for a fresh share link or re-enter the modules",
            ErrorCategory::Configuration => "Review the TOML config file and CLI flags",
            ErrorCategory::Validation => {
                "Every module needs a name, a coefficient > 0 and an average between 0 and 20"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ShareError>;
