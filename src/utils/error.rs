use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Unable to open input file '{path}': {source}")]
    InputUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to read header record from input table")]
    NoHeader,

    #[error("Unable to find column '{column}' in CSV header")]
    ColumnNotFound { column: String },

    #[error("Malformed record on line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: u64,
        found: u64,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Directory response for user ID '{identifier}' is not valid JSON: {source}")]
    InvalidResponse {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::InputUnavailable { .. }
            | EtlError::NoHeader
            | EtlError::ColumnNotFound { .. }
            | EtlError::MalformedRow { .. }
            | EtlError::CsvError(_) => ErrorCategory::Input,
            EtlError::ApiError(_) | EtlError::InvalidResponse { .. } | EtlError::UrlError(_) => {
                ErrorCategory::Network
            }
            EtlError::SerializationError(_) => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ValidationError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Exit status the binaries use for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::InputUnavailable { path, .. } => {
                format!("Check that '{}' exists and is readable", path)
            }
            EtlError::NoHeader => "The input file is empty; it must start with a header row".into(),
            EtlError::ColumnNotFound { column } => format!(
                "Check the spelling and case of '{}' against the CSV header",
                column
            ),
            EtlError::MalformedRow { .. } | EtlError::CsvError(_) => {
                "Every row must have the same number of fields as the header".into()
            }
            EtlError::ApiError(_) | EtlError::InvalidResponse { .. } => {
                "Check the Mattermost URL, port, scheme and token, and that the server is reachable"
                    .into()
            }
            EtlError::UrlError(_) => "Check the Mattermost URL, port and scheme".into(),
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ValidationError { .. } => {
                "Run with --help to see the required parameters and environment variables".into()
            }
            EtlError::IoError(_) | EtlError::SerializationError(_) => {
                "Check disk space and file permissions".into()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Could not process the input table: {}", self),
            ErrorCategory::Network => format!("Could not query Mattermost: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data | ErrorCategory::System => format!("Processing failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
