use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Twitter API error: {0}")]
    TwitterApi(#[from] TwitterApiError),

    #[error("Inference error: {0}")]
    Inference(#[from] ClassifierError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unknown emotion label: {label}")]
    UnknownEmotion { label: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum TwitterApiError {
    #[error("Authentication failed (status {status_code})")]
    AuthenticationFailed { status_code: u16 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Rate limit exceeded (retry after {retry_after:?} seconds)")]
    RateLimitExceeded { retry_after: Option<u64> },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Request failed with status {status_code}")]
    RequestFailed { status_code: u16 },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },
}

impl TwitterApiError {
    /// HTTP status the API answered with, when the failure came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TwitterApiError::AuthenticationFailed { status_code }
            | TwitterApiError::ServerError { status_code }
            | TwitterApiError::RequestFailed { status_code } => Some(*status_code),
            TwitterApiError::Forbidden { .. } => Some(403),
            TwitterApiError::RateLimitExceeded { .. } => Some(429),
            TwitterApiError::RequestTimeout | TwitterApiError::InvalidResponse { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model loading failed: {model_path}: {reason}")]
    ModelLoadingFailed { model_path: String, reason: String },

    #[error("Model file not found: {path}")]
    ModelNotFound { path: String },

    #[error("Tokenization failed: {text_length} characters")]
    TokenizationFailed { text_length: usize },

    #[error("Model inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("Cannot classify empty text")]
    EmptyInput,

    #[error("Confidence out of range: {score}")]
    InvalidScore { score: f32 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
