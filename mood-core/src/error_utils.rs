use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        match self {
            CoreError::TwitterApi(e) => {
                e.log_error();
            }
            CoreError::Inference(e) => {
                e.log_error();
            }
            CoreError::Config(e) => {
                e.log_error();
            }
            _ => error!("CoreError: {}", self),
        }
        self
    }

    fn log_warn(&self) -> &Self {
        match self {
            CoreError::TwitterApi(e) => {
                e.log_warn();
            }
            CoreError::Inference(e) => {
                e.log_warn();
            }
            CoreError::Config(e) => {
                e.log_warn();
            }
            _ => warn!("CoreError (warning): {}", self),
        }
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::TwitterApi(e) => e.user_friendly_message(),
            CoreError::Inference(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::UnknownEmotion { label } => format!(
                "The emotion model returned an unsupported label '{}'.",
                label
            ),
            CoreError::InvalidInput { message } => format!("Invalid input: {}", message),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::TwitterApi(e) => e.error_code(),
            CoreError::Inference(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::UnknownEmotion { .. } => "UNKNOWN_EMOTION".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for TwitterApiError {
    fn log_error(&self) -> &Self {
        error!("TwitterApiError: {} ({:?})", self, self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("TwitterApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        let detail = match self {
            TwitterApiError::AuthenticationFailed { .. } => {
                "Authentication failed. Please check your bearer token."
            }
            TwitterApiError::Forbidden { .. } => {
                "Access denied. Your token may not have access to recent search."
            }
            TwitterApiError::RateLimitExceeded { .. } => {
                "Too many requests. Please wait before trying again."
            }
            TwitterApiError::ServerError { .. } => {
                "Twitter is having problems right now. Please try again later."
            }
            TwitterApiError::RequestFailed { .. } => "The request was rejected.",
            TwitterApiError::RequestTimeout => {
                return "Request to Twitter timed out. Please try again.".to_string()
            }
            TwitterApiError::InvalidResponse { .. } => {
                return "Twitter returned a response that could not be read.".to_string()
            }
        };

        match self.status_code() {
            Some(status) => format!("Twitter API Error: {} - {}", status, detail),
            None => format!("Twitter API Error: {}", detail),
        }
    }

    fn error_code(&self) -> String {
        match self {
            TwitterApiError::AuthenticationFailed { .. } => "TWITTER_AUTH_FAILED".to_string(),
            TwitterApiError::Forbidden { .. } => "TWITTER_FORBIDDEN".to_string(),
            TwitterApiError::RateLimitExceeded { .. } => "TWITTER_RATE_LIMIT".to_string(),
            TwitterApiError::ServerError { .. } => "TWITTER_SERVER_ERROR".to_string(),
            TwitterApiError::RequestFailed { .. } => "TWITTER_REQUEST_FAILED".to_string(),
            TwitterApiError::RequestTimeout => "TWITTER_TIMEOUT".to_string(),
            TwitterApiError::InvalidResponse { .. } => "TWITTER_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ClassifierError {
    fn log_error(&self) -> &Self {
        error!("ClassifierError: {} ({:?})", self, self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ClassifierError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ClassifierError::ModelNotFound { path } => format!(
                "Emotion model file '{}' not found. Please download the model first.",
                path
            ),
            ClassifierError::ModelLoadingFailed { .. } => {
                "Failed to load the emotion model. Please check the model files.".to_string()
            }
            ClassifierError::TokenizationFailed { .. } => {
                "A post could not be tokenized for classification.".to_string()
            }
            _ => "Emotion classification failed. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ClassifierError::ModelLoadingFailed { .. } => "MODEL_LOAD_FAILED".to_string(),
            ClassifierError::ModelNotFound { .. } => "MODEL_NOT_FOUND".to_string(),
            ClassifierError::TokenizationFailed { .. } => "TOKENIZATION_FAILED".to_string(),
            ClassifierError::InferenceFailed { .. } => "INFERENCE_FAILED".to_string(),
            ClassifierError::EmptyInput => "INFERENCE_EMPTY_INPUT".to_string(),
            ClassifierError::InvalidScore { .. } => "INFERENCE_INVALID_SCORE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {} ({:?})", self, self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::ValidationFailed { reason } => {
                format!("Configuration is invalid: {}", reason)
            }
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs a failure with its code and the message the user sees.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }

    pub fn report_warning(&self, error: &CoreError) {
        error.log_warn();
        info!("Error code: {}", error.error_code());
    }
}
