use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Load failure: {0}")]
    LoadFailure(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Stale response: {0}")]
    StaleResponse(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::LoadFailure(_) => "LOAD_FAILURE",
            AppError::NetworkError(_) => "NETWORK_ERROR",
            AppError::DecodeError(_) => "DECODE_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InvalidTransition(_) => "INVALID_TRANSITION",
            AppError::StaleResponse(_) => "STALE_RESPONSE",
            AppError::ChannelClosed(_) => "CHANNEL_CLOSED",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NetworkError(err.to_string())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DecodeError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
