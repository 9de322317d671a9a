use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API Error: {0}")]
    Api(#[from] ApiError),
    #[error("Configuration Error: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Preferences Error: {0}")]
    Preferences(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UI Error: {0}")]
    Ui(String),
}

// Remote depth service error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Application(String),
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
