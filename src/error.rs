use thiserror::Error;

/// Every failure the client can surface. The `Display` output is the message shown to
/// the user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not reach the server: {0}")]
    Network(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("Session expired, please login again")]
    Unauthorized,
    #[error("Todo not found")]
    NotFound,
    #[error("{0}")]
    Rejected(String),
    #[error("Something went wrong on the server, please try again later")]
    Server(String),
    #[error("{0}")]
    Validation(&'static str),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Server(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
