use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with HTTP {status}")]
    Http { status: u16 },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(#[from] ApiError),
    #[error("{0}")]
    Validation(String),
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),
    #[error("not allowed while the quiz is {0}")]
    InvalidPhase(&'static str),
}

impl ClientError {
    /// Server-provided rejection message, if this is an application-level failure.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected(err) => Some(err.message.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
