use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `status` field carried by every admin mutation response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    #[serde(other)]
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEnvelope {
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusEnvelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }

    /// Splits the envelope into the server message on success or an [`ApiError`].
    pub fn into_result(self) -> Result<Option<String>, ApiError> {
        match self.status {
            ActionStatus::Success => Ok(self.message),
            ActionStatus::Error => Err(ApiError::new(
                self.message.unwrap_or_else(|| "Unknown error".to_string()),
            )),
        }
    }
}

/// Application-level rejection reported by the server. Messages are shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
