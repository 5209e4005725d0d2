use thiserror::Error as ThisError;

/// Rejections raised locally before any request reaches the store.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
    #[error("Report title cannot be empty.")]
    EmptyTitle,

    #[error("A report is already being submitted.")]
    SubmissionPending,
}

/// Failures reported by (or while talking to) the remote store.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
    #[error("{message}")]
    Remote {
        message: String,
        code: Option<String>,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            code: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
    #[error("missing configuration value {0}")]
    Missing(&'static str),

    #[error("store url must be http(s), got '{0}'")]
    InvalidUrl(String),
}
