use thiserror::Error;

/// Failure talking to the weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("{message}")]
    Api { code: u16, message: String },

    /// The response body could not be understood.
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Status reported by the provider, if it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Api { code, .. } => Some(*code),
            ProviderError::Transport(_) | ProviderError::Malformed(_) => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

/// Failure of a single lookup cycle, as shown to the user.
///
/// Every kind of provider failure collapses into one message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ProviderError> for QueryError {
    fn from(err: ProviderError) -> Self {
        QueryError::new(err.to_string())
    }
}
