use thiserror::Error;

/// Crate-wide result type for platform operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// The platform answered with an unexpected shape or status.
    #[error("platform error: {message}")]
    Platform { message: String },
}

impl Error {
    #[must_use]
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }
}
