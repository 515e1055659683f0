use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] charla_store::Error),

    #[error(transparent)]
    Channel(#[from] charla_whatsapp::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The stored object or the storage key is unusable.
    #[error("object storage error: {message}")]
    Storage { message: String },

    /// Text extraction backend failure or not configured.
    #[error("vision error: {message}")]
    Vision { message: String },

    /// A queue envelope that cannot be processed at all.
    #[error("invalid envelope: {message}")]
    InvalidEnvelope { message: String },
}

impl Error {
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn vision(message: impl Into<String>) -> Self {
        Self::Vision {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_envelope(message: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            message: message.into(),
        }
    }
}
