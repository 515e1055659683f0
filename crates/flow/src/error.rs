use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] charla_store::Error),

    #[error(transparent)]
    Channel(#[from] charla_whatsapp::Error),

    #[error(transparent)]
    Queue(#[from] charla_queue::Error),
}
