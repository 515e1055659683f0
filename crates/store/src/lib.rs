//! Persistence layer: the `DocumentStore` trait, an in-memory implementation,
//! and the typed records kept by the conversational core (devices, users,
//! messages, media).

pub mod device;
pub mod error;
pub mod media;
pub mod memory;
pub mod message;
pub mod store;
pub mod user;

pub use {
    device::{Device, FlowState},
    error::{Error, Result},
    media::MediaRecord,
    memory::MemoryStore,
    message::MessageRecord,
    store::{DocumentStore, collections},
    user::User,
};
