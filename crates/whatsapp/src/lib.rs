//! WhatsApp Cloud API surface: inbound webhook envelope types, subscription
//! verification, and the messaging-platform client (send text, download
//! attachments).

pub mod client;
pub mod envelope;
pub mod error;
pub mod verify;

pub use {
    client::{ChannelClient, GraphClient},
    envelope::{EventValue, InboundMessage, MediaBody, ReplyContext, extract_value},
    error::{Error, Result},
    verify::verify_subscription,
};
