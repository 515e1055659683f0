//! Work queue between the webhook and the async message processor.
//!
//! The webhook publishes one [`QueueEnvelope`] per inbound message and
//! returns immediately; a consumer picks envelopes up and runs enrichment
//! and flow handling out of band. On the wire an envelope travels as a push
//! delivery: JSON wrapped in base64 under `message.data`, so any
//! Pub/Sub-style broker can carry it unchanged.

pub mod envelope;
pub mod error;
pub mod local;
pub mod publisher;

pub use {
    envelope::{MediaRef, PushEnvelope, QueueEnvelope, QueueMessage},
    error::{Error, Result},
    local::{LocalConsumer, LocalQueue},
    publisher::QueuePublisher,
};
