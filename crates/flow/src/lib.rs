//! Registration dialogue for unregistered phone numbers.
//!
//! State transitions are a pure function over the device record
//! ([`engine::advance`]); the async [`engine::FlowEngine`] wraps it with
//! persistence, outbound replies and the hand-off of authenticated traffic
//! to the work queue.

pub mod engine;
pub mod error;
pub mod pin;
pub mod prompts;

pub use {
    engine::{FlowEngine, FlowOutcome, advance},
    error::{Error, Result},
    pin::generate_pin,
};
