//! HTTP surface: the platform webhook (verification handshake plus inbound
//! events) and the queue push endpoint that drives the async processor.

pub mod routes;
pub mod server;

pub use server::{AppState, Gateway, router, serve};
