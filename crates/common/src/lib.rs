//! Shared vocabulary used across all charla crates.

pub mod types;

pub use types::{MediaKind, now_epoch, truncate_preview};

/// Inbound text command that triggers back-reference OCR resolution.
pub const OCR_COMMAND: &str = "ocr";
