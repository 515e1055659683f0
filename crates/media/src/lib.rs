//! Attachment pipeline: synchronous ingestion at webhook time (download,
//! object storage, pending record), asynchronous enrichment off the work
//! queue (OCR, summaries, one reply per message), and the reply-to-"ocr"
//! back-reference flow.

pub mod error;
pub mod ingest;
pub mod object_store;
pub mod path;
pub mod process;
pub mod resolve;
pub mod vision;

#[cfg(test)]
pub(crate) mod testutil;

pub use {
    error::{Error, Result},
    ingest::MediaIngestor,
    object_store::{FsObjectStore, ObjectStore},
    process::MediaProcessor,
    resolve::BackReferenceResolver,
    vision::{UnconfiguredVision, VisionClient},
};
