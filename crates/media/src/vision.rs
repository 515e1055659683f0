use async_trait::async_trait;

use crate::{Error, Result};

/// Text extraction over image or document bytes.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Extract the full text found in the file, empty when none is detected.
    async fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Placeholder backend for deployments without an OCR provider. Extraction
/// fails; callers degrade to storing the attachment without text.
pub struct UnconfiguredVision;

#[async_trait]
impl VisionClient for UnconfiguredVision {
    async fn extract_text(&self, _bytes: &[u8]) -> Result<String> {
        Err(Error::vision("no text extraction backend configured"))
    }
}
