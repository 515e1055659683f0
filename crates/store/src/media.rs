use std::sync::Arc;

use {
    charla_common::{MediaKind, now_epoch},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::{Result, store::{DocumentStore, collections}};

/// Metadata and extraction results for one inbound attachment, keyed by the
/// platform attachment id. Created when the attachment is first uploaded to
/// object storage; the async processor later fills the content fields and
/// flips `processed`. The storage path is never rewritten after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub media_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub phone_number: String,
    pub media_type: MediaKind,
    pub storage_path: String,
    pub content_type: String,
    pub file_name: String,
    #[serde(default)]
    pub ocr_text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub processed: bool,
    pub created_at: i64,
    #[serde(default)]
    pub sha256: String,
    /// Raw platform metadata for the attachment, kept verbatim.
    #[serde(default)]
    pub metadata: Value,
}

impl MediaRecord {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        media_id: impl Into<String>,
        user_id: Option<String>,
        phone_number: impl Into<String>,
        media_type: MediaKind,
        storage_path: impl Into<String>,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
        sha256: impl Into<String>,
        metadata: Value,
    ) -> Self {
        Self {
            media_id: media_id.into(),
            user_id,
            phone_number: phone_number.into(),
            media_type,
            storage_path: storage_path.into(),
            content_type: content_type.into(),
            file_name: file_name.into(),
            ocr_text: String::new(),
            description: String::new(),
            transcription: String::new(),
            processed: false,
            created_at: now_epoch(),
            sha256: sha256.into(),
            metadata,
        }
    }

    /// Persist the record. Upsert semantics: re-saving an existing attachment
    /// id overwrites the previous document and must not fail.
    pub async fn save(&self, store: &Arc<dyn DocumentStore>) -> Result<()> {
        store
            .set(
                collections::MEDIA,
                &self.media_id,
                serde_json::to_value(self)?,
            )
            .await
    }

    pub async fn fetch(store: &Arc<dyn DocumentStore>, media_id: &str) -> Result<Option<Self>> {
        let Some(doc) = store.get(collections::MEDIA, media_id).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(doc)?))
    }

    /// Record analysis results and flip `processed`. Only non-empty results
    /// overwrite their field, and re-invocation on an already-processed
    /// record is allowed; the caller may run enrichment twice on duplicate
    /// queue delivery.
    pub fn mark_processed(
        &mut self,
        ocr_text: Option<String>,
        description: Option<String>,
        transcription: Option<String>,
    ) {
        if let Some(text) = ocr_text.filter(|t| !t.is_empty()) {
            self.ocr_text = text;
        }
        if let Some(text) = description.filter(|t| !t.is_empty()) {
            self.description = text;
        }
        if let Some(text) = transcription.filter(|t| !t.is_empty()) {
            self.transcription = text;
        }
        self.processed = true;
    }
}
