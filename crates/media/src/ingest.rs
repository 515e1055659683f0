use std::sync::Arc;

use {
    charla_common::MediaKind,
    charla_queue::MediaRef,
    charla_store::{DocumentStore, MediaRecord},
    charla_whatsapp::{ChannelClient, envelope::MediaBody},
    tracing::{error, info, warn},
};

use crate::{ObjectStore, Result, path};

/// Webhook-time attachment ingestion: download the bytes from the platform,
/// place them in object storage, and create the pending media record that
/// enrichment later completes.
pub struct MediaIngestor {
    channel: Arc<dyn ChannelClient>,
    objects: Arc<dyn ObjectStore>,
    store:   Arc<dyn DocumentStore>,
}

impl MediaIngestor {
    #[must_use]
    pub fn new(
        channel: Arc<dyn ChannelClient>,
        objects: Arc<dyn ObjectStore>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            channel,
            objects,
            store,
        }
    }

    /// Ingest one attachment. Download or upload failures degrade to
    /// `Ok(None)`: the message continues through the pipeline without a
    /// media reference and no record is written. Store failures propagate.
    pub async fn ingest(
        &self,
        phone_number: &str,
        user_id: Option<String>,
        kind: MediaKind,
        body: &MediaBody,
    ) -> Result<Option<MediaRef>> {
        let media_id = body.id.as_str();
        let bytes = match self.channel.download_media(media_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(media_id, error = %e, "attachment download failed");
                return Ok(None);
            },
        };

        let content_type = body
            .mime_type
            .clone()
            .unwrap_or_else(|| kind.default_content_type().to_owned());
        let storage_path = path::storage_path(kind, media_id, &content_type, chrono::Utc::now());
        let file_name = path::file_name(kind, media_id, &content_type);

        if let Err(e) = self.objects.put(&storage_path, &bytes, &content_type).await {
            error!(media_id, storage_path, error = %e, "attachment upload failed");
            return Ok(None);
        }

        let record = MediaRecord::new(
            media_id,
            user_id,
            phone_number,
            kind,
            &storage_path,
            &content_type,
            &file_name,
            body.sha256.clone().unwrap_or_default(),
            body.metadata_value(),
        );
        record.save(&self.store).await?;
        info!(media_id, storage_path, "attachment stored");

        Ok(Some(MediaRef {
            media_id: media_id.to_owned(),
            media_type: kind,
            storage_path,
            content_type,
            file_name,
            sha256: record.sha256.clone(),
            metadata: record.metadata.clone(),
        }))
    }
}
