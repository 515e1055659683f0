use std::sync::Arc;

use {
    charla_store::{DocumentStore, MediaRecord, MessageRecord},
    charla_whatsapp::ChannelClient,
    serde_json::Value,
    tracing::{error, info, warn},
};

use crate::{ObjectStore, Result, VisionClient};

pub const MSG_NOT_FOUND: &str = "No se pudo encontrar el mensaje referenciado.";
pub const MSG_NO_VALUE: &str = "El mensaje referenciado no contiene datos válidos.";
pub const MSG_EMPTY: &str = "El mensaje referenciado está vacío.";
pub const MSG_WRONG_KIND: &str = "Solo se puede extraer texto de imágenes o documentos.";
pub const MSG_NO_MEDIA_ID: &str =
    "No se pudo identificar el archivo multimedia en el mensaje referenciado.";
pub const MSG_DOWNLOAD_FAILED: &str =
    "No se pudo descargar el archivo multimedia para procesamiento OCR.";
pub const MSG_NOT_STORED: &str =
    "No se puede procesar el archivo multimedia porque no está almacenado.";
pub const MSG_STORAGE_ACCESS: &str = "No se pudo acceder al archivo multimedia almacenado.";
pub const MSG_GENERIC_FAILURE: &str = "Ocurrió un error al procesar la solicitud de OCR.";
pub const MSG_NO_TEXT: &str = "No se detectó texto en el archivo.";
pub const OCR_PREFIX: &str = "Texto extraído del archivo:\n\n";

fn ocr_reply(text: &str) -> String {
    if text.is_empty() {
        format!("{OCR_PREFIX}{MSG_NO_TEXT}")
    } else {
        format!("{OCR_PREFIX}{text}")
    }
}

/// Answers a reply-to-"ocr" request: walks from the referenced message id to
/// its attachment, reuses stored extraction results when present, and sends
/// exactly one reply describing the text (or why there is none).
pub struct BackReferenceResolver {
    store:   Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
    vision:  Arc<dyn VisionClient>,
    channel: Arc<dyn ChannelClient>,
}

impl BackReferenceResolver {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        vision: Arc<dyn VisionClient>,
        channel: Arc<dyn ChannelClient>,
    ) -> Self {
        Self {
            store,
            objects,
            vision,
            channel,
        }
    }

    /// Resolve `context_id` and reply to `client_phone`. Unexpected failures
    /// collapse into a generic apology; the user always hears back.
    pub async fn respond(
        &self,
        context_id: &str,
        client_phone: &str,
        business_id: &str,
    ) -> Result<String> {
        let reply = match self.build_reply(context_id).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(context_id, error = %e, "ocr request failed");
                MSG_GENERIC_FAILURE.to_owned()
            },
        };
        self.channel
            .send_text(client_phone, &reply, business_id)
            .await?;
        Ok(reply)
    }

    async fn build_reply(&self, context_id: &str) -> Result<String> {
        let Some(record) = MessageRecord::fetch(&self.store, context_id).await? else {
            warn!(context_id, "referenced message not found");
            return Ok(MSG_NOT_FOUND.into());
        };

        let value = &record.value;
        if value.is_null() || value.as_object().is_some_and(serde_json::Map::is_empty) {
            return Ok(MSG_NO_VALUE.into());
        }

        // The stored value is either a full event or a single message.
        let message = if value.get("type").is_some() {
            value
        } else {
            match value.get("messages").and_then(|m| m.get(0)) {
                Some(message) => message,
                None => return Ok(MSG_EMPTY.into()),
            }
        };

        let kind = message.get("type").and_then(Value::as_str).unwrap_or_default();
        let media_id = match kind {
            "image" => message.get("image"),
            "document" => message.get("document"),
            _ => {
                return Ok(MSG_WRONG_KIND.into());
            },
        }
        .and_then(|m| m.get("id"))
        .and_then(Value::as_str)
        .unwrap_or_default();

        if media_id.is_empty() {
            return Ok(MSG_NO_MEDIA_ID.into());
        }

        let Some(mut media) = MediaRecord::fetch(&self.store, media_id).await? else {
            // Never ingested: fetch straight from the platform and extract
            // without persisting anything.
            warn!(media_id, "no media record, falling back to direct download");
            let bytes = match self.channel.download_media(media_id).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(media_id, error = %e, "fallback download failed");
                    return Ok(MSG_DOWNLOAD_FAILED.into());
                },
            };
            let text = self.vision.extract_text(&bytes).await?;
            return Ok(ocr_reply(&text));
        };

        if !media.ocr_text.is_empty() {
            return Ok(ocr_reply(&media.ocr_text));
        }
        if media.storage_path.is_empty() {
            return Ok(MSG_NOT_STORED.into());
        }

        let bytes = match self.objects.get(&media.storage_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(media_id, storage_path = %media.storage_path, error = %e, "stored object unreadable");
                return Ok(MSG_STORAGE_ACCESS.into());
            },
        };

        let text = self.vision.extract_text(&bytes).await?;
        media.mark_processed(Some(text.clone()), None, None);
        media.save(&self.store).await?;
        info!(media_id, chars = text.len(), "ocr extracted on demand");
        Ok(ocr_reply(&text))
    }
}
