use std::sync::Arc;

use {
    charla_common::{MediaKind, OCR_COMMAND, truncate_preview},
    charla_queue::{MediaRef, QueueEnvelope},
    charla_store::{DocumentStore, MediaRecord},
    charla_whatsapp::{ChannelClient, envelope::InboundMessage},
    serde_json::Value,
    tracing::{error, info, warn},
};

use crate::{BackReferenceResolver, Error, ObjectStore, Result, VisionClient};

pub const MSG_NO_MEDIA_ID: &str = "ID de media no encontrado";
pub const MSG_NO_RECORD: &str = "Registro de media no encontrado";

/// Outcome of enriching one attachment.
#[derive(Debug, Default)]
struct Enrichment {
    success:       bool,
    message:       String,
    ocr_text:      String,
    description:   String,
    transcription: String,
}

impl Enrichment {
    fn failure(message: &str) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Queue consumer for authenticated traffic: runs content analysis on
/// attachments, completes their records, answers back-reference OCR
/// requests, and always sends exactly one reply per message.
pub struct MediaProcessor {
    store:    Arc<dyn DocumentStore>,
    objects:  Arc<dyn ObjectStore>,
    vision:   Arc<dyn VisionClient>,
    channel:  Arc<dyn ChannelClient>,
    resolver: BackReferenceResolver,
}

impl MediaProcessor {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        vision: Arc<dyn VisionClient>,
        channel: Arc<dyn ChannelClient>,
    ) -> Self {
        let resolver = BackReferenceResolver::new(
            store.clone(),
            objects.clone(),
            vision.clone(),
            channel.clone(),
        );
        Self {
            store,
            objects,
            vision,
            channel,
            resolver,
        }
    }

    /// Process one queue envelope. Duplicate deliveries are harmless: the
    /// enrichment results simply overwrite themselves.
    pub async fn process(&self, envelope: &QueueEnvelope) -> Result<()> {
        let messages = envelope
            .value
            .get("messages")
            .and_then(Value::as_array)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| Error::invalid_envelope("no messages found in payload"))?;
        let message: InboundMessage = serde_json::from_value(messages[0].clone())?;

        let client_phone = message.from.clone();
        let business_id = envelope
            .value
            .get("metadata")
            .and_then(|m| m.get("phone_number_id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .unwrap_or(&envelope.phone_business_id)
            .to_owned();

        // Back-reference OCR request: a text reply saying "ocr".
        if message.kind == "text"
            && message.caption().trim().eq_ignore_ascii_case(OCR_COMMAND)
            && let Some(context_id) = message.reply_to()
        {
            info!(context_id, "ocr request for referenced message");
            self.resolver
                .respond(context_id, &client_phone, &business_id)
                .await?;
            return Ok(());
        }

        let response = match message.media() {
            Some((kind, body)) => {
                let media = match &envelope.media {
                    Some(media) => media.clone(),
                    // Ingestion never ran for this attachment; enrichment
                    // will report the missing record.
                    None => MediaRef {
                        media_id: body.id.clone(),
                        media_type: kind,
                        storage_path: String::new(),
                        content_type: String::new(),
                        file_name: String::new(),
                        sha256: String::new(),
                        metadata: Value::Null,
                    },
                };
                let outcome = self.enrich(&media).await?;
                summary_reply(&message.caption(), kind, &outcome)
            },
            None => format!("Se ha recibido tu mensaje: {}", message.caption()),
        };

        if !client_phone.is_empty() && !business_id.is_empty() {
            self.channel
                .send_text(&client_phone, &response, &business_id)
                .await?;
        }
        Ok(())
    }

    /// Run content analysis for one attachment and complete its record.
    /// Storage or extraction failures degrade to empty results; the record
    /// is still marked processed so the message is never retried forever.
    async fn enrich(&self, media: &MediaRef) -> Result<Enrichment> {
        if media.media_id.is_empty() {
            warn!("media reference without id");
            return Ok(Enrichment::failure(MSG_NO_MEDIA_ID));
        }

        let Some(mut record) = MediaRecord::fetch(&self.store, &media.media_id).await? else {
            warn!(media_id = %media.media_id, "no record for queued attachment");
            return Ok(Enrichment::failure(MSG_NO_RECORD));
        };

        let mut outcome = Enrichment {
            success: true,
            ..Enrichment::default()
        };

        if !media.storage_path.is_empty() {
            match self.objects.get(&media.storage_path).await {
                Ok(bytes) => self.analyze(media.media_type, &bytes, &mut outcome).await,
                Err(e) => {
                    error!(storage_path = %media.storage_path, error = %e, "stored object unreadable");
                },
            }
        }

        record.mark_processed(
            Some(outcome.ocr_text.clone()),
            Some(outcome.description.clone()),
            Some(outcome.transcription.clone()),
        );
        record.save(&self.store).await?;
        info!(media_id = %media.media_id, "attachment enrichment completed");
        Ok(outcome)
    }

    async fn analyze(&self, kind: MediaKind, bytes: &[u8], outcome: &mut Enrichment) {
        match kind {
            MediaKind::Image => match self.vision.extract_text(bytes).await {
                Ok(text) => {
                    outcome.description = format!(
                        "Imagen procesada con OCR - {} caracteres extraídos",
                        text.chars().count()
                    );
                    outcome.ocr_text = text;
                },
                Err(e) => error!(error = %e, "image text extraction failed"),
            },
            MediaKind::Document => match self.vision.extract_text(bytes).await {
                Ok(text) => {
                    outcome.description = format!(
                        "Documento procesado - {} caracteres extraídos",
                        text.chars().count()
                    );
                    outcome.ocr_text = text;
                },
                Err(e) => error!(error = %e, "document text extraction failed"),
            },
            MediaKind::Audio => {
                outcome.transcription =
                    "Funcionalidad de transcripción de audio en desarrollo".into();
            },
            MediaKind::Video => {
                outcome.transcription =
                    "Funcionalidad de transcripción de video en desarrollo".into();
                outcome.description = "Análisis de video en desarrollo".into();
            },
        }
    }
}

fn summary_reply(caption: &str, kind: MediaKind, outcome: &Enrichment) -> String {
    let mut response = format!("Se ha recibido tu mensaje: {caption}\n\n");
    if !outcome.success {
        response.push_str(&format!(
            "No se pudo procesar el archivo multimedia. {}",
            outcome.message
        ));
        return response;
    }
    match kind {
        MediaKind::Image => {
            response.push_str("Análisis de la imagen:\n");
            if !outcome.ocr_text.is_empty() {
                response.push_str(&format!(
                    "- Texto detectado: {}\n",
                    truncate_preview(&outcome.ocr_text, 100)
                ));
            }
            if !outcome.description.is_empty() {
                response.push_str(&format!("- Descripción: {}\n", outcome.description));
            }
        },
        MediaKind::Document => {
            response.push_str("Análisis del documento:\n");
            if !outcome.ocr_text.is_empty() {
                response.push_str(&format!(
                    "- Texto extraído: {}\n",
                    truncate_preview(&outcome.ocr_text, 100)
                ));
            }
        },
        MediaKind::Audio | MediaKind::Video => {
            response.push_str(&format!("Análisis del {kind}:\n"));
            if !outcome.transcription.is_empty() {
                response.push_str(&format!("- Transcripción: {}\n", outcome.transcription));
            }
            if kind == MediaKind::Video && !outcome.description.is_empty() {
                response.push_str(&format!("- Descripción: {}\n", outcome.description));
            }
        },
    }
    response
}

#[cfg(test)]
mod tests {
    use {
        charla_queue::QueueMessage,
        charla_store::{MemoryStore, MessageRecord},
        serde_json::json,
    };

    use crate::testutil::{MemoryObjects, RecordingChannel, StubVision};

    use super::*;

    struct Harness {
        store:     Arc<dyn DocumentStore>,
        objects:   Arc<MemoryObjects>,
        channel:   Arc<RecordingChannel>,
        processor: MediaProcessor,
    }

    fn harness(vision_text: &str) -> Harness {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let objects = Arc::new(MemoryObjects::default());
        let channel = Arc::new(RecordingChannel::default());
        let processor = MediaProcessor::new(
            store.clone(),
            objects.clone(),
            Arc::new(StubVision::new(vision_text)),
            channel.clone(),
        );
        Harness {
            store,
            objects,
            channel,
            processor,
        }
    }

    fn media_ref(kind: MediaKind, media_id: &str, storage_path: &str) -> MediaRef {
        MediaRef {
            media_id: media_id.into(),
            media_type: kind,
            storage_path: storage_path.into(),
            content_type: "image/jpeg".into(),
            file_name: format!("{kind}_{media_id}.jpg"),
            sha256: String::new(),
            metadata: json!({}),
        }
    }

    fn media_envelope(kind: &str, media_id: &str, caption: &str, media: Option<MediaRef>) -> QueueEnvelope {
        let mut message = json!({
            "id": "wamid.1",
            "from": "5215550001",
            "type": kind,
        });
        message[kind] = json!({ "id": media_id, "caption": caption, "mime_type": "image/jpeg" });
        QueueEnvelope {
            message: QueueMessage {
                id: "wamid.1".into(),
                from: "5215550001".into(),
                kind: kind.into(),
                caption: caption.into(),
                media_id: Some(media_id.into()),
            },
            value: json!({
                "metadata": { "phone_number_id": "BIZ1" },
                "messages": [message]
            }),
            phone_business_id: "FALLBACK".into(),
            media,
        }
    }

    fn text_envelope(body: &str, reply_to: Option<&str>) -> QueueEnvelope {
        let mut message = json!({
            "id": "wamid.1",
            "from": "5215550001",
            "type": "text",
            "text": { "body": body }
        });
        if let Some(id) = reply_to {
            message["context"] = json!({ "id": id, "from": "5215550001" });
        }
        QueueEnvelope {
            message: QueueMessage {
                id: "wamid.1".into(),
                from: "5215550001".into(),
                kind: "text".into(),
                caption: body.into(),
                media_id: None,
            },
            value: json!({
                "metadata": { "phone_number_id": "BIZ1" },
                "messages": [message]
            }),
            phone_business_id: "FALLBACK".into(),
            media: None,
        }
    }

    async fn seed_record(h: &Harness, kind: MediaKind, media_id: &str, storage_path: &str) {
        MediaRecord::new(
            media_id,
            Some("u1".into()),
            "5215550001",
            kind,
            storage_path,
            "image/jpeg",
            "image_M1.jpg",
            "",
            json!({}),
        )
        .save(&h.store)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn image_is_enriched_and_summarized() {
        let h = harness("Hello");
        let path = "media/image/2026/08/28/M1.jpg";
        seed_record(&h, MediaKind::Image, "M1", path).await;
        h.objects.put(path, b"jpeg", "image/jpeg").await.unwrap();

        let envelope = media_envelope("image", "M1", "recibo", Some(media_ref(MediaKind::Image, "M1", path)));
        h.processor.process(&envelope).await.unwrap();

        let record = MediaRecord::fetch(&h.store, "M1").await.unwrap().unwrap();
        assert!(record.processed);
        assert_eq!(record.ocr_text, "Hello");
        assert_eq!(record.description, "Imagen procesada con OCR - 5 caracteres extraídos");

        let bodies = h.channel.sent_bodies();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].starts_with("Se ha recibido tu mensaje: recibo\n\n"));
        assert!(bodies[0].contains("Análisis de la imagen:\n"));
        assert!(bodies[0].contains("- Texto detectado: Hello\n"));
        assert!(bodies[0].contains("- Descripción: Imagen procesada con OCR - 5 caracteres extraídos\n"));

        let sent = h.channel.sent.lock().unwrap();
        assert_eq!(sent[0].2, "BIZ1");
    }

    #[tokio::test]
    async fn long_ocr_text_is_truncated_in_reply() {
        let long = "x".repeat(150);
        let h = harness(&long);
        let path = "media/image/2026/08/28/M1.jpg";
        seed_record(&h, MediaKind::Image, "M1", path).await;
        h.objects.put(path, b"jpeg", "image/jpeg").await.unwrap();

        let envelope = media_envelope("image", "M1", "", Some(media_ref(MediaKind::Image, "M1", path)));
        h.processor.process(&envelope).await.unwrap();

        let bodies = h.channel.sent_bodies();
        let expected = format!("- Texto detectado: {}...\n", "x".repeat(100));
        assert!(bodies[0].contains(&expected));

        // the record keeps the full text
        let record = MediaRecord::fetch(&h.store, "M1").await.unwrap().unwrap();
        assert_eq!(record.ocr_text.len(), 150);
    }

    #[tokio::test]
    async fn missing_record_reports_failure() {
        let h = harness("");
        let envelope = media_envelope(
            "image",
            "GHOST",
            "foto",
            Some(media_ref(MediaKind::Image, "GHOST", "media/x.jpg")),
        );
        h.processor.process(&envelope).await.unwrap();

        let bodies = h.channel.sent_bodies();
        assert_eq!(
            bodies[0],
            format!("Se ha recibido tu mensaje: foto\n\nNo se pudo procesar el archivo multimedia. {MSG_NO_RECORD}")
        );
    }

    #[tokio::test]
    async fn envelope_without_media_ref_reports_missing_record() {
        let h = harness("");
        let envelope = media_envelope("image", "M9", "foto", None);
        h.processor.process(&envelope).await.unwrap();

        let bodies = h.channel.sent_bodies();
        assert!(bodies[0].contains(MSG_NO_RECORD));
    }

    #[tokio::test]
    async fn unreadable_object_still_marks_record_processed() {
        let h = harness("nunca");
        seed_record(&h, MediaKind::Image, "M1", "media/image/2026/08/28/M1.jpg").await;

        let envelope = media_envelope(
            "image",
            "M1",
            "foto",
            Some(media_ref(MediaKind::Image, "M1", "media/image/2026/08/28/M1.jpg")),
        );
        h.processor.process(&envelope).await.unwrap();

        let record = MediaRecord::fetch(&h.store, "M1").await.unwrap().unwrap();
        assert!(record.processed);
        assert!(record.ocr_text.is_empty());

        let bodies = h.channel.sent_bodies();
        assert_eq!(bodies[0], "Se ha recibido tu mensaje: foto\n\nAnálisis de la imagen:\n");
    }

    #[tokio::test]
    async fn audio_gets_development_notice() {
        let h = harness("");
        let path = "media/audio/2026/08/28/A1.ogg";
        seed_record(&h, MediaKind::Audio, "A1", path).await;
        h.objects.put(path, b"ogg", "audio/ogg").await.unwrap();

        let mut media = media_ref(MediaKind::Audio, "A1", path);
        media.content_type = "audio/ogg".into();
        let envelope = media_envelope("audio", "A1", "", Some(media));
        h.processor.process(&envelope).await.unwrap();

        let record = MediaRecord::fetch(&h.store, "A1").await.unwrap().unwrap();
        assert!(record.processed);
        assert_eq!(record.transcription, "Funcionalidad de transcripción de audio en desarrollo");

        let bodies = h.channel.sent_bodies();
        assert!(bodies[0].contains("Análisis del audio:\n"));
        assert!(bodies[0].contains("- Transcripción: Funcionalidad de transcripción de audio en desarrollo\n"));
    }

    #[tokio::test]
    async fn video_gets_transcription_and_description() {
        let h = harness("");
        let path = "media/video/2026/08/28/V1.mp4";
        seed_record(&h, MediaKind::Video, "V1", path).await;
        h.objects.put(path, b"mp4", "video/mp4").await.unwrap();

        let envelope = media_envelope("video", "V1", "", Some(media_ref(MediaKind::Video, "V1", path)));
        h.processor.process(&envelope).await.unwrap();

        let bodies = h.channel.sent_bodies();
        assert!(bodies[0].contains("Análisis del video:\n"));
        assert!(bodies[0].contains("- Transcripción: Funcionalidad de transcripción de video en desarrollo\n"));
        assert!(bodies[0].contains("- Descripción: Análisis de video en desarrollo\n"));
    }

    #[tokio::test]
    async fn text_message_is_echoed() {
        let h = harness("");
        h.processor.process(&text_envelope("hola", None)).await.unwrap();
        assert_eq!(h.channel.sent_bodies(), vec!["Se ha recibido tu mensaje: hola".to_owned()]);
    }

    #[tokio::test]
    async fn ocr_reply_routes_to_resolver() {
        let h = harness("should-not-run");
        MessageRecord::new(
            "wamid.ref",
            None,
            json!({ "messages": [{ "id": "wamid.ref", "from": "5215550001", "type": "image",
                                   "image": { "id": "M1" } }] }),
        )
        .create(&h.store)
        .await
        .unwrap();
        let mut record = MediaRecord::new(
            "M1",
            None,
            "5215550001",
            MediaKind::Image,
            "media/image/2026/08/28/M1.jpg",
            "image/jpeg",
            "image_M1.jpg",
            "",
            json!({}),
        );
        record.ocr_text = "Hello".into();
        record.save(&h.store).await.unwrap();

        h.processor
            .process(&text_envelope("OCR", Some("wamid.ref")))
            .await
            .unwrap();

        assert_eq!(
            h.channel.sent_bodies(),
            vec!["Texto extraído del archivo:\n\nHello".to_owned()]
        );
    }

    #[tokio::test]
    async fn ocr_text_without_reference_is_echoed() {
        let h = harness("");
        h.processor.process(&text_envelope("ocr", None)).await.unwrap();
        assert_eq!(h.channel.sent_bodies(), vec!["Se ha recibido tu mensaje: ocr".to_owned()]);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_idempotent() {
        let h = harness("Hello");
        let path = "media/image/2026/08/28/M1.jpg";
        seed_record(&h, MediaKind::Image, "M1", path).await;
        h.objects.put(path, b"jpeg", "image/jpeg").await.unwrap();

        let envelope = media_envelope("image", "M1", "", Some(media_ref(MediaKind::Image, "M1", path)));
        h.processor.process(&envelope).await.unwrap();
        h.processor.process(&envelope).await.unwrap();

        let record = MediaRecord::fetch(&h.store, "M1").await.unwrap().unwrap();
        assert!(record.processed);
        assert_eq!(record.ocr_text, "Hello");
        assert_eq!(h.channel.sent_bodies().len(), 2);
    }

    #[tokio::test]
    async fn envelope_without_messages_is_rejected() {
        let h = harness("");
        let envelope = QueueEnvelope {
            message: QueueMessage {
                id: "wamid.1".into(),
                from: "5215550001".into(),
                kind: "text".into(),
                caption: String::new(),
                media_id: None,
            },
            value: json!({ "metadata": { "phone_number_id": "BIZ1" } }),
            phone_business_id: "BIZ1".into(),
            media: None,
        };
        let err = h.processor.process(&envelope).await.unwrap_err();
        assert!(matches!(err, Error::InvalidEnvelope { .. }));
        assert!(h.channel.sent_bodies().is_empty());
    }
}
