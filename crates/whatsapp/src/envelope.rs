//! Inbound webhook payload shapes for the Cloud API.
//!
//! A webhook delivery nests the interesting part three levels deep:
//! `entry[0].changes[0].value`. Everything beyond the first entry/change is
//! ignored; the platform sends one change per delivery in practice.

use {
    charla_common::MediaKind,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// Pull `entry[0].changes[0].value` out of a raw webhook payload.
#[must_use]
pub fn extract_value(payload: &Value) -> Option<&Value> {
    payload
        .get("entry")?
        .get(0)?
        .get("changes")?
        .get(0)?
        .get("value")
}

/// The `value` object of a message change. `metadata.phone_number_id` names
/// the business number the event arrived on and is echoed back on replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventValue {
    pub metadata: EventMetadata,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub phone_number_id: String,
}

/// One inbound message. Exactly one of the body fields is populated,
/// matching `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub from: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Present when the sender replied to an earlier message.
    #[serde(default)]
    pub context: Option<ReplyContext>,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub image: Option<MediaBody>,
    #[serde(default)]
    pub video: Option<MediaBody>,
    #[serde(default)]
    pub audio: Option<MediaBody>,
    #[serde(default)]
    pub document: Option<MediaBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Attachment stanza shared by image, video, audio and document messages.
/// Fields the platform adds beyond the ones we name land in `extra` and are
/// persisted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaBody {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(flatten)]
    pub extra: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyContext {
    pub id: String,
    #[serde(default)]
    pub from: Option<String>,
}

impl MediaBody {
    /// The full stanza re-serialized, for storing alongside the attachment
    /// record.
    #[must_use]
    pub fn metadata_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl InboundMessage {
    /// The attachment carried by this message, if its kind is one we ingest.
    #[must_use]
    pub fn media(&self) -> Option<(MediaKind, &MediaBody)> {
        match self.kind.as_str() {
            "image" => self.image.as_ref().map(|m| (MediaKind::Image, m)),
            "video" => self.video.as_ref().map(|m| (MediaKind::Video, m)),
            "audio" => self.audio.as_ref().map(|m| (MediaKind::Audio, m)),
            "document" => self.document.as_ref().map(|m| (MediaKind::Document, m)),
            _ => None,
        }
    }

    /// Human-readable body of the message: the text body for text messages,
    /// the caption for captioned attachments, an empty string for uncaptioned
    /// ones, and a placeholder for kinds we do not handle.
    #[must_use]
    pub fn caption(&self) -> String {
        if self.kind == "text" {
            return self
                .text
                .as_ref()
                .map(|t| t.body.clone())
                .unwrap_or_default();
        }
        if let Some((_, body)) = self.media() {
            return body.caption.clone().unwrap_or_default();
        }
        format!("[{} no soportado]", self.kind)
    }

    #[must_use]
    pub fn reply_to(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.id.as_str())
    }
}
