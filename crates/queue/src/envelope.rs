use {
    base64::Engine,
    charla_common::MediaKind,
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::Result;

/// Unit of work handed to the async processor: the inbound message, the raw
/// platform event it arrived in, and (when the message carried an
/// attachment) a pointer to the already-stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEnvelope {
    pub message: QueueMessage,
    /// The platform `value` object, verbatim.
    pub value: Value,
    /// Business number the event arrived on; replies go out through it.
    pub phone_business_id: String,
    #[serde(default)]
    pub media: Option<MediaRef>,
}

/// The inbound message, reduced to what the processor needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub id: String,
    pub from: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub media_id: Option<String>,
}

/// Pointer to an attachment that ingestion already placed in object storage.
/// The processor re-reads the object from `storage_path`; it never goes back
/// to the platform for the bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    pub media_id: String,
    pub media_type: MediaKind,
    pub storage_path: String,
    pub content_type: String,
    pub file_name: String,
    #[serde(default)]
    pub sha256: String,
    #[serde(default)]
    pub metadata: Value,
}

/// Push-delivery wrapper: the envelope JSON, base64-encoded under
/// `message.data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: PushData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushData {
    pub data: String,
}

impl QueueEnvelope {
    /// Wrap the envelope for push delivery.
    pub fn encode_push(&self) -> Result<PushEnvelope> {
        let json = serde_json::to_vec(self)?;
        Ok(PushEnvelope {
            message: PushData {
                data: base64::engine::general_purpose::STANDARD.encode(json),
            },
        })
    }

    /// Unwrap a push delivery back into an envelope.
    pub fn decode_push(push: &PushEnvelope) -> Result<Self> {
        let json = base64::engine::general_purpose::STANDARD.decode(&push.message.data)?;
        Ok(serde_json::from_slice(&json)?)
    }
}
