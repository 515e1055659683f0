use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Attachment kinds the platform can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Document,
}

impl MediaKind {
    /// Default content type when the platform does not declare one.
    #[must_use]
    pub fn default_content_type(self) -> &'static str {
        match self {
            Self::Image => "image/jpeg",
            Self::Audio => "audio/ogg",
            Self::Video => "video/mp4",
            Self::Document => "application/pdf",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        };
        f.write_str(s)
    }
}

impl FromStr for MediaKind {
    type Err = UnknownMediaKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            other => Err(UnknownMediaKind(other.to_string())),
        }
    }
}

/// A message type that is not a known attachment kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMediaKind(pub String);

impl fmt::Display for UnknownMediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown media kind: {}", self.0)
    }
}

impl std::error::Error for UnknownMediaKind {}

/// Current time as epoch seconds, the persisted timestamp format.
#[must_use]
pub fn now_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Truncate extracted text to `max` characters for reply previews,
/// appending an ellipsis marker when anything was cut.
#[must_use]
pub fn truncate_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_round_trips_as_lowercase_string() {
        for kind in [
            MediaKind::Image,
            MediaKind::Audio,
            MediaKind::Video,
            MediaKind::Document,
        ] {
            let parsed: MediaKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn media_kind_rejects_unknown_types() {
        assert!("sticker".parse::<MediaKind>().is_err());
        assert!("text".parse::<MediaKind>().is_err());
    }

    #[test]
    fn truncate_preview_keeps_short_text() {
        assert_eq!(truncate_preview("hola", 100), "hola");
    }

    #[test]
    fn truncate_preview_cuts_long_text_with_marker() {
        let long = "x".repeat(150);
        let preview = truncate_preview(&long, 100);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn truncate_preview_counts_chars_not_bytes() {
        let text = "á".repeat(100);
        assert_eq!(truncate_preview(&text, 100), text);
    }
}
