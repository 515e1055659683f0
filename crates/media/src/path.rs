//! Storage key and file-name derivation for inbound attachments.

use {
    charla_common::MediaKind,
    chrono::{DateTime, Datelike, Utc},
};

/// Map a MIME type to a file extension, falling back to a per-kind default
/// when the type is unknown. Parameters after `;` are ignored.
#[must_use]
pub fn extension_for_content_type(content_type: &str, kind: MediaKind) -> &'static str {
    let base = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match base.as_str() {
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/png" => ".png",
        "image/webp" => ".webp",
        "image/gif" => ".gif",
        "audio/ogg" => ".ogg",
        "audio/mpeg" => ".mp3",
        "audio/aac" => ".aac",
        "audio/amr" => ".amr",
        "video/mp4" => ".mp4",
        "video/3gpp" => ".3gp",
        "application/pdf" => ".pdf",
        "text/plain" => ".txt",
        _ => match kind {
            MediaKind::Image => ".jpg",
            MediaKind::Audio => {
                if base.contains("ogg") {
                    ".ogg"
                } else {
                    ".mp3"
                }
            },
            MediaKind::Video => ".mp4",
            MediaKind::Document => ".pdf",
        },
    }
}

/// Object key for an attachment: `media/<kind>/<YYYY>/<MM>/<DD>/<id><ext>`.
#[must_use]
pub fn storage_path(
    kind: MediaKind,
    media_id: &str,
    content_type: &str,
    at: DateTime<Utc>,
) -> String {
    let ext = extension_for_content_type(content_type, kind);
    format!(
        "media/{kind}/{:04}/{:02}/{:02}/{media_id}{ext}",
        at.year(),
        at.month(),
        at.day()
    )
}

/// Display file name for an attachment: `<kind>_<id><ext>`.
#[must_use]
pub fn file_name(kind: MediaKind, media_id: &str, content_type: &str) -> String {
    let ext = extension_for_content_type(content_type, kind);
    format!("{kind}_{media_id}{ext}")
}
