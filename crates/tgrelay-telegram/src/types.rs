//! Bot API wire types and the file-identity extraction applied to upload responses.

use serde::Deserialize;
use serde_json::Value;
use tgrelay_common::models::UploadedFile;

use crate::error::TelegramError;

// ─── Envelope ────────────────────────────────────────────────────────────────

/// Every Bot API answer: `{ ok, result?, description?, error_code? }`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

// ─── Files ───────────────────────────────────────────────────────────────────

/// One size variant of a photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Document, video, audio or animation attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

/// The message produced by a `send*` call, reduced to the attachments we read.
#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
    pub document: Option<FileObject>,
    pub video: Option<FileObject>,
    pub audio: Option<FileObject>,
    pub animation: Option<FileObject>,
}

/// Result of `getFile`. `file_path` is valid for at least an hour.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramFile {
    pub file_id: String,
    pub file_unique_id: Option<String>,
    pub file_size: Option<u64>,
    pub file_path: Option<String>,
}

/// Bytes fetched from a file path.
#[derive(Debug, Clone)]
pub struct Download {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// ─── Extraction ──────────────────────────────────────────────────────────────

/// Pull the stored file's identity out of a raw `send*` response.
///
/// Photos pick the variant with the strictly largest `file_size`; on a tie the
/// earlier variant stays. Other kinds carry a single object.
pub fn extract_uploaded_file(raw: &Value) -> Result<UploadedFile, TelegramError> {
    let result = raw
        .get("result")
        .cloned()
        .ok_or_else(|| TelegramError::Shape("send".into(), "response has no result".into()))?;
    let message: Message = serde_json::from_value(result)?;

    if let Some(photo) = largest_photo(&message.photo) {
        return Ok(UploadedFile {
            file_id: photo.file_id.clone(),
            file_name: photo.file_unique_id.clone(),
        });
    }

    let object = [
        message.document,
        message.video,
        message.audio,
        message.animation,
    ]
    .into_iter()
    .flatten()
    .next()
    .ok_or_else(|| TelegramError::Shape("send".into(), "message carries no file".into()))?;

    let file_name = object
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(object.file_unique_id);
    Ok(UploadedFile {
        file_id: object.file_id,
        file_name,
    })
}

fn largest_photo(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes.iter().fold(None, |best: Option<&PhotoSize>, candidate| match best {
        Some(current) if candidate.file_size.unwrap_or(0) <= current.file_size.unwrap_or(0) => {
            Some(current)
        }
        _ => Some(candidate),
    })
}

/// Final segment of a Bot API file path, e.g. `photos/file_12.jpg` → `file_12.jpg`.
pub fn file_name_from_path(file_path: &str) -> &str {
    file_path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn photo(id: &str, size: u64) -> Value {
        json!({ "file_id": id, "file_unique_id": format!("u-{id}"), "file_size": size, "width": 90, "height": 90 })
    }

    #[test]
    fn photo_picks_strictly_largest_variant() {
        let raw = json!({
            "ok": true,
            "result": {
                "message_id": 7,
                "photo": [photo("small", 1000), photo("big", 5000), photo("mid", 3000)]
            }
        });
        let file = extract_uploaded_file(&raw).unwrap();
        assert_eq!(file.file_id, "big");
        assert_eq!(file.file_name, "u-big");
    }

    #[test]
    fn photo_tie_keeps_first_seen() {
        let raw = json!({
            "ok": true,
            "result": {
                "message_id": 7,
                "photo": [photo("a", 10), photo("first", 5000), photo("second", 5000)]
            }
        });
        assert_eq!(extract_uploaded_file(&raw).unwrap().file_id, "first");
    }

    #[test]
    fn document_uses_its_file_name() {
        let raw = json!({
            "ok": true,
            "result": {
                "message_id": 8,
                "document": { "file_id": "doc-1", "file_unique_id": "u-doc", "file_name": "report.pdf" }
            }
        });
        let file = extract_uploaded_file(&raw).unwrap();
        assert_eq!(file.file_id, "doc-1");
        assert_eq!(file.file_name, "report.pdf");
    }

    #[test]
    fn video_without_name_falls_back_to_unique_id() {
        let raw = json!({
            "ok": true,
            "result": {
                "message_id": 9,
                "video": { "file_id": "vid-1", "file_unique_id": "u-vid" }
            }
        });
        assert_eq!(extract_uploaded_file(&raw).unwrap().file_name, "u-vid");
    }

    #[test]
    fn missing_result_or_file_is_a_shape_error() {
        assert!(matches!(
            extract_uploaded_file(&json!({ "ok": true })),
            Err(TelegramError::Shape(..))
        ));
        assert!(matches!(
            extract_uploaded_file(&json!({ "ok": true, "result": { "message_id": 1 } })),
            Err(TelegramError::Shape(..))
        ));
        assert!(matches!(
            extract_uploaded_file(&json!({ "ok": true, "result": "nope" })),
            Err(TelegramError::Serialisation(_))
        ));
    }

    #[test]
    fn file_name_is_last_path_segment() {
        assert_eq!(file_name_from_path("photos/file_12.jpg"), "file_12.jpg");
        assert_eq!(file_name_from_path("documents/"), "documents");
        assert_eq!(file_name_from_path("plain.bin"), "plain.bin");
    }
}
