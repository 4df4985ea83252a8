//! Uploaded-file identity and the upload response.

use serde::{Deserialize, Serialize};

/// Route prefix under which stored files are served.
pub const FILE_ROUTE_PREFIX: &str = "/api/file";

/// Identity of a file stored in the messaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Opaque backend-assigned id; the public retrieval key.
    pub file_id: String,
    /// Best-effort name; the backend's unique id when it returns none.
    pub file_name: String,
}

/// Body returned to the uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub code: u16,
    pub name: String,
}

/// Path under which `file_id` is served, also the key of its rating record.
pub fn retrieval_path(file_id: &str) -> String {
    format!("{FILE_ROUTE_PREFIX}/{file_id}")
}

/// Absolute retrieval URL for `file_id` under `origin`.
pub fn retrieval_url(origin: &str, file_id: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), retrieval_path(file_id))
}
