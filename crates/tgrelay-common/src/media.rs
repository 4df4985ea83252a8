//! MIME type → Bot API send method routing.

use serde::Serialize;

/// Bot API method used to post an upload into the storage channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SendMethod {
    Photo,
    Video,
    Audio,
    Document,
}

/// Ordered prefix rules; the first match wins, anything else is a document.
const PREFIX_RULES: [(&str, SendMethod); 3] = [
    ("image/", SendMethod::Photo),
    ("video/", SendMethod::Video),
    ("audio/", SendMethod::Audio),
];

impl SendMethod {
    /// Pick the send method for a MIME type. Total over every input string.
    pub fn for_mime(mime: &str) -> Self {
        let mime = mime.trim();
        PREFIX_RULES
            .iter()
            .find(|(prefix, _)| {
                mime.len() >= prefix.len()
                    && mime.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
            })
            .map_or(Self::Document, |(_, method)| *method)
    }

    /// Bot API method name, e.g. `sendPhoto`.
    pub const fn api_method(self) -> &'static str {
        match self {
            Self::Photo => "sendPhoto",
            Self::Video => "sendVideo",
            Self::Audio => "sendAudio",
            Self::Document => "sendDocument",
        }
    }

    /// Multipart field carrying the attachment for this method.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
        }
    }
}
