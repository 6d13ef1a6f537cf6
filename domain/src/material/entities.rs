//! Material ingest entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A unit of content submitted for ingestion into the RAG backend.
///
/// The variants mirror the backend's accepted item kinds. Serialization
/// matches the wire shape: a `type` tag plus kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IngestItem {
    #[serde(rename_all = "camelCase")]
    Pdf { name: String, data_base64: String },
    Text { name: String, text: String },
    Youtube {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
}

impl IngestItem {
    pub fn pdf(name: impl Into<String>, data_base64: impl Into<String>) -> Self {
        Self::Pdf {
            name: name.into(),
            data_base64: data_base64.into(),
        }
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn youtube(url: impl Into<String>, title: Option<String>) -> Self {
        Self::Youtube {
            url: url.into(),
            title,
        }
    }

    /// Check that the item carries the payload its kind requires.
    ///
    /// Runs before any session is created or any remote call is made, so a
    /// malformed item never leaves partial state behind.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Pdf { data_base64, .. } if data_base64.trim().is_empty() => Err(
                DomainError::InvalidIngestItem("PDF missing dataBase64".to_string()),
            ),
            Self::Youtube { url, .. } if url.trim().is_empty() => Err(
                DomainError::InvalidIngestItem("YouTube missing url".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Human-readable title for this item, falling back to the URL for
    /// untitled videos.
    pub fn display_title(&self) -> &str {
        match self {
            Self::Pdf { name, .. } | Self::Text { name, .. } => name,
            Self::Youtube { url, title } => title.as_deref().unwrap_or(url),
        }
    }

    /// The wire kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pdf { .. } => "pdf",
            Self::Text { .. } => "text",
            Self::Youtube { .. } => "youtube",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_requires_payload() {
        let item = IngestItem::pdf("notes.pdf", "");
        assert!(item.validate().is_err());

        let item = IngestItem::pdf("notes.pdf", "JVBERi0xLjQ=");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_youtube_requires_url() {
        let item = IngestItem::youtube("", Some("Lecture 1".to_string()));
        assert!(item.validate().is_err());

        let item = IngestItem::youtube("https://youtube.com/watch?v=abc", None);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_wire_shape_pdf() {
        let item = IngestItem::pdf("file.pdf", "AAAA");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "pdf");
        assert_eq!(json["name"], "file.pdf");
        assert_eq!(json["dataBase64"], "AAAA");
    }

    #[test]
    fn test_wire_shape_youtube_omits_missing_title() {
        let item = IngestItem::youtube("https://youtube.com/watch?v=abc", None);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "youtube");
        assert!(json.get("title").is_none());
    }

    #[test]
    fn test_display_title_fallback() {
        let item = IngestItem::youtube("https://youtube.com/watch?v=abc", None);
        assert_eq!(item.display_title(), "https://youtube.com/watch?v=abc");

        let item = IngestItem::youtube("https://youtube.com/watch?v=abc", Some("Lecture".into()));
        assert_eq!(item.display_title(), "Lecture");
    }
}
