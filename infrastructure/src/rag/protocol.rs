//! Wire protocol types for the RAG backend HTTP API.
//!
//! Request bodies borrow from the port-level types; response bodies are
//! deserialized leniently (missing optional fields default) and converted
//! into the strict port types before leaving this module.

use scribe_application::{AskAnswer, HealthStatus, HistoryEntry, IngestReceipt, IngestedItem};
use scribe_domain::{Citation, IngestItem, Role};
use serde::{Deserialize, Serialize};

/// Body for `POST /api/ingest`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IngestRequestBody<'a> {
    pub items: &'a [IngestItem],
    pub session_id: &'a str,
}

/// Body for `POST /api/ask`.
///
/// `sessionIds` is omitted entirely when the scope is empty; absence is
/// what signals global search to the backend.
#[derive(Debug, Serialize)]
pub(crate) struct AskRequestBody<'a> {
    pub question: &'a str,
    #[serde(rename = "sessionIds", skip_serializing_if = "Vec::is_empty")]
    pub session_ids: Vec<&'a str>,
    #[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conversation: Vec<ConversationEntryBody<'a>>,
}

/// One prior exchange line in an ask request.
#[derive(Debug, Serialize)]
pub(crate) struct ConversationEntryBody<'a> {
    pub role: Role,
    pub content: &'a str,
}

impl<'a> ConversationEntryBody<'a> {
    pub fn from_history(history: &'a [HistoryEntry]) -> Vec<Self> {
        history
            .iter()
            .map(|entry| Self {
                role: entry.role,
                content: &entry.content,
            })
            .collect()
    }
}

/// Response body for `POST /api/ask`.
#[derive(Debug, Deserialize)]
pub(crate) struct AskResponseBody {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<CitationBody>,
}

impl From<AskResponseBody> for AskAnswer {
    fn from(body: AskResponseBody) -> Self {
        Self {
            answer: body.answer,
            citations: body.citations.into_iter().map(Citation::from).collect(),
        }
    }
}

/// A citation as the backend reports it. Fields default individually so a
/// sparse citation degrades instead of failing the whole answer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CitationBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chunk_index: u32,
    #[serde(default)]
    pub content: String,
}

impl From<CitationBody> for Citation {
    fn from(body: CitationBody) -> Self {
        Self {
            title: body.title,
            chunk_index: body.chunk_index,
            content: body.content,
        }
    }
}

/// Response body for `POST /api/ingest`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IngestResponseBody {
    pub ingested: Vec<IngestedItemBody>,
    pub total_chunks: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IngestedItemBody {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chunks: u32,
}

impl From<IngestResponseBody> for IngestReceipt {
    fn from(body: IngestResponseBody) -> Self {
        Self {
            items: body
                .ingested
                .into_iter()
                .map(|item| IngestedItem {
                    kind: item.kind,
                    title: item.title,
                    chunks: item.chunks,
                })
                .collect(),
            total_chunks: body.total_chunks,
        }
    }
}

/// Response body for `GET /api/health`.
#[derive(Debug, Deserialize)]
pub(crate) struct HealthBody {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model: Option<String>,
}

impl From<HealthBody> for HealthStatus {
    fn from(body: HealthBody) -> Self {
        Self {
            status: body.status,
            model: body.model,
        }
    }
}
