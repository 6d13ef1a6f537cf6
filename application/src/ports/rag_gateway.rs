//! RAG backend gateway port
//!
//! Defines the interface for communicating with the remote RAG service
//! that owns ingestion, retrieval, and answer synthesis. Adapters live in
//! the infrastructure layer; callers never see raw transport errors.

use async_trait::async_trait;
use scribe_domain::{Citation, IngestItem, Question, Role, SessionId};
use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("RAG backend unreachable: {0}")]
    Unavailable(String),

    #[error("RAG backend rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid response from RAG backend: {0}")]
    InvalidResponse(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,
}

/// One prior exchange line forwarded with a question so the backend can
/// answer conversationally.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// A scoped question for the backend.
///
/// `scope` carries the selected session ids verbatim; an empty scope means
/// the backend searches over all ingested material. There is no partial or
/// default scope in between.
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub question: Question,
    pub scope: Vec<SessionId>,
    pub history: Vec<HistoryEntry>,
    pub top_k: Option<u32>,
}

/// A successful answer with its source citations, order preserved.
#[derive(Debug, Clone)]
pub struct AskAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Per-item ingest summary reported by the backend.
#[derive(Debug, Clone)]
pub struct IngestedItem {
    pub kind: String,
    pub title: String,
    pub chunks: u32,
}

/// Receipt for a completed ingest call.
#[derive(Debug, Clone, Default)]
pub struct IngestReceipt {
    pub items: Vec<IngestedItem>,
    pub total_chunks: u32,
}

/// Backend liveness report.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub model: Option<String>,
}

/// Gateway to the remote RAG service
#[async_trait]
pub trait RagGateway: Send + Sync {
    /// Ingest items into the backend, tagging every produced chunk with
    /// `session_id` so later questions can be scoped to it.
    async fn ingest(
        &self,
        session_id: &SessionId,
        items: &[IngestItem],
    ) -> Result<IngestReceipt, GatewayError>;

    /// Ask a question over the given scope.
    async fn ask(&self, request: &AskRequest) -> Result<AskAnswer, GatewayError>;

    /// Delete all material tagged with `session_id` from the backend.
    async fn delete_material(&self, session_id: &SessionId) -> Result<(), GatewayError>;

    /// Check backend liveness.
    async fn health(&self) -> Result<HealthStatus, GatewayError>;
}
