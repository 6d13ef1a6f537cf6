//! RAG backend adapter.
//!
//! [`HttpRagClient`] implements the
//! [`RagGateway`](scribe_application::RagGateway) port over the backend's
//! HTTP API; [`protocol`] holds the wire request/response shapes.

mod client;
pub(crate) mod protocol;

pub use client::HttpRagClient;
