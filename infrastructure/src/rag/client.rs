//! HTTP client for the RAG backend.
//!
//! Implements the [`RagGateway`] port against the backend's JSON API.
//! Every transport failure is translated into a [`GatewayError`] here;
//! callers never see a raw `reqwest` error. The client carries an explicit
//! request deadline; hitting it surfaces as [`GatewayError::Timeout`].

use crate::rag::protocol::{
    AskRequestBody, AskResponseBody, ConversationEntryBody, HealthBody, IngestRequestBody,
    IngestResponseBody,
};
use async_trait::async_trait;
use scribe_application::{
    AskAnswer, AskRequest, GatewayError, HealthStatus, IngestReceipt, RagGateway,
};
use scribe_domain::{IngestItem, SessionId};
use std::time::Duration;
use tracing::debug;

/// Default deadline for backend calls. Answer synthesis can be slow on a
/// local model, so this is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// `reqwest`-based adapter for the RAG backend.
pub struct HttpRagClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRagClient {
    /// Create a client for the backend at `base_url` with the given
    /// request deadline.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Unavailable(error.to_string())
        }
    }

    /// Turn a non-2xx response into [`GatewayError::Rejected`], keeping
    /// the error body the backend sent.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RagGateway for HttpRagClient {
    async fn ingest(
        &self,
        session_id: &SessionId,
        items: &[IngestItem],
    ) -> Result<IngestReceipt, GatewayError> {
        let body = IngestRequestBody {
            items,
            session_id: session_id.as_str(),
        };

        debug!(items = items.len(), "POST /api/ingest");
        let response = self
            .client
            .post(self.url("/api/ingest"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = Self::check_status(response).await?;

        let body: IngestResponseBody = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(body.into())
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskAnswer, GatewayError> {
        let body = AskRequestBody {
            question: request.question.content(),
            session_ids: request.scope.iter().map(|id| id.as_str()).collect(),
            top_k: request.top_k,
            conversation: ConversationEntryBody::from_history(&request.history),
        };

        debug!(scope = request.scope.len(), "POST /api/ask");
        let response = self
            .client
            .post(self.url("/api/ask"))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = Self::check_status(response).await?;

        let body: AskResponseBody = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(body.into())
    }

    async fn delete_material(&self, session_id: &SessionId) -> Result<(), GatewayError> {
        debug!(session_id = %session_id, "DELETE /api/materials");
        let response = self
            .client
            .delete(self.url(&format!("/api/materials/{}", session_id)))
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await
            .map_err(Self::transport_error)?;
        let response = Self::check_status(response).await?;

        let body: HealthBody = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = HttpRagClient::new("http://localhost:5000/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.url("/api/ask"), "http://localhost:5000/api/ask");

        let client = HttpRagClient::new("http://localhost:5000", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.url("/api/ask"), "http://localhost:5000/api/ask");
    }

    #[test]
    fn test_material_delete_url_embeds_session_id() {
        let client = HttpRagClient::new("http://localhost:5000", DEFAULT_TIMEOUT).unwrap();
        let id = SessionId::new("abc-123");
        assert_eq!(
            client.url(&format!("/api/materials/{}", id)),
            "http://localhost:5000/api/materials/abc-123"
        );
    }
}
