//! Ingest Material use case.
//!
//! Bridges material submission to the session store and the remote RAG
//! backend. Ingestion of new material always starts a fresh session rather
//! than reusing the current one: chunks ingested for different materials
//! must never be silently merged into an unrelated prior session's
//! retrieval scope.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::rag_gateway::{GatewayError, IngestReceipt, RagGateway};
use crate::store::session_store::{SessionStore, StoreError};
use scribe_domain::{DomainError, IngestItem, SessionId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No items provided")]
    NoItems,

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The backend refused or never received the material. The session
    /// named here was already created and remains in the local list,
    /// empty; the caller may retry into it or delete it.
    #[error("Ingest failed; session {session_id} was created but received no content: {source}")]
    Remote {
        session_id: SessionId,
        #[source]
        source: GatewayError,
    },
}

/// Input for the [`IngestMaterialUseCase`].
#[derive(Debug, Clone)]
pub struct IngestMaterialInput {
    /// Session title; derived from the first item when absent.
    pub title: Option<String>,
    pub items: Vec<IngestItem>,
}

impl IngestMaterialInput {
    pub fn new(items: Vec<IngestItem>) -> Self {
        Self { title: None, items }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub session_id: SessionId,
    pub receipt: IngestReceipt,
}

/// Use case for ingesting material into a fresh session.
pub struct IngestMaterialUseCase {
    store: Arc<SessionStore>,
    gateway: Arc<dyn RagGateway>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl IngestMaterialUseCase {
    pub fn new(store: Arc<SessionStore>, gateway: Arc<dyn RagGateway>) -> Self {
        Self {
            store,
            gateway,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Create the session that will own the ingested material.
    ///
    /// Always a new session. The returned id tags the remote ingest
    /// request so the backend can scope retrieval to it later.
    pub fn prepare_ingest_session(&self, candidate_title: &str) -> Result<SessionId, StoreError> {
        self.store.create_session(candidate_title)
    }

    /// Execute the ingestion.
    pub async fn execute(&self, input: IngestMaterialInput) -> Result<IngestOutcome, IngestError> {
        if input.items.is_empty() {
            return Err(IngestError::NoItems);
        }
        // All items validate before any state mutation or remote call.
        for item in &input.items {
            item.validate()?;
        }

        let title = input
            .title
            .unwrap_or_else(|| input.items[0].display_title().to_string());
        let session_id = self.prepare_ingest_session(&title)?;

        info!(
            session_id = %session_id,
            items = input.items.len(),
            "Ingesting material"
        );

        match self.gateway.ingest(&session_id, &input.items).await {
            Ok(receipt) => {
                self.conversation_logger.log(ConversationEvent::new(
                    "material_ingested",
                    serde_json::json!({
                        "sessionId": session_id.as_str(),
                        "items": receipt.items.len(),
                        "totalChunks": receipt.total_chunks,
                    }),
                ));
                Ok(IngestOutcome {
                    session_id,
                    receipt,
                })
            }
            Err(source) => {
                warn!(session_id = %session_id, %source, "Remote ingest failed");
                Err(IngestError::Remote { session_id, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::rag_gateway::{AskAnswer, AskRequest, HealthStatus, IngestedItem};
    use crate::ports::state_storage::InMemoryStateStorage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    struct MockGateway {
        ingests: Mutex<Vec<(SessionId, Vec<IngestItem>)>>,
        fail_with: Mutex<Option<GatewayError>>,
    }

    impl MockGateway {
        fn succeeding() -> Self {
            Self {
                ingests: Mutex::new(Vec::new()),
                fail_with: Mutex::new(None),
            }
        }

        fn failing(error: GatewayError) -> Self {
            Self {
                ingests: Mutex::new(Vec::new()),
                fail_with: Mutex::new(Some(error)),
            }
        }

        fn recorded_ingests(&self) -> Vec<(SessionId, Vec<IngestItem>)> {
            self.ingests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RagGateway for MockGateway {
        async fn ingest(
            &self,
            session_id: &SessionId,
            items: &[IngestItem],
        ) -> Result<IngestReceipt, GatewayError> {
            self.ingests
                .lock()
                .unwrap()
                .push((session_id.clone(), items.to_vec()));
            if let Some(error) = self.fail_with.lock().unwrap().take() {
                return Err(error);
            }
            Ok(IngestReceipt {
                items: items
                    .iter()
                    .map(|item| IngestedItem {
                        kind: item.kind().to_string(),
                        title: item.display_title().to_string(),
                        chunks: 3,
                    })
                    .collect(),
                total_chunks: 3 * items.len() as u32,
            })
        }

        async fn ask(&self, _request: &AskRequest) -> Result<AskAnswer, GatewayError> {
            unimplemented!("not used in ingest tests")
        }

        async fn delete_material(&self, _session_id: &SessionId) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn health(&self) -> Result<HealthStatus, GatewayError> {
            Ok(HealthStatus {
                status: "ok".to_string(),
                model: None,
            })
        }
    }

    fn store() -> Arc<SessionStore> {
        Arc::new(SessionStore::open(Arc::new(InMemoryStateStorage::new())).unwrap())
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_ingest_creates_fresh_session_and_tags_request() {
        let store = store();
        let prior = store.create_session("Prior topic").unwrap();

        let gateway = Arc::new(MockGateway::succeeding());
        let use_case = IngestMaterialUseCase::new(store.clone(), gateway.clone());

        let outcome = use_case
            .execute(
                IngestMaterialInput::new(vec![IngestItem::text("notes.txt", "raw text")])
                    .with_title("Lecture notes"),
            )
            .await
            .unwrap();

        // A fresh session, never the prior one
        assert_ne!(outcome.session_id, prior);
        assert_eq!(store.list_sessions().len(), 2);
        assert_eq!(
            store.get_session(&outcome.session_id).unwrap().title(),
            "Lecture notes"
        );

        // The remote call carried the new session id
        let ingests = gateway.recorded_ingests();
        assert_eq!(ingests.len(), 1);
        assert_eq!(ingests[0].0, outcome.session_id);
        assert_eq!(outcome.receipt.total_chunks, 3);
    }

    #[tokio::test]
    async fn test_title_falls_back_to_first_item() {
        let store = store();
        let gateway = Arc::new(MockGateway::succeeding());
        let use_case = IngestMaterialUseCase::new(store.clone(), gateway);

        let outcome = use_case
            .execute(IngestMaterialInput::new(vec![IngestItem::pdf(
                "chapter1.pdf",
                "JVBERi0=",
            )]))
            .await
            .unwrap();

        assert_eq!(
            store.get_session(&outcome.session_id).unwrap().title(),
            "chapter1.pdf"
        );
    }

    #[tokio::test]
    async fn test_no_items_rejected_before_any_mutation() {
        let store = store();
        let gateway = Arc::new(MockGateway::succeeding());
        let use_case = IngestMaterialUseCase::new(store.clone(), gateway.clone());

        let result = use_case.execute(IngestMaterialInput::new(Vec::new())).await;
        assert!(matches!(result, Err(IngestError::NoItems)));
        assert!(store.list_sessions().is_empty());
        assert!(gateway.recorded_ingests().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_item_rejected_before_any_mutation() {
        let store = store();
        let gateway = Arc::new(MockGateway::succeeding());
        let use_case = IngestMaterialUseCase::new(store.clone(), gateway.clone());

        let result = use_case
            .execute(IngestMaterialInput::new(vec![
                IngestItem::text("ok.txt", "fine"),
                IngestItem::pdf("broken.pdf", ""),
            ]))
            .await;

        assert!(matches!(
            result,
            Err(IngestError::Invalid(DomainError::InvalidIngestItem(_)))
        ));
        assert!(store.list_sessions().is_empty());
        assert!(gateway.recorded_ingests().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_reports_the_orphaned_session() {
        let store = store();
        let gateway = Arc::new(MockGateway::failing(GatewayError::Rejected {
            status: 500,
            body: "extractor crashed".to_string(),
        }));
        let use_case = IngestMaterialUseCase::new(store.clone(), gateway);

        let result = use_case
            .execute(IngestMaterialInput::new(vec![IngestItem::text(
                "notes.txt",
                "text",
            )]))
            .await;

        let Err(IngestError::Remote { session_id, .. }) = result else {
            panic!("Expected IngestError::Remote");
        };

        // The session was created, remains listed, and holds no messages;
        // the caller is told ingestion failed and may retry or delete it.
        let session = store.get_session(&session_id).unwrap();
        assert!(session.messages().is_empty());
        assert_eq!(store.list_sessions().len(), 1);
    }
}
