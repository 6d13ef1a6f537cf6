//! Delete Material use case.
//!
//! Reconciles a material deletion with the remote store and the local
//! session list. The remote delete is best-effort: whatever the backend
//! says (success, network failure, server error), the local session is
//! removed. The user's intent, "make this disappear from my view", is
//! honored even when the backend is unreachable; a dangling remote record
//! is a recoverable inconsistency, a list that refuses to forget is not.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::rag_gateway::RagGateway;
use crate::store::session_store::{SessionStore, StoreError};
use scribe_domain::SessionId;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a deletion. `remote_warning` carries the backend failure, if
/// any. The caller surfaces it as a warning, never as a failed delete.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub session_id: SessionId,
    pub remote_warning: Option<String>,
}

/// Use case for deleting a session and its remote material.
pub struct DeleteMaterialUseCase {
    store: Arc<SessionStore>,
    gateway: Arc<dyn RagGateway>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl DeleteMaterialUseCase {
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

    /// Execute the deletion. Only a local persistence failure is an error;
    /// remote failures degrade to `remote_warning`.
    pub async fn execute(&self, session_id: &SessionId) -> Result<DeleteOutcome, StoreError> {
        let remote_warning = match self.gateway.delete_material(session_id).await {
            Ok(()) => None,
            Err(error) => {
                warn!(
                    session_id = %session_id,
                    %error,
                    "Remote material delete failed; deleting locally anyway"
                );
                Some(format!(
                    "Material for session {} may remain on the backend: {}",
                    session_id, error
                ))
            }
        };

        // Local deletion runs unconditionally; it also drops the id from
        // the scope selection and repoints the current session.
        self.store.delete_session(session_id)?;

        info!(session_id = %session_id, "Deleted session");
        self.conversation_logger.log(ConversationEvent::new(
            "material_deleted",
            serde_json::json!({
                "sessionId": session_id.as_str(),
                "remoteOk": remote_warning.is_none(),
            }),
        ));

        Ok(DeleteOutcome {
            session_id: session_id.clone(),
            remote_warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::rag_gateway::{
        AskAnswer, AskRequest, GatewayError, HealthStatus, IngestReceipt,
    };
    use crate::ports::state_storage::InMemoryStateStorage;
    use async_trait::async_trait;
    use scribe_domain::IngestItem;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    struct MockGateway {
        deletes: Mutex<Vec<SessionId>>,
        fail_with: Mutex<Option<GatewayError>>,
    }

    impl MockGateway {
        fn succeeding() -> Self {
            Self {
                deletes: Mutex::new(Vec::new()),
                fail_with: Mutex::new(None),
            }
        }

        fn failing(error: GatewayError) -> Self {
            Self {
                deletes: Mutex::new(Vec::new()),
                fail_with: Mutex::new(Some(error)),
            }
        }
    }

    #[async_trait]
    impl RagGateway for MockGateway {
        async fn ingest(
            &self,
            _session_id: &SessionId,
            _items: &[IngestItem],
        ) -> Result<IngestReceipt, GatewayError> {
            Ok(IngestReceipt::default())
        }

        async fn ask(&self, _request: &AskRequest) -> Result<AskAnswer, GatewayError> {
            unimplemented!("not used in delete tests")
        }

        async fn delete_material(&self, session_id: &SessionId) -> Result<(), GatewayError> {
            self.deletes.lock().unwrap().push(session_id.clone());
            if let Some(error) = self.fail_with.lock().unwrap().take() {
                return Err(error);
            }
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
    async fn test_delete_removes_session_locally_and_remotely() {
        let store = store();
        let id = store.create_session("Doomed").unwrap();

        let gateway = Arc::new(MockGateway::succeeding());
        let use_case = DeleteMaterialUseCase::new(store.clone(), gateway.clone());

        let outcome = use_case.execute(&id).await.unwrap();
        assert!(outcome.remote_warning.is_none());
        assert!(store.list_sessions().is_empty());
        assert_eq!(gateway.deletes.lock().unwrap().clone(), vec![id]);
    }

    #[tokio::test]
    async fn test_remote_failure_still_deletes_locally() {
        let store = store();
        let id = store.create_session("Doomed").unwrap();

        let gateway = Arc::new(MockGateway::failing(GatewayError::Rejected {
            status: 500,
            body: "internal error".to_string(),
        }));
        let use_case = DeleteMaterialUseCase::new(store.clone(), gateway);

        let outcome = use_case.execute(&id).await.unwrap();

        // Warning reported AND the session is gone from the local list
        assert!(outcome.remote_warning.is_some());
        assert!(store.list_sessions().iter().all(|s| s.id() != &id));
    }

    #[tokio::test]
    async fn test_unreachable_backend_still_deletes_locally() {
        let store = store();
        let id = store.create_session("Doomed").unwrap();

        let gateway = Arc::new(MockGateway::failing(GatewayError::Unavailable(
            "connection refused".to_string(),
        )));
        let use_case = DeleteMaterialUseCase::new(store.clone(), gateway);

        let outcome = use_case.execute(&id).await.unwrap();
        assert!(outcome.remote_warning.is_some());
        assert!(store.list_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_selected_session_cleans_selection() {
        let store = store();
        let keep = store.create_session("Keep").unwrap();
        let drop = store.create_session("Drop").unwrap();
        store.select_scope(vec![keep.clone(), drop.clone()]).unwrap();

        let gateway = Arc::new(MockGateway::succeeding());
        let use_case = DeleteMaterialUseCase::new(store.clone(), gateway);

        use_case.execute(&drop).await.unwrap();
        assert!(!store.selection().contains(&drop));
        assert_eq!(store.current_session_id(), Some(keep));
    }

    #[tokio::test]
    async fn test_delete_unknown_session_is_a_no_op() {
        let store = store();
        let gateway = Arc::new(MockGateway::succeeding());
        let use_case = DeleteMaterialUseCase::new(store.clone(), gateway);

        let outcome = use_case.execute(&SessionId::new("ghost")).await.unwrap();
        assert!(outcome.remote_warning.is_none());
        assert!(store.list_sessions().is_empty());
    }
}
