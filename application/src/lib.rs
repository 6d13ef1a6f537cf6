//! Application layer for scribe-tutor
//!
//! This crate contains the session store, the use cases, and the port
//! definitions. It depends only on the domain layer.
//!
//! The three core components:
//!
//! - [`SessionStore`]: single authority over the session collection, the
//!   current-session pointer, and the retrieval scope selection. Every
//!   mutation persists through the [`StateStorage`] port before the
//!   in-memory view updates.
//! - [`AskQuestionUseCase`]: per-question orchestration. It decides the
//!   retrieval scope, writes both halves of the exchange, and relays
//!   citations. Failures land in the conversation log as in-band messages.
//! - [`IngestMaterialUseCase`] / [`DeleteMaterialUseCase`]: the material
//!   lifecycle: eager session creation on ingest, best-effort remote delete
//!   with unconditional local delete.

pub mod ports;
pub mod store;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    rag_gateway::{
        AskAnswer, AskRequest, GatewayError, HealthStatus, HistoryEntry, IngestReceipt,
        IngestedItem, RagGateway,
    },
    state_storage::{InMemoryStateStorage, StateStorage, StorageError},
};
pub use store::session_store::{SessionStore, StoreError};
pub use use_cases::ask_question::{
    AskError, AskInput, AskOutcome, AskQuestionUseCase, AskReply, FailureReason,
};
pub use use_cases::delete_material::{DeleteMaterialUseCase, DeleteOutcome};
pub use use_cases::ingest_material::{
    IngestError, IngestMaterialInput, IngestMaterialUseCase, IngestOutcome,
};
