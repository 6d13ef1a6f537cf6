//! Infrastructure layer for scribe-tutor
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer, plus configuration file loading.

pub mod config;
pub mod logging;
pub mod rag;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileBackendConfig, FileConfig, FileLoggingConfig, FileStorageConfig,
};
pub use logging::JsonlConversationLogger;
pub use rag::HttpRagClient;
pub use storage::FileStateStorage;
