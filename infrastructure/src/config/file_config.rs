//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every field has a default so a missing file, section, or key never
//! blocks startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// RAG backend connection settings
    pub backend: FileBackendConfig,
    /// Local state persistence settings
    pub storage: FileStorageConfig,
    /// Conversation transcript settings
    pub logging: FileLoggingConfig,
}

/// `[backend]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL of the RAG backend.
    pub base_url: String,
    /// Request deadline in seconds for backend calls.
    pub timeout_secs: u64,
    /// Retrieval depth sent with every question; the backend applies its
    /// own default when absent.
    pub top_k: Option<u32>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 120,
            top_k: None,
        }
    }
}

/// `[storage]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Where the session state file lives. Defaults to
    /// `<data dir>/scribe-tutor/sessions.json`.
    pub state_path: Option<PathBuf>,
}

impl FileStorageConfig {
    /// Resolve the state file path, falling back to the platform data
    /// directory (or the working directory when none exists).
    pub fn resolved_state_path(&self) -> PathBuf {
        if let Some(path) = &self.state_path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scribe-tutor")
            .join("sessions.json")
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Whether to write the JSONL conversation transcript.
    pub conversation_log: bool,
    /// Where the transcript lives. Defaults to
    /// `<data dir>/scribe-tutor/conversation.jsonl`.
    pub conversation_log_path: Option<PathBuf>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            conversation_log: true,
            conversation_log_path: None,
        }
    }
}

impl FileLoggingConfig {
    /// Resolve the transcript path, falling back to the platform data
    /// directory (or the working directory when none exists).
    pub fn resolved_log_path(&self) -> PathBuf {
        if let Some(path) = &self.conversation_log_path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scribe-tutor")
            .join("conversation.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.backend.timeout_secs, 120);
        assert!(config.backend.top_k.is_none());
        assert!(config.logging.conversation_log);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [backend]
            base_url = "http://tutor.local:8000"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://tutor.local:8000");
        assert_eq!(config.backend.timeout_secs, 120);
        assert!(config.storage.state_path.is_none());
    }

    #[test]
    fn test_explicit_state_path_wins() {
        let config = FileStorageConfig {
            state_path: Some(PathBuf::from("/tmp/custom.json")),
        };
        assert_eq!(
            config.resolved_state_path(),
            PathBuf::from("/tmp/custom.json")
        );
    }
}
