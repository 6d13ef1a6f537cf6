//! Configuration loading.
//!
//! [`FileConfig`] mirrors the TOML config file structure;
//! [`ConfigLoader`] discovers and merges the config sources.

mod file_config;
mod loader;

pub use file_config::{FileBackendConfig, FileConfig, FileLoggingConfig, FileStorageConfig};
pub use loader::ConfigLoader;
