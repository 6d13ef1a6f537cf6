//! Storage adapters.
//!
//! [`FileStateStorage`] implements the
//! [`StateStorage`](scribe_application::StateStorage) port on top of a
//! single local file.

mod file_state;

pub use file_state::FileStateStorage;
