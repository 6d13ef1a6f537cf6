//! Session state management.
//!
//! [`session_store::SessionStore`] is the single writer of persisted
//! session state.

pub mod session_store;
