//! Session domain.
//!
//! - [`entities::Session`] — a named, ordered log of exchanges
//! - [`entities::Message`] — a single message within a session
//! - [`selection::ScopeSelection`] — the set of sessions scoping retrieval
//! - [`value_objects::SessionId`] / [`value_objects::MessageId`] — identifiers

pub mod entities;
pub mod selection;
pub mod value_objects;
