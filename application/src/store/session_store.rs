//! Session store: single authority over session state.
//!
//! Owns the ordered session collection, the current-session pointer, and
//! the retrieval scope selection. Every mutation serializes the persisted
//! portion of the state and writes it through the [`StateStorage`] port
//! *before* the in-memory view is updated, so the persisted representation
//! and the in-memory view are never observably divergent: the persisted
//! write is the state transition.
//!
//! Mutations are critical sections guarded by a mutex. None of them spans
//! a network round trip; remote calls happen in the use cases, outside
//! the lock.

use crate::ports::state_storage::{StateStorage, StorageError};
use chrono::{DateTime, Utc};
use scribe_domain::{Citation, Message, MessageId, Role, ScopeSelection, Session, SessionId};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from session store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The targeted session id does not exist, a consistency error on the
    /// caller's side. Local state is left unchanged.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The durable store could not be written or read. Fatal to the
    /// attempted operation only; the in-memory view keeps its last
    /// persisted state.
    #[error("Local storage failure: {0}")]
    Persistence(#[from] StorageError),
}

/// The durable portion of the store state, written back atomically as a
/// unit on every mutation. The scope selection is deliberately absent: it
/// is transient UI state and resets to global on restart.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    sessions: Vec<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_session_id: Option<SessionId>,
}

#[derive(Debug, Default)]
struct StoreState {
    /// Newest session first; display order is recomputed on read.
    sessions: Vec<Session>,
    current: Option<SessionId>,
    selection: ScopeSelection,
}

/// Single authority for reading and mutating sessions, messages, the
/// current-session pointer, and the scope selection.
///
/// Invariant kept by every mutation: when the selection is non-empty, the
/// current-session id is a member of it, so the append target for new
/// messages is always inside the retrieval scope.
pub struct SessionStore {
    storage: Arc<dyn StateStorage>,
    state: Mutex<StoreState>,
}

impl SessionStore {
    /// Open the store, loading previously persisted state if present.
    ///
    /// A missing blob starts an empty store; a corrupt blob is a
    /// [`StoreError::Persistence`]; silently discarding the user's
    /// sessions is worse than refusing to start.
    pub fn open(storage: Arc<dyn StateStorage>) -> Result<Self, StoreError> {
        let state = match storage.load()? {
            Some(bytes) => {
                let persisted: PersistedState = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Corrupt(e.to_string()))?;
                debug!(
                    sessions = persisted.sessions.len(),
                    "Loaded persisted session state"
                );
                StoreState {
                    sessions: persisted.sessions,
                    current: persisted.current_session_id,
                    selection: ScopeSelection::new(),
                }
            }
            None => StoreState::default(),
        };

        Ok(Self {
            storage,
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Serialize and save the candidate state. Called before any in-memory
    /// commit; a failure here aborts the whole mutation.
    fn persist(
        &self,
        sessions: &[Session],
        current: &Option<SessionId>,
    ) -> Result<(), StoreError> {
        let snapshot = PersistedState {
            sessions: sessions.to_vec(),
            current_session_id: current.clone(),
        };
        let bytes =
            serde_json::to_vec_pretty(&snapshot).map_err(|e| StorageError::Save(e.to_string()))?;
        self.storage.save(&bytes)?;
        Ok(())
    }

    /// Create a new session, insert it at the head of the collection, and
    /// make it the current session. Returns the new id.
    pub fn create_session(&self, title: impl Into<String>) -> Result<SessionId, StoreError> {
        let mut state = self.lock();
        self.create_session_locked(&mut state, title.into())
    }

    fn create_session_locked(
        &self,
        state: &mut StoreState,
        title: String,
    ) -> Result<SessionId, StoreError> {
        let session = Session::new(title, Utc::now());
        let id = session.id().clone();

        let mut sessions = state.sessions.clone();
        sessions.insert(0, session);
        let current = Some(id.clone());
        self.persist(&sessions, &current)?;

        // The new session becomes the append target. If a scope was
        // selected it must contain the current session, so the new id
        // joins it.
        let mut selection = state.selection.clone();
        if !selection.is_empty() {
            selection.insert(id.clone());
        }

        state.sessions = sessions;
        state.current = current;
        state.selection = selection;
        debug!(session_id = %id, "Created session");
        Ok(id)
    }

    /// Resolve the current session, creating a default-titled one when the
    /// pointer is unset or dangling. Guarantees messages always have a
    /// session to land in.
    pub fn ensure_session(&self) -> Result<SessionId, StoreError> {
        let mut state = self.lock();
        self.ensure_session_locked(&mut state)
    }

    fn ensure_session_locked(&self, state: &mut StoreState) -> Result<SessionId, StoreError> {
        if let Some(id) = state.current.clone() {
            if state.sessions.iter().any(|s| s.id() == &id) {
                return Ok(id);
            }
            warn!(session_id = %id, "Current session pointer is dangling; starting a new session");
        }
        self.create_session_locked(state, default_session_title(Utc::now()))
    }

    /// Append a message to an existing session.
    ///
    /// Citations are attached to assistant messages only; a user message
    /// never carries them.
    pub fn append_message(
        &self,
        session_id: &SessionId,
        role: Role,
        content: impl Into<String>,
        citations: Vec<Citation>,
    ) -> Result<MessageId, StoreError> {
        let mut state = self.lock();
        self.append_message_locked(&mut state, session_id, role, content.into(), citations)
    }

    fn append_message_locked(
        &self,
        state: &mut StoreState,
        session_id: &SessionId,
        role: Role,
        content: String,
        citations: Vec<Citation>,
    ) -> Result<MessageId, StoreError> {
        let index = state
            .sessions
            .iter()
            .position(|s| s.id() == session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.clone()))?;

        let message = match role {
            Role::User => Message::user(content, Utc::now()),
            Role::Assistant => Message::assistant(content, citations, Utc::now()),
        };
        let message_id = message.id.clone();

        let mut sessions = state.sessions.clone();
        sessions[index].push_message(message);
        self.persist(&sessions, &state.current)?;

        state.sessions = sessions;
        Ok(message_id)
    }

    /// Append a message to the current session, creating one first when
    /// none exists. Returns the session the message landed in together
    /// with the new message id.
    pub fn append_message_to_current(
        &self,
        role: Role,
        content: impl Into<String>,
        citations: Vec<Citation>,
    ) -> Result<(SessionId, MessageId), StoreError> {
        let mut state = self.lock();
        let session_id = self.ensure_session_locked(&mut state)?;
        let message_id =
            self.append_message_locked(&mut state, &session_id, role, content.into(), citations)?;
        Ok((session_id, message_id))
    }

    /// Set or clear the current-session pointer.
    ///
    /// The id is not validated; pointing at a stale id is tolerated and
    /// simply yields no session on read. Setting an id outside a non-empty
    /// selection adds it to the selection; clearing the pointer clears the
    /// selection, so the scope invariant holds either way.
    pub fn set_current_session(&self, id: Option<SessionId>) -> Result<(), StoreError> {
        let mut state = self.lock();

        let mut selection = state.selection.clone();
        match &id {
            Some(id) if !selection.is_empty() && !selection.contains(id) => {
                selection.insert(id.clone());
            }
            None => selection.clear(),
            _ => {}
        }

        self.persist(&state.sessions, &id)?;
        state.current = id;
        state.selection = selection;
        Ok(())
    }

    /// The session the current pointer names, or `None` when unset or
    /// dangling.
    pub fn get_current_session(&self) -> Option<Session> {
        let state = self.lock();
        let current = state.current.as_ref()?;
        state.sessions.iter().find(|s| s.id() == current).cloned()
    }

    pub fn current_session_id(&self) -> Option<SessionId> {
        self.lock().current.clone()
    }

    /// Look up a session by id.
    pub fn get_session(&self, id: &SessionId) -> Option<Session> {
        let state = self.lock();
        state.sessions.iter().find(|s| s.id() == id).cloned()
    }

    /// Delete a session and all its messages. Idempotent: deleting an
    /// unknown id is a no-op.
    ///
    /// The id also leaves the scope selection. When the deleted session
    /// was current, the pointer moves to another selected session if one
    /// remains, otherwise it clears.
    pub fn delete_session(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut state = self.lock();

        if !state.sessions.iter().any(|s| s.id() == id) {
            return Ok(());
        }

        let sessions: Vec<Session> = state
            .sessions
            .iter()
            .filter(|s| s.id() != id)
            .cloned()
            .collect();

        let mut selection = state.selection.clone();
        selection.remove(id);

        let current = match &state.current {
            Some(current) if current == id => selection.first().cloned(),
            other => other.clone(),
        };

        self.persist(&sessions, &current)?;
        state.sessions = sessions;
        state.selection = selection;
        state.current = current;
        debug!(session_id = %id, "Deleted session");
        Ok(())
    }

    /// All sessions, most recent first.
    pub fn list_sessions(&self) -> Vec<Session> {
        let state = self.lock();
        let mut sessions = state.sessions.clone();
        sessions.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        sessions
    }

    /// Replace the scope selection.
    ///
    /// A non-empty selection repoints the current session to a member
    /// (keeping it when it already is one); an empty selection leaves the
    /// pointer alone and means global retrieval.
    pub fn select_scope(
        &self,
        ids: impl IntoIterator<Item = SessionId>,
    ) -> Result<ScopeSelection, StoreError> {
        let mut state = self.lock();
        let selection: ScopeSelection = ids.into_iter().collect();

        let current = if selection.is_empty() {
            state.current.clone()
        } else {
            match &state.current {
                Some(current) if selection.contains(current) => Some(current.clone()),
                _ => selection.first().cloned(),
            }
        };

        if current != state.current {
            self.persist(&state.sessions, &current)?;
            state.current = current;
        }
        state.selection = selection;
        Ok(state.selection.clone())
    }

    /// Clear the selection, returning retrieval to global scope. The
    /// current-session pointer is untouched.
    pub fn clear_scope(&self) {
        self.lock().selection.clear();
    }

    /// The current scope selection.
    pub fn selection(&self) -> ScopeSelection {
        self.lock().selection.clone()
    }
}

/// Title for sessions created implicitly by [`SessionStore::ensure_session`].
fn default_session_title(now: DateTime<Utc>) -> String {
    format!("Session {}", now.format("%Y-%m-%d %H:%M"))
}
