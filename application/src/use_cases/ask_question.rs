//! Ask Question use case.
//!
//! Orchestrates a single question: decides the retrieval scope, writes
//! both halves of the exchange into the session log, and relays citations.
//!
//! Each question moves through `Idle → Pending → Answered | Failed`. An
//! empty question is rejected while still idle. Once pending, the session
//! the user message landed in is snapshotted as the append anchor for the
//! whole flight; repointing the current session mid-flight cannot split
//! the exchange across sessions. Remote failures are not surfaced as bare
//! errors: the session still gains an assistant message with a failure
//! notice, so the log remains a complete record of what was attempted.
//!
//! Only one question may be pending at a time per orchestrator instance; a
//! concurrent ask is rejected rather than interleaved. There is no retry
//! loop here; a retry is a fresh user-initiated question.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::rag_gateway::{AskRequest, GatewayError, HistoryEntry, RagGateway};
use crate::store::session_store::{SessionStore, StoreError};
use scribe_domain::{Citation, DomainError, MessageId, Question, Role, SessionId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that reject a question before it reaches the session log.
#[derive(Error, Debug)]
pub enum AskError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("A question is already pending")]
    Busy,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a question failed after reaching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Unavailable,
    Rejected,
    Timeout,
    Cancelled,
}

/// The terminal state of a question's flight.
#[derive(Debug, Clone)]
pub enum AskReply {
    Answered {
        answer: String,
        citations: Vec<Citation>,
    },
    /// The backend call failed; `notice` is the in-band assistant message
    /// that was appended in place of an answer.
    Failed {
        reason: FailureReason,
        notice: String,
    },
}

/// Result of a completed flight: both message halves and where they
/// landed.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub session_id: SessionId,
    pub question_message_id: MessageId,
    pub reply_message_id: MessageId,
    pub reply: AskReply,
}

impl AskOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self.reply, AskReply::Answered { .. })
    }
}

/// Input for the [`AskQuestionUseCase`].
#[derive(Debug, Clone)]
pub struct AskInput {
    /// The user's question, validated (trimmed non-empty) on execute.
    pub question: String,
    /// How many chunks the backend should retrieve; `None` uses its default.
    pub top_k: Option<u32>,
    /// Cancelling this token abandons the backend call; the flight still
    /// terminates as `Failed` with an in-band notice.
    pub cancel: CancellationToken,
}

impl AskInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Use case for asking a scoped question.
pub struct AskQuestionUseCase {
    store: Arc<SessionStore>,
    gateway: Arc<dyn RagGateway>,
    conversation_logger: Arc<dyn ConversationLogger>,
    pending: AtomicBool,
}

impl AskQuestionUseCase {
    pub fn new(store: Arc<SessionStore>, gateway: Arc<dyn RagGateway>) -> Self {
        Self {
            store,
            gateway,
            conversation_logger: Arc::new(NoConversationLogger),
            pending: AtomicBool::new(false),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Execute one question flight.
    pub async fn execute(&self, input: AskInput) -> Result<AskOutcome, AskError> {
        // Validation happens while still idle: no state is touched yet.
        let question = Question::try_new(input.question)?;

        let _flight = FlightGuard::acquire(&self.pending).ok_or(AskError::Busy)?;

        // Scope snapshot: the selected ids go out verbatim; an empty
        // selection means global search. This is the only scoping rule.
        let scope = self.store.selection().to_vec();

        // The user message may itself create a session. Whatever id comes
        // back anchors the rest of the flight.
        let (session_id, question_message_id) =
            self.store
                .append_message_to_current(Role::User, question.content(), Vec::new())?;

        let history = self.history_before_question(&session_id);

        info!(
            session_id = %session_id,
            scope = scope.len(),
            "Asking question"
        );
        self.conversation_logger.log(ConversationEvent::new(
            "question_asked",
            serde_json::json!({
                "sessionId": session_id.as_str(),
                "scope": scope.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
                "question": question.content(),
            }),
        ));

        let request = AskRequest {
            question,
            scope,
            history,
            top_k: input.top_k,
        };

        let result = tokio::select! {
            _ = input.cancel.cancelled() => Err(GatewayError::Cancelled),
            result = self.gateway.ask(&request) => result,
        };

        match result {
            Ok(answer) => {
                debug!(
                    session_id = %session_id,
                    citations = answer.citations.len(),
                    "Answer received"
                );
                let reply_message_id = self.store.append_message(
                    &session_id,
                    Role::Assistant,
                    &answer.answer,
                    answer.citations.clone(),
                )?;
                self.conversation_logger.log(ConversationEvent::new(
                    "answer_received",
                    serde_json::json!({
                        "sessionId": session_id.as_str(),
                        "citations": answer.citations.len(),
                        "bytes": answer.answer.len(),
                    }),
                ));
                Ok(AskOutcome {
                    session_id,
                    question_message_id,
                    reply_message_id,
                    reply: AskReply::Answered {
                        answer: answer.answer,
                        citations: answer.citations,
                    },
                })
            }
            Err(error) => {
                warn!(session_id = %session_id, %error, "Ask failed");
                let reason = failure_reason(&error);
                let notice = failure_notice(&error);
                // The failure stays visible in-band: the session gains an
                // assistant message instead of silently dropping the turn.
                let reply_message_id = self.store.append_message(
                    &session_id,
                    Role::Assistant,
                    &notice,
                    Vec::new(),
                )?;
                self.conversation_logger.log(ConversationEvent::new(
                    "ask_failed",
                    serde_json::json!({
                        "sessionId": session_id.as_str(),
                        "error": error.to_string(),
                    }),
                ));
                Ok(AskOutcome {
                    session_id,
                    question_message_id,
                    reply_message_id,
                    reply: AskReply::Failed { reason, notice },
                })
            }
        }
    }

    /// Prior exchanges of the anchored session, excluding the question
    /// that was just appended, so the backend can answer conversationally.
    fn history_before_question(&self, session_id: &SessionId) -> Vec<HistoryEntry> {
        let Some(session) = self.store.get_session(session_id) else {
            return Vec::new();
        };
        let messages = session.messages();
        let prior = messages.len().saturating_sub(1);
        messages[..prior]
            .iter()
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}

/// Releases the single-flight guard on every exit path, including
/// cancellation by dropping the future.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
        {
            Some(Self(flag))
        } else {
            None
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn failure_reason(error: &GatewayError) -> FailureReason {
    match error {
        GatewayError::Unavailable(_) => FailureReason::Unavailable,
        GatewayError::Rejected { .. } | GatewayError::InvalidResponse(_) => {
            FailureReason::Rejected
        }
        GatewayError::Timeout => FailureReason::Timeout,
        GatewayError::Cancelled => FailureReason::Cancelled,
    }
}

fn failure_notice(error: &GatewayError) -> String {
    match error {
        GatewayError::Cancelled => {
            "This question was cancelled before an answer arrived.".to_string()
        }
        GatewayError::Timeout => {
            "The study backend took too long to answer. Please try asking again.".to_string()
        }
        _ => "The study backend could not answer this question. Please try asking again."
            .to_string(),
    }
}
