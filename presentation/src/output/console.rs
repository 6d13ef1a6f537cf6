//! Console output formatter

use colored::Colorize;
use scribe_application::{AskOutcome, AskReply, HealthStatus, IngestOutcome};
use scribe_domain::{ScopeSelection, Session, SessionId};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an answered (or failed) question.
    pub fn format_answer(outcome: &AskOutcome) -> String {
        match &outcome.reply {
            AskReply::Answered { answer, citations } => {
                let mut output = String::new();
                output.push_str(answer);
                output.push('\n');

                if !citations.is_empty() {
                    output.push('\n');
                    output.push_str(&"Sources:".cyan().bold().to_string());
                    output.push('\n');
                    for citation in citations {
                        output.push_str(&format!(
                            "  ({}#{})\n",
                            citation.title, citation.chunk_index
                        ));
                    }
                }
                output
            }
            AskReply::Failed { notice, .. } => format!("{}\n", notice.red()),
        }
    }

    /// Format the session list, most recent first, with current (`*`) and
    /// selected (`+`) markers.
    pub fn format_sessions(
        sessions: &[Session],
        current: Option<&SessionId>,
        selection: &ScopeSelection,
    ) -> String {
        if sessions.is_empty() {
            return "No sessions yet. Ingest material or ask a question to start one.\n".to_string();
        }

        let mut output = String::new();
        if selection.is_global() {
            output.push_str("Scope: all material\n\n");
        } else {
            output.push_str(&format!("Scope: {} selected session(s)\n\n", selection.len()));
        }

        for session in sessions {
            let marker = if Some(session.id()) == current {
                "*".green().bold().to_string()
            } else if selection.contains(session.id()) {
                "+".cyan().to_string()
            } else {
                " ".to_string()
            };
            output.push_str(&format!(
                "{} {}  {}  {} message(s), created {}\n",
                marker,
                short_id(session.id()).dimmed(),
                session.title().bold(),
                session.messages().len(),
                session.created_at().format("%Y-%m-%d %H:%M"),
            ));
        }
        output
    }

    /// Format an ingest receipt.
    pub fn format_receipt(outcome: &IngestOutcome) -> String {
        let mut output = format!(
            "{} session {}\n",
            "Ingested into".green().bold(),
            short_id(&outcome.session_id)
        );
        for item in &outcome.receipt.items {
            output.push_str(&format!(
                "  {} {} ({} chunks)\n",
                item.kind.dimmed(),
                item.title,
                item.chunks
            ));
        }
        output.push_str(&format!("Total chunks: {}\n", outcome.receipt.total_chunks));
        output
    }

    /// Format a backend health report.
    pub fn format_health(health: &HealthStatus) -> String {
        match &health.model {
            Some(model) => format!("Backend status: {} (model: {})\n", health.status, model),
            None => format!("Backend status: {}\n", health.status),
        }
    }
}

/// First 8 characters of a session id, enough to disambiguate in a list.
fn short_id(id: &SessionId) -> String {
    id.as_str().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scribe_domain::{Citation, MessageId};

    fn answered(answer: &str, citations: Vec<Citation>) -> AskOutcome {
        AskOutcome {
            session_id: SessionId::new("s1"),
            question_message_id: MessageId::new("m1"),
            reply_message_id: MessageId::new("m2"),
            reply: AskReply::Answered {
                answer: answer.to_string(),
                citations,
            },
        }
    }

    #[test]
    fn test_answer_includes_citations() {
        colored::control::set_override(false);
        let outcome = answered(
            "X is a thing.",
            vec![Citation {
                title: "doc1".to_string(),
                chunk_index: 0,
                content: "...".to_string(),
            }],
        );
        let output = ConsoleFormatter::format_answer(&outcome);
        assert!(output.contains("X is a thing."));
        assert!(output.contains("(doc1#0)"));
    }

    #[test]
    fn test_failed_answer_shows_notice() {
        colored::control::set_override(false);
        let outcome = AskOutcome {
            session_id: SessionId::new("s1"),
            question_message_id: MessageId::new("m1"),
            reply_message_id: MessageId::new("m2"),
            reply: AskReply::Failed {
                reason: scribe_application::FailureReason::Unavailable,
                notice: "backend is down".to_string(),
            },
        };
        let output = ConsoleFormatter::format_answer(&outcome);
        assert!(output.contains("backend is down"));
    }

    #[test]
    fn test_session_list_markers() {
        colored::control::set_override(false);
        let a = Session::new("Topic A", Utc::now());
        let b = Session::new("Topic B", Utc::now());
        let current = a.id().clone();
        let selection: ScopeSelection = vec![a.id().clone()].into_iter().collect();

        let output = ConsoleFormatter::format_sessions(
            &[a.clone(), b.clone()],
            Some(&current),
            &selection,
        );
        assert!(output.contains("Topic A"));
        assert!(output.contains("Topic B"));
        assert!(output.contains("* "));
        assert!(output.contains("1 selected"));
    }

    #[test]
    fn test_empty_session_list() {
        let output =
            ConsoleFormatter::format_sessions(&[], None, &ScopeSelection::new());
        assert!(output.contains("No sessions yet"));
    }
}
