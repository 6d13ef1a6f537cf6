//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These are validation failures detected before any state is mutated or
/// any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Invalid ingest item: {0}")]
    InvalidIngestItem(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_question_display() {
        assert_eq!(
            DomainError::EmptyQuestion.to_string(),
            "Question cannot be empty"
        );
    }

    #[test]
    fn test_invalid_ingest_item_display() {
        let error = DomainError::InvalidIngestItem("PDF missing dataBase64".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid ingest item: PDF missing dataBase64"
        );
    }
}
