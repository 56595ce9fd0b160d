use bulletin_ai::AiError;
use bulletin_doc::DocError;
use thiserror::Error;

/// Controller-side failure taxonomy. Every variant ends a submission the
/// same way: a notice to subscribers and a cleared busy flag.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("endpoint not configured: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("document mutation rejected: {0}")]
    DocumentMutation(#[from] DocError),

    #[error("submission cancelled")]
    Cancelled,
}

impl From<AiError> for EditorError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Configuration(message) => Self::Configuration(message),
            AiError::Transport(message) => Self::Transport(message),
            AiError::MalformedResponse(message) => Self::MalformedResponse(message),
            // Status and server-side failures read as transport problems to
            // the person holding the prompt box.
            AiError::Endpoint(message) => Self::Transport(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_errors_fold_into_controller_taxonomy() {
        let folded = EditorError::from(AiError::Endpoint("503 service unavailable".into()));
        assert!(matches!(folded, EditorError::Transport(_)));

        let folded = EditorError::from(AiError::MalformedResponse("not an array".into()));
        assert!(matches!(folded, EditorError::MalformedResponse(_)));
    }

    #[test]
    fn test_doc_errors_convert_via_from() {
        let err: EditorError = DocError::NoSelection.into();
        assert!(matches!(err, EditorError::DocumentMutation(_)));
    }
}
