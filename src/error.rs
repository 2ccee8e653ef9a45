use thiserror::Error;

/// Errors raised by the feature pipeline and the predictor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("malformed input at row {row}: field `{field}` has value {value:?} ({reason})")]
    MalformedInput {
        row: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("no opponent code for {0}: it never appears in the opponent column")]
    NoOpponentCode(String),

    #[error("insufficient history for {team}: {matches} matches, no full {required}-match window")]
    InsufficientHistory {
        team: String,
        matches: usize,
        required: usize,
    },

    #[error("classifier failed: {0}")]
    Classifier(String),
}

impl PipelineError {
    pub(crate) fn malformed(
        row: usize,
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedInput {
            row,
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
