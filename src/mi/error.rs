//! Error taxonomy for MI parsing and conversion.

use thiserror::Error;

/// Failures produced by the parser and the stack/argument merge.
///
/// Offsets are byte positions into the line being parsed. `MalformedRecord`
/// carries the raw line (when one is available) for diagnostics; batch
/// parsing attaches it to a [`ParseDiagnostic`](crate::mi::parser::ParseDiagnostic)
/// instead of aborting.
#[derive(Debug, Error)]
pub enum MiError {
    #[error("malformed value at offset {offset}: {reason}")]
    MalformedValue { offset: usize, reason: &'static str },

    #[error("malformed result at offset {offset}: expected '=' after field name")]
    MalformedResult { offset: usize },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscapeSequence { offset: usize },

    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String, line: String },
}

impl MiError {
    /// Wrap a value/result-level failure as a record-level one, keeping the
    /// raw line. Already record-level errors pass through unchanged.
    pub(crate) fn into_record_error(self, line: &str) -> MiError {
        match self {
            err @ MiError::MalformedRecord { .. } => err,
            err => MiError::MalformedRecord {
                reason: err.to_string(),
                line: line.to_string(),
            },
        }
    }
}
