//! Diagnostic taxonomy for recoverable data problems.
//!
//! Every variant here is recovered at its emitting site and converted to a
//! degraded-but-valid result; nothing in the aggregation path aborts. The
//! variants exist so log output stays greppable per failure class.

use std::fmt;

use tracing::warn;

/// A recoverable data-quality problem encountered somewhere in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A timestamp string failed both the standard and the manual parse.
    MalformedTimestamp(String),
    /// An instant was absent where one was expected.
    InvalidInstant,
    /// A trip referenced a station identifier no index entry matches.
    UnresolvedIdentifier(String),
    /// The trip table is missing a required header column.
    MissingRequiredColumn(&'static str),
    /// Real aggregation matched zero stations; synthetic fallback engaged.
    NoIdentifierMatches,
    /// The coordinate projector rejected a lon/lat pair.
    ProjectionFailure,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedTimestamp(raw) => write!(f, "malformed timestamp: {:?}", raw),
            Diagnostic::InvalidInstant => write!(f, "missing or invalid instant"),
            Diagnostic::UnresolvedIdentifier(id) => {
                write!(f, "unresolved station identifier: {:?}", id)
            }
            Diagnostic::MissingRequiredColumn(col) => {
                write!(f, "trip table missing required column: {}", col)
            }
            Diagnostic::NoIdentifierMatches => {
                write!(f, "no identifier matches; generating synthetic traffic")
            }
            Diagnostic::ProjectionFailure => write!(f, "coordinate projection failed"),
        }
    }
}

/// Logs a diagnostic as a structured warning.
pub fn emit(diag: &Diagnostic) {
    warn!(diagnostic = ?diag, "{}", diag);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_offending_value() {
        let d = Diagnostic::UnresolvedIdentifier("A32000".to_string());
        assert!(d.to_string().contains("A32000"));

        let d = Diagnostic::MissingRequiredColumn("started_at");
        assert!(d.to_string().contains("started_at"));
    }

    #[test]
    fn test_emit_does_not_panic() {
        emit(&Diagnostic::InvalidInstant);
        emit(&Diagnostic::MalformedTimestamp("not a date".into()));
    }
}
