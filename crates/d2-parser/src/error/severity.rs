//! Severity levels for diagnostics.

use std::fmt;

/// The severity level of a diagnostic.
///
/// Lexical and syntax problems are always [`Severity::Error`]. The
/// validation pass reports unknown keywords and shapes as
/// [`Severity::Warning`], since D2 tolerates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The source is malformed; the tree contains error nodes or the value
    /// cannot be used.
    Error,

    /// The source parses, but something in it is probably a mistake.
    Warning,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}
