//! Collector for accumulating diagnostics during a processing phase.

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    span::Span,
};

/// An append-only list of diagnostics, kept in detection order.
///
/// The scanner, the parser and the validation pass each own one collector.
/// Diagnostics are never modified once emitted.
///
/// # Example
///
/// ```
/// # use d2_parser::error::{Diagnostic, DiagnosticCollector, ErrorCode};
/// # use d2_parser::Span;
///
/// let mut collector = DiagnosticCollector::new();
/// collector.record(ErrorCode::E100, "unexpected token `]`", Span::new(2..3));
/// collector.emit(Diagnostic::warning("unknown shape `blob`"));
///
/// assert!(collector.has_errors());
/// let diagnostics = collector.finish();
/// assert_eq!(diagnostics.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record an error with `code` whose primary label covers `span`.
    pub fn record(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.emit(
            Diagnostic::error(message)
                .with_code(code)
                .with_label(span, code.description()),
        );
    }

    /// Returns `true` if any error-severity diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Number of diagnostics emitted so far.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finish collection and return every diagnostic in emission order.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Finish collection, failing if any error was emitted.
    ///
    /// Warnings are discarded in the success case.
    pub fn into_result(self) -> Result<(), ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }
}

impl Extend<Diagnostic> for DiagnosticCollector {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for diagnostic in iter {
            self.emit(diagnostic);
        }
    }
}
