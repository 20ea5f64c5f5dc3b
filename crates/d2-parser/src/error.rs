//! Diagnostics produced while scanning, parsing and validating D2 source.
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with an optional error code, labeled
//! source spans and help text. Diagnostics never abort a parse; they are
//! returned next to the syntax tree. [`ParseError`] wraps them when a caller
//! wants a `Result`.
//!
//! # Example
//!
//! ```
//! # use d2_parser::error::{Diagnostic, ErrorCode};
//! # use d2_parser::Span;
//!
//! let diag = Diagnostic::error("unclosed block")
//!     .with_code(ErrorCode::E102)
//!     .with_label(Span::new(20..20), "expected `}`")
//!     .with_secondary_label(Span::new(3..4), "block opened here")
//!     .with_help("add a closing `}`");
//!
//! assert_eq!(diag.to_string(), "error[E102]: unclosed block");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
