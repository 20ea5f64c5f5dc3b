//! # D2 Parser
//!
//! Lossless parser for the D2 diagram language. Source text goes through a
//! scanner and a recursive-descent parser and comes out as an immutable
//! [`SyntaxTree`](syntax::SyntaxTree) that reproduces the input byte for
//! byte, together with the diagnostics found along the way.
//!
//! Parsing never fails: malformed input produces `Error` nodes and
//! diagnostics, and the tree always exists.
//!
//! ## Usage
//!
//! ```
//! use d2_parser::syntax::ShapeBody;
//!
//! let parse = d2_parser::parse("user -> server: Request\nserver: { shape: cylinder }");
//! assert!(!parse.has_errors());
//!
//! let document = parse.document();
//! assert_eq!(document.shape_connections().count(), 1);
//! assert_eq!(document.shape_definitions().count(), 1);
//! ```

pub mod error;
pub mod lexer;
pub mod line_index;
pub mod parser;
#[cfg(test)]
mod parser_tests;
mod span;
pub mod syntax;
pub mod tokens;
pub mod validate;

pub use span::Span;

use log::debug;

use error::{Diagnostic, ParseError};
use syntax::{AstNode, Document, SyntaxTree};

/// The result of parsing a text: the tree plus every diagnostic.
#[derive(Debug, Clone)]
pub struct Parse {
    tree: SyntaxTree,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// The typed root node.
    pub fn document(&self) -> Document<'_> {
        Document::cast(self.tree.root()).expect("tree root is always a document")
    }

    /// Lexical diagnostics first, then syntax diagnostics, each group in
    /// detection order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns `true` if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity().is_error())
    }

    /// Adds diagnostics from a later pass, such as [`validate`].
    pub fn push_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Returns the tree, or every diagnostic if any of them is an error.
    pub fn into_result(self) -> Result<SyntaxTree, ParseError> {
        if self.has_errors() {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.tree)
        }
    }

    pub fn into_parts(self) -> (SyntaxTree, Vec<Diagnostic>) {
        (self.tree, self.diagnostics)
    }
}

/// Parse D2 source text into a lossless syntax tree.
///
/// This is the main entry point of the crate. It runs the scanner and the
/// parser and never fails.
///
/// # Example
///
/// ```
/// # use d2_parser::{parse, error::ErrorCode};
/// let parse = parse("a -> ");
///
/// assert!(parse.has_errors());
/// assert_eq!(parse.diagnostics()[0].code(), Some(ErrorCode::E103));
/// assert_eq!(parse.tree().text(), "a -> ");
/// ```
pub fn parse(text: &str) -> Parse {
    let (tokens, mut diagnostics) = lexer::tokenize(text);
    let (tree, syntax_diagnostics) = parser::parse_tokens(text, &tokens);
    diagnostics.extend(syntax_diagnostics);

    debug!(bytes = text.len(), diagnostics = diagnostics.len(); "Parsed source");

    Parse { tree, diagnostics }
}
