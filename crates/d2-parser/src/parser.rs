//! Recursive-descent parser from tokens to a lossless [`SyntaxTree`].
//!
//! The parser walks the token slice produced by the [`lexer`](super::lexer)
//! and emits start, token and finish events into a tree builder. Every token
//! is attached to the tree, trivia included. Syntax errors never abort the
//! parse: the offending tokens are wrapped in an `Error` node, one diagnostic
//! is recorded, and parsing resumes at the next statement terminator.
//!
//! The public entry point is [`parse_tokens`].

use log::{debug, trace};

use d2_core::keyword;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
    syntax::{NodeKind, SyntaxTree, TreeBuilder},
    tokens::{Token, TokenKind},
};

/// Deepest brace or bracket nesting the parser descends into.
pub const MAX_NESTING: usize = 256;

/// What a statement list may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Top level. A bare `{` block here has no owning shape.
    Document,
    /// Body of a shape or of an inline endpoint.
    Shape,
    /// Body of a connection or of a map property. Holds properties only.
    Block,
}

/// Result of looking ahead over a dotted path.
#[derive(Debug, Clone, Copy)]
struct PathScan {
    /// Token index just past the last segment.
    end: usize,
    /// Whether any unquoted segment is a reserved keyword.
    has_keyword: bool,
}

struct Parser<'a, 'src> {
    tokens: &'a [Token<'src>],
    pos: usize,
    builder: TreeBuilder,
    diagnostics: DiagnosticCollector,
    depth: usize,
}

/// Parse `tokens`, which must tile `source`, into a syntax tree.
///
/// Never fails. The returned diagnostics are parser diagnostics only, in the
/// order they were detected.
pub fn parse_tokens(source: &str, tokens: &[Token<'_>]) -> (SyntaxTree, Vec<Diagnostic>) {
    let mut parser = Parser {
        tokens,
        pos: 0,
        builder: TreeBuilder::new(),
        diagnostics: DiagnosticCollector::new(),
        depth: 0,
    };

    parser.statements(Scope::Document);

    let tree = parser.builder.finish(source.to_string());
    let diagnostics = parser.diagnostics.finish();

    debug!(
        tokens = tokens.len(),
        nodes = tree.node_count(),
        diagnostics = diagnostics.len();
        "Parsed document"
    );

    (tree, diagnostics)
}

impl<'src> Parser<'_, 'src> {
    // =========================================================================
    // Token cursor
    // =========================================================================

    fn current(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|token| token.kind)
    }

    /// Index of the first non-trivia token at or after `index`.
    fn skip_trivia_from(&self, index: usize) -> usize {
        let mut index = index;
        while self.kind_at(index).is_some_and(TokenKind::is_trivia) {
            index += 1;
        }
        index
    }

    /// Kind of the next non-trivia token, without consuming anything.
    fn peek(&self) -> Option<TokenKind> {
        self.kind_at(self.skip_trivia_from(self.pos))
    }

    /// Span of the current token, or an empty span at the end of input.
    fn current_span(&self) -> Span {
        self.current()
            .map_or_else(|| Span::empty(self.builder.cursor()), |token| token.span)
    }

    fn bump(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind, token.span);
            self.pos += 1;
        }
    }

    fn bump_until(&mut self, end: usize) {
        while self.pos < end {
            self.bump();
        }
    }

    fn eat_trivia(&mut self) {
        while self.current_kind().is_some_and(TokenKind::is_trivia) {
            self.bump();
        }
    }

    /// Consumes the next non-trivia token if it is `kind`.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek() != Some(kind) {
            return false;
        }
        self.eat_trivia();
        self.bump();
        true
    }

    // =========================================================================
    // Statement lists
    // =========================================================================

    /// Parses statements until the enclosing `}` or the end of input.
    fn statements(&mut self, scope: Scope) {
        loop {
            self.eat_trivia();
            match self.current_kind() {
                None => break,
                Some(TokenKind::Newline | TokenKind::Semicolon) => self.bump(),
                Some(TokenKind::RightBrace) if scope == Scope::Document => {
                    self.unexpected_closing_brace();
                }
                Some(TokenKind::RightBrace) => break,
                Some(_) => {
                    self.statement(scope);
                    self.expect_terminator();
                }
            }
        }
    }

    fn statement(&mut self, scope: Scope) {
        let Some(kind) = self.current_kind() else {
            return;
        };

        match kind {
            TokenKind::LeftBrace if self.block_followed_by_connector() => self.connection(),
            TokenKind::LeftBrace => self.bare_block(scope),
            TokenKind::Identifier | TokenKind::String => {
                let scan = self.scan_path(self.pos);
                let after = self.kind_at(self.skip_trivia_from(scan.end));
                if after.is_some_and(TokenKind::is_connector) {
                    self.connection();
                } else if scan.has_keyword || scope == Scope::Block {
                    self.property(scan.end);
                } else {
                    self.shape_definition(scan.end);
                }
            }
            kind if kind.is_connector() => self.connection(),
            // Already reported by the scanner.
            TokenKind::Error => {
                self.builder.start_node(NodeKind::Error);
                self.skip_to_terminator();
                self.builder.finish_node();
            }
            _ => self.recover(),
        }
    }

    /// Requires the statement just parsed to be followed by a terminator.
    fn expect_terminator(&mut self) {
        match self.peek() {
            None
            | Some(TokenKind::Newline | TokenKind::Semicolon | TokenKind::RightBrace) => {}
            Some(TokenKind::Error) => {
                self.eat_trivia();
                self.builder.start_node(NodeKind::Error);
                self.skip_to_terminator();
                self.builder.finish_node();
            }
            Some(_) => {
                self.eat_trivia();
                self.recover();
            }
        }
    }

    /// Wraps everything up to the next terminator in an `Error` node.
    ///
    /// Only called when the cursor is not on a terminator, so at least one
    /// token is consumed.
    fn recover(&mut self) {
        let span = self.current_span();
        let kind = self.current_kind().map_or("end of input", TokenKind::describe);
        trace!(offset = span.start(), token = kind; "Recovering from unexpected token");

        self.diagnostics
            .record(ErrorCode::E100, format!("unexpected {kind}"), span);
        self.builder.start_node(NodeKind::Error);
        self.skip_to_terminator();
        self.builder.finish_node();
    }

    /// Bumps tokens up to a `Newline` or `;` outside nested braces, or up to
    /// the enclosing `}`.
    fn skip_to_terminator(&mut self) {
        let mut nesting = 0usize;
        while let Some(kind) = self.current_kind() {
            match kind {
                TokenKind::Newline | TokenKind::Semicolon if nesting == 0 => break,
                TokenKind::RightBrace if nesting == 0 => break,
                TokenKind::RightBrace => nesting -= 1,
                TokenKind::LeftBrace => nesting += 1,
                _ => {}
            }
            self.bump();
        }
    }

    fn unexpected_closing_brace(&mut self) {
        self.diagnostics.emit(
            Diagnostic::error("unexpected `}`")
                .with_code(ErrorCode::E100)
                .with_label(self.current_span(), "no block to close")
                .with_help("remove the `}` or add the matching `{`"),
        );
        self.builder.start_node(NodeKind::Error);
        self.bump();
        self.builder.finish_node();
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    /// Scans a dotted path starting at `start` without consuming it.
    ///
    /// Segments are identifiers, runs of space-separated identifiers, or
    /// quoted strings. Whitespace is allowed around dots. A trailing dot is
    /// not part of the path.
    fn scan_path(&self, start: usize) -> PathScan {
        let mut index = start;
        let mut scan = PathScan {
            end: start,
            has_keyword: false,
        };

        loop {
            match self.kind_at(index) {
                Some(TokenKind::Identifier) => {
                    let first = index;
                    index += 1;
                    while self.kind_at(index) == Some(TokenKind::Whitespace)
                        && self.kind_at(index + 1) == Some(TokenKind::Identifier)
                    {
                        index += 2;
                    }
                    if index == first + 1 && keyword::is_reserved(self.tokens[first].text) {
                        scan.has_keyword = true;
                    }
                }
                Some(TokenKind::String) => index += 1,
                _ => break,
            }
            scan.end = index;

            let dot = self.skip_trivia_from(index);
            if self.kind_at(dot) != Some(TokenKind::Dot) {
                break;
            }
            let next = self.skip_trivia_from(dot + 1);
            if !matches!(
                self.kind_at(next),
                Some(TokenKind::Identifier | TokenKind::String)
            ) {
                break;
            }
            index = next;
        }

        scan
    }

    /// Returns `true` if the `{` at the cursor closes and is then followed by
    /// a connector.
    fn block_followed_by_connector(&self) -> bool {
        let mut nesting = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match token.kind {
                TokenKind::LeftBrace => nesting += 1,
                TokenKind::RightBrace => {
                    nesting -= 1;
                    if nesting == 0 {
                        return self
                            .kind_at(self.skip_trivia_from(index + 1))
                            .is_some_and(TokenKind::is_connector);
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Index just past the unquoted text starting at the cursor.
    ///
    /// A text run stops at a statement terminator, a brace or a comment.
    /// Trailing whitespace is left out.
    fn text_run_end(&self) -> usize {
        let mut end = self.pos;
        for (index, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match token.kind {
                TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::LeftBrace
                | TokenKind::RightBrace
                | TokenKind::Comment
                | TokenKind::BlockComment => break,
                TokenKind::Whitespace => {}
                _ => end = index + 1,
            }
        }
        end
    }

    fn starts_text_run(kind: TokenKind) -> bool {
        !matches!(
            kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::LeftBrace | TokenKind::RightBrace
        ) && !kind.is_trivia()
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// `shape_id (':' label? sub_shape?)?`
    fn shape_definition(&mut self, path_end: usize) {
        self.builder.start_node(NodeKind::ShapeDefinition);
        self.path(NodeKind::ShapeId, path_end);

        if self.eat(TokenKind::Colon) && self.peek().is_some_and(Self::starts_text_run) {
            self.eat_trivia();
            self.text_run(NodeKind::LabelDefinition);
        }
        if self.peek() == Some(TokenKind::LeftBrace) {
            self.eat_trivia();
            self.braced(NodeKind::SubShapeDefinition, Scope::Shape);
        }

        self.builder.finish_node();
    }

    /// `endpoint (connector endpoint)+ (':' label?)? block?`
    fn connection(&mut self) {
        self.builder.start_node(NodeKind::ShapeConnection);

        if let Some(connector) = self.current_kind().filter(|kind| kind.is_connector()) {
            self.missing_endpoint(format!("expected a shape before {}", connector.describe()));
        } else {
            self.endpoint();
        }

        while let Some(connector) = self.peek().filter(|kind| kind.is_connector()) {
            self.eat_trivia();
            self.bump();
            let found = self.peek();
            self.eat_trivia();
            match found {
                Some(TokenKind::Identifier | TokenKind::String | TokenKind::LeftBrace) => {
                    self.endpoint();
                }
                // Already reported by the scanner.
                Some(TokenKind::Error) => {
                    self.builder.start_node(NodeKind::Error);
                    self.bump();
                    self.builder.finish_node();
                }
                _ => {
                    let message = format!("expected a shape after {}", connector.describe());
                    self.missing_endpoint(message);
                }
            }
        }

        if self.eat(TokenKind::Colon) && self.peek().is_some_and(Self::starts_text_run) {
            self.eat_trivia();
            self.text_run(NodeKind::LabelDefinition);
        }
        if self.peek() == Some(TokenKind::LeftBrace) {
            self.eat_trivia();
            self.braced(NodeKind::BlockDefinition, Scope::Block);
        }

        self.builder.finish_node();
    }

    /// A shape path or an inline `{ ... }` block at the cursor.
    fn endpoint(&mut self) {
        if self.current_kind() == Some(TokenKind::LeftBrace) {
            self.braced(NodeKind::InlineShapeDefinition, Scope::Shape);
        } else {
            let scan = self.scan_path(self.pos);
            self.path(NodeKind::ShapeId, scan.end);
        }
    }

    /// Records E103 and leaves an empty `Error` node where the endpoint
    /// belongs.
    fn missing_endpoint(&mut self, message: String) {
        let offset = self.builder.cursor();
        self.diagnostics
            .record(ErrorCode::E103, message, Span::empty(offset));
        self.builder.start_node(NodeKind::Error);
        self.builder.finish_node();
    }

    /// `property_key (':' (attribute_value | block)?)?`
    fn property(&mut self, path_end: usize) {
        self.builder.start_node(NodeKind::Property);
        self.path(NodeKind::PropertyKey, path_end);

        if self.eat(TokenKind::Colon) {
            match self.peek() {
                Some(TokenKind::LeftBracket) => {
                    self.eat_trivia();
                    self.builder.start_node(NodeKind::AttributeValue);
                    self.array();
                    self.builder.finish_node();
                }
                Some(kind) if Self::starts_text_run(kind) => {
                    self.eat_trivia();
                    self.text_run(NodeKind::AttributeValue);
                }
                _ => {}
            }
        }
        if self.peek() == Some(TokenKind::LeftBrace) {
            self.eat_trivia();
            self.braced(NodeKind::BlockDefinition, Scope::Block);
        }

        self.builder.finish_node();
    }

    /// A `{ ... }` in statement position that belongs to no shape.
    fn bare_block(&mut self, scope: Scope) {
        match scope {
            Scope::Document => {
                self.diagnostics.emit(
                    Diagnostic::error("anonymous block outside a shape")
                        .with_code(ErrorCode::E104)
                        .with_label(self.current_span(), "this block has no owning shape")
                        .with_help("give the block a name, for example `group: { ... }`"),
                );
                self.braced(NodeKind::SubShapeDefinition, Scope::Shape);
            }
            Scope::Shape => self.braced(NodeKind::SubShapeDefinition, Scope::Shape),
            Scope::Block => self.recover(),
        }
    }

    // =========================================================================
    // Building blocks
    // =========================================================================

    /// Wraps the tokens up to `end` in a path node.
    fn path(&mut self, kind: NodeKind, end: usize) {
        self.builder.start_node(kind);
        self.bump_until(end);
        self.builder.finish_node();
    }

    /// Wraps the text run at the cursor in a node of `kind`.
    fn text_run(&mut self, kind: NodeKind) {
        let end = self.text_run_end();
        self.builder.start_node(kind);
        self.bump_until(end);
        self.builder.finish_node();
    }

    /// Parses a `{ statements }` body at the cursor into a node of `kind`.
    fn braced(&mut self, kind: NodeKind, scope: Scope) {
        if self.depth >= MAX_NESTING {
            self.too_deep(TokenKind::LeftBrace, TokenKind::RightBrace);
            return;
        }

        let open = self.current_span();
        self.builder.start_node(kind);
        self.bump();
        self.depth += 1;

        self.statements(scope);

        if self.current_kind() == Some(TokenKind::RightBrace) {
            self.bump();
        } else {
            self.unclosed_block(open);
        }

        self.depth -= 1;
        self.builder.finish_node();
    }

    /// `'[' (value (';' | ',' | newline)*)* ']'`
    fn array(&mut self) {
        if self.depth >= MAX_NESTING {
            self.too_deep(TokenKind::LeftBracket, TokenKind::RightBracket);
            return;
        }

        let open = self.current_span();
        self.builder.start_node(NodeKind::Array);
        self.bump();
        self.depth += 1;

        loop {
            self.eat_trivia();
            let Some(token) = self.current().copied() else {
                self.unclosed_array(open);
                break;
            };
            match token.kind {
                TokenKind::RightBracket => {
                    self.bump();
                    break;
                }
                TokenKind::RightBrace => {
                    self.unclosed_array(open);
                    break;
                }
                TokenKind::Semicolon | TokenKind::Newline => self.bump(),
                TokenKind::Symbol if token.text == "," => self.bump(),
                TokenKind::LeftBracket => {
                    self.builder.start_node(NodeKind::AttributeValue);
                    self.array();
                    self.builder.finish_node();
                }
                _ => self.array_value(),
            }
        }

        self.depth -= 1;
        self.builder.finish_node();
    }

    /// One array element: every token up to a separator, with trailing
    /// whitespace left out.
    fn array_value(&mut self) {
        let mut end = self.pos;
        for (index, token) in self.tokens.iter().enumerate().skip(self.pos) {
            match token.kind {
                TokenKind::Semicolon
                | TokenKind::Newline
                | TokenKind::RightBracket
                | TokenKind::LeftBracket
                | TokenKind::RightBrace
                | TokenKind::Comment
                | TokenKind::BlockComment => break,
                TokenKind::Symbol if token.text == "," => break,
                TokenKind::Whitespace => {}
                _ => end = index + 1,
            }
        }
        self.builder.start_node(NodeKind::AttributeValue);
        self.bump_until(end.max(self.pos + 1));
        self.builder.finish_node();
    }

    fn unclosed_block(&mut self, open: Span) {
        self.diagnostics.emit(
            Diagnostic::error("unclosed block")
                .with_code(ErrorCode::E102)
                .with_label(Span::empty(self.builder.cursor()), "expected `}`")
                .with_secondary_label(open, "block opened here"),
        );
    }

    fn unclosed_array(&mut self, open: Span) {
        self.diagnostics.emit(
            Diagnostic::error("unclosed array")
                .with_code(ErrorCode::E101)
                .with_label(Span::empty(self.builder.cursor()), "expected `]`")
                .with_secondary_label(open, "array opened here"),
        );
    }

    /// Keeps an over-nested group in a single `Error` node, balancing
    /// `open` and `close` without descending.
    fn too_deep(&mut self, open: TokenKind, close: TokenKind) {
        let span = self.current_span();
        trace!(offset = span.start(), depth = self.depth; "Nesting limit reached");
        self.diagnostics.emit(
            Diagnostic::error(format!("nesting deeper than {MAX_NESTING} levels"))
                .with_code(ErrorCode::E105)
                .with_label(span, ErrorCode::E105.description()),
        );

        self.builder.start_node(NodeKind::Error);
        let mut nesting = 0usize;
        while let Some(kind) = self.current_kind() {
            self.bump();
            if kind == open {
                nesting += 1;
            } else if kind == close {
                nesting -= 1;
                if nesting == 0 {
                    break;
                }
            }
        }
        self.builder.finish_node();
    }
}
