//! Token definitions for D2 source text.

use std::fmt;

use crate::span::Span;

/// The kind of a lexical token.
///
/// Every byte of the source belongs to exactly one token, including
/// whitespace and comments, so the token stream can be concatenated back
/// into the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Unquoted word: `server`, `font-size`, `3d`, `数据库`.
    Identifier,
    /// `"..."` or `'...'` on a single line.
    String,
    /// `|tag ... |`, `||...||` or `|||...|||`.
    BlockString,

    Dot,          // .
    Colon,        // :
    Semicolon,    // ;
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]

    Arrow,       // ->
    LeftArrow,   // <-
    DoubleArrow, // <->
    Line,        // --

    Newline,
    Whitespace,
    /// `#` to the end of the line.
    Comment,
    /// `"""` ... `"""`.
    BlockComment,

    /// Any other printable character (`,`, `!`, `(`, emoji).
    Symbol,
    /// Unterminated string or block comment, or a control character.
    Error,
}

impl TokenKind {
    /// Whitespace and comments, which carry no meaning for the parser.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::BlockComment
        )
    }

    /// Returns `true` for `->`, `<-`, `<->` and `--`.
    pub fn is_connector(self) -> bool {
        self.connector().is_some()
    }

    /// The connector this token spells, if any.
    pub fn connector(self) -> Option<ConnectorKind> {
        match self {
            TokenKind::Arrow => Some(ConnectorKind::Forward),
            TokenKind::LeftArrow => Some(ConnectorKind::Backward),
            TokenKind::DoubleArrow => Some(ConnectorKind::Bidirectional),
            TokenKind::Line => Some(ConnectorKind::Undirected),
            _ => None,
        }
    }

    /// Human readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::BlockString => "block string",
            TokenKind::Dot => "`.`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::LeftBrace => "`{`",
            TokenKind::RightBrace => "`}`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::Arrow => "`->`",
            TokenKind::LeftArrow => "`<-`",
            TokenKind::DoubleArrow => "`<->`",
            TokenKind::Line => "`--`",
            TokenKind::Newline => "newline",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::Symbol => "symbol",
            TokenKind::Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Direction of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    /// `->`
    Forward,
    /// `<-`
    Backward,
    /// `<->`
    Bidirectional,
    /// `--`
    Undirected,
}

impl ConnectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectorKind::Forward => "->",
            ConnectorKind::Backward => "<-",
            ConnectorKind::Bidirectional => "<->",
            ConnectorKind::Undirected => "--",
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token with its position and raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub span: Span,
    pub text: &'src str,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, span: Span, text: &'src str) -> Self {
        Self { kind, span, text }
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{} {:?}", self.kind, self.span, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::Comment.is_trivia());
        assert!(TokenKind::BlockComment.is_trivia());
        assert!(!TokenKind::Newline.is_trivia());
        assert!(!TokenKind::Identifier.is_trivia());
    }

    #[test]
    fn test_connectors() {
        assert_eq!(TokenKind::Arrow.connector(), Some(ConnectorKind::Forward));
        assert_eq!(TokenKind::Line.connector(), Some(ConnectorKind::Undirected));
        assert!(!TokenKind::Dot.is_connector());
        assert_eq!(ConnectorKind::Bidirectional.to_string(), "<->");
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenKind::Identifier, Span::new(0..1), "a");
        assert_eq!(token.to_string(), "Identifier@0..1 \"a\"");
    }
}
