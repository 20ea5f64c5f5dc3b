//! Lexical analyzer for D2 source text.
//!
//! [`Scanner`] turns source text into a lazy stream of [`Token`]s. Scanning
//! never fails: malformed input becomes [`TokenKind::Error`] tokens, and a
//! diagnostic is recorded for each one. Every byte of the input lands in
//! exactly one token, trivia included, so the tokens concatenate back to the
//! source.
//!
//! The public entry point is [`tokenize`], which drives a scanner to the end
//! and returns the tokens together with the lexical diagnostics.

use log::debug;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, none_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
    tokens::{Token, TokenKind},
};

/// How far an error token extends once its sub-parser has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extent {
    /// Up to, but not including, the next newline.
    LineEnd,
    /// To the end of the input.
    InputEnd,
}

/// Diagnostic information attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    extent: Extent,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Escape characters accepted after a backslash inside quoted strings.
const VALID_ESCAPES: [char; 10] = ['n', 'r', 't', '\\', '"', '\'', '/', '0', ' ', '#'];

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse a `"""` block comment.
fn block_comment(input: &mut Input<'_>) -> IResult<TokenKind> {
    preceded(
        literal("\"\"\""),
        cut_err((take_until(0.., "\"\"\""), literal("\"\"\""))).context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated block comment",
            help: Some("close the comment with `\"\"\"`"),
            extent: Extent::InputEnd,
        }),
    )
    .value(TokenKind::BlockComment)
    .parse_next(input)
}

/// Parse the body of a quoted string up to, but excluding, the closing quote.
///
/// A backslash consumes the character after it, so `\"` does not close the
/// string. Escapes are checked separately once the token is complete.
fn string_body<'a>(quote: char) -> impl FnMut(&mut Input<'a>) -> IResult<()> {
    move |input: &mut Input<'a>| {
        repeat(
            0..,
            alt((
                ('\\', none_of('\n')).void(),
                none_of([quote, '\\', '\n']).void(),
            )),
        )
        .parse_next(input)
    }
}

fn quoted<'a>(quote: char) -> impl FnMut(&mut Input<'a>) -> IResult<TokenKind> {
    move |input: &mut Input<'a>| {
        preceded(
            quote,
            cut_err(terminated(string_body(quote), quote)).context(LexerDiagnostic {
                code: ErrorCode::E001,
                message: "unterminated string literal",
                help: Some("add the closing quote before the end of the line"),
                extent: Extent::LineEnd,
            }),
        )
        .value(TokenKind::String)
        .parse_next(input)
    }
}

/// Parse a single-line string quoted with `"` or `'`.
fn quoted_string(input: &mut Input<'_>) -> IResult<TokenKind> {
    alt((quoted('"'), quoted('\''))).parse_next(input)
}

/// Parse a block string such as `|md # Title |` or `|||ts x || y |||`.
///
/// The closing delimiter is the same run of pipes as the opening one. Without
/// a closing run the parser backtracks and the `|` is scanned as a symbol.
fn block_string(input: &mut Input<'_>) -> IResult<TokenKind> {
    take_while(1..=3, '|')
        .flat_map(|pipes: &str| (take_until(0.., pipes), literal(pipes)))
        .value(TokenKind::BlockString)
        .parse_next(input)
}

/// Length of the leading `|` run of `text`, capped at the longest block
/// string delimiter.
fn pipe_run(text: &str) -> usize {
    text.bytes().take_while(|b| *b == b'|').count().min(3)
}

/// Parse connectors (order matters - longest first)
fn connector(input: &mut Input<'_>) -> IResult<TokenKind> {
    alt((
        literal("<->").value(TokenKind::DoubleArrow),
        literal("->").value(TokenKind::Arrow),
        literal("<-").value(TokenKind::LeftArrow),
        literal("--").value(TokenKind::Line),
    ))
    .parse_next(input)
}

fn newline(input: &mut Input<'_>) -> IResult<TokenKind> {
    '\n'.value(TokenKind::Newline).parse_next(input)
}

/// Parse whitespace (spaces, tabs, carriage returns, but not newlines)
fn whitespace(input: &mut Input<'_>) -> IResult<TokenKind> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(TokenKind::Whitespace)
        .parse_next(input)
}

/// Parse a `#` comment running to the end of the line.
fn comment(input: &mut Input<'_>) -> IResult<TokenKind> {
    preceded('#', take_while(0.., |c: char| c != '\n'))
        .value(TokenKind::Comment)
        .parse_next(input)
}

/// Parse an identifier.
///
/// A `-` joins two identifier runs (`font-size`), but never starts a
/// connector: `a->b` and `a--b` stay three tokens.
fn identifier(input: &mut Input<'_>) -> IResult<TokenKind> {
    (
        take_while(1.., is_identifier_char),
        repeat(0.., ('-', take_while(1.., is_identifier_char))).map(|()| ()),
    )
        .value(TokenKind::Identifier)
        .parse_next(input)
}

/// Parse single character punctuation
fn punctuation(input: &mut Input<'_>) -> IResult<TokenKind> {
    alt((
        '.'.value(TokenKind::Dot),
        ':'.value(TokenKind::Colon),
        ';'.value(TokenKind::Semicolon),
        '{'.value(TokenKind::LeftBrace),
        '}'.value(TokenKind::RightBrace),
        '['.value(TokenKind::LeftBracket),
        ']'.value(TokenKind::RightBracket),
    ))
    .parse_next(input)
}

/// Parse any other printable character.
fn symbol(input: &mut Input<'_>) -> IResult<TokenKind> {
    any.verify(|c: &char| !c.is_control())
        .value(TokenKind::Symbol)
        .parse_next(input)
}

/// Parse the kind of the next token.
fn token_kind(input: &mut Input<'_>) -> IResult<TokenKind> {
    alt((
        block_comment, // Must come before quoted strings
        quoted_string,
        block_string,
        connector, // Must come before identifier and symbol
        newline,   // Must come before whitespace
        whitespace,
        comment,
        identifier,
        punctuation,
        symbol,
    ))
    .parse_next(input)
}

/// A lazy, restartable token stream over D2 source text.
///
/// # Example
///
/// ```
/// use d2_parser::{lexer::Scanner, tokens::TokenKind};
///
/// let kinds: Vec<_> = Scanner::new("a -> b").map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [
///         TokenKind::Identifier,
///         TokenKind::Whitespace,
///         TokenKind::Arrow,
///         TokenKind::Whitespace,
///         TokenKind::Identifier,
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<'src> {
    source: &'src str,
    input: Input<'src>,
    diagnostics: DiagnosticCollector,
    /// Whether the last token was an identifier. A `'` right after one is an
    /// apostrophe (`don't`), not the start of a string.
    after_identifier: bool,
    /// Per pipe run length, the earliest offset from which no closing run
    /// exists. Every later run of the same length is unclosed too.
    unclosed_pipes: [Option<usize>; 3],
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            input: LocatingSlice::new(source),
            diagnostics: DiagnosticCollector::new(),
            after_identifier: false,
            unclosed_pipes: [None; 3],
        }
    }

    /// Diagnostics recorded for the tokens produced so far.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.finish()
    }

    /// Byte length of the error token starting at `start`, plus its diagnostic.
    ///
    /// Uses the `LexerDiagnostic` attached to the failing sub-parser. Falls
    /// back to a one-character E002 when no context is present, which is what
    /// happens for control characters.
    fn recover(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        start: usize,
    ) -> (usize, Diagnostic) {
        let rest = &self.source[start..];
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            extent,
        }) = context_error.context().next()
        {
            let len = match extent {
                Extent::LineEnd => rest.find('\n').unwrap_or(rest.len()),
                Extent::InputEnd => rest.len(),
            };
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(start..start + len), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return (len, diag);
        }

        let len = rest.chars().next().map_or(1, char::len_utf8);
        let diag = Diagnostic::error(format!("unexpected character {:?}", &rest[..len]))
            .with_code(ErrorCode::E002)
            .with_label(Span::new(start..start + len), ErrorCode::E002.description())
            .with_help("remove the character or put it inside a quoted string");
        (len, diag)
    }

    /// Returns `true` if the character at `start` cannot open a quoted or
    /// block string and is scanned as a plain symbol.
    fn is_plain_symbol(&self, start: usize) -> bool {
        let rest = &self.source[start..];
        match rest.chars().next() {
            Some('\'') => self.after_identifier,
            Some('|') => {
                let run = pipe_run(rest);
                self.unclosed_pipes[run - 1].is_some_and(|offset| offset <= start)
            }
            _ => false,
        }
    }

    /// Report every unknown `\x` escape inside a string token.
    fn check_escapes(&mut self, text: &str, start: usize) {
        let mut chars = text.char_indices();
        while let Some((index, c)) = chars.next() {
            if c != '\\' {
                continue;
            }
            let Some((next_index, next)) = chars.next() else {
                break;
            };
            if !VALID_ESCAPES.contains(&next) {
                let span = Span::new(start + index..start + next_index + next.len_utf8());
                self.diagnostics.emit(
                    Diagnostic::error(format!("invalid escape sequence `\\{next}`"))
                        .with_code(ErrorCode::E003)
                        .with_label(span, ErrorCode::E003.description())
                        .with_help(
                            "valid escapes: `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`, `\\'`, `\\/`, `\\0`, `\\ `, `\\#`",
                        ),
                );
            }
        }
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        if self.input.is_empty() {
            return None;
        }

        let start = self.input.current_token_start();
        let checkpoint = self.input.checkpoint();

        let kind = if self.is_plain_symbol(start) {
            self.input.next_token();
            TokenKind::Symbol
        } else {
            match token_kind(&mut self.input) {
                Ok(kind) => kind,
                Err(err) => {
                    self.input.reset(&checkpoint);
                    let (len, diagnostic) = self.recover(err, start);
                    self.diagnostics.emit(diagnostic);
                    self.input.next_slice(len);
                    TokenKind::Error
                }
            }
        };

        let end = self.input.current_token_start();
        let text = &self.source[start..end];
        match kind {
            TokenKind::String => self.check_escapes(text, start),
            TokenKind::Symbol if text == "|" => {
                let run = pipe_run(&self.source[start..]);
                self.unclosed_pipes[run - 1].get_or_insert(start);
            }
            _ => {}
        }
        self.after_identifier = kind == TokenKind::Identifier;

        Some(Token::new(kind, Span::new(start..end), text))
    }
}

/// Tokenize `source`, returning every token and the lexical diagnostics.
///
/// The returned tokens always cover the whole input.
pub fn tokenize(source: &str) -> (Vec<Token<'_>>, Vec<Diagnostic>) {
    let mut scanner = Scanner::new(source);
    let tokens: Vec<Token<'_>> = scanner.by_ref().collect();
    let diagnostics = scanner.into_diagnostics();

    debug!(tokens = tokens.len(), diagnostics = diagnostics.len(); "Tokenized source");

    (tokens, diagnostics)
}

/// Returns the cooked contents of a quoted string token.
///
/// Known escapes are replaced; unknown escapes are kept as written. The
/// surrounding quotes are removed when present.
pub fn unescape(raw: &str) -> String {
    let inner = strip_quotes(raw);
    let mut cooked = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            cooked.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => cooked.push('\n'),
            Some('r') => cooked.push('\r'),
            Some('t') => cooked.push('\t'),
            Some('0') => cooked.push('\0'),
            Some(c @ ('\\' | '"' | '\'' | '/' | ' ' | '#')) => cooked.push(c),
            Some(other) => {
                cooked.push('\\');
                cooked.push(other);
            }
            None => cooked.push('\\'),
        }
    }

    cooked
}

fn strip_quotes(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw.strip_prefix(['"', '\'']).unwrap_or(raw)
}

/// Returns the contents of a block string token.
///
/// Strips the pipe delimiters and the language tag (`md`, `tex`, ...) and
/// trims surrounding blank space.
pub fn cook_block_string(raw: &str) -> &str {
    let pipes = raw.chars().take_while(|c| *c == '|').count().min(3);
    let body = &raw[pipes..];
    let body = body.strip_suffix(&raw[..pipes]).unwrap_or(body);
    let tag_len = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    body[tag_len..].trim()
}

/// Returns the language tag of a block string token, if any.
pub fn block_string_tag(raw: &str) -> Option<&str> {
    let body = raw.trim_start_matches('|');
    let tag_len = body.find(|c: char| c.is_whitespace()).unwrap_or(0);
    (tag_len > 0).then(|| &body[..tag_len])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).0.into_iter().map(|t| t.kind).collect()
    }

    fn test_single_token(input: &str, expected: TokenKind) {
        let (tokens, diagnostics) = tokenize(input);
        assert_eq!(tokens.len(), 1, "expected one token for {input:?}: {tokens:?}");
        assert_eq!(tokens[0].kind, expected, "wrong kind for {input:?}");
        assert_eq!(tokens[0].text, input);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    }

    #[test]
    fn test_identifiers() {
        test_single_token("server", TokenKind::Identifier);
        test_single_token("_private", TokenKind::Identifier);
        test_single_token("font-size", TokenKind::Identifier);
        test_single_token("grid-rows", TokenKind::Identifier);
        test_single_token("3d", TokenKind::Identifier);
        test_single_token("数据库", TokenKind::Identifier);
    }

    #[test]
    fn test_connectors() {
        test_single_token("->", TokenKind::Arrow);
        test_single_token("<-", TokenKind::LeftArrow);
        test_single_token("<->", TokenKind::DoubleArrow);
        test_single_token("--", TokenKind::Line);
    }

    #[test]
    fn test_connector_splits_identifiers() {
        use TokenKind::*;
        assert_eq!(kinds("a->b"), [Identifier, Arrow, Identifier]);
        assert_eq!(kinds("a--b"), [Identifier, Line, Identifier]);
        assert_eq!(kinds("a<->b"), [Identifier, DoubleArrow, Identifier]);
        assert_eq!(kinds("a-b->c"), [Identifier, Arrow, Identifier]);
    }

    #[test]
    fn test_punctuation() {
        test_single_token(".", TokenKind::Dot);
        test_single_token(":", TokenKind::Colon);
        test_single_token(";", TokenKind::Semicolon);
        test_single_token("{", TokenKind::LeftBrace);
        test_single_token("}", TokenKind::RightBrace);
        test_single_token("[", TokenKind::LeftBracket);
        test_single_token("]", TokenKind::RightBracket);
    }

    #[test]
    fn test_strings() {
        test_single_token("\"hello world\"", TokenKind::String);
        test_single_token("'single'", TokenKind::String);
        test_single_token("\"\"", TokenKind::String);
        test_single_token("\"say \\\"hi\\\"\"", TokenKind::String);
    }

    #[test]
    fn test_block_strings() {
        test_single_token("|md # Title |", TokenKind::BlockString);
        test_single_token("||ts a | b||", TokenKind::BlockString);
        test_single_token("|||\nx || y\n|||", TokenKind::BlockString);
    }

    #[test]
    fn test_unmatched_pipe_is_symbol() {
        use TokenKind::*;
        assert_eq!(kinds("a | b"), [Identifier, Whitespace, Symbol, Whitespace, Identifier]);
    }

    #[test]
    fn test_unclosed_pipe_runs() {
        use TokenKind::*;
        let (tokens, diagnostics) = tokenize("a ||||");
        let token_kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(token_kinds, [Identifier, Whitespace, Symbol, Symbol, Symbol, Symbol]);
        assert!(diagnostics.is_empty());

        // A failed `||` does not stop a single `|` from opening a block string.
        assert_eq!(
            kinds("a || b | c"),
            [Identifier, Whitespace, Symbol, BlockString, Whitespace, Identifier]
        );
    }

    #[test]
    fn test_apostrophe_after_identifier() {
        use TokenKind::*;
        let (tokens, diagnostics) = tokenize("don't panic");
        let token_kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(token_kinds, [Identifier, Symbol, Identifier, Whitespace, Identifier]);
        assert_eq!(tokens[1].text, "'");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        assert_eq!(kinds("it 'quoted'"), [Identifier, Whitespace, String]);
        assert_eq!(kinds("a:'b'"), [Identifier, Colon, String]);
    }

    #[test]
    fn test_trivia() {
        test_single_token("  \t", TokenKind::Whitespace);
        test_single_token("# a comment", TokenKind::Comment);
        test_single_token("\"\"\"\nblock\ncomment\n\"\"\"", TokenKind::BlockComment);
        test_single_token("\n", TokenKind::Newline);
    }

    #[test]
    fn test_crlf_is_whitespace_then_newline() {
        assert_eq!(kinds("\r\n"), [TokenKind::Whitespace, TokenKind::Newline]);
    }

    #[test]
    fn test_symbols() {
        test_single_token(",", TokenKind::Symbol);
        test_single_token("!", TokenKind::Symbol);
        test_single_token("🚀", TokenKind::Symbol);
    }

    #[test]
    fn test_unterminated_string_runs_to_line_end() {
        let (tokens, diagnostics) = tokenize("a: \"oops\nb");

        let error = tokens.iter().find(|t| t.kind == TokenKind::Error).unwrap();
        assert_eq!(error.text, "\"oops");
        assert_eq!(error.span, Span::new(3..8));
        assert_eq!(tokens.last().unwrap().text, "b");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E001));
        assert_eq!(diagnostics[0].span(), Some(Span::new(3..8)));
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_input_end() {
        let (tokens, diagnostics) = tokenize("a\n\"\"\" never closed\nb");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(tokens[2].text, "\"\"\" never closed\nb");
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E004));
    }

    #[test]
    fn test_control_character() {
        let (tokens, diagnostics) = tokenize("a\u{7}b");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].span, Span::new(1..2));
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_invalid_escape_keeps_string_token() {
        let (tokens, diagnostics) = tokenize("\"a\\qb\"");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E003));
        assert_eq!(diagnostics[0].span(), Some(Span::new(2..4)));
    }

    #[test]
    fn test_tokens_cover_input() {
        let source = "x: {\n  shape: circle # note\n}\ny <- \"z\" ; |md *hi*|";
        let (tokens, _) = tokenize(source);
        let rebuilt: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_scanner_is_restartable() {
        let scanner = Scanner::new("a -> b");
        let first: Vec<_> = scanner.clone().collect();
        let second: Vec<_> = scanner.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("\"a\\nb\""), "a\nb");
        assert_eq!(unescape("'it\\'s'"), "it's");
        assert_eq!(unescape("\"\\#hash\""), "#hash");
        assert_eq!(unescape("\"keep \\q\""), "keep \\q");
    }

    #[test]
    fn test_cook_block_string() {
        assert_eq!(cook_block_string("|md # Title |"), "# Title");
        assert_eq!(cook_block_string("|||\n  code\n|||"), "code");
        assert_eq!(block_string_tag("|md # Title |"), Some("md"));
        assert_eq!(block_string_tag("| plain |"), None);
    }
}
