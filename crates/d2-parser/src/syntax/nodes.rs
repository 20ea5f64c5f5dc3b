//! Typed wrappers over [`SyntaxNode`].
//!
//! Each wrapper is a zero-cost view of a node of one [`NodeKind`]. Accessors
//! only look at direct children and never mutate the tree.

use std::{borrow::Cow, fmt};

use d2_core::{identifier::Id, keyword};

use crate::{
    lexer,
    syntax::{NodeKind, SyntaxElement, SyntaxNode, SyntaxToken, Visitor},
    tokens::{ConnectorKind, TokenKind},
};

/// A typed view of a syntax node.
pub trait AstNode<'t>: Sized + Copy {
    /// Returns `true` if nodes of `kind` can be viewed as `Self`.
    fn can_cast(kind: NodeKind) -> bool;

    fn cast(node: SyntaxNode<'t>) -> Option<Self>;

    /// The untyped node behind this view.
    fn syntax(&self) -> SyntaxNode<'t>;

    /// Calls the visitor method for this node's kind.
    fn accept<V: Visitor<'t> + ?Sized>(&self, visitor: &mut V);
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $visit:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name<'t>(pub(crate) SyntaxNode<'t>);

        impl<'t> AstNode<'t> for $name<'t> {
            fn can_cast(kind: NodeKind) -> bool {
                kind == NodeKind::$kind
            }

            fn cast(node: SyntaxNode<'t>) -> Option<Self> {
                Self::can_cast(node.kind()).then_some(Self(node))
            }

            fn syntax(&self) -> SyntaxNode<'t> {
                self.0
            }

            fn accept<V: Visitor<'t> + ?Sized>(&self, visitor: &mut V) {
                visitor.$visit(*self);
            }
        }

        impl fmt::Display for $name<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

ast_node!(
    /// The root of every tree.
    Document, Document, visit_document
);
ast_node!(
    /// `a`, `a: Label`, `a: Label { ... }`.
    ShapeDefinition, ShapeDefinition, visit_shape_definition
);
ast_node!(
    /// The `{ ... }` body of a shape, or a bare block in statement position.
    SubShapeDefinition, SubShapeDefinition, visit_sub_shape_definition
);
ast_node!(
    /// A `{ ... }` body used as a connection endpoint.
    InlineShapeDefinition, InlineShapeDefinition, visit_inline_shape_definition
);
ast_node!(
    /// `a -> b`, `a -> b -> c: label { ... }`.
    ShapeConnection, ShapeConnection, visit_shape_connection
);
ast_node!(ShapeId, ShapeId, visit_shape_id);
ast_node!(LabelDefinition, LabelDefinition, visit_label_definition);
ast_node!(
    /// The property-only `{ ... }` body of a connection or a map property.
    BlockDefinition, BlockDefinition, visit_block_definition
);
ast_node!(
    /// `shape: circle`, `style.fill: red`, `style: { ... }`.
    Property, Property, visit_property
);
ast_node!(PropertyKey, PropertyKey, visit_property_key);
ast_node!(AttributeValue, AttributeValue, visit_attribute_value);
ast_node!(Array, Array, visit_array);
ast_node!(
    /// Tokens skipped by recovery, or an empty marker for a missing child.
    ErrorNode, Error, visit_error
);

/// A node that can appear in a statement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'t> {
    Shape(ShapeDefinition<'t>),
    Connection(ShapeConnection<'t>),
    Property(Property<'t>),
    SubShape(SubShapeDefinition<'t>),
    Error(ErrorNode<'t>),
}

impl<'t> Statement<'t> {
    pub fn cast(node: SyntaxNode<'t>) -> Option<Self> {
        let statement = match node.kind() {
            NodeKind::ShapeDefinition => Statement::Shape(ShapeDefinition(node)),
            NodeKind::ShapeConnection => Statement::Connection(ShapeConnection(node)),
            NodeKind::Property => Statement::Property(Property(node)),
            NodeKind::SubShapeDefinition => Statement::SubShape(SubShapeDefinition(node)),
            NodeKind::Error => Statement::Error(ErrorNode(node)),
            _ => return None,
        };
        Some(statement)
    }

    pub fn syntax(&self) -> SyntaxNode<'t> {
        match self {
            Statement::Shape(node) => node.syntax(),
            Statement::Connection(node) => node.syntax(),
            Statement::Property(node) => node.syntax(),
            Statement::SubShape(node) => node.syntax(),
            Statement::Error(node) => node.syntax(),
        }
    }
}

/// Accessors shared by every node that holds a statement list.
pub trait ShapeBody<'t>: AstNode<'t> {
    /// Every statement, in document order.
    fn statements(&self) -> impl Iterator<Item = Statement<'t>> {
        self.syntax().children().filter_map(Statement::cast)
    }

    fn shape_definitions(&self) -> impl Iterator<Item = ShapeDefinition<'t>> {
        self.syntax().children_of::<ShapeDefinition<'t>>()
    }

    /// The first connection in the body.
    fn shape_connection(&self) -> Option<ShapeConnection<'t>> {
        self.syntax().child()
    }

    fn shape_connections(&self) -> impl Iterator<Item = ShapeConnection<'t>> {
        self.syntax().children_of::<ShapeConnection<'t>>()
    }

    fn properties(&self) -> impl Iterator<Item = Property<'t>> {
        self.syntax().children_of::<Property<'t>>()
    }

    /// The first bare `{ ... }` block nested in the body.
    fn sub_shape_definition(&self) -> Option<SubShapeDefinition<'t>> {
        self.syntax().child()
    }
}

impl<'t> ShapeBody<'t> for Document<'t> {}
impl<'t> ShapeBody<'t> for SubShapeDefinition<'t> {}
impl<'t> ShapeBody<'t> for InlineShapeDefinition<'t> {}

impl SubShapeDefinition<'_> {
    /// Returns `false` when the closing `}` is missing.
    pub fn is_closed(&self) -> bool {
        self.0.child_token(TokenKind::RightBrace).is_some()
    }
}

impl InlineShapeDefinition<'_> {
    /// Returns `false` when the closing `}` is missing.
    pub fn is_closed(&self) -> bool {
        self.0.child_token(TokenKind::RightBrace).is_some()
    }
}

impl<'t> ShapeDefinition<'t> {
    pub fn shape_id(&self) -> ShapeId<'t> {
        self.0
            .child()
            .expect("shape definition always starts with a shape id")
    }

    pub fn label_definition(&self) -> Option<LabelDefinition<'t>> {
        self.0.child()
    }

    pub fn sub_shape_definition(&self) -> Option<SubShapeDefinition<'t>> {
        self.0.child()
    }

    /// The interned path of the shape.
    pub fn id(&self) -> Id {
        self.shape_id().id()
    }
}

/// One end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'t> {
    Shape(ShapeId<'t>),
    Inline(InlineShapeDefinition<'t>),
    /// The endpoint was missing or could not be parsed.
    Missing(ErrorNode<'t>),
}

impl<'t> Endpoint<'t> {
    fn cast(node: SyntaxNode<'t>) -> Option<Self> {
        match node.kind() {
            NodeKind::ShapeId => Some(Endpoint::Shape(ShapeId(node))),
            NodeKind::InlineShapeDefinition => Some(Endpoint::Inline(InlineShapeDefinition(node))),
            NodeKind::Error => Some(Endpoint::Missing(ErrorNode(node))),
            _ => None,
        }
    }

    pub fn syntax(&self) -> SyntaxNode<'t> {
        match self {
            Endpoint::Shape(node) => node.syntax(),
            Endpoint::Inline(node) => node.syntax(),
            Endpoint::Missing(node) => node.syntax(),
        }
    }

    pub fn shape_id(&self) -> Option<ShapeId<'t>> {
        match self {
            Endpoint::Shape(id) => Some(*id),
            _ => None,
        }
    }
}

/// A single `source connector target` step of a connection chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<'t> {
    pub source: Endpoint<'t>,
    pub connector: ConnectorKind,
    pub target: Endpoint<'t>,
}

impl<'t> ShapeConnection<'t> {
    /// Endpoints in chain order. A chain of `n` connectors has `n + 1`.
    pub fn endpoints(&self) -> Vec<Endpoint<'t>> {
        self.0.children().filter_map(Endpoint::cast).collect()
    }

    pub fn connectors(&self) -> Vec<SyntaxToken<'t>> {
        self.0
            .children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .filter(|token| token.kind().is_connector())
            .collect()
    }

    /// Splits the chain into its edges: `a -> b -> c` has two.
    pub fn edges(&self) -> Vec<Edge<'t>> {
        let endpoints = self.endpoints();
        self.connectors()
            .into_iter()
            .zip(endpoints.windows(2))
            .filter_map(|(token, pair)| {
                Some(Edge {
                    source: pair[0],
                    connector: token.connector()?,
                    target: pair[1],
                })
            })
            .collect()
    }

    pub fn source(&self) -> Option<Endpoint<'t>> {
        self.0.children().find_map(Endpoint::cast)
    }

    pub fn target(&self) -> Option<Endpoint<'t>> {
        self.0.children().filter_map(Endpoint::cast).nth(1)
    }

    pub fn label_definition(&self) -> Option<LabelDefinition<'t>> {
        self.0.child()
    }

    pub fn block_definition(&self) -> Option<BlockDefinition<'t>> {
        self.0.child()
    }
}

/// One segment of a dotted path.
struct Segment<'t> {
    text: Cow<'t, str>,
    quoted: bool,
}

/// Splits the tokens of `node` on `.` into trimmed segments.
fn path_segments<'t>(node: SyntaxNode<'t>) -> Vec<Segment<'t>> {
    let source = node.tree().text();
    let mut segments = Vec::new();
    let mut current: Vec<SyntaxToken<'t>> = Vec::new();

    let mut flush = |tokens: &mut Vec<SyntaxToken<'t>>| {
        let significant: Vec<_> = tokens.drain(..).filter(|t| !t.is_trivia()).collect();
        let (Some(first), Some(last)) = (significant.first(), significant.last()) else {
            return;
        };
        let segment = if significant.len() == 1 && first.kind() == TokenKind::String {
            Segment {
                text: Cow::Owned(lexer::unescape(first.text())),
                quoted: true,
            }
        } else {
            Segment {
                text: Cow::Borrowed(&source[first.span().start()..last.span().end()]),
                quoted: false,
            }
        };
        segments.push(segment);
    };

    for token in node.tokens() {
        if token.kind() == TokenKind::Dot {
            flush(&mut current);
        } else {
            current.push(token);
        }
    }
    flush(&mut current);
    segments
}

impl<'t> ShapeId<'t> {
    /// Path segments with quotes removed: `a."b.c".d` gives `a`, `b.c`, `d`.
    pub fn segments(&self) -> Vec<Cow<'t, str>> {
        path_segments(self.0).into_iter().map(|s| s.text).collect()
    }

    /// The interned path.
    pub fn id(&self) -> Id {
        Id::from_segments(self.segments())
    }
}

impl<'t> PropertyKey<'t> {
    pub fn segments(&self) -> Vec<Cow<'t, str>> {
        path_segments(self.0).into_iter().map(|s| s.text).collect()
    }

    fn keyword_index(&self) -> Option<usize> {
        path_segments(self.0)
            .iter()
            .position(|segment| !segment.quoted && keyword::is_reserved(&segment.text))
    }

    /// The first reserved keyword in the key: `style` in `a.style.fill`.
    pub fn keyword(&self) -> Option<Cow<'t, str>> {
        let index = self.keyword_index()?;
        self.segments().into_iter().nth(index)
    }

    /// Segments before the first keyword: `a` in `a.style.fill`.
    pub fn target_path(&self) -> Vec<Cow<'t, str>> {
        let mut segments = self.segments();
        segments.truncate(self.keyword_index().unwrap_or(0));
        segments
    }

    /// Segments from the first keyword on: `style.fill` in `a.style.fill`.
    pub fn keyword_path(&self) -> Vec<Cow<'t, str>> {
        let mut segments = self.segments();
        let index = self.keyword_index().unwrap_or(0);
        segments.drain(..index);
        segments
    }
}

impl<'t> Property<'t> {
    pub fn property_key(&self) -> PropertyKey<'t> {
        self.0
            .child()
            .expect("property always starts with a property key")
    }

    pub fn attribute_value(&self) -> Option<AttributeValue<'t>> {
        self.0.child()
    }

    pub fn block_definition(&self) -> Option<BlockDefinition<'t>> {
        self.0.child()
    }

    /// A property with neither value nor block, such as `near` alone, which
    /// reads as `true`.
    pub fn is_flag(&self) -> bool {
        self.attribute_value().is_none() && self.block_definition().is_none()
    }
}

/// Cooks the text of a label or value: unquotes strings, strips block
/// string fences, and returns text runs as written.
fn cooked_text<'t>(node: SyntaxNode<'t>) -> Cow<'t, str> {
    let significant: Vec<_> = node.tokens().filter(|t| !t.is_trivia()).collect();
    match significant.as_slice() {
        [token] if token.kind() == TokenKind::String => Cow::Owned(lexer::unescape(token.text())),
        [token] if token.kind() == TokenKind::BlockString => {
            Cow::Borrowed(lexer::cook_block_string(token.text()))
        }
        _ => Cow::Borrowed(node.text()),
    }
}

fn is_quoted(node: SyntaxNode<'_>) -> bool {
    let mut significant = node.tokens().filter(|t| !t.is_trivia());
    matches!(
        (significant.next().map(|t| t.kind()), significant.next()),
        (Some(TokenKind::String | TokenKind::BlockString), None)
    )
}

impl<'t> LabelDefinition<'t> {
    /// The label text, unquoted.
    pub fn value(&self) -> Cow<'t, str> {
        cooked_text(self.0)
    }

    pub fn is_quoted(&self) -> bool {
        is_quoted(self.0)
    }
}

/// Coarse classification of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    Number,
    Text,
    Array,
}

impl<'t> AttributeValue<'t> {
    /// The value text, unquoted. For arrays this is the raw `[...]` text.
    pub fn value(&self) -> Cow<'t, str> {
        cooked_text(self.0)
    }

    pub fn array(&self) -> Option<Array<'t>> {
        self.0.child()
    }

    pub fn is_quoted(&self) -> bool {
        is_quoted(self.0)
    }

    pub fn value_kind(&self) -> ValueKind {
        if self.array().is_some() {
            return ValueKind::Array;
        }
        if self.is_quoted() {
            return ValueKind::Text;
        }
        let text = self.0.text();
        if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
            ValueKind::Boolean
        } else if text.parse::<f64>().is_ok() {
            ValueKind::Number
        } else {
            ValueKind::Text
        }
    }
}

impl<'t> Array<'t> {
    pub fn values(&self) -> impl Iterator<Item = AttributeValue<'t>> + use<'t> {
        self.0.children_of::<AttributeValue<'t>>()
    }

    pub fn is_closed(&self) -> bool {
        self.0.child_token(TokenKind::RightBracket).is_some()
    }
}

impl<'t> BlockDefinition<'t> {
    pub fn properties(&self) -> impl Iterator<Item = Property<'t>> + use<'t> {
        self.0.children_of::<Property<'t>>()
    }

    pub fn is_closed(&self) -> bool {
        self.0.child_token(TokenKind::RightBrace).is_some()
    }
}

impl ErrorNode<'_> {
    /// Empty markers stand for a required child that was not written.
    pub fn is_missing(&self) -> bool {
        self.0.span().is_empty()
    }
}
