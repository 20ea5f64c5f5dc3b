//! Arena storage for the lossless syntax tree and the handles that read it.

use std::{
    fmt::{self, Write as _},
    hash::{Hash, Hasher},
    ptr,
};

use crate::{
    span::Span,
    syntax::{AstNode, NodeKind},
    tokens::{ConnectorKind, TokenKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TokenId(pub(crate) usize);

/// A child slot of a node: either a nested node or a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Element {
    Node(NodeId),
    Token(TokenId),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<Element>,
}

#[derive(Debug, Clone)]
pub(crate) struct TokenData {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
    pub(crate) parent: NodeId,
}

/// An immutable, lossless syntax tree.
///
/// The tree owns the source text. Every token of the source, trivia
/// included, is attached to exactly one node, so the tree reproduces the text
/// byte for byte. The root is always a [`NodeKind::Document`] node.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    text: String,
    nodes: Vec<NodeData>,
    tokens: Vec<TokenData>,
}

impl SyntaxTree {
    pub(crate) fn from_parts(text: String, nodes: Vec<NodeData>, tokens: Vec<TokenData>) -> Self {
        debug_assert!(
            nodes.first().is_some_and(|root| root.kind == NodeKind::Document),
            "first node must be the document"
        );
        Self {
            text,
            nodes,
            tokens,
        }
    }

    /// The root `Document` node.
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: NodeId(0),
        }
    }

    /// The source text the tree was built from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every token in source order.
    pub fn tokens(&self) -> impl DoubleEndedIterator<Item = SyntaxToken<'_>> + '_ {
        (0..self.tokens.len()).map(move |index| SyntaxToken {
            tree: self,
            id: TokenId(index),
        })
    }

    /// The token containing byte `offset`, if any.
    pub fn token_at_offset(&self, offset: usize) -> Option<SyntaxToken<'_>> {
        let index = self
            .tokens
            .partition_point(|token| token.span.end() <= offset);
        (index < self.tokens.len() && self.tokens[index].span.contains(offset)).then(|| {
            SyntaxToken {
                tree: self,
                id: TokenId(index),
            }
        })
    }

    /// Renders the tree as an indented `Kind@start..end` listing.
    ///
    /// ```
    /// let parse = d2_parser::parse("a -> b");
    /// let dump = parse.tree().debug_dump();
    /// assert!(dump.starts_with("Document@0..6\n  ShapeConnection@0..6\n"));
    /// ```
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root(), 0, &mut out);
        out
    }

    fn dump_node(&self, node: SyntaxNode<'_>, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        writeln!(out, "{indent}{}@{}", node.kind(), node.span())
            .expect("Writing to String buffer is infallible");
        for child in node.children_with_tokens() {
            match child {
                SyntaxElement::Node(child) => self.dump_node(child, depth + 1, out),
                SyntaxElement::Token(token) => {
                    writeln!(
                        out,
                        "{indent}  {:?}@{} {:?}",
                        token.kind(),
                        token.span(),
                        token.text()
                    )
                    .expect("Writing to String buffer is infallible");
                }
            }
        }
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn token(&self, id: TokenId) -> &TokenData {
        &self.tokens[id.0]
    }
}

/// A handle to a node inside a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> SyntaxNode<'t> {
    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// Byte range of the node in the source.
    pub fn span(&self) -> Span {
        self.data().span
    }

    /// Exact source text covered by the node.
    pub fn text(&self) -> &'t str {
        &self.tree.text[self.span().range()]
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.data().parent.map(|id| self.with_id(id))
    }

    /// The root `Document` node owning this node.
    pub fn document(&self) -> SyntaxNode<'t> {
        self.tree.root()
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        std::iter::successors(self.parent(), SyntaxNode::parent)
    }

    /// Direct child nodes in document order.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + use<'t> {
        let node = *self;
        self.data().children.iter().filter_map(move |element| match element {
            Element::Node(id) => Some(node.with_id(*id)),
            Element::Token(_) => None,
        })
    }

    /// Direct children, nodes and tokens, in document order.
    pub fn children_with_tokens(&self) -> impl Iterator<Item = SyntaxElement<'t>> + use<'t> {
        let node = *self;
        self.data()
            .children
            .iter()
            .map(move |element| node.element(*element))
    }

    /// This node and every node below it, pre-order, depth-first.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            stack: vec![self.id],
        }
    }

    /// Every token below this node in source order.
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken<'t>> + use<'t> {
        let tree = self.tree;
        let (first, last) = match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => (first.id.0, last.id.0 + 1),
            _ => (0, 0),
        };
        (first..last).map(move |index| SyntaxToken {
            tree,
            id: TokenId(index),
        })
    }

    pub fn first_token(&self) -> Option<SyntaxToken<'t>> {
        self.data().children.iter().find_map(|element| match element {
            Element::Token(id) => Some(SyntaxToken {
                tree: self.tree,
                id: *id,
            }),
            Element::Node(id) => self.with_id(*id).first_token(),
        })
    }

    pub fn last_token(&self) -> Option<SyntaxToken<'t>> {
        self.data().children.iter().rev().find_map(|element| match element {
            Element::Token(id) => Some(SyntaxToken {
                tree: self.tree,
                id: *id,
            }),
            Element::Node(id) => self.with_id(*id).last_token(),
        })
    }

    /// First direct child that casts to `N`.
    pub fn child<N: AstNode<'t>>(&self) -> Option<N> {
        self.children().find_map(N::cast)
    }

    /// Every direct child that casts to `N`, in document order.
    pub fn children_of<N: AstNode<'t>>(&self) -> impl Iterator<Item = N> + use<'t, N> {
        self.children().filter_map(N::cast)
    }

    /// First direct child token of `kind`.
    pub fn child_token(&self, kind: TokenKind) -> Option<SyntaxToken<'t>> {
        self.children_with_tokens()
            .filter_map(SyntaxElement::into_token)
            .find(|token| token.kind() == kind)
    }

    fn data(&self) -> &'t NodeData {
        self.tree.node(self.id)
    }

    fn with_id(&self, id: NodeId) -> SyntaxNode<'t> {
        SyntaxNode {
            tree: self.tree,
            id,
        }
    }

    fn element(&self, element: Element) -> SyntaxElement<'t> {
        match element {
            Element::Node(id) => SyntaxElement::Node(self.with_id(id)),
            Element::Token(id) => SyntaxElement::Token(SyntaxToken {
                tree: self.tree,
                id,
            }),
        }
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl Hash for SyntaxNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.tree, state);
        self.id.hash(state);
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.span())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A handle to a token inside a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxToken<'t> {
    tree: &'t SyntaxTree,
    id: TokenId,
}

impl<'t> SyntaxToken<'t> {
    pub fn kind(&self) -> TokenKind {
        self.tree.token(self.id).kind
    }

    pub fn span(&self) -> Span {
        self.tree.token(self.id).span
    }

    pub fn text(&self) -> &'t str {
        &self.tree.text[self.span().range()]
    }

    /// The node owning this token.
    pub fn parent(&self) -> SyntaxNode<'t> {
        SyntaxNode {
            tree: self.tree,
            id: self.tree.token(self.id).parent,
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.kind().is_trivia()
    }

    pub fn connector(&self) -> Option<ConnectorKind> {
        self.kind().connector()
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxToken<'_> {}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{} {:?}", self.kind(), self.span(), self.text())
    }
}

impl fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Either a node or a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxElement<'t> {
    Node(SyntaxNode<'t>),
    Token(SyntaxToken<'t>),
}

impl<'t> SyntaxElement<'t> {
    pub fn span(&self) -> Span {
        match self {
            SyntaxElement::Node(node) => node.span(),
            SyntaxElement::Token(token) => token.span(),
        }
    }

    pub fn into_node(self) -> Option<SyntaxNode<'t>> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<SyntaxToken<'t>> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }
}

/// Pre-order iterator over a node and its descendants.
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = SyntaxNode<'t>;

    fn next(&mut self) -> Option<SyntaxNode<'t>> {
        let id = self.stack.pop()?;
        let children = &self.tree.node(id).children;
        self.stack
            .extend(children.iter().rev().filter_map(|element| match element {
                Element::Node(child) => Some(*child),
                Element::Token(_) => None,
            }));
        Some(SyntaxNode {
            tree: self.tree,
            id,
        })
    }
}
