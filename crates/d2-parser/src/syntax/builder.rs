use crate::{
    span::Span,
    syntax::{
        NodeKind, SyntaxTree,
        tree::{Element, NodeData, NodeId, TokenData, TokenId},
    },
    tokens::TokenKind,
};

/// Builds a [`SyntaxTree`] from a stream of start, token and finish events.
///
/// Tokens must arrive in source order without gaps. Node spans are derived
/// from their children when the node is finished.
#[derive(Debug)]
pub(crate) struct TreeBuilder {
    nodes: Vec<NodeData>,
    tokens: Vec<TokenData>,
    stack: Vec<NodeId>,
    cursor: usize,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        let mut builder = Self {
            nodes: Vec::new(),
            tokens: Vec::new(),
            stack: Vec::new(),
            cursor: 0,
        };
        builder.start_node(NodeKind::Document);
        builder
    }

    /// Byte offset just past the last token pushed.
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn start_node(&mut self, kind: NodeKind) {
        let id = NodeId(self.nodes.len());
        let parent = self.stack.last().copied();
        self.nodes.push(NodeData {
            kind,
            span: Span::empty(self.cursor),
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(Element::Node(id));
        }
        self.stack.push(id);
    }

    pub(crate) fn token(&mut self, kind: TokenKind, span: Span) {
        debug_assert_eq!(span.start(), self.cursor, "tokens must tile the source");
        let parent = *self.stack.last().expect("token pushed outside any node");
        let id = TokenId(self.tokens.len());
        self.tokens.push(TokenData { kind, span, parent });
        self.nodes[parent.0].children.push(Element::Token(id));
        self.cursor = span.end();
    }

    pub(crate) fn finish_node(&mut self) {
        let id = self.stack.pop().expect("finish_node without start_node");
        let span = {
            let children = &self.nodes[id.0].children;
            match (children.first(), children.last()) {
                (Some(first), Some(last)) => {
                    Span::new(self.element_span(*first).start()..self.element_span(*last).end())
                }
                _ => Span::empty(self.nodes[id.0].span.start()),
            }
        };
        debug_assert!(self.is_tiled(id), "children of a node must be contiguous");
        self.nodes[id.0].span = span;
    }

    /// Closes every open node, the document included, and returns the tree.
    pub(crate) fn finish(mut self, text: String) -> SyntaxTree {
        while !self.stack.is_empty() {
            self.finish_node();
        }
        debug_assert_eq!(self.cursor, text.len(), "tokens must cover the source");
        SyntaxTree::from_parts(text, self.nodes, self.tokens)
    }

    fn element_span(&self, element: Element) -> Span {
        match element {
            Element::Node(id) => self.nodes[id.0].span,
            Element::Token(id) => self.tokens[id.0].span,
        }
    }

    fn is_tiled(&self, id: NodeId) -> bool {
        self.nodes[id.0]
            .children
            .windows(2)
            .all(|pair| self.element_span(pair[0]).end() == self.element_span(pair[1]).start())
    }
}
