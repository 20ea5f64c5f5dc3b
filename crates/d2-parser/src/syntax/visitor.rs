//! Double-dispatch traversal over the syntax tree.
//!
//! Implement [`Visitor`] and override only the methods for the node kinds of
//! interest; every other kind falls through to [`Visitor::visit_element`].
//! [`SyntaxNode::accept`] dispatches one node, [`walk`] dispatches a whole
//! subtree in document order.
//!
//! # Example
//!
//! ```
//! use d2_parser::syntax::{ShapeId, Visitor, walk};
//!
//! #[derive(Default)]
//! struct Ids(Vec<String>);
//!
//! impl<'t> Visitor<'t> for Ids {
//!     fn visit_shape_id(&mut self, node: ShapeId<'t>) {
//!         self.0.push(node.id().to_string());
//!     }
//! }
//!
//! let parse = d2_parser::parse("a -> b.c");
//! let mut ids = Ids::default();
//! walk(parse.tree().root(), &mut ids);
//! assert_eq!(ids.0, ["a", "b.c"]);
//! ```

use crate::syntax::{
    Array, AttributeValue, BlockDefinition, Document, ErrorNode, InlineShapeDefinition,
    LabelDefinition, NodeKind, Property, PropertyKey, ShapeConnection, ShapeDefinition, ShapeId,
    SubShapeDefinition, SyntaxNode,
};

/// One method per node kind, each defaulting to [`Visitor::visit_element`].
pub trait Visitor<'t> {
    /// Fallback for every kind without a dedicated override.
    fn visit_element(&mut self, _node: SyntaxNode<'t>) {}

    fn visit_document(&mut self, node: Document<'t>) {
        self.visit_element(node.0);
    }

    fn visit_shape_definition(&mut self, node: ShapeDefinition<'t>) {
        self.visit_element(node.0);
    }

    fn visit_sub_shape_definition(&mut self, node: SubShapeDefinition<'t>) {
        self.visit_element(node.0);
    }

    fn visit_inline_shape_definition(&mut self, node: InlineShapeDefinition<'t>) {
        self.visit_element(node.0);
    }

    fn visit_shape_connection(&mut self, node: ShapeConnection<'t>) {
        self.visit_element(node.0);
    }

    fn visit_shape_id(&mut self, node: ShapeId<'t>) {
        self.visit_element(node.0);
    }

    fn visit_label_definition(&mut self, node: LabelDefinition<'t>) {
        self.visit_element(node.0);
    }

    fn visit_block_definition(&mut self, node: BlockDefinition<'t>) {
        self.visit_element(node.0);
    }

    fn visit_property(&mut self, node: Property<'t>) {
        self.visit_element(node.0);
    }

    fn visit_property_key(&mut self, node: PropertyKey<'t>) {
        self.visit_element(node.0);
    }

    fn visit_attribute_value(&mut self, node: AttributeValue<'t>) {
        self.visit_element(node.0);
    }

    fn visit_array(&mut self, node: Array<'t>) {
        self.visit_element(node.0);
    }

    fn visit_error(&mut self, node: ErrorNode<'t>) {
        self.visit_element(node.0);
    }
}

impl<'t> SyntaxNode<'t> {
    /// Calls exactly one visitor method, chosen by this node's kind.
    pub fn accept<V: Visitor<'t> + ?Sized>(self, visitor: &mut V) {
        match self.kind() {
            NodeKind::Document => visitor.visit_document(Document(self)),
            NodeKind::ShapeDefinition => visitor.visit_shape_definition(ShapeDefinition(self)),
            NodeKind::SubShapeDefinition => {
                visitor.visit_sub_shape_definition(SubShapeDefinition(self))
            }
            NodeKind::InlineShapeDefinition => {
                visitor.visit_inline_shape_definition(InlineShapeDefinition(self))
            }
            NodeKind::ShapeConnection => visitor.visit_shape_connection(ShapeConnection(self)),
            NodeKind::ShapeId => visitor.visit_shape_id(ShapeId(self)),
            NodeKind::LabelDefinition => visitor.visit_label_definition(LabelDefinition(self)),
            NodeKind::BlockDefinition => visitor.visit_block_definition(BlockDefinition(self)),
            NodeKind::Property => visitor.visit_property(Property(self)),
            NodeKind::PropertyKey => visitor.visit_property_key(PropertyKey(self)),
            NodeKind::AttributeValue => visitor.visit_attribute_value(AttributeValue(self)),
            NodeKind::Array => visitor.visit_array(Array(self)),
            NodeKind::Error => visitor.visit_error(ErrorNode(self)),
        }
    }
}

/// Dispatches `root` and every node below it, pre-order, depth-first.
pub fn walk<'t, V: Visitor<'t> + ?Sized>(root: SyntaxNode<'t>, visitor: &mut V) {
    for node in root.descendants() {
        node.accept(visitor);
    }
}
