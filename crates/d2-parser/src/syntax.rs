//! The lossless syntax tree.
//!
//! A [`SyntaxTree`] owns the source text and an arena of nodes and tokens.
//! [`SyntaxNode`] and [`SyntaxToken`] are copyable handles into it, and the
//! typed wrappers in this module ([`ShapeDefinition`], [`ShapeConnection`],
//! ...) give named access to the children of each [`NodeKind`].
//!
//! ```
//! use d2_parser::syntax::{Endpoint, ShapeBody};
//!
//! let parse = d2_parser::parse("client -> server: request");
//! let connection = parse.document().shape_connections().next().unwrap();
//!
//! let Some(Endpoint::Shape(target)) = connection.target() else {
//!     unreachable!()
//! };
//! assert_eq!(target.id(), "server");
//! assert_eq!(connection.label_definition().unwrap().value(), "request");
//! ```

mod builder;
mod kind;
mod nodes;
mod tree;
mod visitor;

pub(crate) use builder::TreeBuilder;
pub use kind::NodeKind;
pub use nodes::{
    Array, AstNode, AttributeValue, BlockDefinition, Document, Edge, Endpoint, ErrorNode,
    InlineShapeDefinition, LabelDefinition, Property, PropertyKey, ShapeBody, ShapeConnection,
    ShapeDefinition, ShapeId, Statement, SubShapeDefinition, ValueKind,
};
pub use tree::{Descendants, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree};
pub use visitor::{Visitor, walk};
