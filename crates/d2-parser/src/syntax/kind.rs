use std::fmt;

/// The closed set of syntax node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    ShapeDefinition,
    SubShapeDefinition,
    InlineShapeDefinition,
    ShapeConnection,
    ShapeId,
    LabelDefinition,
    BlockDefinition,
    Property,
    PropertyKey,
    AttributeValue,
    Array,
    Error,
}

impl NodeKind {
    pub const ALL: [NodeKind; 13] = [
        NodeKind::Document,
        NodeKind::ShapeDefinition,
        NodeKind::SubShapeDefinition,
        NodeKind::InlineShapeDefinition,
        NodeKind::ShapeConnection,
        NodeKind::ShapeId,
        NodeKind::LabelDefinition,
        NodeKind::BlockDefinition,
        NodeKind::Property,
        NodeKind::PropertyKey,
        NodeKind::AttributeValue,
        NodeKind::Array,
        NodeKind::Error,
    ];

    /// Kinds that can appear directly in a statement list.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::ShapeDefinition
                | NodeKind::ShapeConnection
                | NodeKind::Property
                | NodeKind::SubShapeDefinition
                | NodeKind::Error
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
