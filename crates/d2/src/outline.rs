//! Shape and edge summary of a parsed document.
//!
//! An [`Outline`] resolves the dotted paths of a document against the blocks
//! they appear in. `cloud: { db }` declares `cloud` and `cloud.db`, and a
//! connection inside `cloud`'s block connects shapes under `cloud`.

use std::fmt;

use indexmap::IndexMap;
use log::trace;

use d2_core::identifier::Id;
use d2_parser::{
    Span,
    syntax::{AstNode, Endpoint, Property, ShapeBody, ShapeConnection, ShapeDefinition, Statement},
    tokens::ConnectorKind,
};

/// A shape mentioned somewhere in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeEntry {
    id: Id,
    label: Option<String>,
    shape: Option<String>,
    span: Span,
}

impl ShapeEntry {
    /// Fully qualified path of the shape.
    pub fn id(&self) -> Id {
        self.id
    }

    /// The last label given to the shape, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The last `shape:` value given to the shape, if any.
    pub fn shape(&self) -> Option<&str> {
        self.shape.as_deref()
    }

    /// Span of the first mention.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// One edge of a connection chain between two named shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeEntry {
    source: Id,
    connector: ConnectorKind,
    target: Id,
    label: Option<String>,
    span: Span,
}

impl EdgeEntry {
    pub fn source(&self) -> Id {
        self.source
    }

    pub fn connector(&self) -> ConnectorKind {
        self.connector
    }

    pub fn target(&self) -> Id {
        self.target
    }

    /// Label of the connection the edge belongs to.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Span of the whole connection statement.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// Shapes in order of first mention, and edges in document order.
///
/// # Example
///
/// ```
/// use d2::outline::Outline;
///
/// let parse = d2_parser::parse("cloud: AWS {\n  lb -> api\n}");
/// let outline = Outline::from_document(parse.document());
///
/// let ids: Vec<String> = outline.shapes().map(|s| s.id().to_string()).collect();
/// assert_eq!(ids, ["cloud", "cloud.lb", "cloud.api"]);
/// assert_eq!(outline.edges()[0].source(), "cloud.lb");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Outline {
    shapes: IndexMap<Id, ShapeEntry>,
    edges: Vec<EdgeEntry>,
}

impl Outline {
    /// Builds the outline of a document or any other shape body.
    pub fn from_document<'t>(body: impl ShapeBody<'t>) -> Self {
        let mut outline = Self::default();
        outline.collect_body(body, None);
        trace!(shapes = outline.shapes.len(), edges = outline.edges.len(); "Built outline");
        outline
    }

    pub fn shapes(&self) -> impl Iterator<Item = &ShapeEntry> {
        self.shapes.values()
    }

    pub fn shape(&self, id: Id) -> Option<&ShapeEntry> {
        self.shapes.get(&id)
    }

    pub fn edges(&self) -> &[EdgeEntry] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.edges.is_empty()
    }

    fn collect_body<'t>(&mut self, body: impl ShapeBody<'t>, scope: Option<Id>) {
        for statement in body.statements() {
            match statement {
                Statement::Shape(definition) => self.collect_shape(definition, scope),
                Statement::Connection(connection) => self.collect_connection(connection, scope),
                Statement::Property(property) => self.collect_property(property, scope),
                Statement::SubShape(block) => self.collect_body(block, scope),
                Statement::Error(_) => {}
            }
        }
    }

    fn collect_shape(&mut self, definition: ShapeDefinition<'_>, scope: Option<Id>) {
        let shape_id = definition.shape_id();
        let Some(id) = self.declare(scope, &shape_id.segments(), shape_id.syntax().span()) else {
            return;
        };
        if let Some(label) = definition.label_definition() {
            self.entry(id).label = Some(label.value().into_owned());
        }
        if let Some(body) = definition.sub_shape_definition() {
            self.collect_body(body, Some(id));
        }
    }

    fn collect_connection(&mut self, connection: ShapeConnection<'_>, scope: Option<Id>) {
        let mut ids = Vec::new();
        for endpoint in connection.endpoints() {
            let id = match endpoint {
                Endpoint::Shape(shape_id) => {
                    self.declare(scope, &shape_id.segments(), shape_id.syntax().span())
                }
                Endpoint::Inline(inline) => {
                    self.collect_body(inline, scope);
                    None
                }
                Endpoint::Missing(_) => None,
            };
            ids.push(id);
        }

        let label = connection
            .label_definition()
            .map(|label| label.value().into_owned());
        let connectors = connection
            .connectors()
            .into_iter()
            .filter_map(|token| token.connector());
        for (connector, pair) in connectors.zip(ids.windows(2)) {
            // Edges to inline blocks or missing endpoints have no single shape.
            if let [Some(source), Some(target)] = pair {
                self.edges.push(EdgeEntry {
                    source: *source,
                    connector,
                    target: *target,
                    label: label.clone(),
                    span: connection.syntax().span(),
                });
            }
        }
    }

    fn collect_property(&mut self, property: Property<'_>, scope: Option<Id>) {
        let key = property.property_key();
        let target = key.target_path();
        let owner = if target.is_empty() {
            scope
        } else {
            self.declare(scope, &target, key.syntax().span())
        };
        let Some(owner) = owner else {
            return;
        };
        let Some(value) = property.attribute_value() else {
            return;
        };

        let keyword_path = key.keyword_path();
        match keyword_path.as_slice() {
            [keyword] if keyword.eq_ignore_ascii_case("label") => {
                self.entry(owner).label = Some(value.value().into_owned());
            }
            [keyword] if keyword.eq_ignore_ascii_case("shape") => {
                self.entry(owner).shape = Some(value.value().into_owned());
            }
            _ => {}
        }
    }

    /// Records `segments` under `scope` and every path above it, returning
    /// the innermost one.
    fn declare<S: AsRef<str>>(
        &mut self,
        scope: Option<Id>,
        segments: &[S],
        span: Span,
    ) -> Option<Id> {
        let mut id = scope;
        for segment in segments {
            let segment = Id::new(segment.as_ref());
            let nested = match id {
                Some(parent) => parent.create_nested(segment),
                None => segment,
            };
            self.shapes.entry(nested).or_insert_with(|| ShapeEntry {
                id: nested,
                label: None,
                shape: None,
                span,
            });
            id = Some(nested);
        }
        id
    }

    fn entry(&mut self, id: Id) -> &mut ShapeEntry {
        self.shapes.entry(id).or_insert_with(|| ShapeEntry {
            id,
            label: None,
            shape: None,
            span: Span::default(),
        })
    }
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "shapes:")?;
        for entry in self.shapes() {
            write!(f, "  {}", entry.id)?;
            if let Some(label) = &entry.label {
                write!(f, ": {label}")?;
            }
            if let Some(shape) = &entry.shape {
                write!(f, " [{shape}]")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "edges:")?;
        for edge in &self.edges {
            write!(f, "  {} {} {}", edge.source, edge.connector, edge.target)?;
            if let Some(label) = &edge.label {
                write!(f, ": {label}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(source: &str) -> Outline {
        let parse = d2_parser::parse(source);
        assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
        Outline::from_document(parse.document())
    }

    fn ids(outline: &Outline) -> Vec<String> {
        outline.shapes().map(|entry| entry.id().to_string()).collect()
    }

    #[test]
    fn test_nested_shapes_are_scoped() {
        let outline = outline("cloud: AWS {\n  db: Postgres {\n    shape: cylinder\n  }\n}");

        assert_eq!(ids(&outline), ["cloud", "cloud.db"]);
        let db = outline.shape(Id::new("cloud.db")).expect("db");
        assert_eq!(db.label(), Some("Postgres"));
        assert_eq!(db.shape(), Some("cylinder"));
        assert_eq!(outline.shape(Id::new("cloud")).unwrap().label(), Some("AWS"));
    }

    #[test]
    fn test_dotted_paths_declare_parents() {
        let outline = outline("a.b.c -> d");

        assert_eq!(ids(&outline), ["a", "a.b", "a.b.c", "d"]);
        assert_eq!(outline.shape(Id::new("a")).unwrap().span(), Span::new(0..5));
    }

    #[test]
    fn test_chain_edges() {
        let outline = outline("a -> b <- c: flow");

        let edges = outline.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].source(), "a");
        assert_eq!(edges[0].connector(), ConnectorKind::Forward);
        assert_eq!(edges[1].connector(), ConnectorKind::Backward);
        assert_eq!(edges[1].target(), "c");
        assert_eq!(edges[1].label(), Some("flow"));
    }

    #[test]
    fn test_connections_inside_blocks() {
        let outline = outline("net: {\n  a -- b\n}");

        assert_eq!(ids(&outline), ["net", "net.a", "net.b"]);
        assert_eq!(outline.edges()[0].source(), "net.a");
    }

    #[test]
    fn test_inline_endpoints_declare_shapes_without_edges() {
        let outline = outline("{ a; b } -> c");

        assert_eq!(ids(&outline), ["a", "b", "c"]);
        assert!(outline.edges().is_empty());
    }

    #[test]
    fn test_keyword_properties() {
        let outline = outline("a.shape: circle\na.label: Start\na.style.fill: red\ndirection: right");

        assert_eq!(ids(&outline), ["a"]);
        let a = outline.shape(Id::new("a")).unwrap();
        assert_eq!(a.shape(), Some("circle"));
        assert_eq!(a.label(), Some("Start"));
    }

    #[test]
    fn test_display() {
        let outline = outline("a: A {\n  shape: circle\n}\na -> b: go");

        assert_eq!(
            outline.to_string(),
            "shapes:\n  a: A [circle]\n  b\nedges:\n  a -> b: go\n"
        );
    }

    #[test]
    fn test_empty_document() {
        assert!(outline("").is_empty());
    }
}
