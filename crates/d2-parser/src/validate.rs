//! Keyword and value checks that run on a finished tree.
//!
//! The parser accepts any key inside a `style` map and any value after
//! `shape:`. This pass walks the properties of a tree and reports:
//!
//! - `E200` (warning): unknown keyword inside a `style` map or a connection
//!   block,
//! - `E201` (error): style value outside its allowed range or set,
//! - `E202` (warning): unknown shape type.

use log::debug;

use d2_core::{keyword, style::StyleKeyword};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    syntax::{AstNode, NodeKind, Property, SyntaxTree, Visitor, walk},
};

/// Which checks [`validate`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateConfig {
    /// Style keywords, style values and connection block keywords.
    pub check_styles: bool,
    /// `shape:` values.
    pub check_shapes: bool,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            check_styles: true,
            check_shapes: true,
        }
    }
}

/// Runs the enabled checks over `tree`, returning diagnostics in document
/// order.
///
/// # Example
///
/// ```
/// use d2_parser::{parse, validate::{validate, ValidateConfig}};
///
/// let parse = parse("a.style.opacity: 1.5");
/// let diagnostics = validate(parse.tree(), ValidateConfig::default());
///
/// assert_eq!(
///     diagnostics[0].message(),
///     "expected opacity to be a float between 0 and 1"
/// );
/// ```
pub fn validate(tree: &SyntaxTree, config: ValidateConfig) -> Vec<Diagnostic> {
    let mut validator = Validator {
        config,
        diagnostics: DiagnosticCollector::new(),
    };
    walk(tree.root(), &mut validator);

    let diagnostics = validator.diagnostics.finish();
    debug!(diagnostics = diagnostics.len(); "Validated document");
    diagnostics
}

/// What owns the `{ ... }` block a property sits in.
enum Owner<'t> {
    /// Statement position, not inside any block.
    None,
    /// A map-valued property such as `style: { ... }`.
    Property(Property<'t>),
    /// The block of a connection.
    Connection,
}

fn owner(property: Property<'_>) -> Owner<'_> {
    let Some(block) = property
        .syntax()
        .parent()
        .filter(|parent| parent.kind() == NodeKind::BlockDefinition)
    else {
        return Owner::None;
    };
    match block.parent() {
        Some(parent) if parent.kind() == NodeKind::ShapeConnection => Owner::Connection,
        Some(parent) => Property::cast(parent).map_or(Owner::None, Owner::Property),
        None => Owner::None,
    }
}

/// Keyword path of `property`, including the keys of the maps around it.
///
/// `style: { fill: red }` gives `style.fill` for the inner property.
fn keyword_path(property: Property<'_>) -> Vec<String> {
    let key = property.property_key();
    match owner(property) {
        Owner::Property(outer) => {
            let mut path = keyword_path(outer);
            path.extend(key.segments().into_iter().map(String::from));
            path
        }
        Owner::None | Owner::Connection => key
            .keyword_path()
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

struct Validator {
    config: ValidateConfig,
    diagnostics: DiagnosticCollector,
}

impl Validator {
    fn check_connection_keyword(&mut self, property: Property<'_>) {
        let key = property.property_key();
        let Some(first) = key.segments().into_iter().next() else {
            return;
        };
        if !keyword::is_reserved(&first) {
            self.diagnostics.emit(
                Diagnostic::warning(format!("unknown keyword `{first}` in connection block"))
                    .with_code(ErrorCode::E200)
                    .with_label(key.syntax().span(), ErrorCode::E200.description()),
            );
        }
    }

    fn check_style(&mut self, property: Property<'_>, attribute: &str) {
        let key = property.property_key();
        let Some(style) = StyleKeyword::from_keyword(attribute) else {
            self.diagnostics.emit(
                Diagnostic::warning(format!("unknown style keyword `{attribute}`"))
                    .with_code(ErrorCode::E200)
                    .with_label(key.syntax().span(), ErrorCode::E200.description()),
            );
            return;
        };

        // Flags and maps carry no scalar value to check.
        let Some(value) = property.attribute_value() else {
            return;
        };
        if let Err(err) = style.validate(&value.value()) {
            self.diagnostics.emit(
                Diagnostic::error(err.to_string())
                    .with_code(ErrorCode::E201)
                    .with_label(value.syntax().span(), ErrorCode::E201.description()),
            );
        }
    }

    fn check_shape(&mut self, property: Property<'_>, path: &[String]) {
        let Some(value) = property.attribute_value() else {
            return;
        };
        let shape = value.value();
        let arrowhead = path.iter().any(|segment| keyword::is_arrowhead(segment));
        let known = if arrowhead {
            keyword::is_arrowhead_shape(&shape)
        } else {
            keyword::is_shape_type(&shape)
        };
        if !known {
            let kind = if arrowhead { "arrowhead shape" } else { "shape type" };
            self.diagnostics.emit(
                Diagnostic::warning(format!("unknown {kind} `{shape}`"))
                    .with_code(ErrorCode::E202)
                    .with_label(value.syntax().span(), ErrorCode::E202.description()),
            );
        }
    }
}

impl<'t> Visitor<'t> for Validator {
    fn visit_property(&mut self, property: Property<'t>) {
        if self.config.check_styles && matches!(owner(property), Owner::Connection) {
            self.check_connection_keyword(property);
        }

        let path = keyword_path(property);
        match path.as_slice() {
            [style, rest @ ..]
                if self.config.check_styles
                    && !rest.is_empty()
                    && style.eq_ignore_ascii_case(keyword::STYLE_KEYWORD) =>
            {
                self.check_style(property, &rest.join("."));
            }
            [.., last] if self.config.check_shapes && last.eq_ignore_ascii_case("shape") => {
                self.check_shape(property, &path);
            }
            _ => {}
        }
    }
}
