//! Reserved keyword and shape catalogues of the D2 language.
//!
//! A dotted key containing any [`RESERVED_KEYWORDS`] segment is a property
//! rather than a shape path. Style attribute names live in
//! [`crate::style`].

/// Keywords that turn a key path into a property.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "label",
    "shape",
    "icon",
    "constraint",
    "tooltip",
    "link",
    "near",
    "width",
    "height",
    "direction",
    "top",
    "left",
    "grid-rows",
    "grid-columns",
    "grid-gap",
    "vertical-gap",
    "horizontal-gap",
    "class",
    "classes",
    "vars",
    "style",
    "source-arrowhead",
    "target-arrowhead",
    "layers",
    "scenarios",
    "steps",
];

/// Keywords that open a map of style attributes.
pub const STYLE_KEYWORD: &str = "style";

/// Shape types accepted by `shape:` on a shape.
pub const SHAPE_TYPES: &[&str] = &[
    "rectangle",
    "square",
    "page",
    "parallelogram",
    "document",
    "cylinder",
    "queue",
    "package",
    "step",
    "callout",
    "stored_data",
    "person",
    "diamond",
    "oval",
    "circle",
    "hexagon",
    "cloud",
    "text",
    "code",
    "class",
    "sql_table",
    "image",
    "sequence_diagram",
];

/// Shape types accepted by `shape:` inside an arrowhead map.
pub const ARROWHEAD_SHAPES: &[&str] = &[
    "triangle",
    "arrow",
    "diamond",
    "circle",
    "box",
    "cf-one",
    "cf-one-required",
    "cf-many",
    "cf-many-required",
    "cross",
];

/// Returns `true` if `word` is a reserved keyword.
///
/// Matching is case-insensitive, as D2 treats `Shape` and `shape` alike.
pub fn is_reserved(word: &str) -> bool {
    RESERVED_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(word))
}

/// Returns `true` if `word` names a shape type.
pub fn is_shape_type(word: &str) -> bool {
    SHAPE_TYPES.iter().any(|shape| shape.eq_ignore_ascii_case(word))
}

/// Returns `true` if `word` names an arrowhead shape.
pub fn is_arrowhead_shape(word: &str) -> bool {
    ARROWHEAD_SHAPES
        .iter()
        .any(|shape| shape.eq_ignore_ascii_case(word))
}

/// Returns `true` if `word` is an arrowhead keyword.
pub fn is_arrowhead(word: &str) -> bool {
    word.eq_ignore_ascii_case("source-arrowhead") || word.eq_ignore_ascii_case("target-arrowhead")
}
