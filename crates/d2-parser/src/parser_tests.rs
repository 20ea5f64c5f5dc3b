//! Scenario tests for the recursive-descent parser
//!
//! These tests drive the whole pipeline (scanner and parser) over small D2
//! documents and check the shape of the resulting tree and the diagnostics.

use crate::{
    Parse,
    error::{ErrorCode, Severity},
    parse,
    span::Span,
    syntax::{NodeKind, SyntaxNode},
};

/// Kinds of the direct child nodes of `node`.
fn child_kinds(node: SyntaxNode<'_>) -> Vec<NodeKind> {
    node.children().map(|child| child.kind()).collect()
}

/// Codes of every diagnostic, in emission order.
fn codes(parse: &Parse) -> Vec<ErrorCode> {
    parse
        .diagnostics()
        .iter()
        .filter_map(|diagnostic| diagnostic.code())
        .collect()
}

/// Parses `source` and asserts that no diagnostic was emitted.
fn parse_clean(source: &str) -> Parse {
    let parse = parse(source);
    assert!(
        parse.diagnostics().is_empty(),
        "expected no diagnostics for {source:?}, got {:?}",
        parse.diagnostics()
    );
    parse
}

/// Asserts that concatenating every token reproduces the source.
fn assert_round_trip(source: &str) {
    let parse = parse(source);
    let rebuilt: String = parse.tree().tokens().map(|token| token.text()).collect();
    assert_eq!(rebuilt, source);
}

#[cfg(test)]
mod basic_parsing_tests {
    use super::*;

    #[test]
    fn test_single_connection() {
        let parse = parse_clean("a -> b");
        let root = parse.tree().root();

        assert_eq!(child_kinds(root), [NodeKind::ShapeConnection]);
        let connection = root.children().next().unwrap();
        assert_eq!(child_kinds(connection), [NodeKind::ShapeId, NodeKind::ShapeId]);
        assert_eq!(connection.span(), Span::new(0..6));
    }

    #[test]
    fn test_shape_with_property_block() {
        let parse = parse_clean("a: { shape: circle }");
        let root = parse.tree().root();

        let shape = root.children().next().unwrap();
        assert_eq!(shape.kind(), NodeKind::ShapeDefinition);
        assert_eq!(
            child_kinds(shape),
            [NodeKind::ShapeId, NodeKind::SubShapeDefinition]
        );

        let body = shape.children().nth(1).unwrap();
        assert_eq!(child_kinds(body), [NodeKind::Property]);
        let property = body.children().next().unwrap();
        assert_eq!(
            child_kinds(property),
            [NodeKind::PropertyKey, NodeKind::AttributeValue]
        );
    }

    #[test]
    fn test_empty_input() {
        let parse = parse_clean("");
        let root = parse.tree().root();

        assert_eq!(root.kind(), NodeKind::Document);
        assert_eq!(root.span(), Span::new(0..0));
        assert_eq!(root.children().count(), 0);
    }

    #[test]
    fn test_only_trivia() {
        let parse = parse_clean("  # just a comment\n\n\"\"\"\nblock\n\"\"\"\n");
        assert_eq!(parse.tree().root().children().count(), 0);
        assert_round_trip("  # just a comment\n\n\"\"\"\nblock\n\"\"\"\n");
    }

    #[test]
    fn test_statements_separated_by_semicolons() {
        let parse = parse_clean("a; b; c -> d");
        assert_eq!(
            child_kinds(parse.tree().root()),
            [
                NodeKind::ShapeDefinition,
                NodeKind::ShapeDefinition,
                NodeKind::ShapeConnection,
            ]
        );
    }

    #[test]
    fn test_shape_with_label() {
        let parse = parse_clean("server: Web Server  # trailing comment");
        let shape = parse.tree().root().children().next().unwrap();

        let label = shape.children().nth(1).unwrap();
        assert_eq!(label.kind(), NodeKind::LabelDefinition);
        assert_eq!(label.text(), "Web Server");
    }

    #[test]
    fn test_apostrophe_in_label() {
        let parse = parse_clean("a: don't panic");
        let shape = parse.tree().root().children().next().unwrap();

        let label = shape.children().nth(1).unwrap();
        assert_eq!(label.kind(), NodeKind::LabelDefinition);
        assert_eq!(label.text(), "don't panic");
    }

    #[test]
    fn test_shape_with_label_and_block() {
        let parse = parse_clean("a: Label {\n  b\n}");
        let shape = parse.tree().root().children().next().unwrap();

        assert_eq!(
            child_kinds(shape),
            [
                NodeKind::ShapeId,
                NodeKind::LabelDefinition,
                NodeKind::SubShapeDefinition,
            ]
        );
    }

    #[test]
    fn test_shape_block_without_colon() {
        let parse = parse_clean("a {\n  b\n}");
        let shape = parse.tree().root().children().next().unwrap();

        assert_eq!(
            child_kinds(shape),
            [NodeKind::ShapeId, NodeKind::SubShapeDefinition]
        );
    }

    #[test]
    fn test_colon_without_label() {
        let parse = parse_clean("a:\nb:");
        assert_eq!(
            child_kinds(parse.tree().root()),
            [NodeKind::ShapeDefinition, NodeKind::ShapeDefinition]
        );
    }
}

#[cfg(test)]
mod path_tests {
    use super::*;

    #[test]
    fn test_dotted_shape_path() {
        let parse = parse_clean("a.b.c: deep");
        let id = parse.tree().root().children().next().unwrap().children().next().unwrap();

        assert_eq!(id.kind(), NodeKind::ShapeId);
        assert_eq!(id.text(), "a.b.c");
    }

    #[test]
    fn test_multi_word_segment() {
        let parse = parse_clean("my shape -> other shape");
        let connection = parse.tree().root().children().next().unwrap();
        let ids: Vec<_> = connection.children().map(|n| n.text()).collect();

        assert_eq!(ids, ["my shape", "other shape"]);
    }

    #[test]
    fn test_quoted_segment() {
        let parse = parse_clean("\"a.b\".c -> d");
        let connection = parse.tree().root().children().next().unwrap();
        assert_eq!(connection.children().next().unwrap().text(), "\"a.b\".c");
    }

    #[test]
    fn test_keyword_path_is_property() {
        let parse = parse_clean("a.style.fill: red");
        assert_eq!(child_kinds(parse.tree().root()), [NodeKind::Property]);
    }

    #[test]
    fn test_quoted_keyword_is_shape() {
        let parse = parse_clean("\"shape\": just a name");
        assert_eq!(child_kinds(parse.tree().root()), [NodeKind::ShapeDefinition]);
    }

    #[test]
    fn test_keyword_before_connector_is_connection() {
        let parse = parse_clean("shape -> label");
        assert_eq!(child_kinds(parse.tree().root()), [NodeKind::ShapeConnection]);
    }

    #[test]
    fn test_trailing_dot_is_rejected() {
        let parse = parse("a.");
        assert_eq!(codes(&parse), [ErrorCode::E100]);
        assert_eq!(
            child_kinds(parse.tree().root()),
            [NodeKind::ShapeDefinition, NodeKind::Error]
        );
    }
}

#[cfg(test)]
mod connection_tests {
    use super::*;

    #[test]
    fn test_chain_is_one_connection() {
        let parse = parse_clean("a -> b -> c");
        let root = parse.tree().root();

        assert_eq!(root.children().count(), 1);
        let connection = root.children().next().unwrap();
        assert_eq!(connection.children().count(), 3);
    }

    #[test]
    fn test_all_connectors() {
        parse_clean("a -> b\na <- b\na <-> b\na -- b");
    }

    #[test]
    fn test_connection_label_and_block() {
        let parse = parse_clean("a -> b: calls {\n  style.stroke: red\n}");
        let connection = parse.tree().root().children().next().unwrap();

        assert_eq!(
            child_kinds(connection),
            [
                NodeKind::ShapeId,
                NodeKind::ShapeId,
                NodeKind::LabelDefinition,
                NodeKind::BlockDefinition,
            ]
        );
    }

    #[test]
    fn test_connection_block_without_label() {
        let parse = parse_clean("a -> b: {\n  source-arrowhead: 1\n}");
        let connection = parse.tree().root().children().next().unwrap();
        assert_eq!(
            child_kinds(connection),
            [NodeKind::ShapeId, NodeKind::ShapeId, NodeKind::BlockDefinition]
        );
    }

    #[test]
    fn test_inline_endpoint() {
        let parse = parse_clean("{ a; b } -> c");
        let connection = parse.tree().root().children().next().unwrap();

        assert_eq!(connection.kind(), NodeKind::ShapeConnection);
        let inline = connection.children().next().unwrap();
        assert_eq!(inline.kind(), NodeKind::InlineShapeDefinition);
        assert_eq!(
            child_kinds(inline),
            [NodeKind::ShapeDefinition, NodeKind::ShapeDefinition]
        );
    }

    #[test]
    fn test_inline_target() {
        let parse = parse_clean("a -> { b }");
        let connection = parse.tree().root().children().next().unwrap();
        assert_eq!(
            child_kinds(connection),
            [NodeKind::ShapeId, NodeKind::InlineShapeDefinition]
        );
    }

    #[test]
    fn test_apostrophe_in_connection_label() {
        let parse = parse_clean("a -> b: it's here");
        let connection = parse.tree().root().children().next().unwrap();

        assert_eq!(
            child_kinds(connection),
            [NodeKind::ShapeId, NodeKind::ShapeId, NodeKind::LabelDefinition]
        );
        assert_eq!(connection.children().nth(2).unwrap().text(), "it's here");
    }

    #[test]
    fn test_missing_target_at_end_of_input() {
        let parse = parse("a -> ");

        assert_eq!(codes(&parse), [ErrorCode::E103]);
        assert_eq!(parse.diagnostics()[0].span(), Some(Span::empty(5)));

        let connection = parse.tree().root().children().next().unwrap();
        let missing = connection.children().nth(1).unwrap();
        assert_eq!(missing.kind(), NodeKind::Error);
        assert_eq!(missing.span(), Span::empty(5));
    }

    #[test]
    fn test_missing_target_before_newline() {
        let parse = parse("a ->\nb");

        assert_eq!(codes(&parse), [ErrorCode::E103]);
        assert_eq!(parse.diagnostics()[0].span(), Some(Span::empty(4)));
        assert_eq!(
            child_kinds(parse.tree().root()),
            [NodeKind::ShapeConnection, NodeKind::ShapeDefinition]
        );
    }

    #[test]
    fn test_missing_source() {
        let parse = parse("-> b");

        assert_eq!(codes(&parse), [ErrorCode::E103]);
        assert_eq!(parse.diagnostics()[0].span(), Some(Span::empty(0)));
        let connection = parse.tree().root().children().next().unwrap();
        assert_eq!(
            child_kinds(connection),
            [NodeKind::Error, NodeKind::ShapeId]
        );
    }

    #[test]
    fn test_missing_middle_endpoint() {
        let parse = parse("a -> -> c");
        assert_eq!(codes(&parse), [ErrorCode::E103]);
        let connection = parse.tree().root().children().next().unwrap();
        assert_eq!(
            child_kinds(connection),
            [NodeKind::ShapeId, NodeKind::Error, NodeKind::ShapeId]
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    #[test]
    fn test_map_property() {
        let parse = parse_clean("style: {\n  fill: \"#fff\"\n  stroke-width: 2\n}");
        let property = parse.tree().root().children().next().unwrap();

        assert_eq!(
            child_kinds(property),
            [NodeKind::PropertyKey, NodeKind::BlockDefinition]
        );
        let block = property.children().nth(1).unwrap();
        assert_eq!(
            child_kinds(block),
            [NodeKind::Property, NodeKind::Property]
        );
    }

    #[test]
    fn test_apostrophe_in_attribute_value() {
        let parse = parse_clean("x: {\n  label: user's view\n}");
        let value = parse
            .tree()
            .root()
            .descendants()
            .find(|node| node.kind() == NodeKind::AttributeValue)
            .unwrap();

        assert_eq!(value.text(), "user's view");
    }

    #[test]
    fn test_flag_property() {
        let parse = parse_clean("a: {\n  near\n}");
        let body = parse
            .tree()
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::SubShapeDefinition)
            .unwrap();
        let property = body.children().next().unwrap();

        assert_eq!(property.kind(), NodeKind::Property);
        assert_eq!(child_kinds(property), [NodeKind::PropertyKey]);
    }

    #[test]
    fn test_array_value() {
        let parse = parse_clean("constraint: [primary_key; unique]");
        let value = parse
            .tree()
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::AttributeValue)
            .unwrap();

        assert_eq!(child_kinds(value), [NodeKind::Array]);
        let array = value.children().next().unwrap();
        assert_eq!(
            child_kinds(array),
            [NodeKind::AttributeValue, NodeKind::AttributeValue]
        );
    }

    #[test]
    fn test_nested_array() {
        let parse = parse_clean("vars: [[a, b]; c]");
        let arrays = parse
            .tree()
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::Array)
            .count();
        assert_eq!(arrays, 2);
    }

    #[test]
    fn test_unclosed_array() {
        let parse = parse("constraint: [a; b");

        assert_eq!(codes(&parse), [ErrorCode::E101]);
        let diagnostic = &parse.diagnostics()[0];
        assert_eq!(diagnostic.span(), Some(Span::empty(17)));
        assert_eq!(diagnostic.labels()[1].span(), Span::new(12..13));
    }

    #[test]
    fn test_block_string_value() {
        let parse = parse_clean("label: |md\n  # Title\n  text\n|");
        let value = parse
            .tree()
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::AttributeValue)
            .unwrap();
        assert!(value.text().starts_with("|md"));
    }

    #[test]
    fn test_any_key_in_map_is_property() {
        let parse = parse_clean("style: { custom-thing: 1 }");
        let inner = parse
            .tree()
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::Property)
            .count();
        assert_eq!(inner, 2);
    }
}

#[cfg(test)]
mod block_tests {
    use super::*;

    #[test]
    fn test_nested_shapes() {
        let parse = parse_clean("a: {\n  b: {\n    c\n  }\n}");
        let shapes = parse
            .tree()
            .root()
            .descendants()
            .filter(|n| n.kind() == NodeKind::ShapeDefinition)
            .count();
        assert_eq!(shapes, 3);
    }

    #[test]
    fn test_bare_block_at_document_level() {
        let parse = parse("{ a; b }");

        assert_eq!(codes(&parse), [ErrorCode::E104]);
        assert_eq!(
            child_kinds(parse.tree().root()),
            [NodeKind::SubShapeDefinition]
        );
    }

    #[test]
    fn test_bare_block_inside_shape() {
        let parse = parse_clean("a: {\n  { b }\n}");
        let body = parse.tree().root().descendants().nth(3).unwrap();
        assert_eq!(body.kind(), NodeKind::SubShapeDefinition);
        assert_eq!(child_kinds(body), [NodeKind::SubShapeDefinition]);
    }

    #[test]
    fn test_unclosed_block() {
        let parse = parse("a: {\n  b\n");

        assert_eq!(codes(&parse), [ErrorCode::E102]);
        let diagnostic = &parse.diagnostics()[0];
        assert_eq!(diagnostic.span(), Some(Span::empty(9)));
        assert_eq!(diagnostic.labels()[1].span(), Span::new(3..4));
        assert!(!diagnostic.labels()[1].is_primary());
    }

    #[test]
    fn test_stray_closing_brace() {
        let parse = parse("a\n}\nb");

        assert_eq!(codes(&parse), [ErrorCode::E100]);
        assert_eq!(
            child_kinds(parse.tree().root()),
            [
                NodeKind::ShapeDefinition,
                NodeKind::Error,
                NodeKind::ShapeDefinition,
            ]
        );
    }

    #[test]
    fn test_nesting_limit() {
        let depth = 300;
        let source = format!("{}{}", "a: {".repeat(depth), "}".repeat(depth));
        let parse = parse(&source);

        assert_eq!(codes(&parse), [ErrorCode::E105]);
        let error = parse
            .tree()
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::Error)
            .unwrap();
        assert_eq!(error.span().start(), 256 * 4 + 3);
        assert_round_trip(&source);
    }

    #[test]
    fn test_nesting_at_limit_is_fine() {
        let depth = 256;
        let source = format!("{}{}", "a: {".repeat(depth), "}".repeat(depth));
        parse_clean(&source);
    }
}

#[cfg(test)]
mod error_handling_tests {
    use super::*;

    #[test]
    fn test_recovery_continues_on_next_line() {
        let parse = parse("a: b\n: oops\nc -> d");

        assert_eq!(codes(&parse), [ErrorCode::E100]);
        assert_eq!(
            child_kinds(parse.tree().root()),
            [
                NodeKind::ShapeDefinition,
                NodeKind::Error,
                NodeKind::ShapeConnection,
            ]
        );
    }

    #[test]
    fn test_one_diagnostic_per_bad_statement() {
        let parse = parse("!!! ??? ***\nok");
        assert_eq!(codes(&parse), [ErrorCode::E100]);
        assert_eq!(parse.diagnostics()[0].span(), Some(Span::new(0..1)));
    }

    #[test]
    fn test_junk_after_statement() {
        let parse = parse("a -> b ]");

        assert_eq!(codes(&parse), [ErrorCode::E100]);
        assert_eq!(parse.diagnostics()[0].span(), Some(Span::new(7..8)));
        assert_eq!(
            child_kinds(parse.tree().root()),
            [NodeKind::ShapeConnection, NodeKind::Error]
        );
    }

    #[test]
    fn test_recovery_stops_at_enclosing_brace() {
        let parse = parse("a: {\n  . junk\n  b\n}");

        assert_eq!(codes(&parse), [ErrorCode::E100]);
        let body = parse
            .tree()
            .root()
            .descendants()
            .find(|n| n.kind() == NodeKind::SubShapeDefinition)
            .unwrap();
        assert_eq!(
            child_kinds(body),
            [NodeKind::Error, NodeKind::ShapeDefinition]
        );
        assert!(body.text().ends_with('}'));
    }

    #[test]
    fn test_lexical_errors_come_first() {
        let parse = parse("-> x\na: \"unterminated");

        let diagnostics = parse.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E001));
        assert_eq!(diagnostics[1].code(), Some(ErrorCode::E103));
        assert!(diagnostics.iter().all(|d| d.severity() == Severity::Error));
    }

    #[test]
    fn test_error_token_at_statement_start() {
        let parse = parse("\"open\nb");

        assert_eq!(codes(&parse), [ErrorCode::E001]);
        assert_eq!(
            child_kinds(parse.tree().root()),
            [NodeKind::Error, NodeKind::ShapeDefinition]
        );
    }

    #[test]
    fn test_error_token_as_endpoint() {
        let parse = parse("a -> \"b");

        assert_eq!(codes(&parse), [ErrorCode::E001]);
        let connection = parse.tree().root().children().next().unwrap();
        assert_eq!(
            child_kinds(connection),
            [NodeKind::ShapeId, NodeKind::Error]
        );
        assert_eq!(connection.children().nth(1).unwrap().text(), "\"b");
        assert_round_trip("a -> \"b");
    }

    #[test]
    fn test_error_token_after_statement() {
        let parse = parse("a -> b \"c\nd");

        assert_eq!(codes(&parse), [ErrorCode::E001]);
        assert_eq!(
            child_kinds(parse.tree().root()),
            [NodeKind::ShapeConnection, NodeKind::Error, NodeKind::ShapeDefinition]
        );
    }

    #[test]
    fn test_block_in_property_map_is_rejected() {
        let parse = parse("style: {\n  { fill: red }\n}");
        assert_eq!(codes(&parse), [ErrorCode::E100]);
        assert_round_trip("style: {\n  { fill: red }\n}");
    }
}

#[cfg(test)]
mod whitespace_and_comments_tests {
    use super::*;

    #[test]
    fn test_comments_are_kept() {
        let source = "# header\na -> b # trailing\n\"\"\"\nblock\n\"\"\"\nc";
        parse_clean(source);
        assert_round_trip(source);
    }

    #[test]
    fn test_crlf_line_endings() {
        let source = "a -> b\r\nc: label\r\n";
        let parse = parse_clean(source);
        assert_eq!(parse.tree().root().children().count(), 2);
        assert_round_trip(source);
    }

    #[test]
    fn test_trailing_whitespace_outside_statement() {
        let parse = parse_clean("a: label   \n");
        let shape = parse.tree().root().children().next().unwrap();
        assert_eq!(shape.text(), "a: label");
    }

    #[test]
    fn test_unicode_identifiers() {
        let parse = parse_clean("数据库 -> サーバー: 接続");
        let connection = parse.tree().root().children().next().unwrap();
        assert_eq!(connection.children().next().unwrap().text(), "数据库");
    }
}
