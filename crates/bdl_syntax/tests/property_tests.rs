//! Property-based tests for the syntax front end.
//!
//! These tests use proptest to check invariants that must hold for *any* input, including text that is not BDL
//! at all: the tokenizer and parser are total, spans nest, and offsets map to positions and back.

use bdl_syntax::ast::queries;
use bdl_syntax::diagnostics::NullSink;
use bdl_syntax::lexer::{self, TokenKind};
use bdl_syntax::parser::{self, ParseOptions};
use bdl_syntax::source::LineOffsetTable;
use proptest::prelude::*;

/// Source-like text: BDL words and symbols mixed with noise, across several lines.
fn source_like() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("MAIN".to_string()),
        Just("END".to_string()),
        Just("FUNCTION".to_string()),
        Just("DEFINE".to_string()),
        Just("RECORD".to_string()),
        Just("DECIMAL".to_string()),
        Just("IF".to_string()),
        Just("THEN".to_string()),
        Just("LET".to_string()),
        Just("CALL".to_string()),
        Just("LIKE".to_string()),
        Just("ARRAY".to_string()),
        Just("OF".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just(",".to_string()),
        Just("=".to_string()),
        Just("\"str".to_string()),
        Just("{ comment".to_string()),
        Just("\n".to_string()),
        Just("\n  ".to_string()),
        "[a-z_]{1,8}",
        "[0-9]{1,4}",
        "[ -~]{0,3}",
    ];
    prop::collection::vec(word, 0..60).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn tokenizer_is_total_and_ends_with_eof(source in "\\PC{0,200}") {
        let tokens = lexer::lex(&source);
        prop_assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
        for token in &tokens {
            prop_assert!(token.span.start <= token.span.end);
            prop_assert!(token.span.end <= source.len());
        }
    }

    #[test]
    fn token_spans_are_ordered(source in source_like()) {
        let tokens = lexer::lex(&source);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].span.start <= pair[1].span.start, "{:?} then {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn indents_and_dedents_balance(source in source_like()) {
        let tokens = lexer::lex(&source);
        let indents = tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        prop_assert_eq!(indents, dedents);
    }

    #[test]
    fn parser_is_total_and_spans_nest(source in source_like()) {
        let tree = parser::parse(&source, &ParseOptions::default(), &mut NullSink);
        let root = tree.span(tree.root());
        prop_assert_eq!(root.start, 0);
        prop_assert_eq!(root.end, source.len());

        for id in queries::descendants(&tree, tree.root()) {
            let node = tree.node(id);
            let mut previous = node.span.start;
            for child in node.children() {
                let span = tree.span(child);
                prop_assert!(node.span.covers(span), "{} does not cover {}", id, child);
                prop_assert!(span.start >= previous, "children of {} are out of order", id);
                prop_assert_eq!(tree.node(child).parent(), Some(id));
                previous = span.start;
            }
        }
    }

    #[test]
    fn every_node_is_reachable_from_the_root(source in source_like()) {
        let tree = parser::parse(&source, &ParseOptions::default(), &mut NullSink);
        let reachable = queries::descendants(&tree, tree.root()).count();
        prop_assert_eq!(reachable, tree.len());
    }

    #[test]
    fn offsets_round_trip_through_positions(source in "[a-z \\n]{0,120}") {
        let table = LineOffsetTable::from_source(&source);
        for offset in 0..=source.len() {
            let (line, column) = table.location_of(offset);
            prop_assert_eq!(table.offset_of(line, column), Some(offset));
        }
    }

    #[test]
    fn positions_round_trip_through_offsets(
        source in "[a-z \\n]{0,120}",
        line_pick in 0usize..64,
        column_pick in 0usize..64,
    ) {
        let table = LineOffsetTable::from_source(&source);
        let line = (line_pick % table.line_count()) as u32 + 1;
        let start = table.line_start(line).unwrap();
        // The last line also accepts the position just past the end of the text.
        let end = table.line_start(line + 1).unwrap_or(source.len() + 1);
        let column = (column_pick % (end - start)) as u32 + 1;
        let offset = table.offset_of(line, column).unwrap();
        prop_assert_eq!(table.location_of(offset), (line, column));
    }

    #[test]
    fn node_at_returns_a_node_containing_the_offset(source in source_like(), pick in 0usize..400) {
        let tree = parser::parse(&source, &ParseOptions::default(), &mut NullSink);
        if source.is_empty() {
            return Ok(());
        }
        let offset = pick % source.len();
        if let Some(id) = queries::node_at(&tree, offset) {
            prop_assert!(tree.span(id).contains(offset));
        }
    }
}
