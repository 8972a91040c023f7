#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on specific syntactic forms and on error recovery: one malformed construct should
/// produce one diagnostic and an incomplete node, never a cascade.
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn parse_str(source: &str) -> (SyntaxTree, CollectingSink) {
        parse_with(source, ParseOptions::default())
    }

    fn parse_with(source: &str, options: ParseOptions) -> (SyntaxTree, CollectingSink) {
        let mut sink = CollectingSink::new();
        let tree = parse(source, &options, &mut sink);
        (tree, sink)
    }

    fn find<'t>(tree: &'t SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> Option<(NodeId, &'t NodeKind)> {
        tree.ids().map(|id| (id, tree.kind(id))).find(|(_, kind)| pred(kind))
    }

    fn messages(sink: &CollectingSink) -> Vec<String> {
        sink.diagnostics().iter().map(|d| d.diagnostic.message.clone()).collect()
    }

    #[test]
    fn test_decimal_constraint_is_normalized() {
        let (tree, sink) = parse_str("DEFINE amount DECIMAL( 5 , 2 )\n");
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
        let (_, kind) = find(&tree, |k| matches!(k, NodeKind::TypeReference(_))).expect("type reference");
        let NodeKind::TypeReference(type_ref) = kind else { unreachable!() };
        assert_eq!(type_ref.type_name(), Some("DECIMAL"));
        assert_eq!(type_ref.base, Some(BaseTypeId::Decimal));
        assert_eq!(type_ref.constraint.as_deref(), Some("(5,2)"));
    }

    #[test]
    fn test_decimal_missing_scale_is_one_diagnostic() {
        let (tree, sink) = parse_str("DEFINE amount DECIMAL(5,)\n");
        assert_eq!(sink.len(), 1, "got: {:?}", messages(&sink));
        assert_eq!(sink.diagnostics()[0].diagnostic.code, ErrorCode::InvalidTypeConstraint);
        assert!(messages(&sink)[0].contains("a number"), "got: {}", messages(&sink)[0]);

        let (id, kind) = find(&tree, |k| matches!(k, NodeKind::TypeReference(_))).expect("type reference");
        let NodeKind::TypeReference(type_ref) = kind else { unreachable!() };
        assert_eq!(type_ref.type_name(), Some("DECIMAL"));
        assert!(!tree.node(id).is_complete);
    }

    #[test]
    fn test_datetime_qualifiers() {
        let (tree, sink) = parse_str("DEFINE stamp DATETIME YEAR TO FRACTION(3)\n");
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
        let (_, kind) = find(&tree, |k| matches!(k, NodeKind::TypeReference(_))).expect("type reference");
        let NodeKind::TypeReference(type_ref) = kind else { unreachable!() };
        assert_eq!(type_ref.constraint.as_deref(), Some("YEAR TO FRACTION(3)"));
    }

    #[test]
    fn test_malformed_record_keeps_members() {
        let (tree, sink) = parse_str("DEFINE r RECORD a INTEGER, b END");
        assert_eq!(sink.len(), 1, "got: {:?}", messages(&sink));
        assert_eq!(sink.diagnostics()[0].diagnostic.code, ErrorCode::MissingEnd);

        let (id, kind) = find(&tree, |k| matches!(k, NodeKind::RecordDefinition(_))).expect("record");
        let NodeKind::RecordDefinition(record) = kind else { unreachable!() };
        assert!(!tree.node(id).is_complete);
        let names: Vec<&str> = record.members.iter().map(|m| m.name.node.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(record.member("A").is_some_and(|m| m.type_ref.is_some()));
        assert!(record.member("b").is_some_and(|m| m.type_ref.is_none()));
    }

    #[test]
    fn test_record_missing_comma_on_one_line() {
        let (tree, sink) = parse_str("DEFINE r RECORD a INTEGER b STRING END RECORD\n");
        assert_eq!(sink.len(), 1, "got: {:?}", messages(&sink));
        assert!(messages(&sink)[0].contains("`,`"), "got: {}", messages(&sink)[0]);

        let (id, kind) = find(&tree, |k| matches!(k, NodeKind::RecordDefinition(_))).expect("record");
        let NodeKind::RecordDefinition(record) = kind else { unreachable!() };
        let names: Vec<&str> = record.members.iter().map(|m| m.name.node.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(record.members.iter().all(|m| m.type_ref.is_some()));
        assert!(!tree.node(id).is_complete);
    }

    #[test]
    fn test_record_like_column_is_mimic_misuse() {
        let (_, sink) = parse_str("DEFINE r RECORD LIKE customer.name\n");
        assert_eq!(sink.len(), 1, "got: {:?}", messages(&sink));
        assert_eq!(sink.diagnostics()[0].diagnostic.code, ErrorCode::MimicMisuse);
    }

    #[test]
    fn test_scalar_like_whole_table_is_mimic_misuse() {
        let (_, sink) = parse_str("DEFINE c LIKE stores:customer.*\n");
        assert_eq!(sink.len(), 1, "got: {:?}", messages(&sink));
        assert_eq!(sink.diagnostics()[0].diagnostic.code, ErrorCode::MimicMisuse);
    }

    #[test]
    fn test_missing_end_if_recovers_at_end_function() {
        let source = "FUNCTION f()\n  IF x THEN\n    LET y = 1\nEND FUNCTION\n\nFUNCTION g()\nEND FUNCTION\n";
        let (tree, sink) = parse_str(source);
        assert_eq!(sink.len(), 1, "got: {:?}", messages(&sink));
        assert_eq!(sink.diagnostics()[0].diagnostic.code, ErrorCode::MissingEnd);

        let functions: Vec<NodeId> = tree
            .ids()
            .filter(|id| matches!(tree.kind(*id), NodeKind::Function(_)))
            .collect();
        assert_eq!(functions.len(), 2, "both functions should be parsed");
        assert!(tree.node(functions[0]).is_complete, "END FUNCTION still closes f");
        assert!(tree.node(functions[1]).is_complete);

        let (if_id, _) = find(&tree, |k| matches!(k, NodeKind::If(_))).expect("if statement");
        assert!(!tree.node(if_id).is_complete);
    }

    #[test]
    fn test_missing_end_main_at_eof() {
        let (tree, sink) = parse_str("MAIN\n  CALL f()\n");
        assert_eq!(sink.len(), 1, "got: {:?}", messages(&sink));
        let (id, _) = find(&tree, |k| matches!(k, NodeKind::Main(_))).expect("main");
        assert!(!tree.node(id).is_complete);
    }

    #[test]
    fn test_statement_outside_routine() {
        let (_, sink) = parse_str("LET x = 1\nMAIN\nEND MAIN\n");
        assert_eq!(sink.len(), 1, "got: {:?}", messages(&sink));
        assert_eq!(
            sink.diagnostics()[0].diagnostic.code,
            ErrorCode::StatementOutsideFunction
        );
    }

    #[test]
    fn test_exit_target_must_enclose() {
        let source = "MAIN\n  WHILE TRUE\n    EXIT WHILE\n    EXIT FOR\n  END WHILE\nEND MAIN\n";
        let (_, sink) = parse_str(source);
        let invalid: Vec<_> = sink.with_code(ErrorCode::InvalidExitTarget).collect();
        assert_eq!(invalid.len(), 1, "got: {:?}", messages(&sink));
        assert_eq!(invalid[0].line, 4);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_return_arity_is_checked() {
        let source = "FUNCTION f() RETURNS (INTEGER, STRING)\n  RETURN 1\nEND FUNCTION\n";
        let (_, sink) = parse_str(source);
        let arity: Vec<_> = sink.with_code(ErrorCode::ReturnArity).collect();
        assert_eq!(arity.len(), 1, "got: {:?}", messages(&sink));
        assert!(arity[0].diagnostic.message.contains("2 values"));
    }

    #[test]
    fn test_function_without_returns_accepts_any_return() {
        let source = "FUNCTION f()\n  RETURN 1, 2\nEND FUNCTION\n";
        let (_, sink) = parse_str(source);
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
    }

    #[test]
    fn test_prepare_binds_sql_text() {
        let source = "FUNCTION f()\n  LET q = \"SELECT * FROM customer\"\n  PREPARE s FROM q\n  DECLARE c CURSOR FOR s\nEND FUNCTION\n";
        let (tree, sink) = parse_str(source);
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));

        let (prepare, _) = find(&tree, |k| matches!(k, NodeKind::Prepare(_))).expect("prepare");
        let bound = tree
            .attributes(prepare)
            .and_then(|bag| bag.get::<BoundSql>())
            .expect("bound SQL on PREPARE");
        assert_eq!(bound.statement, "s");
        assert_eq!(bound.text, "SELECT * FROM customer");

        let (declare, _) = find(&tree, |k| matches!(k, NodeKind::Declare(_))).expect("declare");
        assert!(tree.attributes(declare).is_some_and(|bag| bag.contains::<BoundSql>()));
    }

    #[test]
    fn test_prepare_from_expression_is_not_bound() {
        let source = "FUNCTION f()\n  PREPARE s FROM \"SELECT \" || cols\nEND FUNCTION\n";
        let (tree, sink) = parse_str(source);
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
        let (prepare, _) = find(&tree, |k| matches!(k, NodeKind::Prepare(_))).expect("prepare");
        assert!(!tree.attributes(prepare).is_some_and(|bag| bag.contains::<BoundSql>()));
    }

    #[test]
    fn test_dialog_scoped_variables() {
        let source = "MAIN\n  DIALOG\n    DEFINE answer STRING\n    ON ACTION accept\n      EXIT DIALOG\n  END DIALOG\nEND MAIN\n";
        let (tree, sink) = parse_str(source);
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));

        let (dialog, _) = find(&tree, |k| matches!(k, NodeKind::Dialog(_))).expect("dialog");
        let scoped = tree
            .attributes(dialog)
            .and_then(|bag| bag.get::<ScopedVariables>())
            .expect("scoped variables");
        let names: Vec<&str> = scoped.names.iter().map(|n| n.node.as_str()).collect();
        assert_eq!(names, vec!["answer"]);
    }

    #[test]
    fn test_dictionary_is_version_gated() {
        let options = ParseOptions::default().with_language_version(LanguageVersion::BASE);
        let (tree, sink) = parse_with("DEFINE d DICTIONARY OF INTEGER\n", options);
        let unsupported: Vec<_> = sink.with_code(ErrorCode::UnsupportedConstruct).collect();
        assert_eq!(unsupported.len(), 1, "got: {:?}", messages(&sink));
        assert!(find(&tree, |k| matches!(k, NodeKind::DictionaryDefinition(_))).is_none());

        let (tree, sink) = parse_str("DEFINE d DICTIONARY OF INTEGER\n");
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
        assert!(find(&tree, |k| matches!(k, NodeKind::DictionaryDefinition(_))).is_some());
    }

    #[test]
    fn test_static_array_sizes() {
        let (tree, sink) = parse_str("DEFINE grid ARRAY[10, max_cols] OF CHAR(1)\n");
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
        let (_, kind) = find(&tree, |k| matches!(k, NodeKind::ArrayType(_))).expect("array");
        let NodeKind::ArrayType(array) = kind else { unreachable!() };
        assert_eq!(array.kind, ArrayKind::Static);
        assert_eq!(array.sizes, vec![10, 0]);
        assert_eq!(array.dimensions, 2);
    }

    #[test]
    fn test_expression_precedence() {
        let (tree, sink) = parse_str("MAIN\n  LET x = a + b * c\nEND MAIN\n");
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
        let (_, kind) = find(&tree, |k| matches!(k, NodeKind::Binary(b) if b.op == BinaryOp::Add)).expect("sum");
        let NodeKind::Binary(sum) = kind else { unreachable!() };
        assert!(matches!(tree.kind(sum.rhs), NodeKind::Binary(b) if b.op == BinaryOp::Mul));
    }

    #[test]
    fn test_not_between_and_is_not_null() {
        let source = "MAIN\n  IF a NOT BETWEEN 1 AND 5 AND b IS NOT NULL THEN\n  END IF\nEND MAIN\n";
        let (tree, sink) = parse_str(source);
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
        let (_, kind) = find(&tree, |k| matches!(k, NodeKind::Between(_))).expect("between");
        let NodeKind::Between(between) = kind else { unreachable!() };
        assert!(between.negated);
        assert!(between.high.is_some());
        assert!(find(&tree, |k| matches!(k, NodeKind::IsNull(i) if i.negated)).is_some());
        assert!(find(&tree, |k| matches!(k, NodeKind::Binary(b) if b.op == BinaryOp::And)).is_some());
    }

    #[test]
    fn test_missing_operand_is_reported_once() {
        let (_, sink) = parse_str("MAIN\n  LET x = 1 +\nEND MAIN\n");
        let missing: Vec<_> = sink.with_code(ErrorCode::ExpectedExpression).collect();
        assert_eq!(missing.len(), 1, "got: {:?}", messages(&sink));
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        // Unoptimized builds use large frames; give the parser room to reach the limit.
        let handle = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| {
                let source = format!("MAIN\n  LET x = {}1{}\nEND MAIN\n", "(".repeat(400), ")".repeat(400));
                let (tree, sink) = parse_str(&source);
                assert!(sink.has_errors());
                assert!(find(&tree, |k| matches!(k, NodeKind::Main(_))).is_some());
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_keyword_set() {
        let set = KeywordSet::of(&[KeywordId::While, KeywordId::For]);
        assert!(set.contains(KeywordId::While));
        assert!(set.contains(KeywordId::For));
        assert!(!set.contains(KeywordId::Case));
        assert!(KeywordSet::EMPTY.is_empty());
        assert!(!set.with(KeywordId::Case).is_empty());
    }

    #[test]
    fn test_keyword_set_holds_every_keyword() {
        let mut set = KeywordSet::EMPTY;
        for info in keywords::KEYWORDS {
            set.insert(info.id);
        }
        assert!(keywords::KEYWORDS.iter().all(|info| set.contains(info.id)));
    }
}
