//! End-to-end parser scenarios: whole source files in, tree shape and diagnostics out.

use bdl_core::lang::types::BaseTypeId;
use bdl_syntax::ast::queries;
use bdl_syntax::ast::{NodeKind, SyntaxTree};
use bdl_syntax::diagnostics::{CollectingSink, ErrorCode};
use bdl_syntax::parser::{self, ParseOptions};
use bdl_syntax::source::SourceLocation;

fn parse(source: &str) -> (SyntaxTree, CollectingSink) {
    let mut sink = CollectingSink::new();
    let tree = parser::parse(source, &ParseOptions::default(), &mut sink);
    (tree, sink)
}

fn kinds_named<'t>(tree: &'t SyntaxTree, pred: impl Fn(&NodeKind) -> bool + 't) -> impl Iterator<Item = &'t NodeKind> {
    tree.ids().map(|id| tree.kind(id)).filter(move |k| pred(*k))
}

#[test]
fn malformed_record_tree() {
    let (tree, sink) = parse("DEFINE r RECORD a INTEGER, b END");
    assert_eq!(sink.len(), 1);
    insta::assert_snapshot!(queries::dump(&tree, tree.root()), @r"
    module @0..32
      DEFINE @0..32
        variable r @7..32
          type reference ! @9..32
            RECORD (a, b) ! @9..32
              type reference INTEGER @18..25
    ");
}

#[test]
fn customer_module_parses_cleanly() {
    let source = r#"
SCHEMA stores
IMPORT FGL utils

GLOBALS
  DEFINE g_user STRING
END GLOBALS

TYPE customer_t RECORD LIKE customer.*

CONSTANT max_rows = 100

MAIN
  DEFINE rows DYNAMIC ARRAY OF customer_t
  DEFINE i INTEGER
  CALL load_customers(rows) RETURNING i
  DISPLAY ARRAY rows TO sr.*
    ON ACTION refresh
      CALL load_customers(rows) RETURNING i
  END DISPLAY
END MAIN

FUNCTION load_customers(rows) RETURNS INTEGER
  DEFINE rows DYNAMIC ARRAY OF customer_t
  DEFINE rec customer_t
  DEFINE n INTEGER
  DECLARE c CURSOR FOR SELECT * FROM customer ORDER BY cust_name
  LET n = 0
  FOREACH c INTO rec.*
    LET n = n + 1
    LET rows[n].* = rec.*
    IF n >= max_rows THEN
      EXIT FOREACH
    END IF
  END FOREACH
  RETURN n
END FUNCTION
"#;
    let (tree, sink) = parse(source);
    let messages: Vec<String> = sink.diagnostics().iter().map(ToString::to_string).collect();
    assert!(sink.is_empty(), "unexpected diagnostics: {messages:#?}");
    assert!(tree.node(tree.root()).is_complete);
    assert_eq!(kinds_named(&tree, |k| k.is_routine()).count(), 2);
    assert_eq!(kinds_named(&tree, |k| matches!(k, NodeKind::Foreach(_))).count(), 1);

    let sql = kinds_named(&tree, |k| matches!(k, NodeKind::Declare(_)))
        .next()
        .expect("declare");
    let NodeKind::Declare(declare) = sql else { unreachable!() };
    assert!(matches!(&declare.source, bdl_syntax::ast::CursorSource::Sql(text) if text == "SELECT * FROM customer ORDER BY cust_name"));
}

#[test]
fn every_diagnostic_has_a_precise_position() {
    let source = "MAIN\n  LET x = \n  DEFINE y DECIMAL(5,)\nEND MAIN\n";
    let (_, sink) = parse(source);
    let positions: Vec<(u32, u32)> = sink.diagnostics().iter().map(|d| (d.line, d.column)).collect();
    assert_eq!(positions.len(), 2, "got: {positions:?}");
    assert_eq!(positions[1], (3, 22), "the bad scale is reported at `)`");
    assert!(positions.windows(2).all(|w| w[0] <= w[1]), "diagnostics are in source order");
}

#[test]
fn decimal_scenarios() {
    let (tree, sink) = parse("DEFINE a DECIMAL(5,2), b DECIMAL(5), c DECIMAL\n");
    assert!(sink.is_empty());
    let constraints: Vec<Option<&str>> = kinds_named(&tree, |k| matches!(k, NodeKind::TypeReference(_)))
        .map(|k| match k {
            NodeKind::TypeReference(t) => {
                assert_eq!(t.base, Some(BaseTypeId::Decimal));
                t.constraint.as_deref()
            }
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(constraints, vec![Some("(5,2)"), Some("(5)"), None]);
}

#[test]
fn stray_end_is_reported_and_skipped() {
    let (tree, sink) = parse("MAIN\n  CALL f()\n  END WHILE\n  CALL g()\nEND MAIN\n");
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.diagnostics()[0].diagnostic.code, ErrorCode::UnexpectedToken);
    assert_eq!(kinds_named(&tree, |k| matches!(k, NodeKind::Call(_))).count(), 2);
}

#[test]
fn case_and_for_loops() {
    let source = "\
FUNCTION grade(score)
  DEFINE score, i INTEGER
  FOR i = 1 TO 10 STEP 2
    CASE
      WHEN score > 90
        RETURN \"A\"
      WHEN score BETWEEN 50 AND 90
        CONTINUE FOR
      OTHERWISE
        EXIT CASE
    END CASE
  END FOR
  RETURN \"F\"
END FUNCTION
";
    let (tree, sink) = parse(source);
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
    let NodeKind::Case(case) = kinds_named(&tree, |k| matches!(k, NodeKind::Case(_))).next().expect("case") else {
        unreachable!()
    };
    assert!(case.subject.is_none());
    assert_eq!(case.arms.len(), 3);
}

#[test]
fn report_definition() {
    let source = "\
REPORT customer_list(r)
  DEFINE r RECORD LIKE customer.*
  OUTPUT
    LEFT MARGIN 0
  ORDER BY r.name
  FORMAT
    PAGE HEADER
      PRINT \"Customers\"
    ON EVERY ROW
      PRINT r.name CLIPPED, COLUMN 30, r.city
    ON LAST ROW
      PRINT COUNT(*) USING \"###\"
END REPORT

MAIN
  START REPORT customer_list
  OUTPUT TO REPORT customer_list(NULL)
  FINISH REPORT customer_list
END MAIN
";
    let (tree, sink) = parse(source);
    assert!(sink.is_empty(), "{:?}", sink.diagnostics());
    let NodeKind::Report(report) = kinds_named(&tree, |k| matches!(k, NodeKind::Report(_))).next().expect("report")
    else {
        unreachable!()
    };
    assert_eq!(report.sections.len(), 5);
    assert_eq!(kinds_named(&tree, |k| matches!(k, NodeKind::ReportCall(_))).count(), 3);
}

#[test]
fn parse_starting_mid_file() {
    let options = ParseOptions::default().with_start(SourceLocation::new(100, 10, 1));
    let mut sink = CollectingSink::new();
    let tree = parser::parse("DEFINE x INTEGER\nLET", &options, &mut sink);
    assert_eq!(tree.span(tree.root()).start, 100);
    assert_eq!(sink.len(), 2, "{:?}", sink.diagnostics());
    assert!(sink.diagnostics().iter().all(|d| d.line == 11));
}

#[test]
fn parse_reader_matches_parse() {
    let source = "MAIN\n  DISPLAY \"a\" || \"b\"\nEND MAIN\n";
    let (expected, _) = parse(source);
    let mut sink = CollectingSink::new();
    let tree = parser::parse_reader(source.as_bytes(), &ParseOptions::default(), &mut sink);
    assert_eq!(queries::dump(&tree, tree.root()), queries::dump(&expected, expected.root()));
}
