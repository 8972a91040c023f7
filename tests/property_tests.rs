//! Property-based tests for the BDL front end
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs: the checker and the editor queries accept any text,
//! and declared names always resolve.

use bdl::frontend::check::{CheckForErrors, CheckOptions};
use bdl::frontend::program::Program;
use bdl::ide;
use bdl_core::lang::keywords;
use proptest::prelude::*;

// Strategy for generating identifiers that are not keywords
fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}".prop_filter("Not a keyword", |s| keywords::from_str(s).is_none())
}

const PROGRAM: &str = "\
TYPE money_t DECIMAL(10,2)
DEFINE total money_t
MAIN
  DEFINE i INTEGER
  DECLARE c1 CURSOR FOR SELECT id FROM customer
  FOR i = 1 TO 3
    LET total = total + compute(i)
  END FOR
  OPEN c1
END MAIN
FUNCTION compute(n)
  DEFINE n INTEGER
  RETURN n * 2
END FUNCTION
";

proptest! {
    /// Property: checking arbitrary text never panics and reports in source order
    #[test]
    fn check_accepts_any_text(source in "\\PC{0,200}") {
        let program = Program::default();
        program.add_source("fuzz.4gl", source);
        let reports = CheckForErrors::new(&program, CheckOptions::default()).check_program().unwrap();
        prop_assert_eq!(reports.len(), 1);
        let starts: Vec<usize> = reports[0].diagnostics.iter().map(|d| d.diagnostic.span.start).collect();
        prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }

    /// Property: hover and definition answer (or decline) at every offset, including past the end
    #[test]
    fn queries_are_total(offset in 0usize..PROGRAM.len() + 8) {
        let program = Program::default();
        let id = program.add_source("main.4gl", PROGRAM);
        program.annotate(id);
        let file = program.file(id).unwrap();
        if let Some(hover) = ide::hover(&program, &file, offset) {
            prop_assert!(hover.span.contains(offset));
            prop_assert!(!hover.contents.is_empty());
        }
        if let Some(location) = ide::definition(&program, &file, offset) {
            prop_assert!(location.line >= 1);
            prop_assert!(location.end <= PROGRAM.len());
        }
    }

    /// Property: a declared type name resolves at every use, wherever it is declared
    #[test]
    fn declared_types_resolve(name in ident_strategy(), forward in any::<bool>()) {
        let declaration = format!("TYPE {name} INTEGER\n");
        let usage = format!("DEFINE v_{name} {name}\n");
        let source = if forward { format!("{usage}{declaration}") } else { format!("{declaration}{usage}") };
        let program = Program::default();
        program.add_source("main.4gl", source.as_str());
        let reports = CheckForErrors::new(&program, CheckOptions::default()).check_program().unwrap();
        let messages: Vec<String> = reports[0].diagnostics.iter().map(ToString::to_string).collect();
        prop_assert!(messages.is_empty(), "{}: {:?}", source, messages);
    }
}
