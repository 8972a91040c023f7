//! Integration tests for the BDL front end: fixture programs checked end to end.

use std::fs;
use std::path::{Path, PathBuf};

use bdl::diagnostics::{ErrorCode, LocatedDiagnostic};
use bdl::frontend::check::{CheckForErrors, CheckOptions};
use bdl::frontend::program::{FileRole, Program};
use bdl::frontend::providers::DirectoryProgram;
use bdl::ide;

fn fixtures_dir(kind: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(kind)
}

fn fixture_files(kind: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(fixtures_dir(kind))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|e| e == "4gl"))
        .collect();
    files.sort();
    files
}

/// Load `path` on its own and check everything that got loaded.
fn check_alone(path: &Path) -> Vec<LocatedDiagnostic> {
    let program = Program::default();
    program.load(&[path.to_path_buf()]).unwrap();
    let reports = CheckForErrors::new(&program, CheckOptions::default()).check_program().unwrap();
    reports.into_iter().flat_map(|r| r.diagnostics).collect()
}

/// Test that all valid fixtures check without a single diagnostic
#[test]
fn test_valid_fixtures() {
    let files = fixture_files("valid");
    assert!(!files.is_empty());
    for path in files {
        let diagnostics = check_alone(&path);
        let messages: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
        assert!(
            diagnostics.is_empty(),
            "Expected {} to check cleanly, got: {messages:#?}",
            path.display()
        );
    }
}

/// Test that invalid fixtures produce errors, with the expected code where one is known
#[test]
fn test_invalid_fixtures() {
    let expected = [
        ("duplicate.4gl", Some(ErrorCode::DuplicateDeclaration)),
        ("missing_include.4gl", Some(ErrorCode::UnresolvedInclude)),
        ("syntax_error.4gl", None),
        ("unresolved_type.4gl", Some(ErrorCode::UnresolvedType)),
        ("untyped_member.4gl", Some(ErrorCode::UntypedMember)),
    ];
    let files = fixture_files("invalid");
    assert_eq!(files.len(), expected.len());

    for (path, (name, code)) in files.iter().zip(expected) {
        assert_eq!(path.file_name().unwrap(), name);
        let diagnostics = check_alone(path);
        assert!(
            diagnostics.iter().any(|d| d.diagnostic.is_error()),
            "Expected {} to report an error",
            path.display()
        );
        if let Some(code) = code {
            assert!(
                diagnostics.iter().any(|d| d.diagnostic.code == code),
                "Expected {:?} in {}, got {:?}",
                code,
                path.display(),
                diagnostics.iter().map(|d| d.diagnostic.code).collect::<Vec<_>>()
            );
        }
    }
}

fn load_program_fixture() -> (Program, PathBuf) {
    let main = fixtures_dir("program").join("main.4gl");
    let program = Program::default();
    let ids = program.load_program(&main, &DirectoryProgram::default()).unwrap();
    assert_eq!(ids.len(), 3, "main, tax and types are program modules");
    (program, main)
}

mod program_tests {
    use super::*;

    #[test]
    fn test_program_loads_includes_once() {
        let (program, _) = load_program_fixture();
        assert_eq!(program.len(), 4);
        let included: Vec<_> = program.files().into_iter().filter(|f| f.role == FileRole::Included).collect();
        assert_eq!(included.len(), 1);
        assert!(included[0].path.ends_with("common.inc"));
    }

    #[test]
    fn test_program_checks_cleanly_across_files() {
        let (program, _) = load_program_fixture();
        let reports = CheckForErrors::new(&program, CheckOptions::default()).check_program().unwrap();
        for report in &reports {
            let messages: Vec<String> = report.diagnostics.iter().map(ToString::to_string).collect();
            assert!(report.diagnostics.is_empty(), "{}: {messages:#?}", report.file.display_name());
        }
    }

    #[test]
    fn test_entry_alone_misses_sibling_declarations() {
        let main = fixtures_dir("program").join("main.4gl");
        let diagnostics = check_alone(&main);
        let codes: Vec<ErrorCode> = diagnostics.iter().map(|d| d.diagnostic.code).collect();
        // customer_t lives in types.4gl and compute_tax in tax.4gl; money_t and tax_rate come from the include.
        assert_eq!(codes, vec![ErrorCode::UnresolvedType, ErrorCode::UnknownFunction]);
        assert!(diagnostics[0].diagnostic.message.contains("customer_t"));
        assert!(diagnostics[1].diagnostic.message.contains("compute_tax"));
    }
}

mod ide_tests {
    use super::*;

    fn offset_of(source: &str, needle: &str) -> usize {
        source.rfind(needle).unwrap()
    }

    #[test]
    fn test_hover_type_from_include() {
        let (program, main) = load_program_fixture();
        let file = program.file(program.file_id(&main).unwrap()).unwrap();
        let hover = ide::hover(&program, &file, offset_of(&file.source, "total =")).unwrap();
        assert_eq!(hover.contents, "variable total: money_t = DECIMAL(10,2)");
    }

    #[test]
    fn test_hover_constant_names_its_file() {
        let (program, main) = load_program_fixture();
        let file = program.file(program.file_id(&main).unwrap()).unwrap();
        let hover = ide::hover(&program, &file, offset_of(&file.source, "tax_rate")).unwrap();
        assert!(hover.contents.starts_with("constant tax_rate"), "{}", hover.contents);
        assert!(hover.contents.contains("common.inc"), "{}", hover.contents);
    }

    #[test]
    fn test_definition_of_sibling_function() {
        let (program, main) = load_program_fixture();
        let file = program.file(program.file_id(&main).unwrap()).unwrap();
        let location = ide::definition(&program, &file, offset_of(&file.source, "compute_tax")).unwrap();
        assert!(location.path.ends_with("tax.4gl"));
        assert_eq!((location.line, location.column), (1, 10));
    }

    #[test]
    fn test_definition_of_sibling_type() {
        let (program, main) = load_program_fixture();
        let file = program.file(program.file_id(&main).unwrap()).unwrap();
        let location = ide::definition(&program, &file, offset_of(&file.source, "customer_t")).unwrap();
        assert!(location.path.ends_with("types.4gl"));
        assert_eq!(location.line, 1);
    }

    #[test]
    fn test_annotate_attaches_resolved_types() {
        let (program, main) = load_program_fixture();
        let id = program.file_id(&main).unwrap();
        let annotated = program.annotate(id).unwrap();
        assert_eq!(annotated, 2, "customer_t and money_t");
    }
}
