//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bdl_core::LanguageVersion;
use bdl_syntax::ast::queries;
use bdl_syntax::diagnostics::{CollectingSink, Diagnostic, SourceDiagnostic};
use bdl_syntax::lexer::{self, TokenKind, TokenizerOptions};
use bdl_syntax::parser::{self, ParseOptions};
use bdl_syntax::source::LineOffsetTable;

use crate::frontend::check::{CheckForErrors, CheckOptions};
use crate::frontend::program::{MAX_SOURCE_SIZE, Program, SourceFile};
use crate::frontend::providers::{DirectoryProgram, ProgramFileProvider, SearchMode, StaticSchema};
use crate::ide;

use super::{CliError, CliResult, ExitCode};

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub language_version: Option<LanguageVersion>,
    pub search: SearchMode,
    pub schema: Option<PathBuf>,
}

impl Settings {
    fn parse_options(&self) -> ParseOptions {
        match self.language_version {
            Some(version) => ParseOptions::default().with_language_version(version),
            None => ParseOptions::default(),
        }
    }

    fn program(&self) -> CliResult<Program> {
        let program = Program::new(self.parse_options());
        match &self.schema {
            Some(path) => {
                let schema = StaticSchema::load(path)
                    .map_err(|e| CliError::failure(format!("Cannot load schema '{}': {}", path.display(), e)))?;
                Ok(program.with_schema(Arc::new(schema)))
            }
            None => Ok(program),
        }
    }
}

/// Read a source file, enforcing a size limit to prevent memory exhaustion.
pub fn read_source(path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", path.display(), e)))
}

fn render(name: &str, source: &str, diagnostic: &Diagnostic) {
    let report = miette::Report::new(SourceDiagnostic::new(diagnostic, name, source));
    eprintln!("{report:?}");
}

/// Load the program `path` belongs to (every source file in its directory) and return `path`'s file.
fn load_with_siblings(program: &Program, path: &Path) -> CliResult<Arc<SourceFile>> {
    let mut files = DirectoryProgram::default().program_files(path);
    if !files.iter().any(|f| f == path) {
        files.push(path.to_path_buf());
    }
    program.load(&files).map_err(|e| CliError::failure(e.to_string()))?;

    let id = program
        .file_id(path)
        .ok_or_else(|| CliError::failure(format!("'{}' was not loaded", path.display())))?;
    program.annotate(id);
    program
        .file(id)
        .ok_or_else(|| CliError::failure(format!("'{}' was not loaded", path.display())))
}

/// Lex and display tokens, one per line as `line:column category spelling`.
pub fn lex_file(path: &Path, verbatim: bool) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let lines = LineOffsetTable::from_source(&source);
    let tokens = lexer::lex_with(&source, TokenizerOptions::default().with_verbatim(verbatim));

    let mut failed = false;
    for token in &tokens {
        let (line, column) = lines.location_of(token.span.start);
        let text = match token.kind.spelling() {
            spelling if spelling.trim().is_empty() => token.kind.describe(),
            spelling => spelling,
        };
        println!("{line}:{column}\t{:?}\t{}", token.category(), text.escape_debug());
        failed |= matches!(token.kind, TokenKind::Error(_));
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Parse and display the syntax tree. Syntax diagnostics go to stderr.
pub fn parse_file(path: &Path, settings: &Settings) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let mut sink = CollectingSink::new();
    let tree = parser::parse(&source, &settings.parse_options(), &mut sink);

    print!("{}", queries::dump(&tree, tree.root()));

    let name = path.display().to_string();
    for located in sink.diagnostics() {
        render(&name, &source, &located.diagnostic);
    }
    Ok(if sink.has_errors() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Check a program: syntax, declarations, type references and calls.
pub fn check_files(files: &[PathBuf], whole_program: bool, settings: &Settings) -> CliResult<ExitCode> {
    let program = settings.program()?;
    let mut paths = files.to_vec();
    if whole_program {
        if let Some(entry) = files.first() {
            for path in DirectoryProgram::default().program_files(entry) {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
    }
    program.load(&paths).map_err(|e| CliError::failure(e.to_string()))?;

    let options = CheckOptions::default().with_function_search(settings.search);
    let reports = CheckForErrors::new(&program, options)
        .check_program()
        .map_err(|e| CliError::failure(e.to_string()))?;

    let (mut errors, mut warnings) = (0, 0);
    for report in &reports {
        let name = report.file.display_name();
        for located in &report.diagnostics {
            render(&name, &report.file.source, &located.diagnostic);
        }
        let file_errors = report.error_count();
        errors += file_errors;
        warnings += report.diagnostics.len() - file_errors;
    }

    println!("checked {} file(s): {errors} error(s), {warnings} warning(s)", reports.len());
    Ok(if errors > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Print the module outline.
pub fn outline_file(path: &Path, json: bool, settings: &Settings) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let mut sink = CollectingSink::new();
    let tree = parser::parse(&source, &settings.parse_options(), &mut sink);
    let items = ide::outline(&tree);

    if json {
        let text = serde_json::to_string_pretty(&items)
            .map_err(|e| CliError::failure(format!("Cannot serialize outline: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", ide::render_outline(&items));
    }
    Ok(ExitCode::SUCCESS)
}

/// Print hover text for the name at `offset`.
pub fn hover_file(path: &Path, offset: usize, settings: &Settings) -> CliResult<ExitCode> {
    let program = settings.program()?;
    let file = load_with_siblings(&program, path)?;

    match ide::hover(&program, &file, offset) {
        Some(hover) => {
            println!("{}", hover.contents);
            Ok(ExitCode::SUCCESS)
        }
        None => Err(CliError::failure(format!("No information at offset {offset}"))),
    }
}

/// Print the declaration site of the name at `offset`.
pub fn definition_file(path: &Path, offset: usize, json: bool, settings: &Settings) -> CliResult<ExitCode> {
    let program = settings.program()?;
    let file = load_with_siblings(&program, path)?;

    let Some(location) = ide::definition(&program, &file, offset) else {
        return Err(CliError::failure(format!("No definition at offset {offset}")));
    };
    if json {
        let text = serde_json::to_string_pretty(&location)
            .map_err(|e| CliError::failure(format!("Cannot serialize location: {e}")))?;
        println!("{text}");
    } else {
        println!("{}:{}:{}", location.path.display(), location.line, location.column);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bdl_cli_{tag}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.4gl")).unwrap_err();
        assert!(err.message.contains("Cannot access file"));
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_check_reports_failure_on_errors() {
        let dir = temp_dir("check");
        let bad = dir.join("bad.4gl");
        fs::write(&bad, "DEFINE x missing_t\n").unwrap();
        let good = dir.join("good.4gl");
        fs::write(&good, "DEFINE x INTEGER\n").unwrap();

        let settings = Settings::default();
        assert_eq!(check_files(&[good.clone()], false, &settings).unwrap(), ExitCode::SUCCESS);
        assert_eq!(check_files(&[bad], false, &settings).unwrap(), ExitCode::FAILURE);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_check_whole_program_sees_siblings() {
        let dir = temp_dir("program");
        let main = dir.join("main.4gl");
        fs::write(&main, "DEFINE c customer_t\n").unwrap();
        fs::write(dir.join("types.4gl"), "PUBLIC TYPE customer_t INTEGER\n").unwrap();

        let settings = Settings::default();
        assert_eq!(check_files(&[main.clone()], false, &settings).unwrap(), ExitCode::FAILURE);
        assert_eq!(check_files(&[main], true, &settings).unwrap(), ExitCode::SUCCESS);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_hover_without_target_fails() {
        let dir = temp_dir("hover");
        let main = dir.join("main.4gl");
        fs::write(&main, "MAIN\nEND MAIN\n").unwrap();
        let err = hover_file(&main, 0, &Settings::default()).unwrap_err();
        assert!(err.message.contains("offset 0"));
        let _ = fs::remove_dir_all(&dir);
    }
}
