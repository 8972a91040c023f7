//! CLI module for the BDL front end
//!
//! ## Commands
//!
//! - `lex <file>` - Print the token stream
//! - `parse <file>` - Print the syntax tree and syntax diagnostics
//! - `check <file>...` - Parse, resolve and report every diagnostic of a program
//! - `outline <file>` - Print the module outline (text or JSON)
//! - `hover <file> --offset N` - Describe the name at a byte offset
//! - `definition <file> --offset N` - Locate the declaration of the name at a byte offset
//!
//! ## Design
//!
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use bdl_core::LanguageVersion;
use clap::{Parser, Subcommand};

use crate::frontend::providers::SearchMode;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Front end for BDL business-language sources
#[derive(Parser, Debug)]
#[command(name = "bdl")]
#[command(version = VERSION)]
#[command(about = "Scan, parse and resolve BDL sources", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Language version that version-gated syntax is checked against (e.g. 3.20)
    #[arg(long = "language-version", value_name = "VERSION", global = true)]
    pub language_version: Option<LanguageVersion>,

    /// How far function lookups reach: none, program or all
    #[arg(long = "search", value_name = "MODE", default_value = "program", global = true)]
    pub search: SearchMode,

    /// JSON database schema used to resolve LIKE declarations
    #[arg(long = "schema", value_name = "FILE", global = true)]
    pub schema: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the token stream
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Keep comments and whitespace tokens
        #[arg(long)]
        verbatim: bool,
    },

    /// Print the syntax tree
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse, resolve and report diagnostics
    Check {
        /// Source files; included files are loaded automatically
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// Treat every source file next to the first FILE as part of the program
        #[arg(long)]
        program: bool,
    },

    /// Print the outline of a module
    Outline {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Emit JSON instead of indented text
        #[arg(long)]
        json: bool,
    },

    /// Describe the name at a byte offset
    Hover {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_name = "N")]
        offset: usize,
    },

    /// Locate the declaration of the name at a byte offset
    Definition {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_name = "N")]
        offset: usize,
        /// Emit JSON instead of `path:line:column`
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let settings = commands::Settings {
        language_version: cli.language_version,
        search: cli.search,
        schema: cli.schema,
    };

    match cli.command {
        Command::Lex { file, verbatim } => commands::lex_file(&file, verbatim),
        Command::Parse { file } => commands::parse_file(&file, &settings),
        Command::Check { files, program } => commands::check_files(&files, program, &settings),
        Command::Outline { file, json } => commands::outline_file(&file, json, &settings),
        Command::Hover { file, offset } => commands::hover_file(&file, offset, &settings),
        Command::Definition { file, offset, json } => commands::definition_file(&file, offset, json, &settings),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_lex() {
        let cli = Cli::try_parse_from(["bdl", "lex", "main.4gl", "--verbatim"]).unwrap();
        if let Command::Lex { file, verbatim } = cli.command {
            assert_eq!(file, PathBuf::from("main.4gl"));
            assert!(verbatim);
        } else {
            panic!("Expected Lex command");
        }
    }

    #[test]
    fn test_cli_parse_check_many() {
        let cli = Cli::try_parse_from(["bdl", "check", "a.4gl", "b.4gl"]).unwrap();
        if let Command::Check { files, program } = cli.command {
            assert_eq!(files.len(), 2);
            assert!(!program);
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_cli_check_requires_a_file() {
        assert!(Cli::try_parse_from(["bdl", "check"]).is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "bdl",
            "check",
            "main.4gl",
            "--search",
            "all",
            "--language-version",
            "3.20",
            "--schema",
            "db.json",
        ])
        .unwrap();
        assert_eq!(cli.search, SearchMode::All);
        assert_eq!(cli.language_version, Some(LanguageVersion::FUNCTION_TYPES));
        assert_eq!(cli.schema, Some(PathBuf::from("db.json")));
    }

    #[test]
    fn test_cli_default_search_mode() {
        let cli = Cli::try_parse_from(["bdl", "parse", "main.4gl"]).unwrap();
        assert_eq!(cli.search, SearchMode::Program);
        assert!(cli.language_version.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["bdl", "parse", "x.4gl", "--search", "everywhere"]).is_err());
        assert!(Cli::try_parse_from(["bdl", "parse", "x.4gl", "--language-version", "three"]).is_err());
        assert!(Cli::try_parse_from(["bdl", "hover", "x.4gl"]).is_err());
    }

    #[test]
    fn test_cli_parse_definition() {
        let cli = Cli::try_parse_from(["bdl", "definition", "main.4gl", "--offset", "42", "--json"]).unwrap();
        if let Command::Definition { offset, json, .. } = cli.command {
            assert_eq!(offset, 42);
            assert!(json);
        } else {
            panic!("Expected Definition command");
        }
    }
}
