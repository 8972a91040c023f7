#![forbid(unsafe_code)]
//! BDL business-language front end
//!
//! Scans, parses and resolves BDL (4GL) sources without ever giving up on malformed input. The syntax layer
//! (scanner, tokenizer, arena AST, parser, diagnostics) lives in `bdl_syntax`; the shared vocabulary (keywords,
//! base types, packages, built-in functions, type constraints) lives in `bdl_core`. This crate adds:
//!
//! - [`frontend`]: multi-file programs, symbol tables, the type-reference resolver and the error checker.
//! - [`ide`]: editor queries (outline, hover, go-to-definition) built on the resolver.
//! - [`cli`]: the `bdl` command-line tool.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a front-end bug (logic error), use `.expect("INVARIANT: reason")` with
//!   a clear explanation.

pub mod cli;
pub mod frontend;
pub mod ide;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::symbols;

pub use frontend::check::{CheckForErrors, CheckOptions};
pub use frontend::program::{FileId, Program, SourceFile};
pub use frontend::resolver::{ResolvedType, Resolver};
