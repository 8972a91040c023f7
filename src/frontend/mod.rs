//! BDL front end above the syntax layer.
//!
//! This module contains the analysis components:
//! - `symbols`: per-file declarations grouped by scope
//! - `program`: the multi-file program model (parallel loading, published trees)
//! - `providers`: interfaces to function catalogs, schemas and referenced projects
//! - `resolver`: name and type-reference resolution across files
//! - `check`: the `CheckForErrors` pass

// Syntax components are provided by the shared bdl_syntax crate.
pub use bdl_syntax::{ast, diagnostics, lexer, parser};

pub mod check;
pub mod program;
pub mod providers;
pub mod resolver;
pub mod symbols;
