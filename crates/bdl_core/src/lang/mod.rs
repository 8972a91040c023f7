//! BDL language vocabulary registries.
//!
//! This module is the "front door" for language-level vocabulary: reserved keywords, operators,
//! punctuation, base types, type constraints, and builtin package types.
//!
//! The design goal is to avoid stringly-typed checks scattered across the parser and tooling.
//! Instead, callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use (diagnostics,
//!   classification, completion).
//!
//! ## Examples
//! ```rust
//! use bdl_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("if"), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "IF");
//! ```

pub mod builtins;
pub mod category;
pub mod constraints;
pub mod keywords;
pub mod operators;
pub mod packages;
pub mod punctuation;
pub mod types;
pub mod version;
