//! Syntax front end for BDL: scanner, tokenizer, syntax tree, error-tolerant parser and diagnostics.
//!
//! This crate is dependency-light and intended for reuse by the command-line tools and editor services.
//!
//! ## Notes
//! - This crate is "syntax-only": type names are recorded as written. Resolving them against declarations,
//!   includes and the schema happens in the analysis layer.
//! - Vocabulary identity (keywords/operators/punctuation/base types) comes from `bdl_core::lang` registries.
//! - Nothing here fails on malformed input. The tokenizer emits error tokens and the parser returns a tree
//!   covering the whole input plus diagnostics.
//!
//! ## Examples
//! ```rust
//! use bdl_syntax::diagnostics::CollectingSink;
//! use bdl_syntax::parser::{self, ParseOptions};
//!
//! let mut sink = CollectingSink::new();
//! let tree = parser::parse("DEFINE total DECIMAL(10,2)\n", &ParseOptions::default(), &mut sink);
//! assert!(sink.is_empty());
//! assert!(tree.len() > 1);
//! ```
//!
//! ## See also
//! - `bdl_core::lang` for registry-backed language vocabulary.

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token_helpers;
