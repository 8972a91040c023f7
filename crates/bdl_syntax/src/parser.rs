//! Error-tolerant parser for BDL.
//!
//! Pulls tokens lazily from a [`Tokenizer`] and builds an arena [`SyntaxTree`]. Malformed input never aborts
//! the parse: problems are reported to a [`DiagnosticSink`], the affected node is marked incomplete, and
//! parsing resumes at the next synchronization point.
//!
//! ## Examples
//!
//! ```rust
//! use bdl_syntax::diagnostics::CollectingSink;
//! use bdl_syntax::parser::{self, ParseOptions};
//!
//! let mut sink = CollectingSink::new();
//! let tree = parser::parse("MAIN\n  DISPLAY \"hi\"\nEND MAIN\n", &ParseOptions::default(), &mut sink);
//! assert!(sink.is_empty());
//! assert!(tree.node(tree.root()).is_complete);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Read;

use bdl_core::lang::category::TokenCategory;
use bdl_core::lang::constraints::{self, Expect, TypeConstraint};
use bdl_core::lang::keywords::{self, KeywordCategory, KeywordId};
use bdl_core::lang::operators::OperatorId;
use bdl_core::lang::punctuation::{self, PunctuationId};
use bdl_core::lang::types::{self, BaseTypeId};
use bdl_core::LanguageVersion;
use tracing::{debug, trace};

use crate::ast::attributes::{BoundSql, ScopedVariables};
use crate::ast::*;
use crate::diagnostics::{errors, Diagnostic, DiagnosticSink, ErrorCode};
use crate::lexer::{Token, TokenKind, Tokenizer, TokenizerOptions};
use crate::source::SourceLocation;

// NOTE: This module is split across multiple files using `include!` so every parser method lives in the same
// Rust module (shared privacy, plain `self.method()` calls) without one very large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/context.rs");
include!("parser/decl.rs");
include!("parser/types.rs");
include!("parser/stmts.rs");
include!("parser/interactive.rs");
include!("parser/sql.rs");
include!("parser/report.rs");
include!("parser/expr.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
