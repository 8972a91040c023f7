//! Provide the canonical language vocabulary for the BDL front end.
//!
//! This crate is intentionally small and dependency-light. It contains the registries that both the
//! syntax crate and the analysis layers read from:
//! - reserved words ([`lang::keywords`]) with their categories and the language version that introduced them,
//! - symbol operators and punctuation,
//! - base data types and the per-type constraint micro-grammars ([`lang::types`], [`lang::constraints`]),
//! - builtin package types and builtin functions ([`lang::packages`], [`lang::builtins`]).
//!
//! ## Notes
//!
//! - This is a "vocabulary" crate: **no IO**, no AST types, no mutable global state. Lookup indices are built
//!   once on first use and are read-only afterwards.

pub mod lang;

pub use lang::version::LanguageVersion;
