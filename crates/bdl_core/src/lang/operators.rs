//! Operator vocabulary.
//!
//! This module defines the canonical set of symbol operators along with basic metadata such as precedence and
//! associativity. Word operators (`AND`, `MOD`, `MATCHES`, ...) are keywords; their precedence is listed here
//! too so the expression parser has a single table to read.
//!
//! ## Examples
//! ```rust
//! use bdl_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("<>"), Some(OperatorId::NotEq));
//! assert_eq!(operators::from_str("!="), Some(OperatorId::NotEq)); // alias
//! assert!(operators::info_for(OperatorId::Star).precedence > operators::info_for(OperatorId::Plus).precedence);
//! ```

use super::keywords::KeywordId;

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    None,
}

/// Stable identifier for every symbol operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,

    // String concatenation
    Concat,

    // Comparison (`=` doubles as the LET/CONSTANT assignment sign)
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Assignment in `CALL f() RETURNING` style shorthands and attribute lists
    ColonEq,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    /// Higher binds tighter.
    pub precedence: u8,
    pub associativity: Associativity,
}

/// Registry of all symbol operators.
pub const OPERATORS: &[OperatorInfo] = &[
    info(OperatorId::Plus, "+", &[], 50, Associativity::Left),
    info(OperatorId::Minus, "-", &[], 50, Associativity::Left),
    info(OperatorId::Star, "*", &[], 60, Associativity::Left),
    info(OperatorId::Slash, "/", &[], 60, Associativity::Left),
    info(OperatorId::StarStar, "**", &[], 70, Associativity::Right),
    info(OperatorId::Concat, "||", &[], 40, Associativity::Left),
    info(OperatorId::Eq, "=", &[], 30, Associativity::None),
    info(OperatorId::EqEq, "==", &[], 30, Associativity::None),
    info(OperatorId::NotEq, "<>", &["!="], 30, Associativity::None),
    info(OperatorId::Lt, "<", &[], 30, Associativity::None),
    info(OperatorId::LtEq, "<=", &[], 30, Associativity::None),
    info(OperatorId::Gt, ">", &[], 30, Associativity::None),
    info(OperatorId::GtEq, ">=", &[], 30, Associativity::None),
    info(OperatorId::ColonEq, ":=", &[], 10, Associativity::Right),
];

/// Precedence of word operators, on the same scale as [`OperatorInfo::precedence`].
pub fn keyword_precedence(id: KeywordId) -> Option<u8> {
    match id {
        KeywordId::Or => Some(10),
        KeywordId::And => Some(20),
        KeywordId::Not => Some(25),
        KeywordId::Like | KeywordId::Matches | KeywordId::Is | KeywordId::Between | KeywordId::In => Some(30),
        KeywordId::Mod => Some(60),
        KeywordId::Using | KeywordId::Clipped | KeywordId::Units => Some(80),
        _ => None,
    }
}

pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id`.
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("INVARIANT: operator info missing")
}

/// Lookup by spelling (canonical or alias).
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| o.canonical == spelling || o.aliases.contains(&spelling))
        .map(|o| o.id)
}

const fn info(
    id: OperatorId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    precedence: u8,
    associativity: Associativity,
) -> OperatorInfo {
    OperatorInfo {
        id,
        canonical,
        aliases,
        precedence,
        associativity,
    }
}
