//! Type-constraint micro-grammars.
//!
//! Several base types accept a suffix after their keyword: a length (`CHAR(20)`), a precision and scale
//! (`DECIMAL(10,2)`), or a qualifier range (`DATETIME YEAR TO SECOND`). Each suffix is described as an ordered
//! list of [`TypeConstraintPiece`]s.
//!
//! ## Group semantics
//! - Group `0` is mandatory: every piece in it must match.
//! - Pieces sharing a non-zero group id are present or absent together. The first piece of a group is its
//!   *trigger* and is marked `optional`: when the trigger does not match, every piece up to the last piece of
//!   that group is skipped (which also skips groups nested inside it).
//! - Inside a present group each non-optional piece must match. A non-trigger piece marked `optional` is simply
//!   skipped when it does not match.
//!
//! With `DECIMAL` = `(`¹ number¹ `,`² number² `)`¹ this accepts `DECIMAL`, `DECIMAL(5)` and `DECIMAL(5,2)`,
//! and rejects `DECIMAL(5,)` with a single complaint about the missing scale.
//!
//! ## Examples
//! ```rust
//! use bdl_core::lang::constraints;
//! use bdl_core::lang::types::BaseTypeId;
//!
//! let decimal = constraints::constraint_for(BaseTypeId::Decimal).unwrap();
//! assert_eq!(decimal.pieces.len(), 5);
//! assert!(constraints::constraint_for(BaseTypeId::Integer).is_none());
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::category::TokenCategory;
use super::keywords::KeywordId;
use super::punctuation::PunctuationId;
use super::types::BaseTypeId;

/// What a single constraint piece expects to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Exactly this punctuation token.
    Punct(PunctuationId),
    /// Exactly this keyword.
    Keyword(KeywordId),
    /// Any of these keywords.
    OneOf(&'static [KeywordId]),
    /// Any token of this category.
    Category(TokenCategory),
}

/// One expected token following a base type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeConstraintPiece {
    pub expect: Expect,
    pub group: u8,
    pub optional: bool,
}

/// The full suffix grammar of one base type.
#[derive(Debug, Clone, Copy)]
pub struct TypeConstraint {
    pub base: BaseTypeId,
    pub pieces: &'static [TypeConstraintPiece],
}

impl TypeConstraint {
    /// Index one past the last piece belonging to `group`, searching from `from`.
    ///
    /// Used to skip an absent group together with anything nested inside it.
    pub fn group_end(&self, from: usize) -> usize {
        let group = self.pieces[from].group;
        self.pieces
            .iter()
            .rposition(|p| p.group == group)
            .map_or(from + 1, |last| last.max(from) + 1)
    }

    /// Return `true` if `index` is the first piece of its group.
    pub fn is_trigger(&self, index: usize) -> bool {
        let group = self.pieces[index].group;
        group != 0 && !self.pieces[..index].iter().any(|p| p.group == group)
    }
}

/// Datetime/interval qualifier words.
pub const QUALIFIERS: &[KeywordId] = &[
    KeywordId::Year,
    KeywordId::Month,
    KeywordId::Day,
    KeywordId::Hour,
    KeywordId::Minute,
    KeywordId::Second,
    KeywordId::Fraction,
];

const NUMBER: Expect = Expect::Category(TokenCategory::NumericLiteral);

const fn piece(expect: Expect, group: u8, optional: bool) -> TypeConstraintPiece {
    TypeConstraintPiece {
        expect,
        group,
        optional,
    }
}

const fn required(expect: Expect, group: u8) -> TypeConstraintPiece {
    piece(expect, group, false)
}

const fn trigger(expect: Expect, group: u8) -> TypeConstraintPiece {
    piece(expect, group, true)
}

/// `[(n)]`
const LENGTH: &[TypeConstraintPiece] = &[
    trigger(Expect::Punct(PunctuationId::LParen), 1),
    required(NUMBER, 1),
    required(Expect::Punct(PunctuationId::RParen), 1),
];

/// `[(p[,s])]`
const PRECISION_SCALE: &[TypeConstraintPiece] = &[
    trigger(Expect::Punct(PunctuationId::LParen), 1),
    required(NUMBER, 1),
    trigger(Expect::Punct(PunctuationId::Comma), 2),
    required(NUMBER, 2),
    required(Expect::Punct(PunctuationId::RParen), 1),
];

/// `q1[(n)] TO q2[(n)]`
const QUALIFIED: &[TypeConstraintPiece] = &[
    required(Expect::OneOf(QUALIFIERS), 0),
    trigger(Expect::Punct(PunctuationId::LParen), 1),
    required(NUMBER, 1),
    required(Expect::Punct(PunctuationId::RParen), 1),
    required(Expect::Keyword(KeywordId::To), 0),
    required(Expect::OneOf(QUALIFIERS), 0),
    trigger(Expect::Punct(PunctuationId::LParen), 2),
    required(NUMBER, 2),
    required(Expect::Punct(PunctuationId::RParen), 2),
];

/// Constraint table, built once on first use and never mutated.
static CONSTRAINTS: Lazy<HashMap<BaseTypeId, TypeConstraint>> = Lazy::new(|| {
    let entries = [
        (BaseTypeId::Char, LENGTH),
        (BaseTypeId::Varchar, PRECISION_SCALE),
        (BaseTypeId::Float, LENGTH),
        (BaseTypeId::Decimal, PRECISION_SCALE),
        (BaseTypeId::Money, PRECISION_SCALE),
        (BaseTypeId::Datetime, QUALIFIED),
        (BaseTypeId::Interval, QUALIFIED),
    ];
    entries
        .into_iter()
        .map(|(base, pieces)| (base, TypeConstraint { base, pieces }))
        .collect()
});

/// Constraint grammar for `base`, or `None` if nothing may follow the type keyword.
pub fn constraint_for(base: BaseTypeId) -> Option<&'static TypeConstraint> {
    CONSTRAINTS.get(&base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_end_skips_nested_groups() {
        let decimal = constraint_for(BaseTypeId::Decimal).unwrap();
        // Skipping group 1 from the `(` trigger also skips the nested `,` group.
        assert_eq!(decimal.group_end(0), 5);
        // Skipping group 2 from the `,` trigger lands on `)`.
        assert_eq!(decimal.group_end(2), 4);
    }

    #[test]
    fn test_triggers() {
        let datetime = constraint_for(BaseTypeId::Datetime).unwrap();
        assert!(!datetime.is_trigger(0), "group 0 has no trigger");
        assert!(datetime.is_trigger(1));
        assert!(!datetime.is_trigger(2));
        assert!(datetime.is_trigger(6));
    }

    #[test]
    fn test_every_constrained_type_has_a_grammar() {
        for info in crate::lang::types::BASE_TYPES {
            assert_eq!(
                info.constrained,
                constraint_for(info.id).is_some(),
                "{:?} constraint flag disagrees with the table",
                info.id
            );
        }
    }
}
