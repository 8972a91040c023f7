//! Base data types.
//!
//! Every base type is spelled with a keyword (`INTEGER`, `DECIMAL`, `DATETIME`, ...). This registry maps those
//! keywords to a stable [`BaseTypeId`] and records the coarse family each type belongs to, which the resolver
//! uses when it describes a type and when it checks `LIKE` mimics against a schema.
//!
//! ## Examples
//! ```rust
//! use bdl_core::lang::keywords::KeywordId;
//! use bdl_core::lang::types::{self, BaseTypeId, TypeFamily};
//!
//! assert_eq!(types::from_keyword(KeywordId::Decimal), Some(BaseTypeId::Decimal));
//! assert_eq!(types::from_str("int"), Some(BaseTypeId::Integer));
//! assert_eq!(types::info_for(BaseTypeId::Money).family, TypeFamily::Numeric);
//! ```

use super::keywords::{self, KeywordId};

/// Stable identifier for each base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseTypeId {
    Char,
    Varchar,
    String,
    Integer,
    Smallint,
    Bigint,
    Tinyint,
    Float,
    Smallfloat,
    Decimal,
    Money,
    Date,
    Datetime,
    Interval,
    Byte,
    Text,
    Boolean,
}

/// Coarse family of a base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Character,
    Numeric,
    Temporal,
    LargeObject,
    Boolean,
}

#[derive(Debug, Clone, Copy)]
pub struct BaseTypeInfo {
    pub id: BaseTypeId,
    pub keyword: KeywordId,
    pub family: TypeFamily,
    /// Whether a constraint suffix (`(n)`, `YEAR TO DAY`, ...) may follow the keyword.
    pub constrained: bool,
}

pub const BASE_TYPES: &[BaseTypeInfo] = &[
    info(BaseTypeId::Char, KeywordId::Char, TypeFamily::Character, true),
    info(BaseTypeId::Varchar, KeywordId::Varchar, TypeFamily::Character, true),
    info(BaseTypeId::String, KeywordId::String, TypeFamily::Character, false),
    info(BaseTypeId::Integer, KeywordId::Integer, TypeFamily::Numeric, false),
    info(BaseTypeId::Smallint, KeywordId::Smallint, TypeFamily::Numeric, false),
    info(BaseTypeId::Bigint, KeywordId::Bigint, TypeFamily::Numeric, false),
    info(BaseTypeId::Tinyint, KeywordId::Tinyint, TypeFamily::Numeric, false),
    info(BaseTypeId::Float, KeywordId::Float, TypeFamily::Numeric, true),
    info(BaseTypeId::Smallfloat, KeywordId::Smallfloat, TypeFamily::Numeric, false),
    info(BaseTypeId::Decimal, KeywordId::Decimal, TypeFamily::Numeric, true),
    info(BaseTypeId::Money, KeywordId::Money, TypeFamily::Numeric, true),
    info(BaseTypeId::Date, KeywordId::Date, TypeFamily::Temporal, false),
    info(BaseTypeId::Datetime, KeywordId::Datetime, TypeFamily::Temporal, true),
    info(BaseTypeId::Interval, KeywordId::Interval, TypeFamily::Temporal, true),
    info(BaseTypeId::Byte, KeywordId::Byte, TypeFamily::LargeObject, false),
    info(BaseTypeId::Text, KeywordId::Text, TypeFamily::LargeObject, false),
    info(BaseTypeId::Boolean, KeywordId::Boolean, TypeFamily::Boolean, false),
];

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id`.
pub fn info_for(id: BaseTypeId) -> &'static BaseTypeInfo {
    BASE_TYPES
        .iter()
        .find(|t| t.id == id)
        .expect("INVARIANT: base type info missing")
}

/// Canonical (upper-case) spelling of the type keyword.
pub fn as_str(id: BaseTypeId) -> &'static str {
    keywords::as_str(info_for(id).keyword)
}

pub fn from_keyword(keyword: KeywordId) -> Option<BaseTypeId> {
    BASE_TYPES.iter().find(|t| t.keyword == keyword).map(|t| t.id)
}

/// Lookup by spelling, ignoring case and accepting keyword aliases (`INT`, `DEC`, `NUMERIC`, ...).
pub fn from_str(name: &str) -> Option<BaseTypeId> {
    keywords::from_str(name).and_then(from_keyword)
}

const fn info(id: BaseTypeId, keyword: KeywordId, family: TypeFamily, constrained: bool) -> BaseTypeInfo {
    BaseTypeInfo {
        id,
        keyword,
        family,
        constrained,
    }
}
