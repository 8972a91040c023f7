//! Token types for the BDL tokenizer

use std::sync::Arc;

use bdl_core::lang::category::TokenCategory;
use bdl_core::lang::keywords::KeywordId;
use bdl_core::lang::operators::OperatorId;
use bdl_core::lang::punctuation::{self, PunctuationCategory, PunctuationId};

use crate::ast::Span;
use crate::diagnostics::{Diagnostic, ErrorCode};

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Token kinds.
///
/// Keywords, operators and punctuation carry the registry id from `bdl_core`; the spelling lives in the
/// registry, not in the token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Words and symbols ==========
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Identifiers and literals ==========
    /// Identifier as written. Identical spellings share one allocation per tokenizer.
    Ident(Arc<str>),
    Int(i64),
    /// Numeric text that is not an `i64`: has a fraction or exponent, or overflows.
    Decimal(String),
    /// Decoded string literal (escapes applied).
    String(String),
    /// Preprocessor line after the `&`, e.g. `include "x.4gl"`.
    Directive(String),

    // ========== Trivia (verbatim mode only) ==========
    Comment,
    Whitespace,

    // ========== Layout ==========
    Newline,
    Indent,
    Dedent,

    // ========== Special ==========
    Error(LexErrorKind),
    Eof,
}

/// Lexical problems, reported as error tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    BadCharacter(char),
    IncompleteString,
    IncompleteComment,
    BadNumber,
}

impl LexErrorKind {
    pub fn code(self) -> ErrorCode {
        match self {
            LexErrorKind::BadCharacter(_) => ErrorCode::BadCharacter,
            LexErrorKind::IncompleteString => ErrorCode::IncompleteString,
            LexErrorKind::IncompleteComment => ErrorCode::IncompleteComment,
            LexErrorKind::BadNumber => ErrorCode::BadNumber,
        }
    }

    pub fn message(self) -> String {
        match self {
            LexErrorKind::BadCharacter(c) => format!("unexpected character {c:?}"),
            LexErrorKind::IncompleteString => "unterminated string literal".to_string(),
            LexErrorKind::IncompleteComment => "unterminated block comment".to_string(),
            LexErrorKind::BadNumber => "malformed number".to_string(),
        }
    }

    pub fn to_diagnostic(self, span: Span) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.message(), span, self.code());
        match self {
            LexErrorKind::IncompleteComment => diagnostic.with_hint("close the comment with `}`"),
            LexErrorKind::BadNumber => diagnostic.with_note("an exponent needs at least one digit"),
            _ => diagnostic,
        }
    }
}

/// A token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn category(&self) -> TokenCategory {
        self.kind.category()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl TokenKind {
    /// Category of this kind. Pure: every kind maps to exactly one category.
    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::Keyword(_) => TokenCategory::Keyword,
            TokenKind::Operator(_) => TokenCategory::Operator,
            TokenKind::Punctuation(id) => match punctuation::category(*id) {
                PunctuationCategory::Grouping => TokenCategory::Grouping,
                PunctuationCategory::Separator | PunctuationCategory::Access => TokenCategory::Delimiter,
            },
            TokenKind::Ident(_) => TokenCategory::Identifier,
            TokenKind::Int(_) | TokenKind::Decimal(_) => TokenCategory::NumericLiteral,
            TokenKind::String(_) => TokenCategory::StringLiteral,
            TokenKind::Directive(_) => TokenCategory::Directive,
            TokenKind::Comment => TokenCategory::Comment,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent => {
                TokenCategory::Whitespace
            }
            TokenKind::Error(_) => TokenCategory::Error,
            TokenKind::Eof => TokenCategory::EndOfStream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_categories() {
        assert_eq!(
            TokenKind::Punctuation(PunctuationId::LParen).category(),
            TokenCategory::Grouping
        );
        assert_eq!(
            TokenKind::Punctuation(PunctuationId::Comma).category(),
            TokenCategory::Delimiter
        );
        assert_eq!(TokenKind::Dedent.category(), TokenCategory::Whitespace);
        assert_eq!(TokenKind::Eof.category(), TokenCategory::EndOfStream);
    }

    #[test]
    fn test_lex_error_diagnostic_codes() {
        let diagnostic = LexErrorKind::IncompleteString.to_diagnostic(Span::new(0, 3));
        assert_eq!(diagnostic.code, ErrorCode::IncompleteString);
        assert!(diagnostic.code.is_lexical());
        assert_eq!(LexErrorKind::BadCharacter('$').message(), "unexpected character '$'");
    }
}
