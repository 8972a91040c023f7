//! Small helper APIs for working with `Token` / `TokenKind`.
//!
//! These helpers exist to reduce repetitive `matches!(...)` at call sites and to make it easy to work with
//! ID-based tokens.

use bdl_core::lang::keywords::{self, KeywordId};
use bdl_core::lang::operators::{self, OperatorId};
use bdl_core::lang::punctuation::{self, PunctuationId};

use crate::lexer::{LexErrorKind, Token, TokenKind};

impl TokenKind {
    /// Return the keyword id, if this is a keyword token.
    pub fn keyword_id(&self) -> Option<KeywordId> {
        match self {
            TokenKind::Keyword(id) => Some(*id),
            _ => None,
        }
    }

    /// Return `true` if this is the given keyword.
    pub fn is_keyword(&self, id: KeywordId) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == id)
    }

    /// Return the operator id, if this is an operator token.
    pub fn operator_id(&self) -> Option<OperatorId> {
        match self {
            TokenKind::Operator(id) => Some(*id),
            _ => None,
        }
    }

    /// Return `true` if this is the given operator.
    pub fn is_operator(&self, id: OperatorId) -> bool {
        matches!(self, TokenKind::Operator(o) if *o == id)
    }

    /// Return the punctuation id, if this is a punctuation token.
    pub fn punctuation_id(&self) -> Option<PunctuationId> {
        match self {
            TokenKind::Punctuation(id) => Some(*id),
            _ => None,
        }
    }

    /// Return `true` if this is the given punctuation.
    pub fn is_punctuation(&self, id: PunctuationId) -> bool {
        matches!(self, TokenKind::Punctuation(p) if *p == id)
    }

    /// Return `true` if this token is layout in the token stream.
    pub fn is_layout(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent)
    }

    /// Comments and whitespace (verbatim mode only).
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Whitespace)
    }

    pub fn lex_error(&self) -> Option<LexErrorKind> {
        match self {
            TokenKind::Error(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Source-like spelling, used to rebuild SQL text and constraint text.
    ///
    /// Keywords use their canonical (upper-case) spelling and strings are re-quoted with `"`.
    pub fn spelling(&self) -> String {
        match self {
            TokenKind::Keyword(id) => keywords::as_str(*id).to_string(),
            TokenKind::Operator(id) => operators::as_str(*id).to_string(),
            TokenKind::Punctuation(id) => punctuation::as_str(*id).to_string(),
            TokenKind::Ident(name) => name.to_string(),
            TokenKind::Int(value) => value.to_string(),
            TokenKind::Decimal(text) => text.clone(),
            TokenKind::String(value) => {
                let mut out = String::with_capacity(value.len() + 2);
                out.push('"');
                for c in value.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        other => out.push(other),
                    }
                }
                out.push('"');
                out
            }
            TokenKind::Directive(text) => format!("&{text}"),
            TokenKind::Comment | TokenKind::Whitespace => String::new(),
            TokenKind::Newline => "\n".to_string(),
            TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof => String::new(),
            TokenKind::Error(LexErrorKind::BadCharacter(c)) => c.to_string(),
            TokenKind::Error(_) => String::new(),
        }
    }

    /// Human-readable description for diagnostics ("keyword `END`", "end of input", ...).
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Keyword(id) => format!("keyword `{}`", keywords::as_str(*id)),
            TokenKind::Operator(id) => format!("`{}`", operators::as_str(*id)),
            TokenKind::Punctuation(id) => format!("`{}`", punctuation::as_str(*id)),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Int(_) | TokenKind::Decimal(_) => format!("number `{}`", self.spelling()),
            TokenKind::String(_) => "string literal".to_string(),
            TokenKind::Directive(_) => "preprocessor directive".to_string(),
            TokenKind::Comment => "comment".to_string(),
            TokenKind::Whitespace => "whitespace".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Indent => "indentation".to_string(),
            TokenKind::Dedent => "dedent".to_string(),
            TokenKind::Error(kind) => kind.message(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

impl Token {
    /// Convenience wrapper for `self.kind.keyword_id()`.
    pub fn keyword_id(&self) -> Option<KeywordId> {
        self.kind.keyword_id()
    }

    /// Convenience wrapper for `self.kind.operator_id()`.
    pub fn operator_id(&self) -> Option<OperatorId> {
        self.kind.operator_id()
    }

    /// Convenience wrapper for `self.kind.punctuation_id()`.
    pub fn punctuation_id(&self) -> Option<PunctuationId> {
        self.kind.punctuation_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_spelling_round_trips_through_lexer() {
        let kinds = [
            TokenKind::Keyword(KeywordId::Select),
            TokenKind::Ident(Arc::from("cust_id")),
            TokenKind::Operator(OperatorId::NotEq),
            TokenKind::String("it's \"x\"".to_string()),
            TokenKind::Decimal("1.50".to_string()),
        ];
        let text: Vec<_> = kinds.iter().map(TokenKind::spelling).collect();
        let relexed: Vec<_> = crate::lexer::lex(&text.join(" ")).into_iter().map(|t| t.kind).collect();
        assert_eq!(&relexed[..kinds.len()], &kinds);
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::Keyword(KeywordId::End).describe(), "keyword `END`");
        assert_eq!(TokenKind::Eof.describe(), "end of input");
        assert_eq!(TokenKind::Int(5).describe(), "number `5`");
    }
}
