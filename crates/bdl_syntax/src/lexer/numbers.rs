//! Number scanning for the BDL tokenizer
//!
//! Reads digits, an optional fraction and an optional exponent, then re-classifies the text: integers that fit
//! an `i64` become `Int`, everything else stays exact text in `Decimal`.

use std::io::Read;

use super::tokens::{LexErrorKind, Token, TokenKind};
use super::Tokenizer;

impl<R: Read> Tokenizer<R> {
    pub(super) fn scan_number(&mut self, start: usize) -> Token {
        let mut text = String::new();
        let mut exact_integer = true;

        self.scanner.advance_while(&mut text, |c| c.is_ascii_digit());

        if self.scanner.peek() == Some('.') && self.scanner.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            exact_integer = false;
            if text.is_empty() {
                text.push('0');
            }
            text.push('.');
            self.scanner.advance();
            self.scanner.advance_while(&mut text, |c| c.is_ascii_digit());
        }

        if matches!(self.scanner.peek(), Some('e' | 'E')) {
            let sign = matches!(self.scanner.peek_at(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.scanner.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                exact_integer = false;
                text.push('e');
                self.scanner.advance();
                if sign {
                    if let Some(s) = self.scanner.advance() {
                        text.push(s);
                    }
                }
                self.scanner.advance_while(&mut text, |c| c.is_ascii_digit());
            } else {
                // Exponent marker without digits: swallow the rest of the word so it is reported once.
                self.scanner.advance();
                if sign {
                    self.scanner.advance();
                }
                let mut rest = String::new();
                self.scanner.advance_while(&mut rest, |c| c.is_ascii_alphanumeric() || c == '_');
                return self.token_from(TokenKind::Error(LexErrorKind::BadNumber), start);
            }
        }

        let kind = if exact_integer {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::Int(value),
                Err(_) => TokenKind::Decimal(text),
            }
        } else {
            TokenKind::Decimal(text)
        };
        self.token_from(kind, start)
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{lex, LexErrorKind, TokenKind};

    fn first(source: &str) -> TokenKind {
        lex(source).remove(0).kind
    }

    #[test]
    fn test_integers_and_decimals() {
        assert_eq!(first("42"), TokenKind::Int(42));
        assert_eq!(first("3.14"), TokenKind::Decimal("3.14".to_string()));
        assert_eq!(first(".5"), TokenKind::Decimal("0.5".to_string()));
        assert_eq!(first("1e10"), TokenKind::Decimal("1e10".to_string()));
        assert_eq!(first("2.5E-3"), TokenKind::Decimal("2.5e-3".to_string()));
    }

    #[test]
    fn test_overflowing_integer_keeps_text() {
        assert_eq!(
            first("123456789012345678901234567890"),
            TokenKind::Decimal("123456789012345678901234567890".to_string())
        );
    }

    #[test]
    fn test_bad_exponent() {
        let tokens = lex("1e+ x");
        assert_eq!(tokens[0].kind, TokenKind::Error(LexErrorKind::BadNumber));
        assert!(matches!(&tokens[1].kind, TokenKind::Ident(s) if &**s == "x"));
        assert_eq!(first("7ex"), TokenKind::Error(LexErrorKind::BadNumber));
    }

    #[test]
    fn test_member_dot_is_not_a_fraction() {
        let kinds: Vec<_> = lex("a[1].b").into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds[2], TokenKind::Int(1));
        assert!(matches!(kinds[4], TokenKind::Punctuation(_)));
    }
}
