//! String scanning for the BDL tokenizer
//!
//! Handles `'...'`, `"..."` and the triple-quoted forms. When the input ends inside a literal the tokenizer
//! records a [`Continuation::String`] so that a resumed tokenizer keeps reading the literal body.

use std::io::Read;

use super::tokens::{LexErrorKind, Token, TokenKind};
use super::{Continuation, Tokenizer};

/// Result of processing an escape sequence
enum EscapeResult {
    Char(char),
    /// Unknown escape, preserved as written (backslash + char)
    Unknown(char),
    /// Backslash-newline: the literal continues on the next line
    LineContinuation,
    Eof,
}

impl<R: Read> Tokenizer<R> {
    /// Called with the opening quote already consumed.
    pub(super) fn scan_string(&mut self, start: usize, quote: char) -> Token {
        if self.scanner.peek() == Some(quote) {
            if self.scanner.peek_at(1) == Some(quote) {
                self.scanner.advance();
                self.scanner.advance();
                return self.scan_string_body(start, quote, true, false);
            }
            self.scanner.advance();
            return self.token_from(TokenKind::String(String::new()), start);
        }
        self.scan_string_body(start, quote, false, false)
    }

    /// Read a literal body up to and including its closing delimiter.
    ///
    /// `escaped` is set when the previous chunk ended right after a backslash.
    pub(super) fn scan_string_body(&mut self, start: usize, quote: char, triple: bool, mut escaped: bool) -> Token {
        let mut value = String::new();
        loop {
            if escaped {
                escaped = false;
                match self.scan_escape(quote) {
                    EscapeResult::Char(c) => value.push(c),
                    EscapeResult::Unknown(c) => {
                        value.push('\\');
                        value.push(c);
                    }
                    EscapeResult::LineContinuation => {}
                    EscapeResult::Eof => return self.incomplete_string(start, quote, triple, true),
                }
                continue;
            }
            match self.scanner.peek() {
                None => return self.incomplete_string(start, quote, triple, false),
                Some('\n') if !triple => {
                    // Raw newline: report without consuming it and without a continuation.
                    return self.token_from(TokenKind::Error(LexErrorKind::IncompleteString), start);
                }
                Some('\\') => {
                    self.scanner.advance();
                    escaped = true;
                }
                Some(c) if c == quote => {
                    if !triple {
                        self.scanner.advance();
                        return self.token_from(TokenKind::String(value), start);
                    }
                    if self.scanner.peek_at(1) == Some(quote) && self.scanner.peek_at(2) == Some(quote) {
                        self.scanner.advance();
                        self.scanner.advance();
                        self.scanner.advance();
                        return self.token_from(TokenKind::String(value), start);
                    }
                    self.scanner.advance();
                    value.push(c);
                }
                Some(c) => {
                    self.scanner.advance();
                    value.push(c);
                }
            }
        }
    }

    fn incomplete_string(&mut self, start: usize, quote: char, triple: bool, escaped: bool) -> Token {
        self.state.continuation = Some(Continuation::String { quote, triple, escaped });
        self.token_from(TokenKind::Error(LexErrorKind::IncompleteString), start)
    }

    /// Called after consuming the backslash.
    fn scan_escape(&mut self, quote: char) -> EscapeResult {
        match self.scanner.advance() {
            Some('n') => EscapeResult::Char('\n'),
            Some('t') => EscapeResult::Char('\t'),
            Some('r') => EscapeResult::Char('\r'),
            Some('\\') => EscapeResult::Char('\\'),
            Some('\n') => EscapeResult::LineContinuation,
            Some(q) if q == quote || q == '\'' || q == '"' => EscapeResult::Char(q),
            Some(c) => EscapeResult::Unknown(c),
            None => EscapeResult::Eof,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Span;
    use crate::lexer::{lex, Continuation, LexErrorKind, Tokenizer, TokenizerOptions, TokenKind};
    use crate::source::SourceLocation;

    fn string(value: &str) -> TokenKind {
        TokenKind::String(value.to_string())
    }

    #[test]
    fn test_simple_strings() {
        let tokens = lex(r#""hello" 'world' '' """#);
        assert_eq!(tokens[0].kind, string("hello"));
        assert_eq!(tokens[1].kind, string("world"));
        assert_eq!(tokens[2].kind, string(""));
        assert_eq!(tokens[3].kind, string(""));
    }

    #[test]
    fn test_escapes() {
        let tokens = lex(r#""a\tb\n\"q\" \\ \x""#);
        assert_eq!(tokens[0].kind, string("a\tb\n\"q\" \\ \\x"));
    }

    #[test]
    fn test_backslash_newline_continues() {
        let tokens = lex("\"one \\\ntwo\"");
        assert_eq!(tokens[0].kind, string("one two"));
    }

    #[test]
    fn test_triple_quoted_spans_lines() {
        let tokens = lex("'''line 1\nit's \"fine\"\n''' x");
        assert_eq!(tokens[0].kind, string("line 1\nit's \"fine\"\n"));
        assert!(matches!(&tokens[1].kind, TokenKind::Ident(s) if &**s == "x"));
    }

    #[test]
    fn test_raw_newline_in_single_quoted_string() {
        let mut tokenizer = Tokenizer::new("LET s = \"abc\nCALL f()\n".as_bytes(), TokenizerOptions::default());
        let tokens: Vec<_> = tokenizer.by_ref().collect();
        assert_eq!(tokens[3].kind, TokenKind::Error(LexErrorKind::IncompleteString));
        assert_eq!(tokens[3].span, Span::new(8, 12));
        assert_eq!(tokens[4].kind, TokenKind::Newline);
        assert_eq!(tokenizer.state().continuation, None);
    }

    #[test]
    fn test_eof_inside_string_resumes() {
        let mut tokenizer = Tokenizer::new("LET s = \"\"\"first half".as_bytes(), TokenizerOptions::default());
        let tokens: Vec<_> = tokenizer.by_ref().collect();
        assert_eq!(tokens[3].kind, TokenKind::Error(LexErrorKind::IncompleteString));
        let state = tokenizer.state();
        assert_eq!(
            state.continuation,
            Some(Continuation::String {
                quote: '"',
                triple: true,
                escaped: false
            })
        );

        let mut resumed = Tokenizer::resume(
            " second half\"\"\" x".as_bytes(),
            TokenizerOptions::default(),
            state,
            SourceLocation::new(21, 1, 22),
        );
        let first = resumed.next_token();
        assert_eq!(first.kind, string(" second half"));
        assert_eq!(first.span, Span::new(21, 36));
        assert!(matches!(resumed.next_token().kind, TokenKind::Ident(_)));
    }

    #[test]
    fn test_eof_after_backslash_resumes_escape() {
        let whole = lex("LET s = \"ab\\\"cd\" x");
        assert_eq!(whole[3].kind, string("ab\"cd"));

        let first_chunk = "LET s = \"ab\\";
        let mut tokenizer = Tokenizer::new(first_chunk.as_bytes(), TokenizerOptions::default());
        let tokens: Vec<_> = tokenizer.by_ref().collect();
        assert_eq!(tokens[3].kind, TokenKind::Error(LexErrorKind::IncompleteString));
        let state = tokenizer.state();
        assert_eq!(
            state.continuation,
            Some(Continuation::String {
                quote: '"',
                triple: false,
                escaped: true
            })
        );

        let mut resumed = Tokenizer::resume(
            "\"cd\" x".as_bytes(),
            TokenizerOptions::default(),
            state,
            SourceLocation::new(first_chunk.len(), 1, first_chunk.len() as u32 + 1),
        );
        let rest: Vec<_> = resumed.by_ref().collect();
        assert_eq!(rest[0].kind, string("\"cd"));
        let tail: Vec<_> = rest[1..].iter().map(|t| t.kind.clone()).collect();
        let whole_tail: Vec<_> = whole[4..].iter().map(|t| t.kind.clone()).collect();
        assert_eq!(tail, whole_tail);
    }

    #[test]
    fn test_backslash_newline_across_chunks() {
        let first_chunk = "\"one \\";
        let mut tokenizer = Tokenizer::new(first_chunk.as_bytes(), TokenizerOptions::default());
        let _: Vec<_> = tokenizer.by_ref().collect();
        let mut resumed = Tokenizer::resume(
            "\ntwo\"".as_bytes(),
            TokenizerOptions::default(),
            tokenizer.state(),
            SourceLocation::new(first_chunk.len(), 1, first_chunk.len() as u32 + 1),
        );
        assert_eq!(resumed.next_token().kind, string("two"));
    }
}
