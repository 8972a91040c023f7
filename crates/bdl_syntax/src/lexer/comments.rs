//! Comment and directive scanning for the BDL tokenizer
//!
//! `#` and `--` run to the end of the line. `{ ... }` may span lines and is resumable when the input ends
//! inside it. `&` starts a preprocessor directive that runs to the end of the line.

use std::io::Read;

use super::tokens::{LexErrorKind, Token, TokenKind};
use super::{Continuation, Tokenizer};

impl<R: Read> Tokenizer<R> {
    /// `#...` or `--...`, up to but not including the newline.
    pub(super) fn scan_line_comment(&mut self, start: usize) -> Option<Token> {
        while let Some(c) = self.scanner.peek() {
            if c == '\n' {
                break;
            }
            self.scanner.advance();
        }
        self.options.verbatim.then(|| self.token_from(TokenKind::Comment, start))
    }

    /// Body of a block comment; the opening `{` (if any) is already consumed.
    pub(super) fn scan_block_comment_body(&mut self, start: usize) -> Option<Token> {
        loop {
            match self.scanner.advance() {
                Some('}') => return self.options.verbatim.then(|| self.token_from(TokenKind::Comment, start)),
                Some(_) => {}
                None => {
                    self.state.continuation = Some(Continuation::BlockComment);
                    return Some(self.token_from(TokenKind::Error(LexErrorKind::IncompleteComment), start));
                }
            }
        }
    }

    /// `&word rest-of-line`. The token text is everything after the `&`, trimmed.
    pub(super) fn scan_directive(&mut self, start: usize) -> Token {
        self.scanner.advance();
        let mut text = String::new();
        self.scanner.advance_while(&mut text, |c| c != '\n');
        self.token_from(TokenKind::Directive(text.trim().to_string()), start)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Span;
    use crate::lexer::{lex, Continuation, LexErrorKind, Tokenizer, TokenizerOptions, TokenKind};

    #[test]
    fn test_comments_are_skipped() {
        let tokens = lex("x # one\ny -- two\n{ three\nfour } z");
        let idents: Vec<_> = tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Ident(s) => Some(s.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(idents, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_unterminated_block_comment_is_resumable() {
        let mut tokenizer = Tokenizer::new("x { never closed".as_bytes(), TokenizerOptions::default());
        let tokens: Vec<_> = tokenizer.by_ref().collect();
        assert_eq!(tokens[1].kind, TokenKind::Error(LexErrorKind::IncompleteComment));
        assert_eq!(tokens[1].span, Span::new(2, 16));
        assert_eq!(tokenizer.state().continuation, Some(Continuation::BlockComment));

        let mut resumed = Tokenizer::resume(
            " still comment } y".as_bytes(),
            TokenizerOptions::default(),
            tokenizer.state(),
            crate::source::SourceLocation::new(16, 1, 17),
        );
        let kinds: Vec<_> = resumed.by_ref().map(|t| t.kind).collect();
        assert!(matches!(&kinds[0], TokenKind::Ident(s) if &**s == "y"));
        assert_eq!(resumed.state().continuation, None);
    }

    #[test]
    fn test_stray_closing_brace() {
        let tokens = lex("a } b");
        assert_eq!(tokens[1].kind, TokenKind::Error(LexErrorKind::BadCharacter('}')));
    }
}
