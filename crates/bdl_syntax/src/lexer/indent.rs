//! Indentation handling for the BDL tokenizer
//!
//! Leading whitespace is measured by peeking, so the whitespace itself is still scanned (and emitted as a
//! `Whitespace` token in verbatim mode). Blank lines, comment-only lines and directive lines never touch the
//! indentation stack.

use std::io::Read;

use super::tokens::{Token, TokenKind};
use super::{IndentLevel, Tokenizer};
use crate::ast::Span;
use crate::diagnostics::{Diagnostic, ErrorCode};

impl<R: Read> Tokenizer<R> {
    pub(super) fn handle_indentation(&mut self) -> Option<Token> {
        self.state.at_line_start = false;
        if self.state.grouping_depth() > 0 {
            return None;
        }

        let start = self.scanner.offset();
        let mut width = 0;
        let mut text = String::new();
        let mut n = 0;
        loop {
            match self.scanner.peek_at(n) {
                Some(' ') => width += 1,
                Some('\t') => {
                    let tab = self.options.tab_width.max(1);
                    width = (width / tab + 1) * tab;
                }
                _ => break,
            }
            if let Some(c) = self.scanner.peek_at(n) {
                text.push(c);
            }
            n += 1;
        }

        if self.scanner.peek_at(n) == Some('&') || self.rest_of_line_is_blank(n) {
            return None;
        }

        // Leading whitespace is ASCII, so `n` characters are `n` bytes.
        let span = Span::new(start, start + n);
        let (top_width, top_text_matches) = match self.state.indent_stack.last() {
            Some(top) => (top.width, top.text == text),
            None => (0, text.is_empty()),
        };

        if width > top_width {
            self.state.indent_stack.push(IndentLevel { width, text });
            return Some(Token::new(TokenKind::Indent, span));
        }

        if width == top_width {
            if !top_text_matches {
                self.warn_mixed_indentation(span);
            }
            return None;
        }

        let mut count = 0;
        while self.state.indent_stack.len() > 1 && self.state.indent_stack.last().is_some_and(|l| l.width > width) {
            self.state.indent_stack.pop();
            count += 1;
        }
        match self.state.indent_stack.last() {
            Some(level) if level.width != width => {
                self.diagnostics.push(Diagnostic::warning(
                    format!(
                        "dedent to width {width} does not match any enclosing indentation level (nearest is {})",
                        level.width
                    ),
                    span,
                    ErrorCode::InconsistentIndentation,
                ));
            }
            Some(level) if level.text != text => self.warn_mixed_indentation(span),
            _ => {}
        }
        if count > 1 {
            self.state.pending_dedents += count - 1;
        }
        Some(Token::new(TokenKind::Dedent, span))
    }

    /// Return `true` if only whitespace and comments follow on this line, starting `n` characters ahead.
    fn rest_of_line_is_blank(&mut self, mut n: usize) -> bool {
        loop {
            match self.scanner.peek_at(n) {
                None | Some('\n' | '\r' | '#') => return true,
                Some('-') if self.scanner.peek_at(n + 1) == Some('-') => return true,
                Some(' ' | '\t') => n += 1,
                Some('{') => {
                    n += 1;
                    loop {
                        match self.scanner.peek_at(n) {
                            Some('}') => {
                                n += 1;
                                break;
                            }
                            // Runs past the end of the line: nothing on this line is measured.
                            None | Some('\n') => return true,
                            Some(_) => n += 1,
                        }
                    }
                }
                Some(_) => return false,
            }
        }
    }

    fn warn_mixed_indentation(&mut self, span: Span) {
        self.diagnostics.push(
            Diagnostic::warning(
                "inconsistent use of tabs and spaces in indentation",
                span,
                ErrorCode::InconsistentIndentation,
            )
            .with_hint("indent with the same whitespace as the enclosing lines"),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::ErrorCode;
    use crate::lexer::{lex, Tokenizer, TokenizerOptions, TokenKind};

    fn count(tokens: &[TokenKind], kind: TokenKind) -> usize {
        tokens.iter().filter(|k| **k == kind).count()
    }

    #[test]
    fn test_indent_and_dedent() {
        let tokens: Vec<_> = lex("IF x THEN\n  CALL f()\nEND IF\n").into_iter().map(|t| t.kind).collect();
        assert_eq!(count(&tokens, TokenKind::Indent), 1);
        assert_eq!(count(&tokens, TokenKind::Dedent), 1);
    }

    #[test]
    fn test_multiple_dedents_one_line() {
        let source = "IF a THEN\n  IF b THEN\n    CALL f()\nEND IF\n";
        let tokens: Vec<_> = lex(source).into_iter().map(|t| t.kind).collect();
        assert_eq!(count(&tokens, TokenKind::Indent), 2);
        assert_eq!(count(&tokens, TokenKind::Dedent), 2);
        let first_dedent = tokens.iter().position(|k| *k == TokenKind::Dedent).expect("dedent");
        assert_eq!(tokens[first_dedent + 1], TokenKind::Dedent);
    }

    #[test]
    fn test_eof_closes_open_levels() {
        let tokens: Vec<_> = lex("MAIN\n  IF x THEN\n    CALL f()").into_iter().map(|t| t.kind).collect();
        assert_eq!(count(&tokens, TokenKind::Indent), 2);
        assert_eq!(count(&tokens, TokenKind::Dedent), 2);
        assert_eq!(tokens.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_blank_and_comment_lines_do_not_indent() {
        let source = "MAIN\n\n      # note\n   -- other\n{ block }\nCALL f()\nEND MAIN\n";
        let tokens: Vec<_> = lex(source).into_iter().map(|t| t.kind).collect();
        assert_eq!(count(&tokens, TokenKind::Indent), 0);
        assert_eq!(count(&tokens, TokenKind::Dedent), 0);
    }

    #[test]
    fn test_code_after_block_comment_is_measured() {
        let source = "MAIN\n  {c} CALL f()\n{ note }\nEND MAIN\n";
        let tokens: Vec<_> = lex(source).into_iter().map(|t| t.kind).collect();
        assert_eq!(count(&tokens, TokenKind::Indent), 1);
        assert_eq!(count(&tokens, TokenKind::Dedent), 1);
        let indent = tokens.iter().position(|k| *k == TokenKind::Indent).expect("indent");
        assert!(matches!(tokens[indent + 1], TokenKind::Keyword(_)), "got {:?}", tokens[indent + 1]);
    }

    #[test]
    fn test_tab_rounds_to_tab_width() {
        // A tab after two spaces reaches column 8, same as eight spaces.
        let mut tokenizer = Tokenizer::new(
            "MAIN\n        CALL a()\n  \tCALL b()\n".as_bytes(),
            TokenizerOptions::default(),
        );
        let tokens: Vec<_> = tokenizer.by_ref().map(|t| t.kind).collect();
        assert_eq!(count(&tokens, TokenKind::Indent), 1);
        let warnings = tokenizer.take_diagnostics();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, ErrorCode::InconsistentIndentation);
    }

    #[test]
    fn test_dedent_to_unknown_level_warns() {
        let mut tokenizer = Tokenizer::new(
            "MAIN\n    CALL a()\n  CALL b()\n".as_bytes(),
            TokenizerOptions::default(),
        );
        let tokens: Vec<_> = tokenizer.by_ref().map(|t| t.kind).collect();
        assert_eq!(count(&tokens, TokenKind::Indent), 1);
        assert_eq!(count(&tokens, TokenKind::Dedent), 1);
        assert_eq!(tokenizer.take_diagnostics().len(), 1);
    }

    #[test]
    fn test_no_indentation_inside_grouping() {
        let tokens: Vec<_> = lex("CALL f(a,\n        b)\nCALL g()\n").into_iter().map(|t| t.kind).collect();
        assert_eq!(count(&tokens, TokenKind::Indent), 0);
    }
}
