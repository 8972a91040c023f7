//! Tokenizer for BDL
//!
//! Handles tokenization including:
//! - Keywords (case-insensitive, resolved through the `bdl_core` keyword registry) and identifiers
//! - Numeric and string literals (including triple-quoted strings)
//! - Operators and punctuation (`<>`, `:=`, `||`, ...)
//! - Line/block comments and `&` preprocessor directives
//! - Indentation markers (INDENT/DEDENT) and grouping-aware newlines
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token, LexErrorKind)
//! - `strings` - String literal scanning (resumable)
//! - `comments` - Comment and directive scanning (block comments are resumable)
//! - `numbers` - Numeric literal scanning
//! - `indent` - INDENT/DEDENT handling
//!
//! ## Restarting
//!
//! Everything the tokenizer needs to continue mid-stream is in [`TokenizerState`]. A saved state plus a reader
//! positioned where the previous tokenizer stopped produce the same tokens the original would have.

mod comments;
mod indent;
mod numbers;
mod strings;
pub mod tokens;

use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

pub use tokens::{LexErrorKind, Token, TokenKind};

use bdl_core::lang::keywords;
use bdl_core::lang::operators::OperatorId;
use bdl_core::lang::punctuation::PunctuationId;

use crate::ast::Span;
use crate::diagnostics::Diagnostic;
use crate::source::{LineOffsetTable, Scanner, SourceLocation, DEFAULT_BUFFER_CAPACITY};

/// Upper bound on characters inspected when deciding whether a newline ends an unterminated grouping.
const RECOVERY_LOOKAHEAD: usize = 4096;

// ============================================================================
// OPTIONS AND STATE
// ============================================================================

/// Tokenizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Emit `Comment` and `Whitespace` tokens instead of skipping them.
    pub verbatim: bool,
    /// Bytes read from the source per fill.
    pub buffer_capacity: usize,
    /// A tab advances indentation to the next multiple of this width.
    pub tab_width: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            verbatim: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            tab_width: 8,
        }
    }
}

impl TokenizerOptions {
    pub fn with_verbatim(mut self, verbatim: bool) -> Self {
        self.verbatim = verbatim;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }
}

/// One entry of the indentation stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentLevel {
    pub width: usize,
    /// Exact leading whitespace that opened the level.
    pub text: String,
}

/// A literal or comment left open at the end of the input read so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// `escaped`: the input ended right after a backslash.
    String { quote: char, triple: bool, escaped: bool },
    BlockComment,
}

/// Everything needed to resume tokenizing mid-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerState {
    pub indent_stack: Vec<IndentLevel>,
    pub paren_depth: u32,
    pub bracket_depth: u32,
    pub pending_dedents: u32,
    pub at_line_start: bool,
    /// A significant token was produced since the last line break.
    pub line_has_content: bool,
    pub continuation: Option<Continuation>,
}

impl Default for TokenizerState {
    fn default() -> Self {
        Self {
            indent_stack: vec![IndentLevel {
                width: 0,
                text: String::new(),
            }],
            paren_depth: 0,
            bracket_depth: 0,
            pending_dedents: 0,
            at_line_start: true,
            line_has_content: false,
            continuation: None,
        }
    }
}

impl TokenizerState {
    pub fn grouping_depth(&self) -> u32 {
        self.paren_depth + self.bracket_depth
    }
}

// ============================================================================
// TOKENIZER
// ----------------------------------------------------------------------------
// [Start of line] → measure indent (peek only) → [Inside code]
//                                                    ↓
//                                      see '(' / '[' → [depth++]
//                                                    ↓
//                                      see '\n' (depth > 0) → next line starts with a statement
//                                                    ↓           keyword? reset depth : skip newline
//                                      see ')' / ']' → [depth--]
// ============================================================================

/// Lazy, restartable token stream over a reader.
pub struct Tokenizer<R> {
    scanner: Scanner<R>,
    options: TokenizerOptions,
    state: TokenizerState,
    interned: HashSet<Arc<str>>,
    diagnostics: Vec<Diagnostic>,
    finished: bool,
    eof_emitted: bool,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(reader: R, options: TokenizerOptions) -> Self {
        Self::resume(reader, options, TokenizerState::default(), SourceLocation::START)
    }

    /// Continue from a saved state. `start` is the location of the reader's first byte.
    pub fn resume(reader: R, options: TokenizerOptions, state: TokenizerState, start: SourceLocation) -> Self {
        Self {
            scanner: Scanner::with_capacity(reader, options.buffer_capacity, start),
            options,
            state,
            interned: HashSet::new(),
            diagnostics: Vec::new(),
            finished: false,
            eof_emitted: false,
        }
    }

    /// Fresh tokenizer whose first byte is at `start` (for embedded or partial sources).
    pub fn starting_at(reader: R, options: TokenizerOptions, start: SourceLocation) -> Self {
        Self::resume(reader, options, TokenizerState::default(), start)
    }

    /// Snapshot of the restartable state.
    pub fn state(&self) -> TokenizerState {
        self.state.clone()
    }

    pub fn options(&self) -> &TokenizerOptions {
        &self.options
    }

    /// Absolute byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.scanner.offset()
    }

    pub fn line_table(&self) -> &LineOffsetTable {
        self.scanner.line_table()
    }

    pub fn into_line_table(self) -> LineOffsetTable {
        self.scanner.into_line_table()
    }

    /// Warnings produced so far (inconsistent indentation). Error tokens are not repeated here.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Read error that ended the input early, if any.
    pub fn take_io_error(&mut self) -> Option<std::io::Error> {
        self.scanner.take_io_error()
    }

    /// Tokens until at least `chars` more characters are consumed or the stream ends (the `Eof` token is
    /// included).
    pub fn read_tokens(&mut self, chars: usize) -> Vec<Token> {
        let target = self.scanner.consumed_chars() + chars;
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_eof() || self.scanner.consumed_chars() >= target;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Produce exactly one token. After the end of input this keeps returning `Eof`.
    pub fn next_token(&mut self) -> Token {
        let token = self.produce();
        match &token.kind {
            TokenKind::Comment
            | TokenKind::Whitespace
            | TokenKind::Newline
            | TokenKind::Indent
            | TokenKind::Dedent => {}
            TokenKind::Eof => self.eof_emitted = true,
            _ => self.state.line_has_content = true,
        }
        tracing::trace!(kind = ?token.kind, start = token.span.start, end = token.span.end, "token");
        token
    }

    fn produce(&mut self) -> Token {
        loop {
            if self.state.pending_dedents > 0 {
                self.state.pending_dedents -= 1;
                return self.point(TokenKind::Dedent);
            }
            if self.finished {
                return self.point(TokenKind::Eof);
            }
            if self.scanner.is_at_end() {
                return self.finish();
            }
            if let Some(continuation) = self.state.continuation.take() {
                return match continuation {
                    Continuation::String { quote, triple, escaped } => {
                        let start = self.scanner.offset();
                        self.scan_string_body(start, quote, triple, escaped)
                    }
                    Continuation::BlockComment => {
                        let start = self.scanner.offset();
                        match self.scan_block_comment_body(start) {
                            Some(token) => token,
                            None => continue,
                        }
                    }
                };
            }
            if self.state.at_line_start {
                if let Some(token) = self.handle_indentation() {
                    return token;
                }
            }
            if let Some(token) = self.scan_token() {
                return token;
            }
        }
    }

    /// Close every open indentation level, then end the stream.
    fn finish(&mut self) -> Token {
        self.finished = true;
        let open = self.state.indent_stack.len().saturating_sub(1) as u32;
        self.state.indent_stack.truncate(1);
        self.state.paren_depth = 0;
        self.state.bracket_depth = 0;
        if open > 0 {
            self.state.pending_dedents += open - 1;
            return self.point(TokenKind::Dedent);
        }
        self.point(TokenKind::Eof)
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn point(&self, kind: TokenKind) -> Token {
        let offset = self.scanner.offset();
        Token::new(kind, Span::point(offset))
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, Span::new(start, self.scanner.offset()))
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.scanner.peek() == Some(expected) {
            self.scanner.advance();
            true
        } else {
            false
        }
    }

    fn intern(&mut self, text: &str) -> Arc<str> {
        if let Some(existing) = self.interned.get(text) {
            return existing.clone();
        }
        let shared: Arc<str> = Arc::from(text);
        self.interned.insert(shared.clone());
        shared
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    /// Scan from the current position. Returns `None` when only skipped trivia was consumed.
    fn scan_token(&mut self) -> Option<Token> {
        let start = self.scanner.offset();

        let mut skipped = false;
        while let Some(' ' | '\t' | '\r') = self.scanner.peek() {
            self.scanner.advance();
            skipped = true;
        }
        if skipped {
            return self.options.verbatim.then(|| self.token_from(TokenKind::Whitespace, start));
        }

        let c = self.scanner.peek()?;
        match c {
            '\n' => {
                self.scanner.advance();
                self.scan_newline(start)
            }
            '#' => self.scan_line_comment(start),
            '-' if self.scanner.peek_at(1) == Some('-') => self.scan_line_comment(start),
            '{' => {
                self.scanner.advance();
                self.scan_block_comment_body(start)
            }
            '&' => Some(self.scan_directive(start)),
            '"' | '\'' => {
                self.scanner.advance();
                Some(self.scan_string(start, c))
            }
            '0'..='9' => Some(self.scan_number(start)),
            '.' if self.scanner.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => Some(self.scan_number(start)),
            _ if is_ident_start(c) => Some(self.scan_identifier(start)),
            _ => {
                self.scanner.advance();
                Some(self.scan_symbol(start, c))
            }
        }
    }

    /// A newline was consumed. Significant only outside groupings and after a line with content.
    fn scan_newline(&mut self, start: usize) -> Option<Token> {
        if self.state.grouping_depth() > 0 {
            if !self.next_line_recovers_grouping() {
                return self.options.verbatim.then(|| self.token_from(TokenKind::Whitespace, start));
            }
            tracing::debug!(
                offset = start,
                paren_depth = self.state.paren_depth,
                bracket_depth = self.state.bracket_depth,
                "statement keyword inside unterminated grouping; resetting depth"
            );
            self.state.paren_depth = 0;
            self.state.bracket_depth = 0;
        }
        self.state.at_line_start = true;
        if std::mem::take(&mut self.state.line_has_content) {
            Some(self.token_from(TokenKind::Newline, start))
        } else {
            self.options.verbatim.then(|| self.token_from(TokenKind::Whitespace, start))
        }
    }

    /// Peek past blank lines: does the next non-blank line start with a grouping-recovery keyword?
    fn next_line_recovers_grouping(&mut self) -> bool {
        let mut n = 0;
        while n < RECOVERY_LOOKAHEAD {
            match self.scanner.peek_at(n) {
                Some(' ' | '\t' | '\r' | '\n') => n += 1,
                Some(_) => break,
                None => return false,
            }
        }
        let mut word = String::new();
        while word.len() <= 12 {
            match self.scanner.peek_at(n + word.len()) {
                Some(c) if is_ident_continue(c) => word.push(c),
                _ => break,
            }
        }
        keywords::from_str(&word).is_some_and(keywords::recovers_grouping)
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        let mut word = String::new();
        self.scanner.advance_while(&mut word, is_ident_continue);
        let kind = match keywords::from_str(&word) {
            Some(id) => TokenKind::Keyword(id),
            None => TokenKind::Ident(self.intern(&word)),
        };
        self.token_from(kind, start)
    }

    /// Operators and punctuation; `c` is already consumed.
    fn scan_symbol(&mut self, start: usize, c: char) -> Token {
        let kind = match c {
            '(' => {
                self.state.paren_depth += 1;
                TokenKind::Punctuation(PunctuationId::LParen)
            }
            ')' => {
                self.state.paren_depth = self.state.paren_depth.saturating_sub(1);
                TokenKind::Punctuation(PunctuationId::RParen)
            }
            '[' => {
                self.state.bracket_depth += 1;
                TokenKind::Punctuation(PunctuationId::LBracket)
            }
            ']' => {
                self.state.bracket_depth = self.state.bracket_depth.saturating_sub(1);
                TokenKind::Punctuation(PunctuationId::RBracket)
            }
            ',' => TokenKind::Punctuation(PunctuationId::Comma),
            ';' => TokenKind::Punctuation(PunctuationId::Semicolon),
            '.' => TokenKind::Punctuation(PunctuationId::Dot),
            ':' if self.match_char('=') => TokenKind::Operator(OperatorId::ColonEq),
            ':' => TokenKind::Punctuation(PunctuationId::Colon),
            '+' => TokenKind::Operator(OperatorId::Plus),
            '-' => TokenKind::Operator(OperatorId::Minus),
            '*' if self.match_char('*') => TokenKind::Operator(OperatorId::StarStar),
            '*' => TokenKind::Operator(OperatorId::Star),
            '/' => TokenKind::Operator(OperatorId::Slash),
            '=' if self.match_char('=') => TokenKind::Operator(OperatorId::EqEq),
            '=' => TokenKind::Operator(OperatorId::Eq),
            '<' if self.match_char('>') => TokenKind::Operator(OperatorId::NotEq),
            '<' if self.match_char('=') => TokenKind::Operator(OperatorId::LtEq),
            '<' => TokenKind::Operator(OperatorId::Lt),
            '>' if self.match_char('=') => TokenKind::Operator(OperatorId::GtEq),
            '>' => TokenKind::Operator(OperatorId::Gt),
            '!' if self.match_char('=') => TokenKind::Operator(OperatorId::NotEq),
            '|' if self.match_char('|') => TokenKind::Operator(OperatorId::Concat),
            other => TokenKind::Error(LexErrorKind::BadCharacter(other)),
        };
        self.token_from(kind, start)
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.eof_emitted {
            return None;
        }
        Some(self.next_token())
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenize a whole string with default options. The result always ends with `Eof`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Vec<Token> {
    lex_with(source, TokenizerOptions::default())
}

/// Tokenize a whole string with explicit options.
pub fn lex_with(source: &str, options: TokenizerOptions) -> Vec<Token> {
    Tokenizer::new(source.as_bytes(), options).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bdl_core::lang::keywords::KeywordId;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_ignore_case() {
        let tokens = kinds("define Define DEFINE customer");
        assert_eq!(tokens[0], TokenKind::Keyword(KeywordId::Define));
        assert_eq!(tokens[1], TokenKind::Keyword(KeywordId::Define));
        assert_eq!(tokens[2], TokenKind::Keyword(KeywordId::Define));
        assert!(matches!(&tokens[3], TokenKind::Ident(s) if &**s == "customer"));
    }

    #[test]
    fn test_identifiers_are_interned() {
        let tokens = lex("total total");
        match (&tokens[0].kind, &tokens[1].kind) {
            (TokenKind::Ident(a), TokenKind::Ident(b)) => assert!(Arc::ptr_eq(a, b)),
            other => panic!("expected identifiers, got {other:?}"),
        }
    }

    #[test]
    fn test_operators_longest_match() {
        let tokens = kinds("<> != <= >= == := ** || < > = * :");
        let expected = [
            OperatorId::NotEq,
            OperatorId::NotEq,
            OperatorId::LtEq,
            OperatorId::GtEq,
            OperatorId::EqEq,
            OperatorId::ColonEq,
            OperatorId::StarStar,
            OperatorId::Concat,
            OperatorId::Lt,
            OperatorId::Gt,
            OperatorId::Eq,
            OperatorId::Star,
        ];
        for (kind, op) in tokens.iter().zip(expected) {
            assert_eq!(kind, &TokenKind::Operator(op));
        }
        assert_eq!(tokens[12], TokenKind::Punctuation(PunctuationId::Colon));
    }

    #[test]
    fn test_lone_pipe_and_bang_are_bad_characters() {
        let tokens = kinds("a | b ! c");
        assert_eq!(tokens[1], TokenKind::Error(LexErrorKind::BadCharacter('|')));
        assert_eq!(tokens[3], TokenKind::Error(LexErrorKind::BadCharacter('!')));
        assert!(matches!(&tokens[4], TokenKind::Ident(s) if &**s == "c"));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = lex("LET x = 10");
        let spans: Vec<_> = tokens.iter().map(|t| (t.span.start, t.span.end)).collect();
        assert_eq!(spans, vec![(0, 3), (4, 5), (6, 7), (8, 10), (10, 10)]);
    }

    #[test]
    fn test_stream_ends_with_single_eof_and_repeats() {
        let mut tokenizer = Tokenizer::new("x".as_bytes(), TokenizerOptions::default());
        assert!(matches!(tokenizer.next_token().kind, TokenKind::Ident(_)));
        assert!(tokenizer.next_token().is_eof());
        assert!(tokenizer.next_token().is_eof());
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \n\n\t"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_newline_only_after_content() {
        let tokens = kinds("CALL a()\n\n\nCALL b()\n");
        let newlines = tokens.iter().filter(|k| **k == TokenKind::Newline).count();
        assert_eq!(newlines, 2);
    }

    #[test]
    fn test_newlines_inside_grouping_are_insignificant() {
        let tokens = kinds("CALL f(a,\n  b)\n");
        let newlines = tokens.iter().filter(|k| **k == TokenKind::Newline).count();
        assert_eq!(newlines, 1);
        assert!(!tokens.contains(&TokenKind::Indent));
    }

    #[test]
    fn test_grouping_recovery_on_statement_keyword() {
        let mut tokenizer = Tokenizer::new("CALL f(a,\nLET x = 1\n".as_bytes(), TokenizerOptions::default());
        let tokens: Vec<_> = tokenizer.by_ref().map(|t| t.kind).collect();
        let let_pos = tokens
            .iter()
            .position(|k| *k == TokenKind::Keyword(KeywordId::Let))
            .expect("LET token");
        assert_eq!(tokens[let_pos - 1], TokenKind::Newline);
        assert_eq!(tokenizer.state().grouping_depth(), 0);
    }

    #[test]
    fn test_grouping_not_recovered_for_expression_words() {
        let tokens = kinds("LET x = f(a,\n  b)\n");
        assert_eq!(tokens.iter().filter(|k| **k == TokenKind::Newline).count(), 1);
    }

    #[test]
    fn test_directive_token() {
        let tokens = lex("&include \"common.4gl\"\nMAIN\n");
        assert_eq!(tokens[0].kind, TokenKind::Directive("include \"common.4gl\"".to_string()));
        assert_eq!(tokens[0].span, Span::new(0, 21));
    }

    #[test]
    fn test_verbatim_mode_keeps_trivia() {
        let tokens = lex_with("x # note\n", TokenizerOptions::default().with_verbatim(true));
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
        assert!(matches!(kinds[0], TokenKind::Ident(_)));
        assert_eq!(kinds[1], TokenKind::Whitespace);
        assert_eq!(kinds[2], TokenKind::Comment);
        assert_eq!(tokens[2].span, Span::new(2, 8));
        assert_eq!(kinds[3], TokenKind::Newline);
    }

    #[test]
    fn test_read_tokens_stops_after_char_budget() {
        let mut tokenizer = Tokenizer::new("LET a = 1\nLET b = 2\n".as_bytes(), TokenizerOptions::default());
        let first = tokenizer.read_tokens(3);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, TokenKind::Keyword(KeywordId::Let));
        let rest = tokenizer.read_tokens(1000);
        assert!(rest.last().is_some_and(Token::is_eof));
    }

    #[test]
    fn test_starting_at_shifts_offsets() {
        let start = SourceLocation::new(100, 5, 1);
        let tokens: Vec<_> = Tokenizer::starting_at("x y".as_bytes(), TokenizerOptions::default(), start).collect();
        assert_eq!(tokens[1].span, Span::new(102, 103));
    }
}
