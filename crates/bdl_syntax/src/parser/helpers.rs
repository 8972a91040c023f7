/// Token navigation and node allocation helpers.
///
/// This chunk contains the low-level cursor methods used throughout the parser (`peek`, `advance`, `check_*`,
/// `match_*`, `expect_*`) plus the helpers that allocate nodes and record diagnostics.
impl<'p, R: Read> Parser<'p, R> {
    // ========================================================================
    // Navigation
    // ========================================================================

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        debug_assert!(n <= LOOKAHEAD, "lookahead {n} past the buffered window");
        let index = (self.pos + n).min(self.buffer.len() - 1);
        &self.buffer[index].token
    }

    /// Return `true` if a line break separates the current token from the previous one.
    fn at_line_start(&self) -> bool {
        self.line_break_at(0)
    }

    fn line_break_at(&self, n: usize) -> bool {
        let index = (self.pos + n).min(self.buffer.len() - 1);
        self.buffer[index].line_break_before
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    /// Consume the current token. At the end of input this keeps returning `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
            self.fill_to(self.pos + LOOKAHEAD);
        }
        token
    }

    fn current_keyword(&self) -> Option<KeywordId> {
        self.peek().keyword_id()
    }

    fn check_keyword(&self, keyword: KeywordId) -> bool {
        self.peek().kind.is_keyword(keyword)
    }

    fn check_keyword_at(&self, n: usize, keyword: KeywordId) -> bool {
        self.peek_at(n).kind.is_keyword(keyword)
    }

    fn check_punct(&self, punct: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(punct)
    }

    fn check_punct_at(&self, n: usize, punct: PunctuationId) -> bool {
        self.peek_at(n).kind.is_punctuation(punct)
    }

    fn check_op(&self, op: OperatorId) -> bool {
        self.peek().kind.is_operator(op)
    }

    fn match_keyword(&mut self, keyword: KeywordId) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_punct(&mut self, punct: PunctuationId) -> bool {
        if self.check_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_op(&mut self, op: OperatorId) -> bool {
        if self.check_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `keyword` or report it as expected. The current token is never skipped.
    fn expect_keyword(&mut self, keyword: KeywordId) -> bool {
        if self.match_keyword(keyword) {
            return true;
        }
        self.error_expected(&format!("`{}`", keywords::as_str(keyword)));
        false
    }

    fn expect_punct(&mut self, punct: PunctuationId) -> bool {
        if self.match_punct(punct) {
            return true;
        }
        self.error_expected(&format!("`{}`", punctuation::as_str(punct)));
        false
    }

    fn skip_semicolons(&mut self) {
        while self.match_punct(PunctuationId::Semicolon) {}
    }

    // ========================================================================
    // Spans
    // ========================================================================

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn current_start(&self) -> usize {
        self.peek().span.start
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(prev) => self.buffer[prev].token.span.end,
            None => self.buffer[0].token.span.start,
        }
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn error(&mut self, diagnostic: Diagnostic) {
        trace!(code = %diagnostic.code, message = %diagnostic.message, "syntax diagnostic");
        self.diagnostics.push(diagnostic);
    }

    /// Report `what` as expected at the current token.
    fn error_expected(&mut self, what: &str) {
        let token = self.peek();
        let diagnostic = errors::expected(what, &token.kind.describe(), token.span);
        self.error(diagnostic);
    }

    fn error_unexpected(&mut self) {
        let token = self.peek();
        let diagnostic = errors::unexpected(&token.kind.describe(), token.span);
        self.error(diagnostic);
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Allocate a node spanning from `start` to the end of the last consumed token.
    ///
    /// Every id the payload mentions becomes a child of the new node.
    fn node(&mut self, kind: NodeKind, start: usize, complete: bool) -> NodeId {
        let end = self.prev_end().max(start);
        self.node_at(kind, Span::new(start, end), complete)
    }

    fn node_at(&mut self, kind: NodeKind, span: Span, complete: bool) -> NodeId {
        let children = kind.child_ids();
        self.builder.alloc(kind, span, complete, &children)
    }

    fn span_of(&self, id: NodeId) -> Span {
        self.builder.span(id)
    }

    fn kind_of(&self, id: NodeId) -> &NodeKind {
        self.builder.kind(id)
    }
}
