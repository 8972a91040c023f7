/// Names, block bodies and recovery.
///
/// Shared helpers for reading names, parsing a statement block up to whatever closes it, checking the closing
/// `END x`, and resynchronizing after an error.

/// Keywords usable where a name is expected (variables, tables, types, members of a dotted path).
fn is_name_keyword(keyword: KeywordId) -> bool {
    !keywords::is_reserved(keyword) && !keywords::starts_statement(keyword) && !keywords::starts_module_item(keyword)
}

/// Keywords that may follow `END`.
fn is_block_keyword(keyword: KeywordId) -> bool {
    matches!(
        keyword,
        KeywordId::If
            | KeywordId::While
            | KeywordId::For
            | KeywordId::Foreach
            | KeywordId::Case
            | KeywordId::Function
            | KeywordId::Main
            | KeywordId::Report
            | KeywordId::Globals
            | KeywordId::Record
            | KeywordId::Input
            | KeywordId::Display
            | KeywordId::Construct
            | KeywordId::Dialog
            | KeywordId::Menu
            | KeywordId::Prompt
            | KeywordId::Try
            | KeywordId::Sql
    )
}

/// Words that open a clause of some enclosing construct. Recovery stops in front of them.
fn is_clause_keyword(keyword: KeywordId) -> bool {
    matches!(
        keyword,
        KeywordId::Else
            | KeywordId::When
            | KeywordId::Otherwise
            | KeywordId::Catch
            | KeywordId::On
            | KeywordId::Before
            | KeywordId::After
            | KeywordId::Command
    )
}

/// Lower-case spelling used when a keyword stands in for a name.
fn keyword_name(keyword: KeywordId) -> String {
    keywords::as_str(keyword).to_ascii_lowercase()
}

/// Append a token to normalized text: single spaces, none inside `(`/`[` or around `.`.
fn push_token_text(text: &mut String, kind: &TokenKind) {
    let spelling = kind.spelling();
    let tight_before = matches!(
        kind.punctuation_id(),
        Some(PunctuationId::Comma | PunctuationId::RParen | PunctuationId::RBracket | PunctuationId::Dot)
    );
    let tight_after = text.ends_with(|c| matches!(c, '(' | '[' | '.'));
    if !text.is_empty() && !tight_before && !tight_after {
        text.push(' ');
    }
    text.push_str(&spelling);
}

impl<'p, R: Read> Parser<'p, R> {
    // ========================================================================
    // Names
    // ========================================================================

    fn name_of(token: &Token) -> Option<Name> {
        match &token.kind {
            TokenKind::Ident(name) => Some(Name::new(name.to_string(), token.span)),
            TokenKind::Keyword(k) if is_name_keyword(*k) => Some(Name::new(keyword_name(*k), token.span)),
            _ => None,
        }
    }

    /// Member names after `.` may be any word except `END`.
    fn member_name_of(token: &Token) -> Option<Name> {
        match &token.kind {
            TokenKind::Ident(name) => Some(Name::new(name.to_string(), token.span)),
            TokenKind::Keyword(k) if *k != KeywordId::End => Some(Name::new(keyword_name(*k), token.span)),
            _ => None,
        }
    }

    fn match_name(&mut self) -> Option<Name> {
        let name = Self::name_of(self.peek())?;
        self.advance();
        Some(name)
    }

    fn expect_name(&mut self, what: &str) -> Option<Name> {
        let name = self.match_name();
        if name.is_none() {
            self.error_expected(what);
        }
        name
    }

    /// `a.b.c`, joined into one name spanning the whole path.
    fn dotted_name(&mut self) -> Option<Name> {
        let mut name = self.match_name()?;
        while self.check_punct(PunctuationId::Dot) {
            let Some(part) = Self::member_name_of(self.peek_at(1)) else {
                break;
            };
            self.advance();
            self.advance();
            name.node.push('.');
            name.node.push_str(&part.node);
            name.span = name.span.merge(part.span);
        }
        Some(name)
    }

    /// The previous token leaves the line open (`,`, an operator, an open grouping).
    fn previous_continues_line(&self) -> bool {
        let Some(prev) = self.pos.checked_sub(1) else {
            return false;
        };
        match &self.buffer[prev].token.kind {
            TokenKind::Operator(_) => true,
            TokenKind::Punctuation(p) => matches!(
                p,
                PunctuationId::Comma | PunctuationId::LParen | PunctuationId::LBracket | PunctuationId::Dot
            ),
            TokenKind::Keyword(k) => matches!(k, KeywordId::And | KeywordId::Or),
            _ => false,
        }
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// Parse statements until something the caller (or an enclosing construct) must handle: end of input, an
    /// `END` that closes an open block, a clause keyword of an enclosing construct, or a module item.
    ///
    /// A stray `END x` closing nothing that is open is reported and skipped.
    fn block_body(&mut self, ctx: &ParseContext<'_>) -> Vec<NodeId> {
        let mut body = Vec::new();
        loop {
            self.skip_semicolons();
            if self.at_body_end(ctx) {
                break;
            }
            if self.check_keyword(KeywordId::End) {
                let closing = self.peek_at(1).keyword_id().map(keywords::as_str).unwrap_or_default();
                let span = self.current_span().merge(self.peek_at(1).span);
                self.error(errors::unexpected(&format!("`END {closing}`"), span).with_note("no open block is closed by it"));
                self.advance();
                self.advance();
                continue;
            }
            let before = self.pos;
            if let Some(statement) = self.statement(ctx) {
                body.push(statement);
            }
            if self.pos == before {
                self.advance();
            }
        }
        body
    }

    fn at_body_end(&self, ctx: &ParseContext<'_>) -> bool {
        match &self.peek().kind {
            TokenKind::Eof => true,
            TokenKind::Keyword(KeywordId::End) => match self.peek_at(1).keyword_id() {
                Some(k) if is_block_keyword(k) => ctx.end_keywords.contains(k) || keywords::starts_module_item(k),
                _ => true,
            },
            TokenKind::Keyword(k) => keywords::starts_module_item(*k) || ctx.clause_keywords.contains(*k),
            _ => false,
        }
    }

    /// Consume `END own`. Returns `false` (and reports) when the block is not closed properly.
    ///
    /// `END` followed by a keyword closing an enclosing block is left for that block. `END` followed by anything
    /// else is consumed.
    fn expect_block_end(&mut self, own: KeywordId) -> bool {
        let block = keywords::as_str(own);
        if !self.check_keyword(KeywordId::End) {
            let token = self.peek();
            let diagnostic = errors::missing_end(block, token.span).with_note(format!("found {}", token.kind.describe()));
            self.error(diagnostic);
            return false;
        }
        match self.peek_at(1).keyword_id() {
            Some(k) if k == own => {
                self.advance();
                self.advance();
                true
            }
            Some(k) if is_block_keyword(k) => {
                let span = self.current_span();
                self.error(errors::missing_end(block, span));
                false
            }
            _ => {
                let next = self.peek_at(1);
                let diagnostic = errors::missing_end_keyword(block, &next.kind.describe(), self.current_span().merge(next.span));
                self.error(diagnostic);
                self.advance();
                false
            }
        }
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    /// Skip to a likely statement boundary. Always consumes at least one token.
    fn synchronize_statement(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.match_punct(PunctuationId::Semicolon) {
                return;
            }
            if let Some(k) = self.current_keyword() {
                if k == KeywordId::End {
                    return;
                }
                if self.at_line_start()
                    && (keywords::starts_statement(k) || keywords::starts_module_item(k) || is_clause_keyword(k))
                {
                    return;
                }
            }
            if matches!(self.peek().kind, TokenKind::Directive(_)) {
                return;
            }
            self.advance();
        }
        trace!(pos = self.pos, "synchronized statement");
    }

    /// Skip to the next module-level item. Always consumes at least one token.
    fn synchronize_module(&mut self) {
        self.advance();
        while !self.is_at_end() {
            match &self.peek().kind {
                TokenKind::Directive(_) => return,
                TokenKind::Keyword(k)
                    if self.at_line_start()
                        && (keywords::starts_module_item(*k)
                            || matches!(k, KeywordId::Define | KeywordId::Constant | KeywordId::Type)) =>
                {
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to just past the next `)` on the current line.
    fn skip_past_close_paren(&mut self) {
        let mut first = true;
        while !self.is_at_end() {
            if self.match_punct(PunctuationId::RParen) {
                return;
            }
            if (!first && self.at_line_start()) || self.check_keyword(KeywordId::End) {
                return;
            }
            first = false;
            self.advance();
        }
    }

    /// Skip a balanced `( ... )` group starting at the current `(`.
    fn skip_parenthesized(&mut self) {
        let mut depth = 0usize;
        loop {
            match &self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Punctuation(PunctuationId::LParen) => depth += 1,
                TokenKind::Punctuation(PunctuationId::RParen) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::Keyword(KeywordId::End) => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// Consume an expression without keeping any nodes or diagnostics for it.
    fn skip_expression(&mut self) {
        let checkpoint = self.checkpoint();
        let before = self.pos;
        self.expression();
        let after = self.pos;
        self.rewind(checkpoint);
        self.pos = after.max(before);
    }

    /// Attach SQL text resolved by a routine's [`PrepareTracker`].
    fn bind_prepared(&mut self, tracker: &PrepareTracker) {
        for (node, bound) in tracker.resolve() {
            if node.index() < self.builder.len()
                && matches!(self.kind_of(node), NodeKind::Prepare(_) | NodeKind::Declare(_))
            {
                trace!(statement = %bound.statement, "bound SQL text");
                self.builder.attributes_mut(node).insert(bound);
            }
        }
    }

    /// Binders for one routine: the caller-supplied ones plus the routine's own tracker.
    fn routine_binders<'t>(&self, tracker: &'t PrepareTracker) -> Vec<&'t dyn PrepareBinder>
    where
        'p: 't,
    {
        let mut binders: Vec<&'t dyn PrepareBinder> = Vec::with_capacity(self.prepare_binders.len() + 1);
        for binder in &self.prepare_binders {
            binders.push(*binder);
        }
        binders.push(tracker);
        binders
    }
}
