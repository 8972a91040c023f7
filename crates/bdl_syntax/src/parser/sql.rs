/// Embedded SQL, prepared statements and cursors.
///
/// SQL is not parsed: it is kept as normalized text ([`SqlStmt`]). `PREPARE` and `DECLARE` are modelled
/// because the binders connect them to the SQL text they run.

/// Statement keywords that commonly start a continuation line of one SQL statement.
fn continues_sql(keyword: KeywordId) -> bool {
    matches!(keyword, KeywordId::Select | KeywordId::Update | KeywordId::Current)
}

impl<'p, R: Read> Parser<'p, R> {
    /// `PREPARE stmt FROM expr`
    fn prepare_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let statement = self.expect_name("statement name");
        let mut complete = statement.is_some() && self.expect_keyword(KeywordId::From);
        let source = if complete { self.require_expression() } else { None };
        complete &= source.is_some();

        let prepare = PrepareStmt {
            statement: statement.clone(),
            source,
        };
        let id = self.node(NodeKind::Prepare(prepare), start, complete);

        if let Some(statement) = statement {
            let prepare_source = match source.map(|s| self.kind_of(s)) {
                Some(NodeKind::Literal(Literal::String(text))) => PrepareSource::Literal(text.clone()),
                Some(NodeKind::Variable(variable)) => PrepareSource::Variable(variable.name.node.clone()),
                _ => PrepareSource::Other,
            };
            for binder in ctx.prepare_binders {
                binder.prepared(&statement.node, &prepare_source, id);
            }
        }
        id
    }

    /// `EXECUTE IMMEDIATE expr` or `EXECUTE stmt [USING ...] [INTO ...]`
    fn execute_stmt(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();

        if self.match_keyword(KeywordId::Immediate) {
            let source = self.require_expression();
            let complete = source.is_some();
            let op = CursorOpStmt {
                op: CursorOp::Execute,
                target: None,
                args: source.into_iter().collect(),
            };
            return self.node(NodeKind::CursorOp(op), start, complete);
        }

        let target = self.expect_name("statement name");
        let complete = target.is_some();
        let args = self.cursor_arguments();
        let op = CursorOpStmt {
            op: CursorOp::Execute,
            target,
            args,
        };
        self.node(NodeKind::CursorOp(op), start, complete)
    }

    /// `DECLARE c [SCROLL] CURSOR [WITH HOLD] FOR (sql | stmt)` or `... FROM expr`
    fn declare_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let cursor = self.expect_name("cursor name");
        let scroll = self.match_keyword(KeywordId::Scroll);
        let mut complete = cursor.is_some() && self.expect_keyword(KeywordId::Cursor);
        let hold = if self.match_keyword(KeywordId::With) {
            complete &= self.expect_keyword(KeywordId::Hold);
            true
        } else {
            false
        };

        let source = if self.match_keyword(KeywordId::For) {
            match self.current_keyword() {
                Some(KeywordId::Select | KeywordId::Insert | KeywordId::Update | KeywordId::Delete) => {
                    CursorSource::Sql(self.raw_sql_text())
                }
                Some(KeywordId::Sql) => {
                    let (text, closed) = self.sql_block_text();
                    complete &= closed;
                    CursorSource::Sql(text)
                }
                _ => match self.expect_name("prepared statement name") {
                    Some(name) => CursorSource::Prepared(name),
                    None => {
                        complete = false;
                        CursorSource::Missing
                    }
                },
            }
        } else if self.match_keyword(KeywordId::From) {
            match self.require_expression() {
                Some(expr) => CursorSource::Expr(expr),
                None => {
                    complete = false;
                    CursorSource::Missing
                }
            }
        } else {
            self.error_expected("`FOR` or `FROM`");
            complete = false;
            CursorSource::Missing
        };

        let statement = match &source {
            CursorSource::Prepared(name) => Some(name.node.clone()),
            _ => None,
        };
        let declare = DeclareStmt {
            cursor: cursor.clone(),
            scroll,
            hold,
            source,
        };
        let id = self.node(NodeKind::Declare(declare), start, complete);

        if let (Some(cursor), Some(statement)) = (cursor, statement) {
            for binder in ctx.prepare_binders {
                binder.cursor_declared(&cursor.node, &statement, id);
            }
        }
        id
    }

    /// `OPEN c [USING ...]`, `FETCH [direction] c [INTO ...]`, `CLOSE c`, `FREE s`
    fn cursor_op_stmt(&mut self, op: CursorOp) -> NodeId {
        let start = self.current_start();
        self.advance();

        if op == CursorOp::Fetch && Self::name_of(self.peek_at(1)).is_some() {
            match self.current_keyword() {
                Some(
                    KeywordId::Next | KeywordId::Previous | KeywordId::First | KeywordId::Last | KeywordId::Current,
                ) => {
                    self.advance();
                }
                Some(KeywordId::Relative | KeywordId::Absolute) => {
                    self.advance();
                    self.skip_expression();
                }
                _ => {}
            }
        }

        let target = self.expect_name("cursor name");
        let complete = target.is_some();
        let args = self.cursor_arguments();
        self.node(NodeKind::CursorOp(CursorOpStmt { op, target, args }), start, complete)
    }

    /// `USING` and `INTO` clauses, in any order.
    fn cursor_arguments(&mut self) -> Vec<NodeId> {
        let mut args = Vec::new();
        loop {
            if self.match_keyword(KeywordId::Using) {
                args.extend(self.expression_list());
            } else if self.match_keyword(KeywordId::Into) {
                args.extend(self.target_list());
            } else {
                break;
            }
        }
        args
    }

    // ========================================================================
    // Raw SQL
    // ========================================================================

    fn raw_sql_stmt(&mut self, verb: KeywordId) -> NodeId {
        let start = self.current_start();
        let text = self.raw_sql_text();
        self.node(NodeKind::Sql(SqlStmt { verb, text }), start, true)
    }

    /// Collect an SQL statement starting at its verb, as normalized text.
    ///
    /// Outside parentheses the statement ends at `;`, `END`, a reserved word SQL does not share with BDL, or a
    /// statement keyword starting a new line. Inside parentheses only a line starting with a block keyword
    /// ends it.
    fn raw_sql_text(&mut self) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut first = true;
        while !self.is_at_end() {
            if !first && self.sql_ends_here(depth) {
                break;
            }
            let token = self.advance();
            match token.kind.punctuation_id() {
                Some(PunctuationId::LParen) => depth += 1,
                Some(PunctuationId::RParen) => depth = depth.saturating_sub(1),
                _ => {}
            }
            push_token_text(&mut text, &token.kind);
            first = false;
        }
        trace!(%text, "raw SQL");
        text
    }

    fn sql_ends_here(&self, depth: usize) -> bool {
        if matches!(self.peek().kind, TokenKind::Directive(_)) {
            return true;
        }
        let keyword = self.current_keyword();
        if depth > 0 {
            return self.at_line_start() && keyword.is_some_and(keywords::recovers_grouping);
        }
        if self.check_punct(PunctuationId::Semicolon) {
            return true;
        }
        let Some(keyword) = keyword else {
            return false;
        };
        if keyword == KeywordId::End {
            return true;
        }
        let for_update = keyword == KeywordId::For && self.check_keyword_at(1, KeywordId::Update);
        if keywords::is_reserved(keyword)
            && !matches!(
                keyword,
                KeywordId::And | KeywordId::Or | KeywordId::Not | KeywordId::Null | KeywordId::Like
            )
            && !for_update
        {
            return true;
        }
        self.at_line_start() && keywords::starts_statement(keyword) && !continues_sql(keyword) && !for_update
    }

    /// `SQL ... END SQL`
    fn sql_block_stmt(&mut self) -> NodeId {
        let start = self.current_start();
        let (text, complete) = self.sql_block_text();
        self.node(
            NodeKind::Sql(SqlStmt {
                verb: KeywordId::Sql,
                text,
            }),
            start,
            complete,
        )
    }

    /// Consume `SQL ... END SQL` and return the enclosed text.
    fn sql_block_text(&mut self) -> (String, bool) {
        self.advance();
        let mut text = String::new();
        while !self.is_at_end() {
            if self.check_keyword(KeywordId::End) && self.peek_at(1).keyword_id().is_some_and(is_block_keyword) {
                break;
            }
            let token = self.advance();
            push_token_text(&mut text, &token.kind);
        }
        let closed = self.expect_block_end(KeywordId::Sql);
        (text, closed)
    }
}
