/// Interactive statements: `INPUT`, `DISPLAY ARRAY`, `CONSTRUCT`, `MENU`, `PROMPT` and `DIALOG`.
///
/// Each is a header followed, optionally, by control blocks (`ON ACTION x`, `BEFORE FIELD f`, `COMMAND "Add"`)
/// and a closing `END x`. Variables declared inside a `DIALOG` are scoped to it and recorded on the dialog
/// node as [`ScopedVariables`].

fn is_dialog_trigger(keyword: KeywordId) -> bool {
    matches!(
        keyword,
        KeywordId::Before | KeywordId::After | KeywordId::On | KeywordId::Command
    )
}

/// Option words that may continue a dialog header on its own line.
fn continues_dialog_header(keyword: KeywordId) -> bool {
    matches!(
        keyword,
        KeywordId::Attributes | KeywordId::Without | KeywordId::From | KeywordId::To | KeywordId::Help
    )
}

impl<'p, R: Read> Parser<'p, R> {
    fn dialog_statement(&mut self, ctx: &ParseContext<'_>, kind: DialogKind) -> NodeId {
        let start = self.current_start();
        let own = kind.end_keyword();
        let collector = ScopeCollector::default();
        let body_ctx = ctx.with_registrar(&collector).exitable(own);

        self.advance();
        let mut complete = true;
        let mut bindings = Vec::new();
        match kind {
            DialogKind::DisplayArray | DialogKind::InputArray => {
                self.advance();
                match self.postfix_expression() {
                    Some(array) => bindings.push(array),
                    None => {
                        self.error_expected("an array variable");
                        complete = false;
                    }
                }
            }
            DialogKind::Input => {
                if self.match_keyword(KeywordId::By) {
                    complete &= self.expect_keyword(KeywordId::Name);
                }
                bindings = self.target_list();
                complete &= !bindings.is_empty();
            }
            DialogKind::Construct => {
                if self.match_keyword(KeywordId::By) {
                    complete &= self.expect_keyword(KeywordId::Name);
                }
                match self.postfix_expression() {
                    Some(query) => bindings.push(query),
                    None => {
                        self.error_expected("a query variable");
                        complete = false;
                    }
                }
                if self.expect_keyword(KeywordId::On) {
                    bindings.extend(self.target_list());
                } else {
                    complete = false;
                }
            }
            DialogKind::Menu => {
                if !self.at_line_start() && self.starts_expression() {
                    bindings.extend(self.expression());
                }
            }
            DialogKind::Prompt => {
                bindings.extend(self.require_expression());
                if self.expect_keyword(KeywordId::For) {
                    self.match_keyword(KeywordId::Char);
                    match self.postfix_expression() {
                        Some(answer) => bindings.push(answer),
                        None => {
                            self.error_expected("a variable");
                            complete = false;
                        }
                    }
                } else {
                    complete = false;
                }
            }
            DialogKind::Subdialog => {
                let name = self.postfix_expression();
                if name.is_none() {
                    self.error_expected("subdialog name");
                    complete = false;
                }
                bindings.extend(name);
                let dialog = DialogStmt {
                    kind,
                    bindings,
                    blocks: Vec::new(),
                };
                return self.node(NodeKind::Dialog(dialog), start, complete);
            }
            DialogKind::Dialog => {}
        }
        self.dialog_header_tail();

        let has_blocks = matches!(kind, DialogKind::Menu | DialogKind::Dialog)
            || self.current_keyword().is_some_and(is_dialog_trigger)
            || (self.check_keyword(KeywordId::End) && self.check_keyword_at(1, own));
        let blocks = if has_blocks {
            let blocks = self.dialog_blocks(&body_ctx, kind);
            complete &= self.expect_block_end(own);
            blocks
        } else {
            Vec::new()
        };

        let id = self.node(
            NodeKind::Dialog(DialogStmt {
                kind,
                bindings,
                blocks,
            }),
            start,
            complete,
        );
        let names = collector.into_names();
        if !names.is_empty() {
            debug!(dialog = kind.as_str(), count = names.len(), "dialog-scoped variables");
            self.builder.attributes_mut(id).insert(ScopedVariables { names });
        }
        id
    }

    /// Skip header options (`WITHOUT DEFAULTS`, `FROM s.*`, `ATTRIBUTES(...)`, `HELP n`).
    fn dialog_header_tail(&mut self) {
        loop {
            if self.is_at_end() || self.check_punct(PunctuationId::Semicolon) || self.check_keyword(KeywordId::End) {
                return;
            }
            let keyword = self.current_keyword();
            if keyword.is_some_and(is_dialog_trigger) {
                return;
            }
            if self.at_line_start() && !keyword.is_some_and(continues_dialog_header) {
                return;
            }
            if keyword == Some(KeywordId::Attributes) && self.check_punct_at(1, PunctuationId::LParen) {
                self.advance();
                self.skip_parenthesized();
                continue;
            }
            self.advance();
        }
    }

    /// Control blocks up to the closing `END`. Inside `DIALOG` also declarations and sub-dialogs.
    fn dialog_blocks(&mut self, ctx: &ParseContext<'_>, kind: DialogKind) -> Vec<NodeId> {
        let mut blocks = Vec::new();
        loop {
            self.skip_semicolons();
            if self.is_at_end() || self.check_keyword(KeywordId::End) {
                break;
            }
            let start = self.current_start();
            let keyword = self.current_keyword();
            let before = self.pos;
            match keyword {
                Some(k) if is_dialog_trigger(k) => blocks.push(self.dialog_block(ctx)),
                Some(KeywordId::Define | KeywordId::Constant | KeywordId::Type) if kind == DialogKind::Dialog => {
                    blocks.push(self.declaration(ctx, Visibility::Default, start));
                }
                Some(KeywordId::Subdialog) if kind == DialogKind::Dialog => {
                    blocks.push(self.dialog_statement(ctx, DialogKind::Subdialog));
                }
                Some(k) if keywords::starts_module_item(k) => break,
                _ => match self.statement_start() {
                    Some(StatementStart::Dialog(
                        nested @ (DialogKind::Input | DialogKind::InputArray | DialogKind::DisplayArray | DialogKind::Construct),
                    )) if kind == DialogKind::Dialog => {
                        blocks.push(self.dialog_statement(ctx, nested));
                    }
                    _ => {
                        self.error_unexpected();
                        self.synchronize_statement();
                    }
                },
            }
            if self.pos == before {
                self.advance();
            }
        }
        blocks
    }

    /// `ON ACTION accept`, `BEFORE FIELD a, b`, `COMMAND "Add" "Add a row"` followed by its statements.
    fn dialog_block(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        let trigger_token = self.advance();
        let trigger = trigger_token.keyword_id().unwrap_or(KeywordId::On);
        let mut header = keywords::as_str(trigger).to_string();

        if !self.at_line_start() && !self.is_at_end() {
            let word = self.advance();
            push_token_text(&mut header, &word.kind);
            let names_follow = matches!(
                word.keyword_id(),
                Some(KeywordId::Action | KeywordId::Field | KeywordId::Infield | KeywordId::Key)
            );
            if names_follow && !self.at_line_start() && !self.is_at_end() {
                let name = self.advance();
                match name.keyword_id() {
                    Some(k) => {
                        header.push(' ');
                        header.push_str(&keyword_name(k));
                    }
                    None => push_token_text(&mut header, &name.kind),
                }
            }
        }
        while !self.at_line_start() && !self.is_at_end() && !self.check_punct(PunctuationId::Semicolon) {
            if self.current_keyword().is_some_and(keywords::starts_statement) {
                break;
            }
            let token = self.advance();
            push_token_text(&mut header, &token.kind);
        }

        let body_ctx = ctx.with_clauses(&[KeywordId::Before, KeywordId::After, KeywordId::On, KeywordId::Command]);
        let body = self.block_body(&body_ctx);
        self.node(NodeKind::DialogBlock(DialogBlock { trigger, header, body }), start, true)
    }
}
