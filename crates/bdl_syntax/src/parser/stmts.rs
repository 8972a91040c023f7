/// Statements.
///
/// The first one or two tokens decide which statement parser runs ([`StatementStart`]). Control flow is
/// modelled in full; statements the front end does not analyse are kept as [`SimpleStmt`]s holding the
/// expressions they mention.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementStart {
    Call,
    Let,
    If,
    While,
    For,
    Foreach,
    Case,
    Exit,
    Return,
    Goto,
    Label,
    Try,
    Declaration,
    Directive,
    Prepare,
    Execute,
    Declare,
    CursorOp(CursorOp),
    RawSql(KeywordId),
    SqlBlock,
    Dialog(DialogKind),
    ReportCall(ReportAction),
    Simple(KeywordId),
}

impl<'p, R: Read> Parser<'p, R> {
    fn statement_start(&self) -> Option<StatementStart> {
        let keyword = match &self.peek().kind {
            TokenKind::Directive(_) => return Some(StatementStart::Directive),
            TokenKind::Keyword(k) => *k,
            _ => return None,
        };
        let next = self.peek_at(1).keyword_id();

        let start = match keyword {
            KeywordId::Call => StatementStart::Call,
            KeywordId::Let => StatementStart::Let,
            KeywordId::If => StatementStart::If,
            KeywordId::While => StatementStart::While,
            KeywordId::For => StatementStart::For,
            KeywordId::Foreach => StatementStart::Foreach,
            KeywordId::Case => StatementStart::Case,
            KeywordId::Exit | KeywordId::Continue => StatementStart::Exit,
            KeywordId::Return => StatementStart::Return,
            KeywordId::Goto => StatementStart::Goto,
            KeywordId::Label => StatementStart::Label,
            KeywordId::Try => StatementStart::Try,
            KeywordId::Define | KeywordId::Constant | KeywordId::Type => StatementStart::Declaration,
            KeywordId::Prepare => StatementStart::Prepare,
            KeywordId::Execute => StatementStart::Execute,
            KeywordId::Declare => StatementStart::Declare,
            KeywordId::Open | KeywordId::Close if matches!(next, Some(KeywordId::Window | KeywordId::Form)) => {
                StatementStart::Simple(keyword)
            }
            KeywordId::Open => StatementStart::CursorOp(CursorOp::Open),
            KeywordId::Close => StatementStart::CursorOp(CursorOp::Close),
            KeywordId::Fetch => StatementStart::CursorOp(CursorOp::Fetch),
            KeywordId::Free => StatementStart::CursorOp(CursorOp::Free),
            KeywordId::Display if next == Some(KeywordId::Array) => StatementStart::Dialog(DialogKind::DisplayArray),
            KeywordId::Input if next == Some(KeywordId::Array) => StatementStart::Dialog(DialogKind::InputArray),
            KeywordId::Input => StatementStart::Dialog(DialogKind::Input),
            KeywordId::Construct => StatementStart::Dialog(DialogKind::Construct),
            KeywordId::Menu => StatementStart::Dialog(DialogKind::Menu),
            KeywordId::Prompt => StatementStart::Dialog(DialogKind::Prompt),
            KeywordId::Dialog => StatementStart::Dialog(DialogKind::Dialog),
            KeywordId::Start if next == Some(KeywordId::Report) => StatementStart::ReportCall(ReportAction::Start),
            KeywordId::Finish if next == Some(KeywordId::Report) => StatementStart::ReportCall(ReportAction::Finish),
            KeywordId::Terminate if next == Some(KeywordId::Report) => {
                StatementStart::ReportCall(ReportAction::Terminate)
            }
            KeywordId::Output if next == Some(KeywordId::To) => StatementStart::ReportCall(ReportAction::Output),
            KeywordId::Select
            | KeywordId::Insert
            | KeywordId::Update
            | KeywordId::Delete
            | KeywordId::Create
            | KeywordId::Drop
            | KeywordId::Lock
            | KeywordId::Unlock => StatementStart::RawSql(keyword),
            KeywordId::Sql => StatementStart::SqlBlock,
            k if keywords::starts_statement(k) => StatementStart::Simple(k),
            _ => return None,
        };
        Some(start)
    }

    /// Parse one statement. Returns `None` (after reporting and resynchronizing) if no statement starts here.
    fn statement(&mut self, ctx: &ParseContext<'_>) -> Option<NodeId> {
        let Some(kind) = self.statement_start() else {
            let token = self.peek();
            let mut diagnostic = errors::unexpected(&token.kind.describe(), token.span);
            if matches!(token.kind, TokenKind::Ident(_)) {
                diagnostic = diagnostic.with_hint("statements start with a keyword such as LET or CALL");
            }
            self.error(diagnostic);
            self.synchronize_statement();
            return None;
        };
        if !self.enter() {
            self.synchronize_statement();
            return None;
        }

        let start = self.current_start();
        let id = match kind {
            StatementStart::Call => self.call_stmt(),
            StatementStart::Let => self.let_stmt(ctx),
            StatementStart::If => self.if_stmt(ctx),
            StatementStart::While => self.while_stmt(ctx),
            StatementStart::For => self.for_stmt(ctx),
            StatementStart::Foreach => self.foreach_stmt(ctx),
            StatementStart::Case => self.case_stmt(ctx),
            StatementStart::Exit => self.exit_stmt(ctx),
            StatementStart::Return => self.return_stmt(ctx),
            StatementStart::Goto => self.goto_stmt(),
            StatementStart::Label => self.label_stmt(),
            StatementStart::Try => self.try_stmt(ctx),
            StatementStart::Declaration => self.declaration(ctx, Visibility::Default, start),
            StatementStart::Directive => {
                let text = match &self.peek().kind {
                    TokenKind::Directive(text) => text.clone(),
                    _ => String::new(),
                };
                self.directive(text)
            }
            StatementStart::Prepare => self.prepare_stmt(ctx),
            StatementStart::Execute => self.execute_stmt(),
            StatementStart::Declare => self.declare_stmt(ctx),
            StatementStart::CursorOp(op) => self.cursor_op_stmt(op),
            StatementStart::RawSql(verb) => self.raw_sql_stmt(verb),
            StatementStart::SqlBlock => self.sql_block_stmt(),
            StatementStart::Dialog(kind) => self.dialog_statement(ctx, kind),
            StatementStart::ReportCall(action) => self.report_call_stmt(action),
            StatementStart::Simple(keyword) => self.simple_stmt(keyword),
        };
        self.leave();
        self.match_punct(PunctuationId::Semicolon);
        Some(id)
    }

    // ========================================================================
    // Calls and assignment
    // ========================================================================

    /// `CALL f(args) [RETURNING a, b]`
    fn call_stmt(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();

        let call = self.postfix_expression();
        let mut complete = true;
        match call {
            Some(id) if matches!(self.kind_of(id), NodeKind::CallExpr(_)) => {}
            Some(id) => {
                let found = self.kind_of(id).describe();
                let span = self.span_of(id);
                self.error(errors::expected("a function call", found, span).with_hint("add `()` after the name"));
                complete = false;
            }
            None => {
                self.error_expected("a function call");
                complete = false;
            }
        }

        let returning = if self.match_keyword(KeywordId::Returning) {
            let targets = self.target_list();
            complete &= !targets.is_empty();
            targets
        } else {
            Vec::new()
        };
        self.node(NodeKind::Call(CallStmt { call, returning }), start, complete)
    }

    /// `LET target [, ...] = value [, ...]`. Comma-separated values are concatenated.
    fn let_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let targets = self.target_list();
        let mut complete = !targets.is_empty();
        let values = if complete && self.expect_op_eq() {
            self.expression_list()
        } else {
            complete = false;
            Vec::new()
        };
        complete &= !values.is_empty();

        if let Some((variable, text)) = self.string_assignment(&targets, &values) {
            for binder in ctx.prepare_binders {
                binder.string_assigned(&variable, &text);
            }
        }
        self.node(NodeKind::Let(LetStmt { targets, values }), start, complete)
    }

    /// `LET v = "a", "b"` assigns `v` a statically known string.
    fn string_assignment(&self, targets: &[NodeId], values: &[NodeId]) -> Option<(String, String)> {
        let [target] = targets else {
            return None;
        };
        let NodeKind::Variable(variable) = self.kind_of(*target) else {
            return None;
        };
        if values.is_empty() {
            return None;
        }
        let mut text = String::new();
        for value in values {
            match self.kind_of(*value) {
                NodeKind::Literal(Literal::String(part)) => text.push_str(part),
                _ => return None,
            }
        }
        Some((variable.name.node.clone(), text))
    }

    /// Assignable expressions separated by commas (`LET`, `INTO`, `RETURNING`).
    fn target_list(&mut self) -> Vec<NodeId> {
        let mut targets = Vec::new();
        loop {
            match self.postfix_expression() {
                Some(target) => targets.push(target),
                None => {
                    self.error_expected("a variable");
                    break;
                }
            }
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        targets
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn if_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let condition = self.require_expression();
        let mut complete = condition.is_some();
        complete &= self.expect_keyword(KeywordId::Then);

        let then_body = self.block_body(&ctx.block(KeywordId::If).with_clauses(&[KeywordId::Else]));
        let else_body = if self.match_keyword(KeywordId::Else) {
            self.block_body(&ctx.block(KeywordId::If))
        } else {
            Vec::new()
        };
        complete &= self.expect_block_end(KeywordId::If);

        self.node(
            NodeKind::If(IfStmt {
                condition,
                then_body,
                else_body,
            }),
            start,
            complete,
        )
    }

    fn while_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let condition = self.require_expression();
        let body = self.block_body(&ctx.exitable(KeywordId::While));
        let complete = self.expect_block_end(KeywordId::While) && condition.is_some();
        self.node(NodeKind::While(WhileStmt { condition, body }), start, complete)
    }

    /// `FOR i = a TO b [STEP c] ... END FOR`
    fn for_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let variable = self.postfix_expression();
        let mut complete = variable.is_some();
        if variable.is_none() {
            self.error_expected("loop variable");
        }
        complete &= self.expect_op_eq();
        let first = self.require_expression();
        complete &= first.is_some();
        complete &= self.expect_keyword(KeywordId::To);
        let end = self.require_expression();
        complete &= end.is_some();
        let step = if self.match_keyword(KeywordId::Step) {
            let step = self.require_expression();
            complete &= step.is_some();
            step
        } else {
            None
        };

        let body = self.block_body(&ctx.exitable(KeywordId::For));
        complete &= self.expect_block_end(KeywordId::For);
        self.node(
            NodeKind::For(ForStmt {
                variable,
                start: first,
                end,
                step,
                body,
            }),
            start,
            complete,
        )
    }

    /// `FOREACH c [USING ...] [INTO ...] [WITH REOPTIMIZATION] ... END FOREACH`
    fn foreach_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let cursor = self.expect_name("cursor name");
        let mut complete = cursor.is_some();
        let mut using = Vec::new();
        let mut into = Vec::new();
        loop {
            if self.match_keyword(KeywordId::Using) {
                using.extend(self.expression_list());
            } else if self.match_keyword(KeywordId::Into) {
                into.extend(self.target_list());
            } else {
                break;
            }
        }
        if self.match_keyword(KeywordId::With) {
            self.match_name();
        }

        let body = self.block_body(&ctx.exitable(KeywordId::Foreach));
        complete &= self.expect_block_end(KeywordId::Foreach);
        self.node(
            NodeKind::Foreach(ForeachStmt {
                cursor,
                using,
                into,
                body,
            }),
            start,
            complete,
        )
    }

    /// `CASE [subject] WHEN v ... OTHERWISE ... END CASE`
    fn case_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let subject = if self.check_keyword(KeywordId::When) || self.check_keyword(KeywordId::Otherwise) {
            None
        } else {
            self.require_expression()
        };

        let arm_ctx = ctx
            .exitable(KeywordId::Case)
            .with_clauses(&[KeywordId::When, KeywordId::Otherwise]);
        let mut arms = Vec::new();
        loop {
            self.skip_semicolons();
            let arm_start = self.current_start();
            if self.match_keyword(KeywordId::When) {
                let values = self.expression_list();
                let arm_complete = !values.is_empty();
                let body = self.block_body(&arm_ctx);
                let arm = CaseArm {
                    values,
                    otherwise: false,
                    body,
                };
                arms.push(self.node(NodeKind::CaseArm(arm), arm_start, arm_complete));
            } else if self.match_keyword(KeywordId::Otherwise) {
                let body = self.block_body(&arm_ctx);
                let arm = CaseArm {
                    values: Vec::new(),
                    otherwise: true,
                    body,
                };
                arms.push(self.node(NodeKind::CaseArm(arm), arm_start, true));
            } else {
                break;
            }
        }

        let complete = self.expect_block_end(KeywordId::Case);
        self.node(NodeKind::Case(CaseStmt { subject, arms }), start, complete)
    }

    /// `EXIT x` / `CONTINUE x`. The target must name an enclosing construct that allows it.
    fn exit_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        let token = self.advance();
        let kind = if token.kind.is_keyword(KeywordId::Continue) {
            ExitKind::Continue
        } else {
            ExitKind::Exit
        };

        let target = if !self.at_line_start() && !self.check_keyword(KeywordId::End) {
            self.current_keyword()
        } else {
            None
        };
        let Some(target) = target else {
            self.error_expected(&format!("a block keyword after {}", token.kind.spelling()));
            return self.node(
                NodeKind::Exit(ExitStmt {
                    kind,
                    target: None,
                    value: None,
                }),
                start,
                false,
            );
        };
        let target_span = self.current_span();
        self.advance();

        let value = if kind == ExitKind::Exit
            && target == KeywordId::Program
            && !self.at_line_start()
            && self.starts_expression()
        {
            self.expression()
        } else {
            None
        };

        let valid = match kind {
            ExitKind::Exit => ctx.exit_keywords.contains(target),
            ExitKind::Continue => {
                ctx.exit_keywords.contains(target)
                    && !matches!(
                        target,
                        KeywordId::Program | KeywordId::Case | KeywordId::Report | KeywordId::Function | KeywordId::Main
                    )
            }
        };
        if !valid {
            let statement = format!("{} {}", token.kind.spelling(), keywords::as_str(target));
            self.error(
                Diagnostic::error(
                    format!("{statement} is not inside a construct it can leave"),
                    token.span.merge(target_span),
                    ErrorCode::InvalidExitTarget,
                )
                .with_note(format!("no enclosing {} accepts it", keywords::as_str(target))),
            );
        }

        self.node(
            NodeKind::Exit(ExitStmt {
                kind,
                target: Some(target),
                value,
            }),
            start,
            valid,
        )
    }

    /// `RETURN [values]`, checked against the routine's `RETURNS` clause.
    fn return_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        let values = if !self.at_line_start() && self.starts_expression() {
            self.expression_list()
        } else {
            Vec::new()
        };
        let mut complete = true;
        if let Some(binder) = ctx.return_binder {
            let span = Span::new(start, self.prev_end());
            if let Some(diagnostic) = binder.check_return(values.len(), span) {
                self.error(diagnostic);
                complete = false;
            }
        }
        self.node(NodeKind::Return(ReturnStmt { values }), start, complete)
    }

    /// `GOTO [:]label`
    fn goto_stmt(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();
        self.match_punct(PunctuationId::Colon);
        let label = self.expect_name("label name");
        let complete = label.is_some();
        self.node(NodeKind::Goto(GotoStmt { label }), start, complete)
    }

    /// `LABEL name:`
    fn label_stmt(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();
        let name = self.expect_name("label name");
        let complete = name.is_some() && self.expect_punct(PunctuationId::Colon);
        self.node(NodeKind::Label(LabelStmt { name }), start, complete)
    }

    /// `TRY ... CATCH ... END TRY`
    fn try_stmt(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        let token = self.advance();
        if !self.options.language_version.supports(LanguageVersion::DYNAMIC_ARRAYS) {
            self.error(errors::unsupported("TRY", LanguageVersion::DYNAMIC_ARRAYS, token.span));
        }

        let body = self.block_body(&ctx.block(KeywordId::Try).with_clauses(&[KeywordId::Catch]));
        let mut complete = true;
        let catch_body = if self.match_keyword(KeywordId::Catch) {
            self.block_body(&ctx.block(KeywordId::Try))
        } else {
            self.error_expected("`CATCH`");
            complete = false;
            Vec::new()
        };
        complete &= self.expect_block_end(KeywordId::Try);
        self.node(NodeKind::Try(TryStmt { body, catch_body }), start, complete)
    }

    // ========================================================================
    // Loosely modelled statements
    // ========================================================================

    fn simple_stmt(&mut self, keyword: KeywordId) -> NodeId {
        let start = self.current_start();
        self.advance();
        let args = self.loose_arguments(keyword);
        self.node(NodeKind::Simple(SimpleStmt { keyword, args }), start, true)
    }

    /// Collect the expressions of a statement whose clauses are not modelled, skipping option words and
    /// punctuation. Stops at the end of the statement's line (unless the line is left open), at `;`, `END`,
    /// or a reserved word.
    fn loose_arguments(&mut self, keyword: KeywordId) -> Vec<NodeId> {
        let mut args = Vec::new();
        loop {
            if self.is_at_end() {
                break;
            }
            if self.check_punct(PunctuationId::Semicolon) {
                if keyword == KeywordId::Print && !self.line_break_at(1) {
                    self.advance();
                    continue;
                }
                break;
            }
            if self.at_line_start() && !self.previous_continues_line() {
                break;
            }
            match self.current_keyword() {
                Some(KeywordId::End) => break,
                Some(k)
                    if keywords::is_reserved(k)
                        && !matches!(k, KeywordId::Not | KeywordId::Null)
                        && keyword != KeywordId::Whenever =>
                {
                    break;
                }
                _ => {}
            }

            if self.starts_loose_argument() {
                let before = self.pos;
                if let Some(arg) = self.expression() {
                    args.push(arg);
                }
                if self.pos == before {
                    self.advance();
                }
            } else {
                self.advance();
            }
        }
        args
    }

    /// Whether the current token begins an expression worth keeping inside loose arguments. Bare option words
    /// (`BY`, `NAME`, `WITHOUT`, ...) do not, unless they are followed by `(`, `.` or `[`.
    fn starts_loose_argument(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Keyword(k) => {
                matches!(
                    k,
                    KeywordId::Null
                        | KeywordId::True
                        | KeywordId::False
                        | KeywordId::Today
                        | KeywordId::Notfound
                        | KeywordId::Current
                        | KeywordId::Not
                        | KeywordId::Column
                        | KeywordId::Ascii
                        | KeywordId::Group
                ) || (is_name_keyword(*k)
                    && keywords::category(*k) != KeywordCategory::Operator
                    && (self.check_punct_at(1, PunctuationId::LParen)
                        || self.check_punct_at(1, PunctuationId::Dot)
                        || self.check_punct_at(1, PunctuationId::LBracket)))
            }
            _ => self.starts_expression(),
        }
    }
}
