/// Report routines and the statements that drive them.
impl<'p, R: Read> Parser<'p, R> {
    /// `START REPORT r [TO ...]`, `OUTPUT TO REPORT r(args)`, `FINISH REPORT r`, `TERMINATE REPORT r`
    fn report_call_stmt(&mut self, action: ReportAction) -> NodeId {
        let start = self.current_start();
        self.advance();
        let mut complete = true;
        if action == ReportAction::Output {
            complete &= self.expect_keyword(KeywordId::To);
        }
        complete &= self.expect_keyword(KeywordId::Report);
        let report = self.expect_name("report name");
        complete &= report.is_some();

        let args = match action {
            ReportAction::Start => self.loose_arguments(KeywordId::Start),
            ReportAction::Output if self.check_punct(PunctuationId::LParen) => {
                let (args, closed) = self.parenthesized_arguments();
                complete &= closed;
                args
            }
            ReportAction::Output => {
                self.error_expected("`(`");
                complete = false;
                Vec::new()
            }
            ReportAction::Finish | ReportAction::Terminate => Vec::new(),
        };
        self.node(NodeKind::ReportCall(ReportCallStmt { action, report, args }), start, complete)
    }

    /// `REPORT r(params) [declarations] [OUTPUT ...] [ORDER BY ...] FORMAT ... END REPORT`
    fn report_def(&mut self, visibility: Visibility, start: usize) -> NodeId {
        self.advance();
        let name = self.expect_name("report name");
        let (params, params_complete) = self.parenthesized_parameters();
        let mut complete = name.is_some() && params_complete;

        let tracker = PrepareTracker::new();
        let binders = self.routine_binders(&tracker);
        let ctx = ParseContext::new(&binders).exitable(KeywordId::Report);

        let mut body = Vec::new();
        loop {
            self.skip_semicolons();
            let item_start = self.current_start();
            match self.current_keyword() {
                Some(KeywordId::Define | KeywordId::Constant | KeywordId::Type) => {
                    body.push(self.declaration(&ctx, Visibility::Default, item_start));
                }
                _ => break,
            }
        }

        let mut sections = Vec::new();
        if self.check_keyword(KeywordId::Output) {
            sections.push(self.report_output_section());
        }
        if self.check_keyword(KeywordId::Order) {
            let (section, ok) = self.report_order_section();
            complete &= ok;
            sections.push(section);
        }
        if self.match_keyword(KeywordId::Format) {
            complete &= self.report_format_sections(&ctx, &mut sections);
        } else {
            self.error_expected("`FORMAT`");
            complete = false;
        }

        complete &= self.expect_block_end(KeywordId::Report);
        self.bind_prepared(&tracker);
        debug!(name = name.as_ref().map(|n| n.node.as_str()), sections = sections.len(), "parsed report");

        self.node(
            NodeKind::Report(ReportDef {
                name,
                visibility,
                params,
                body,
                sections,
            }),
            start,
            complete,
        )
    }

    /// `OUTPUT` followed by page settings (`REPORT TO FILE "x"`, `LEFT MARGIN 0`, ...).
    fn report_output_section(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();
        let mut args = Vec::new();
        loop {
            match self.current_keyword() {
                Some(KeywordId::Order | KeywordId::Format | KeywordId::End) => break,
                Some(KeywordId::Report) if self.check_keyword_at(1, KeywordId::To) => {}
                Some(k) if keywords::starts_module_item(k) => break,
                _ => {}
            }
            if self.is_at_end() {
                break;
            }
            if self.starts_loose_argument() {
                let before = self.pos;
                args.extend(self.expression());
                if self.pos == before {
                    self.advance();
                }
            } else {
                self.advance();
            }
        }
        let section = ReportSection {
            kind: ReportSectionKind::Output,
            args,
            body: Vec::new(),
        };
        self.node(NodeKind::ReportSection(section), start, true)
    }

    /// `ORDER [EXTERNAL] BY a, b`
    fn report_order_section(&mut self) -> (NodeId, bool) {
        let start = self.current_start();
        self.advance();
        self.match_keyword(KeywordId::External);
        let mut complete = self.expect_keyword(KeywordId::By);
        let args = self.expression_list();
        complete &= !args.is_empty();
        let section = ReportSection {
            kind: ReportSectionKind::OrderBy,
            args,
            body: Vec::new(),
        };
        (self.node(NodeKind::ReportSection(section), start, complete), complete)
    }

    /// Sections after `FORMAT`, up to `END REPORT`. Returns `false` if a section header was malformed.
    fn report_format_sections(&mut self, ctx: &ParseContext<'_>, sections: &mut Vec<NodeId>) -> bool {
        if self.check_keyword(KeywordId::Every) {
            let start = self.current_start();
            self.advance();
            let complete = self.expect_keyword(KeywordId::Row);
            let section = ReportSection {
                kind: ReportSectionKind::EveryRow,
                args: Vec::new(),
                body: Vec::new(),
            };
            sections.push(self.node(NodeKind::ReportSection(section), start, complete));
            return complete;
        }

        let body_ctx = ctx.with_clauses(&[
            KeywordId::First,
            KeywordId::Page,
            KeywordId::On,
            KeywordId::Before,
            KeywordId::After,
        ]);
        let mut complete = true;
        loop {
            self.skip_semicolons();
            if self.is_at_end() || self.check_keyword(KeywordId::End) {
                break;
            }
            if self.current_keyword().is_some_and(keywords::starts_module_item) {
                break;
            }
            let start = self.current_start();
            let Some(kind) = self.report_section_header() else {
                self.error(
                    errors::unexpected(&self.peek().kind.describe(), self.current_span())
                        .with_note("FORMAT sections start with PAGE HEADER, ON EVERY ROW, BEFORE GROUP OF, ..."),
                );
                complete = false;
                self.synchronize_statement();
                continue;
            };
            let args = if matches!(kind, ReportSectionKind::BeforeGroupOf | ReportSectionKind::AfterGroupOf) {
                let group = self.require_expression();
                complete &= group.is_some();
                group.into_iter().collect()
            } else {
                Vec::new()
            };
            let body = self.block_body(&body_ctx);
            let section = ReportSection { kind, args, body };
            sections.push(self.node(NodeKind::ReportSection(section), start, true));
        }
        complete
    }

    /// Consume a section header and return its kind, or consume nothing.
    fn report_section_header(&mut self) -> Option<ReportSectionKind> {
        let words = [
            self.current_keyword(),
            self.peek_at(1).keyword_id(),
            self.peek_at(2).keyword_id(),
        ];
        use KeywordId as K;
        let (kind, len) = match words {
            [Some(K::First), Some(K::Page), Some(K::Header)] => (ReportSectionKind::FirstPageHeader, 3),
            [Some(K::Page), Some(K::Header), _] => (ReportSectionKind::PageHeader, 2),
            [Some(K::Page), Some(K::Trailer), _] => (ReportSectionKind::PageTrailer, 2),
            [Some(K::On), Some(K::Every), Some(K::Row)] => (ReportSectionKind::OnEveryRow, 3),
            [Some(K::On), Some(K::Last), Some(K::Row)] => (ReportSectionKind::OnLastRow, 3),
            [Some(K::Before), Some(K::Group), Some(K::Of)] => (ReportSectionKind::BeforeGroupOf, 3),
            [Some(K::After), Some(K::Group), Some(K::Of)] => (ReportSectionKind::AfterGroupOf, 3),
            _ => return None,
        };
        for _ in 0..len {
            self.advance();
        }
        Some(kind)
    }
}
