/// Module-level items and declarations.
///
/// This chunk parses the top of a source file (imports, schema, globals, directives, routines) and the
/// `DEFINE` / `CONSTANT` / `TYPE` declarations shared by module, routine and dialog scopes.
impl<'p, R: Read> Parser<'p, R> {
    // ========================================================================
    // Module
    // ========================================================================

    fn module(&mut self) -> NodeId {
        let start = self.options.start.index;
        let tracker = PrepareTracker::new();
        let binders = self.routine_binders(&tracker);
        let ctx = ParseContext::new(&binders);

        let mut items = Vec::new();
        loop {
            self.skip_semicolons();
            if self.is_at_end() {
                break;
            }
            let before = self.pos;
            if let Some(item) = self.module_item(&ctx) {
                items.push(item);
            }
            if self.pos == before {
                self.advance();
            }
        }

        self.bind_prepared(&tracker);
        let end = self.current_span().end.max(start);
        self.node_at(NodeKind::Module(ModuleNode { items }), Span::new(start, end), true)
    }

    fn module_item(&mut self, ctx: &ParseContext<'_>) -> Option<NodeId> {
        let start = self.current_start();
        let keyword = match &self.peek().kind {
            TokenKind::Directive(text) => {
                let text = text.clone();
                return Some(self.directive(text));
            }
            TokenKind::Keyword(k) => *k,
            _ => {
                self.error_unexpected();
                self.synchronize_module();
                return None;
            }
        };

        match keyword {
            KeywordId::Public | KeywordId::Private => self.visibility_item(ctx),
            KeywordId::Import => Some(self.import_decl()),
            KeywordId::Schema | KeywordId::Database => Some(self.schema_decl()),
            KeywordId::Globals => Some(self.globals(ctx)),
            KeywordId::Define | KeywordId::Constant | KeywordId::Type => {
                Some(self.declaration(ctx, Visibility::Default, start))
            }
            KeywordId::Main => Some(self.main_def()),
            KeywordId::Function => Some(self.function_def(Visibility::Default, start)),
            KeywordId::Report => Some(self.report_def(Visibility::Default, start)),
            k if keywords::starts_statement(k) => {
                let first = self.current_span();
                let statement = self.statement(ctx)?;
                self.error(
                    Diagnostic::error(
                        format!("{} statement outside of MAIN, FUNCTION or REPORT", keywords::as_str(k)),
                        first,
                        ErrorCode::StatementOutsideFunction,
                    )
                    .with_hint("move the statement into a routine"),
                );
                Some(statement)
            }
            _ => {
                self.error_unexpected();
                self.synchronize_module();
                None
            }
        }
    }

    fn visibility_item(&mut self, ctx: &ParseContext<'_>) -> Option<NodeId> {
        let start = self.current_start();
        let token = self.advance();
        let visibility = if token.kind.is_keyword(KeywordId::Private) {
            Visibility::Private
        } else {
            Visibility::Public
        };
        if !self.options.language_version.supports(LanguageVersion::MODULES) {
            let word = token.kind.spelling();
            self.error(errors::unsupported(&word, LanguageVersion::MODULES, token.span));
        }

        match self.current_keyword() {
            Some(KeywordId::Function) => Some(self.function_def(visibility, start)),
            Some(KeywordId::Report) => Some(self.report_def(visibility, start)),
            Some(KeywordId::Define | KeywordId::Constant | KeywordId::Type) => {
                Some(self.declaration(ctx, visibility, start))
            }
            _ => {
                self.error_expected(&format!("FUNCTION, REPORT, DEFINE, CONSTANT or TYPE after {}", token.kind.spelling()));
                None
            }
        }
    }

    /// `IMPORT FGL module`, `IMPORT JAVA class.path` or `IMPORT package`.
    fn import_decl(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();
        let kind = if self.match_keyword(KeywordId::Fgl) {
            if !self.options.language_version.supports(LanguageVersion::MODULES) {
                let span = Span::new(start, self.prev_end());
                self.error(errors::unsupported("IMPORT FGL", LanguageVersion::MODULES, span));
            }
            ImportKind::Fgl
        } else if self.match_keyword(KeywordId::Java) {
            ImportKind::Java
        } else {
            ImportKind::Package
        };

        let (path, complete) = match self.dotted_name() {
            Some(path) => (path, true),
            None => {
                self.error_expected("module name");
                (Name::new(String::new(), Span::point(self.prev_end())), false)
            }
        };
        self.node(NodeKind::Import(ImportDecl { kind, path }), start, complete)
    }

    /// `SCHEMA db` / `DATABASE db`.
    fn schema_decl(&mut self) -> NodeId {
        let start = self.current_start();
        let keyword = self.advance().keyword_id().unwrap_or(KeywordId::Schema);
        let database = self.expect_name("database name");
        let complete = database.is_some();
        self.node(NodeKind::Schema(SchemaDecl { keyword, database }), start, complete)
    }

    /// `GLOBALS "file"` or `GLOBALS declarations END GLOBALS`.
    fn globals(&mut self, ctx: &ParseContext<'_>) -> NodeId {
        let start = self.current_start();
        self.advance();

        if let TokenKind::String(path) = &self.peek().kind {
            let path = Spanned::new(path.clone(), self.current_span());
            self.advance();
            return self.node(NodeKind::GlobalsFile(GlobalsFile { path }), start, true);
        }

        let mut items = Vec::new();
        let mut complete = true;
        loop {
            self.skip_semicolons();
            let item_start = self.current_start();
            match &self.peek().kind {
                TokenKind::Eof | TokenKind::Keyword(KeywordId::End) => break,
                TokenKind::Keyword(KeywordId::Define | KeywordId::Constant | KeywordId::Type) => {
                    items.push(self.declaration(ctx, Visibility::Default, item_start));
                }
                TokenKind::Directive(text) => {
                    let text = text.clone();
                    items.push(self.directive(text));
                }
                TokenKind::Keyword(k) if keywords::starts_module_item(*k) => break,
                _ => {
                    self.error_unexpected();
                    complete = false;
                    self.synchronize_module();
                }
            }
        }
        complete &= self.expect_block_end(KeywordId::Globals);
        self.node(NodeKind::Globals(GlobalsBlock { items }), start, complete)
    }

    /// `&include "file"` becomes an [`IncludeDirective`]; other directive lines are kept verbatim.
    fn directive(&mut self, text: String) -> NodeId {
        let token = self.advance();
        let (word, rest) = text.split_once(char::is_whitespace).unwrap_or((text.as_str(), ""));
        if !word.eq_ignore_ascii_case("include") {
            return self.node_at(NodeKind::Directive(DirectiveNode { text }), token.span, true);
        }

        let path = rest.trim().trim_matches(['"', '\'']).to_string();
        let complete = !path.is_empty();
        if !complete {
            self.error(errors::expected("a file name after &include", "end of line", token.span));
        }
        let path = Spanned::new(path, token.span);
        self.node_at(NodeKind::Include(IncludeDirective { path }), token.span, complete)
    }

    // ========================================================================
    // Routines
    // ========================================================================

    fn main_def(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();

        let tracker = PrepareTracker::new();
        let binders = self.routine_binders(&tracker);
        let arity = ReturnArity {
            routine: "MAIN".to_string(),
            expected: 0,
        };
        let ctx = ParseContext::new(&binders)
            .with_return_binder(Some(&arity as &dyn ReturnBinder))
            .block(KeywordId::Main);

        let body = self.block_body(&ctx);
        let complete = self.expect_block_end(KeywordId::Main);
        self.bind_prepared(&tracker);
        self.node(NodeKind::Main(MainDef { body }), start, complete)
    }

    fn function_def(&mut self, visibility: Visibility, start: usize) -> NodeId {
        self.advance();
        let name = self.expect_name("function name");
        let (params, params_complete) = self.parenthesized_parameters();
        let mut complete = name.is_some() && params_complete;

        let returns = if self.match_keyword(KeywordId::Returns) {
            Some(self.returns_clause())
        } else {
            None
        };

        let tracker = PrepareTracker::new();
        let binders = self.routine_binders(&tracker);
        let arity = returns.as_ref().map(|types| ReturnArity {
            routine: format!("FUNCTION {}", name.as_ref().map_or("", |n| n.node.as_str())),
            expected: types.len(),
        });
        let ctx = ParseContext::new(&binders)
            .with_return_binder(arity.as_ref().map(|a| a as &dyn ReturnBinder))
            .block(KeywordId::Function);

        let body = self.block_body(&ctx);
        complete &= self.expect_block_end(KeywordId::Function);
        self.bind_prepared(&tracker);
        debug!(name = name.as_ref().map(|n| n.node.as_str()), complete, "parsed function");

        self.node(
            NodeKind::Function(FunctionDef {
                name,
                visibility,
                params,
                returns,
                body,
            }),
            start,
            complete,
        )
    }

    /// `( params )` of a routine definition.
    fn parenthesized_parameters(&mut self) -> (Vec<NodeId>, bool) {
        if !self.expect_punct(PunctuationId::LParen) {
            return (Vec::new(), false);
        }
        let params = self.parameter_list();
        if self.expect_punct(PunctuationId::RParen) {
            return (params, true);
        }
        self.skip_past_close_paren();
        (params, false)
    }

    /// Parameters up to (not including) the closing `)`. Each may carry an inline type.
    fn parameter_list(&mut self) -> Vec<NodeId> {
        let mut params = Vec::new();
        if self.check_punct(PunctuationId::RParen) {
            return params;
        }
        loop {
            let start = self.current_start();
            let Some(name) = self.expect_name("parameter name") else {
                break;
            };
            let type_ref = if self.check_punct(PunctuationId::Comma) || self.check_punct(PunctuationId::RParen) {
                None
            } else {
                self.type_reference()
            };
            params.push(self.node(NodeKind::Parameter(Parameter { name, type_ref }), start, true));
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        params
    }

    /// `RETURNS t` or `RETURNS (t1, t2, ...)`.
    fn returns_clause(&mut self) -> Vec<NodeId> {
        let parenthesized = self.match_punct(PunctuationId::LParen);
        let mut types = Vec::new();
        if parenthesized && self.match_punct(PunctuationId::RParen) {
            return types;
        }
        loop {
            match self.type_reference() {
                Some(t) => types.push(t),
                None => {
                    self.error_expected("a type");
                    break;
                }
            }
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        if parenthesized && !self.expect_punct(PunctuationId::RParen) {
            self.skip_past_close_paren();
        }
        types
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// `DEFINE`, `CONSTANT` or `TYPE`, at the current token.
    fn declaration(&mut self, ctx: &ParseContext<'_>, visibility: Visibility, start: usize) -> NodeId {
        match self.current_keyword() {
            Some(KeywordId::Constant) => self.constant_decl(visibility, start),
            Some(KeywordId::Type) => self.type_decl(visibility, start),
            _ => self.define_decl(ctx, visibility, start),
        }
    }

    /// `DEFINE a, b INTEGER, c STRING`: names separated by commas share the type that follows them.
    fn define_decl(&mut self, ctx: &ParseContext<'_>, visibility: Visibility, start: usize) -> NodeId {
        self.advance();
        let mut groups = Vec::new();
        let mut complete = true;

        loop {
            let group_start = self.current_start();
            let mut names = Vec::new();
            match self.expect_name("variable name") {
                Some(name) => names.push(name),
                None => {
                    complete = false;
                    break;
                }
            }
            while self.match_punct(PunctuationId::Comma) {
                match self.expect_name("variable name") {
                    Some(name) => names.push(name),
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if let Some(registrar) = ctx.scoped_registrar {
                for name in &names {
                    registrar.register(name);
                }
            }

            let type_ref = self.type_reference();
            if type_ref.is_none() {
                let joined = names.iter().map(|n| n.node.as_str()).collect::<Vec<_>>().join(", ");
                let span = names
                    .iter()
                    .map(|n| n.span)
                    .reduce(Span::merge)
                    .unwrap_or_else(|| self.current_span());
                self.error(errors::missing_type(&joined, span));
                complete = false;
            }
            let group_complete = type_ref.is_some();
            groups.push(self.node(
                NodeKind::VariableGroup(VariableGroup { names, type_ref }),
                group_start,
                group_complete,
            ));

            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }

        self.node(NodeKind::Define(DefineDecl { visibility, groups }), start, complete)
    }

    /// `CONSTANT name [type] = value, ...`
    fn constant_decl(&mut self, visibility: Visibility, start: usize) -> NodeId {
        self.advance();
        let mut items = Vec::new();
        let mut complete = true;

        loop {
            let item_start = self.current_start();
            let Some(name) = self.expect_name("constant name") else {
                complete = false;
                break;
            };
            let type_ref = if self.check_op(OperatorId::Eq) {
                None
            } else {
                self.type_reference()
            };
            let mut item_complete = self.expect_op_eq();
            let value = if item_complete { self.require_expression() } else { None };
            item_complete &= value.is_some();
            complete &= item_complete;
            items.push(self.node(
                NodeKind::ConstantItem(ConstantItem { name, type_ref, value }),
                item_start,
                item_complete,
            ));
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }

        self.node(NodeKind::Constant(ConstantDecl { visibility, items }), start, complete)
    }

    /// `TYPE name type, ...`
    fn type_decl(&mut self, visibility: Visibility, start: usize) -> NodeId {
        self.advance();
        let mut items = Vec::new();
        let mut complete = true;

        loop {
            let item_start = self.current_start();
            let Some(name) = self.expect_name("type name") else {
                complete = false;
                break;
            };
            let type_ref = self.type_reference();
            if type_ref.is_none() {
                self.error(errors::missing_type(&name.node, name.span));
                complete = false;
            }
            let item_complete = type_ref.is_some();
            items.push(self.node(NodeKind::TypeItem(TypeItem { name, type_ref }), item_start, item_complete));
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }

        self.node(NodeKind::TypeDecl(TypeDecl { visibility, items }), start, complete)
    }

    fn expect_op_eq(&mut self) -> bool {
        if self.match_op(OperatorId::Eq) || self.match_op(OperatorId::EqEq) {
            return true;
        }
        self.error_expected("`=`");
        false
    }
}
