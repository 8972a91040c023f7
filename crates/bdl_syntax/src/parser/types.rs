/// Type references.
///
/// Type syntaxes are tried in a fixed order; the first one whose leading tokens are present wins. Syntaxes
/// newer than the configured language version are not attempted, and the first one skipped that way is
/// reported.
///
/// ## Notes
/// - Composite types (array, record, dictionary, function) are wrapped in a [`TypeReference`] whose only child
///   is the composite node.
/// - Constraint suffixes are checked against the micro-grammar of the base type; one bad suffix yields one
///   diagnostic.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeSyntax {
    Array,
    Function,
    Dictionary,
    Record,
    Mimic,
    Named,
}

impl TypeSyntax {
    const ALL: [TypeSyntax; 6] = [
        TypeSyntax::Array,
        TypeSyntax::Function,
        TypeSyntax::Dictionary,
        TypeSyntax::Record,
        TypeSyntax::Mimic,
        TypeSyntax::Named,
    ];

    fn since(self) -> Option<LanguageVersion> {
        match self {
            TypeSyntax::Function => Some(LanguageVersion::FUNCTION_TYPES),
            TypeSyntax::Dictionary => Some(LanguageVersion::DICTIONARY),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            TypeSyntax::Array => "ARRAY type",
            TypeSyntax::Function => "FUNCTION type",
            TypeSyntax::Dictionary => "DICTIONARY type",
            TypeSyntax::Record => "RECORD type",
            TypeSyntax::Mimic => "LIKE type",
            TypeSyntax::Named => "type name",
        }
    }
}

impl<'p, R: Read> Parser<'p, R> {
    /// Parse a type reference if one starts at the current token. Nothing is consumed otherwise.
    fn type_reference(&mut self) -> Option<NodeId> {
        let mut reported = false;
        for syntax in TypeSyntax::ALL {
            if !self.starts_type_syntax(syntax) {
                continue;
            }
            if let Some(since) = syntax.since() {
                if !self.options.language_version.supports(since) {
                    if !reported {
                        self.error(errors::unsupported(syntax.as_str(), since, self.current_span()));
                        reported = true;
                    }
                    continue;
                }
            }
            let start = self.current_start();
            let id = match syntax {
                TypeSyntax::Array => {
                    let array = self.array_type();
                    self.wrap_composite(start, array)
                }
                TypeSyntax::Function => {
                    let function = self.function_type();
                    self.wrap_composite(start, function)
                }
                TypeSyntax::Dictionary => {
                    let dictionary = self.dictionary_type();
                    self.wrap_composite(start, dictionary)
                }
                TypeSyntax::Record => {
                    let record = self.record_definition();
                    self.wrap_composite(start, record)
                }
                TypeSyntax::Mimic => self.mimic_type(),
                TypeSyntax::Named => self.named_type(),
            };
            return Some(id);
        }
        None
    }

    /// Like [`Self::type_reference`], but reports a missing type.
    fn require_type(&mut self) -> Option<NodeId> {
        let type_ref = self.type_reference();
        if type_ref.is_none() {
            self.error_expected("a type");
        }
        type_ref
    }

    fn starts_type_syntax(&self, syntax: TypeSyntax) -> bool {
        match syntax {
            TypeSyntax::Array => {
                self.check_keyword(KeywordId::Array)
                    || (self.check_keyword(KeywordId::Dynamic) && self.check_keyword_at(1, KeywordId::Array))
            }
            TypeSyntax::Function => {
                self.check_keyword(KeywordId::Function) && self.check_punct_at(1, PunctuationId::LParen)
            }
            TypeSyntax::Dictionary => self.check_keyword(KeywordId::Dictionary),
            TypeSyntax::Record => self.check_keyword(KeywordId::Record),
            TypeSyntax::Mimic => self.check_keyword(KeywordId::Like),
            TypeSyntax::Named => match &self.peek().kind {
                TokenKind::Ident(_) => true,
                TokenKind::Keyword(k) => types::from_keyword(*k).is_some() || is_name_keyword(*k),
                _ => false,
            },
        }
    }

    /// Return `true` if the token `n` ahead could begin a type reference.
    fn starts_type_at(&self, n: usize) -> bool {
        match &self.peek_at(n).kind {
            TokenKind::Ident(_) => true,
            TokenKind::Keyword(k) => {
                matches!(
                    k,
                    KeywordId::Array | KeywordId::Dynamic | KeywordId::Record | KeywordId::Like | KeywordId::Dictionary
                ) || types::from_keyword(*k).is_some()
                    || is_name_keyword(*k)
            }
            _ => false,
        }
    }

    fn wrap_composite(&mut self, start: usize, composite: NodeId) -> NodeId {
        let complete = self.builder.is_complete(composite);
        let type_ref = TypeReference {
            composite: Some(composite),
            ..TypeReference::default()
        };
        self.node(NodeKind::TypeReference(type_ref), start, complete)
    }

    // ========================================================================
    // Composite types
    // ========================================================================

    /// `DYNAMIC ARRAY [WITH DIMENSION n] OF t`, `ARRAY [n[,m[,k]]] OF t` or `ARRAY [] OF t`.
    fn array_type(&mut self) -> NodeId {
        let start = self.current_start();
        let mut complete = true;
        let mut sizes = Vec::new();
        let mut dimensions = 1u8;

        let kind = if self.check_keyword(KeywordId::Dynamic) {
            self.advance();
            self.advance();
            if !self.options.language_version.supports(LanguageVersion::DYNAMIC_ARRAYS) {
                let span = Span::new(start, self.prev_end());
                self.error(errors::unsupported("DYNAMIC ARRAY", LanguageVersion::DYNAMIC_ARRAYS, span));
            }
            if self.match_keyword(KeywordId::With) {
                complete &= self.expect_keyword(KeywordId::Dimension);
                match self.peek().kind {
                    TokenKind::Int(n) => {
                        dimensions = u8::try_from(n).unwrap_or(u8::MAX);
                        self.advance();
                    }
                    _ => {
                        self.error_expected("a dimension count");
                        complete = false;
                    }
                }
            }
            ArrayKind::Dynamic
        } else {
            self.advance();
            if !self.expect_punct(PunctuationId::LBracket) {
                complete = false;
                ArrayKind::Dynamic
            } else if self.match_punct(PunctuationId::RBracket) {
                ArrayKind::Dynamic
            } else {
                let mut entries = 0u8;
                loop {
                    if let TokenKind::Int(n) = self.peek().kind {
                        sizes.push(n);
                        self.advance();
                    } else if self.match_name().is_some() {
                        sizes.push(0);
                    } else {
                        self.error_expected("an array size");
                        complete = false;
                        break;
                    }
                    entries = entries.saturating_add(1);
                    if !self.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
                dimensions = entries.max(1);
                if !self.expect_punct(PunctuationId::RBracket) {
                    complete = false;
                }
                ArrayKind::Static
            }
        };

        complete &= self.expect_keyword(KeywordId::Of);
        let element = self.require_type();
        complete &= element.is_some();

        self.node(
            NodeKind::ArrayType(ArrayType {
                kind,
                sizes,
                dimensions,
                element,
            }),
            start,
            complete,
        )
    }

    /// `RECORD LIKE table.*` or `RECORD member type, ... END RECORD`.
    ///
    /// Members without a type are kept (`type_ref: None`); whether that is an error is decided once the whole
    /// record is known.
    fn record_definition(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();

        if self.match_keyword(KeywordId::Like) {
            let mimic = self.mimic_target();
            let mut complete = mimic.is_some();
            if let Some(target) = mimic.as_ref().filter(|t| !t.is_whole_table()) {
                self.error(
                    Diagnostic::error(
                        format!("RECORD LIKE needs a whole table, found column `{}`", target.display()),
                        target.column.span,
                        ErrorCode::MimicMisuse,
                    )
                    .with_hint(format!("write `RECORD LIKE {}.*`", target.table.node)),
                );
                complete = false;
            }
            let record = RecordDefinition { members: Vec::new(), mimic };
            return self.node(NodeKind::RecordDefinition(record), start, complete);
        }

        let mut members = Vec::new();
        let mut complete = true;
        loop {
            if self.check_keyword(KeywordId::End) || self.is_at_end() {
                break;
            }
            let Some(name) = Self::record_member_name(self.peek()) else {
                break;
            };
            self.advance();
            let type_ref = if self.check_punct(PunctuationId::Comma) || self.check_keyword(KeywordId::End) {
                None
            } else {
                self.type_reference()
            };
            members.push(RecordMember { name, type_ref });

            if self.match_punct(PunctuationId::Comma) {
                continue;
            }
            if self.check_keyword(KeywordId::End) || self.is_at_end() {
                break;
            }
            // A missing comma: the next member starts a line, or reads as `name type`.
            if Self::record_member_name(self.peek()).is_some() && (self.at_line_start() || self.starts_type_at(1)) {
                self.error_expected("`,`");
                complete = false;
                continue;
            }
            break;
        }

        complete &= self.expect_block_end(KeywordId::Record);
        let record = RecordDefinition { members, mimic: None };
        self.node(NodeKind::RecordDefinition(record), start, complete)
    }

    /// Record member names accept most keywords, since columns are often named after them.
    fn record_member_name(token: &Token) -> Option<Name> {
        match &token.kind {
            TokenKind::Ident(name) => Some(Name::new(name.to_string(), token.span)),
            TokenKind::Keyword(k)
                if *k != KeywordId::End
                    && !keywords::starts_module_item(*k)
                    && !(keywords::is_reserved(*k) && keywords::starts_statement(*k)) =>
            {
                Some(Name::new(keyword_name(*k), token.span))
            }
            _ => None,
        }
    }

    /// `DICTIONARY OF t`.
    fn dictionary_type(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();
        let mut complete = self.expect_keyword(KeywordId::Of);
        let value = self.require_type();
        complete &= value.is_some();
        self.node(
            NodeKind::DictionaryDefinition(DictionaryDefinition { value }),
            start,
            complete,
        )
    }

    /// `FUNCTION (params) [RETURNS ...]`.
    fn function_type(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();
        self.advance();
        let params = self.parameter_list();
        let complete = self.expect_punct(PunctuationId::RParen);
        if !complete {
            self.skip_past_close_paren();
        }
        let returns = if self.match_keyword(KeywordId::Returns) {
            self.returns_clause()
        } else {
            Vec::new()
        };
        self.node(NodeKind::FunctionType(FunctionType { params, returns }), start, complete)
    }

    // ========================================================================
    // Scalar types
    // ========================================================================

    /// `LIKE [db:]table.column`.
    fn mimic_type(&mut self) -> NodeId {
        let start = self.current_start();
        self.advance();
        let mimic = self.mimic_target();
        let mut complete = mimic.is_some();
        if let Some(target) = mimic.as_ref().filter(|t| t.is_whole_table()) {
            self.error(
                Diagnostic::error(
                    format!("LIKE {} names a whole table", target.display()),
                    target.column.span,
                    ErrorCode::MimicMisuse,
                )
                .with_hint(format!("write `RECORD LIKE {}` for a record of every column", target.display())),
            );
            complete = false;
        }
        let type_ref = TypeReference {
            mimic,
            ..TypeReference::default()
        };
        self.node(NodeKind::TypeReference(type_ref), start, complete)
    }

    /// `[db:]table.column` or `[db:]table.*`.
    fn mimic_target(&mut self) -> Option<MimicTarget> {
        let first = self.expect_name("table name")?;
        let (database, table) = if self.match_punct(PunctuationId::Colon) {
            (Some(first), self.expect_name("table name")?)
        } else {
            (None, first)
        };
        if !self.expect_punct(PunctuationId::Dot) {
            return None;
        }
        let column = if self.check_op(OperatorId::Star) {
            let star = self.advance();
            Name::new("*".to_string(), star.span)
        } else {
            match Self::member_name_of(self.peek()) {
                Some(column) => {
                    self.advance();
                    column
                }
                None => {
                    self.error_expected("column name or `*`");
                    return None;
                }
            }
        };
        Some(MimicTarget {
            database,
            table,
            column,
        })
    }

    /// A base type with its optional constraint, or a user type name (`customer_t`, `base.Channel`).
    fn named_type(&mut self) -> NodeId {
        let start = self.current_start();
        let base = self.current_keyword().and_then(types::from_keyword);
        let Some(base) = base else {
            let name = self.dotted_name();
            let complete = name.is_some();
            let type_ref = TypeReference {
                name,
                ..TypeReference::default()
            };
            return self.node(NodeKind::TypeReference(type_ref), start, complete);
        };

        let token = self.advance();
        let name = Name::new(types::as_str(base).to_string(), token.span);
        let (constraint, complete) = self.verify_valid_constraint(base);
        let type_ref = TypeReference {
            name: Some(name),
            base: Some(base),
            constraint,
            ..TypeReference::default()
        };
        self.node(NodeKind::TypeReference(type_ref), start, complete)
    }

    // ========================================================================
    // Constraints
    // ========================================================================

    /// Match the constraint suffix of `base` and return its normalized text (`(10,2)`, `YEAR TO SECOND`).
    ///
    /// Returns `false` if the suffix was malformed. At most one diagnostic is reported per group.
    fn verify_valid_constraint(&mut self, base: BaseTypeId) -> (Option<String>, bool) {
        let constraint: &TypeConstraint = match constraints::constraint_for(base) {
            Some(constraint) => constraint,
            None => return (None, true),
        };

        let mut text = String::new();
        let mut open_parens = 0usize;
        let mut valid = true;
        let mut index = 0;
        while index < constraint.pieces.len() {
            let piece = constraint.pieces[index];
            if self.piece_matches(piece.expect) {
                let token = self.advance();
                if token.kind.keyword_id().is_some() && !text.is_empty() {
                    text.push(' ');
                }
                match token.kind.punctuation_id() {
                    Some(PunctuationId::LParen) => open_parens += 1,
                    Some(PunctuationId::RParen) => open_parens = open_parens.saturating_sub(1),
                    _ => {}
                }
                text.push_str(&token.kind.spelling());
                index += 1;
                continue;
            }
            if constraint.is_trigger(index) {
                index = constraint.group_end(index);
                continue;
            }
            if piece.optional {
                index += 1;
                continue;
            }

            let found = self.peek().kind.describe();
            let message = format!(
                "expected {} in {} type constraint, found {}",
                Self::describe_expect(piece.expect),
                types::as_str(base),
                found
            );
            self.error(Diagnostic::error(message, self.current_span(), ErrorCode::InvalidTypeConstraint));
            valid = false;
            if piece.group == 0 {
                break;
            }
            index = constraint.group_end(index);
        }

        if open_parens > 0 {
            self.skip_past_close_paren();
        }
        let text = (!text.is_empty()).then_some(text);
        (text, valid)
    }

    fn piece_matches(&self, expect: Expect) -> bool {
        let token = self.peek();
        match expect {
            Expect::Punct(p) => token.kind.is_punctuation(p),
            Expect::Keyword(k) => token.kind.is_keyword(k),
            Expect::OneOf(list) => token.keyword_id().is_some_and(|k| list.contains(&k)),
            Expect::Category(category) => token.category() == category,
        }
    }

    fn describe_expect(expect: Expect) -> String {
        match expect {
            Expect::Punct(p) => format!("`{}`", punctuation::as_str(p)),
            Expect::Keyword(k) => format!("`{}`", keywords::as_str(k)),
            Expect::OneOf(list) => {
                let words: Vec<&str> = list.iter().map(|k| keywords::as_str(*k)).collect();
                format!("one of {}", words.join(", "))
            }
            Expect::Category(TokenCategory::NumericLiteral) => "a number".to_string(),
            Expect::Category(category) => format!("a {}", category.as_str()),
        }
    }
}
