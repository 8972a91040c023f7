const COMPARISON_BP: u8 = 30;
const UNARY_BP: u8 = 75;
const POSTFIX_BP: u8 = 80;

/// An infix construct found at the current token.
#[derive(Debug, Clone, Copy)]
enum Infix {
    Binary(BinaryOp),
    Between { negated: bool },
    In { negated: bool },
    IsNull { negated: bool },
}

impl Infix {
    fn binding_power(self) -> u8 {
        match self {
            Infix::Binary(op) => match op {
                BinaryOp::Or => 10,
                BinaryOp::And => 20,
                BinaryOp::Concat => 40,
                BinaryOp::Add | BinaryOp::Sub => 50,
                BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 60,
                BinaryOp::Pow => 70,
                _ => COMPARISON_BP,
            },
            Infix::Between { .. } | Infix::In { .. } | Infix::IsNull { .. } => COMPARISON_BP,
        }
    }
}

/// Expressions.
///
/// Precedence climbing over binding powers (higher binds tighter):
///
/// | bp | operators                                              |
/// |----|--------------------------------------------------------|
/// | 10 | `OR`                                                   |
/// | 20 | `AND`                                                  |
/// | 26 | `NOT` (prefix)                                         |
/// | 30 | comparisons, `[NOT] LIKE/MATCHES/BETWEEN/IN`, `IS [NOT] NULL` |
/// | 40 | `\|\|`                                                 |
/// | 50 | `+` `-`                                                |
/// | 60 | `*` `/` `MOD`                                          |
/// | 70 | `**` (right associative)                               |
/// | 75 | unary `-` `+`, `COLUMN`, `ASCII`, `GROUP`              |
/// | 80 | `CLIPPED`, `SPACES`, `USING fmt`, `UNITS q`            |
impl<'p, R: Read> Parser<'p, R> {
    fn expression(&mut self) -> Option<NodeId> {
        self.expression_bp(0)
    }

    /// Parse an expression; reports if nothing at the current token starts one.
    fn require_expression(&mut self) -> Option<NodeId> {
        let before = self.pos;
        let expr = self.expression();
        if expr.is_none() && self.pos == before {
            let token = self.peek();
            let diagnostic = errors::expected_expression(&token.kind.describe(), token.span);
            self.error(diagnostic);
        }
        expr
    }

    /// One or more expressions separated by commas.
    fn expression_list(&mut self) -> Vec<NodeId> {
        let mut list = Vec::new();
        loop {
            match self.require_expression() {
                Some(expr) => list.push(expr),
                None => break,
            }
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        list
    }

    fn starts_expression(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Ident(_) | TokenKind::Int(_) | TokenKind::Decimal(_) | TokenKind::String(_) => true,
            TokenKind::Punctuation(p) => *p == PunctuationId::LParen,
            TokenKind::Operator(op) => matches!(op, OperatorId::Minus | OperatorId::Plus),
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
                ) || (is_name_keyword(*k) && keywords::category(*k) != KeywordCategory::Operator)
            }
            _ => false,
        }
    }

    fn expression_bp(&mut self, min_bp: u8) -> Option<NodeId> {
        if !self.enter() {
            return None;
        }
        let expr = self.climb(min_bp);
        self.leave();
        expr
    }

    fn climb(&mut self, min_bp: u8) -> Option<NodeId> {
        let start = self.current_start();
        let mut lhs = self.unary_expression()?;

        loop {
            if POSTFIX_BP >= min_bp {
                if let Some(postfix) = self.postfix_operator(start, lhs) {
                    lhs = postfix;
                    continue;
                }
            }

            let Some((infix, width)) = self.peek_infix() else {
                break;
            };
            let bp = infix.binding_power();
            if bp < min_bp {
                break;
            }
            for _ in 0..width {
                self.advance();
            }

            lhs = match infix {
                Infix::Binary(op) => {
                    let right_bp = if op == BinaryOp::Pow { bp } else { bp + 1 };
                    let Some(rhs) = self.operand(right_bp) else {
                        break;
                    };
                    if matches!(op, BinaryOp::Like | BinaryOp::NotLike) && self.match_keyword(KeywordId::Escape) {
                        self.skip_expression();
                    }
                    self.node(NodeKind::Binary(BinaryExpr { op, lhs, rhs }), start, true)
                }
                Infix::IsNull { negated } => self.node(
                    NodeKind::IsNull(IsNullExpr {
                        operand: lhs,
                        negated,
                    }),
                    start,
                    true,
                ),
                Infix::Between { negated } => {
                    let Some(low) = self.operand(bp + 1) else {
                        break;
                    };
                    let mut complete = self.expect_keyword(KeywordId::And);
                    let high = if complete { self.operand(bp + 1) } else { None };
                    complete &= high.is_some();
                    self.node(
                        NodeKind::Between(BetweenExpr {
                            operand: lhs,
                            low,
                            high,
                            negated,
                        }),
                        start,
                        complete,
                    )
                }
                Infix::In { negated } => {
                    let (items, complete) = self.parenthesized_arguments();
                    self.node(
                        NodeKind::In(InExpr {
                            operand: lhs,
                            items,
                            negated,
                        }),
                        start,
                        complete,
                    )
                }
            };
        }
        Some(lhs)
    }

    /// The right-hand side of an operator; reports if it is missing.
    fn operand(&mut self, min_bp: u8) -> Option<NodeId> {
        let before = self.pos;
        let operand = self.expression_bp(min_bp);
        if operand.is_none() && self.pos == before {
            let token = self.peek();
            let diagnostic = errors::expected_expression(&token.kind.describe(), token.span);
            self.error(diagnostic);
        }
        operand
    }

    /// Infix operator at the current token and the number of tokens it spans.
    fn peek_infix(&self) -> Option<(Infix, usize)> {
        match &self.peek().kind {
            TokenKind::Operator(op) => {
                let op = match op {
                    OperatorId::Plus => BinaryOp::Add,
                    OperatorId::Minus => BinaryOp::Sub,
                    OperatorId::Star => BinaryOp::Mul,
                    OperatorId::Slash => BinaryOp::Div,
                    OperatorId::StarStar => BinaryOp::Pow,
                    OperatorId::Concat => BinaryOp::Concat,
                    OperatorId::Eq | OperatorId::EqEq => BinaryOp::Eq,
                    OperatorId::NotEq => BinaryOp::NotEq,
                    OperatorId::Lt => BinaryOp::Lt,
                    OperatorId::LtEq => BinaryOp::LtEq,
                    OperatorId::Gt => BinaryOp::Gt,
                    OperatorId::GtEq => BinaryOp::GtEq,
                    OperatorId::ColonEq => return None,
                };
                Some((Infix::Binary(op), 1))
            }
            TokenKind::Keyword(k) => match k {
                KeywordId::Or => Some((Infix::Binary(BinaryOp::Or), 1)),
                KeywordId::And => Some((Infix::Binary(BinaryOp::And), 1)),
                KeywordId::Mod => Some((Infix::Binary(BinaryOp::Mod), 1)),
                KeywordId::Like => Some((Infix::Binary(BinaryOp::Like), 1)),
                KeywordId::Matches => Some((Infix::Binary(BinaryOp::Matches), 1)),
                KeywordId::Between => Some((Infix::Between { negated: false }, 1)),
                KeywordId::In if self.check_punct_at(1, PunctuationId::LParen) => {
                    Some((Infix::In { negated: false }, 1))
                }
                KeywordId::Is if self.check_keyword_at(1, KeywordId::Null) => {
                    Some((Infix::IsNull { negated: false }, 2))
                }
                KeywordId::Is if self.check_keyword_at(1, KeywordId::Not) && self.check_keyword_at(2, KeywordId::Null) => {
                    Some((Infix::IsNull { negated: true }, 3))
                }
                KeywordId::Not => match self.peek_at(1).keyword_id() {
                    Some(KeywordId::Like) => Some((Infix::Binary(BinaryOp::NotLike), 2)),
                    Some(KeywordId::Matches) => Some((Infix::Binary(BinaryOp::NotMatches), 2)),
                    Some(KeywordId::Between) => Some((Infix::Between { negated: true }, 2)),
                    Some(KeywordId::In) if self.check_punct_at(2, PunctuationId::LParen) => {
                        Some((Infix::In { negated: true }, 2))
                    }
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    }

    /// Apply a postfix operator at the current token to `operand`, if there is one.
    fn postfix_operator(&mut self, start: usize, operand: NodeId) -> Option<NodeId> {
        let (op, argument) = match self.current_keyword()? {
            KeywordId::Clipped => {
                self.advance();
                (PostfixOp::Clipped, None)
            }
            KeywordId::Spaces => {
                self.advance();
                (PostfixOp::Spaces, None)
            }
            KeywordId::Using => {
                if !self.starts_expression_at(1) {
                    return None;
                }
                self.advance();
                (PostfixOp::Using, self.unary_expression())
            }
            KeywordId::Units => {
                let qualifier = self.peek_at(1).keyword_id().filter(|k| constraints::QUALIFIERS.contains(k));
                self.advance();
                match qualifier {
                    Some(qualifier) => {
                        self.advance();
                        (PostfixOp::Units(qualifier), None)
                    }
                    None => {
                        self.error_expected("a qualifier (YEAR, MONTH, DAY, ...) after UNITS");
                        return None;
                    }
                }
            }
            _ => return None,
        };
        let postfix = PostfixExpr { op, operand, argument };
        Some(self.node(NodeKind::Postfix(postfix), start, true))
    }

    /// Whether the token `n` ahead can begin a `USING` format (a string or a variable).
    fn starts_expression_at(&self, n: usize) -> bool {
        match &self.peek_at(n).kind {
            TokenKind::String(_) | TokenKind::Ident(_) => true,
            TokenKind::Punctuation(p) => *p == PunctuationId::LParen,
            TokenKind::Keyword(k) => is_name_keyword(*k) && keywords::category(*k) != KeywordCategory::Operator,
            _ => false,
        }
    }

    fn unary_expression(&mut self) -> Option<NodeId> {
        let start = self.current_start();
        let prefix = match &self.peek().kind {
            TokenKind::Keyword(KeywordId::Not) => Some((UnaryOp::Not, 26)),
            TokenKind::Keyword(KeywordId::Column) => Some((UnaryOp::Column, UNARY_BP)),
            TokenKind::Keyword(KeywordId::Ascii) => Some((UnaryOp::Ascii, UNARY_BP)),
            TokenKind::Keyword(KeywordId::Group) => Some((UnaryOp::Group, UNARY_BP)),
            TokenKind::Operator(OperatorId::Minus) => Some((UnaryOp::Neg, UNARY_BP)),
            TokenKind::Operator(OperatorId::Plus) => Some((UnaryOp::Plus, UNARY_BP)),
            _ => None,
        };
        let Some((op, bp)) = prefix else {
            return self.postfix_expression();
        };

        self.advance();
        let operand = self.operand(bp)?;
        if op == UnaryOp::Group && self.match_keyword(KeywordId::Where) {
            self.skip_expression();
        }
        Some(self.node(NodeKind::Unary(UnaryExpr { op, operand }), start, true))
    }

    /// A primary followed by member access, indexing and calls. Also used for assignment targets.
    ///
    /// `[` and `(` on a new line do not continue the expression.
    fn postfix_expression(&mut self) -> Option<NodeId> {
        let start = self.current_start();
        let mut expr = self.primary_expression()?;
        loop {
            if self.check_punct(PunctuationId::Dot) {
                let next = self.peek_at(1);
                let member = if next.kind.is_operator(OperatorId::Star) {
                    None
                } else if let Some(name) = Self::member_name_of(next) {
                    Some(name)
                } else {
                    break;
                };
                self.advance();
                self.advance();
                expr = self.node(NodeKind::Member(MemberExpr { object: expr, member }), start, true);
            } else if self.check_punct(PunctuationId::LBracket) && !self.at_line_start() {
                self.advance();
                let indices = self.expression_list();
                let mut complete = !indices.is_empty();
                complete &= self.expect_punct(PunctuationId::RBracket);
                expr = self.node(NodeKind::Index(IndexExpr { object: expr, indices }), start, complete);
            } else if self.check_punct(PunctuationId::LParen) && !self.at_line_start() {
                let (args, complete) = self.parenthesized_arguments();
                expr = self.node(NodeKind::CallExpr(CallExpr { callee: expr, args }), start, complete);
            } else {
                break;
            }
        }
        Some(expr)
    }

    /// `( args )` starting at the current `(`. A bare `*` is accepted as an argument (`COUNT(*)`).
    fn parenthesized_arguments(&mut self) -> (Vec<NodeId>, bool) {
        self.advance();
        let mut args = Vec::new();
        if self.match_punct(PunctuationId::RParen) {
            return (args, true);
        }
        loop {
            let bare_star = self.check_op(OperatorId::Star)
                && (self.check_punct_at(1, PunctuationId::RParen) || self.check_punct_at(1, PunctuationId::Comma));
            if bare_star {
                let star = self.advance();
                args.push(self.node_at(NodeKind::Star, star.span, true));
            } else {
                match self.require_expression() {
                    Some(arg) => args.push(arg),
                    None => {
                        self.skip_past_close_paren();
                        return (args, false);
                    }
                }
            }
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        if self.expect_punct(PunctuationId::RParen) {
            return (args, true);
        }
        self.skip_past_close_paren();
        (args, false)
    }

    fn primary_expression(&mut self) -> Option<NodeId> {
        let token = self.peek().clone();
        let literal = match &token.kind {
            TokenKind::Int(n) => Some(Literal::Int(*n)),
            TokenKind::Decimal(text) => Some(Literal::Decimal(text.clone())),
            TokenKind::String(text) => Some(Literal::String(text.clone())),
            TokenKind::Keyword(KeywordId::Null) => Some(Literal::Null),
            TokenKind::Keyword(KeywordId::True) => Some(Literal::True),
            TokenKind::Keyword(KeywordId::False) => Some(Literal::False),
            TokenKind::Keyword(KeywordId::Today) => Some(Literal::Today),
            TokenKind::Keyword(KeywordId::Notfound) => Some(Literal::NotFound),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Some(self.node_at(NodeKind::Literal(literal), token.span, true));
        }

        match &token.kind {
            TokenKind::Keyword(KeywordId::Current) => {
                self.advance();
                let qualified = self
                    .current_keyword()
                    .is_some_and(|k| constraints::QUALIFIERS.contains(&k));
                let (qualifier, complete) = if qualified {
                    self.verify_valid_constraint(BaseTypeId::Datetime)
                } else {
                    (None, true)
                };
                Some(self.node(NodeKind::Current(CurrentExpr { qualifier }), token.span.start, complete))
            }
            TokenKind::Punctuation(PunctuationId::LParen) => {
                self.advance();
                let inner = self.require_expression();
                let Some(inner) = inner else {
                    self.skip_past_close_paren();
                    return None;
                };
                let complete = self.expect_punct(PunctuationId::RParen);
                if !complete {
                    self.skip_past_close_paren();
                }
                Some(self.node(NodeKind::Grouped(GroupedExpr { inner }), token.span.start, complete))
            }
            TokenKind::Ident(name) => {
                self.advance();
                let name = Name::new(name.to_string(), token.span);
                Some(self.node_at(NodeKind::Variable(VariableRef { name }), token.span, true))
            }
            TokenKind::Keyword(k) if is_name_keyword(*k) && keywords::category(*k) != KeywordCategory::Operator => {
                self.advance();
                let name = Name::new(keyword_name(*k), token.span);
                Some(self.node_at(NodeKind::Variable(VariableRef { name }), token.span, true))
            }
            _ => None,
        }
    }
}
