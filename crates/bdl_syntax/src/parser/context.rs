/// Parse context and binders.
///
/// A [`ParseContext`] is threaded by reference through statement parsing. It records which constructs enclose
/// the current position (so `EXIT`/`CONTINUE` targets can be checked and `END x` recovery knows what is open)
/// and carries the binders that observe declarations while they are parsed.
///
/// ## Notes
/// - Binders take `&self`; stateful binders keep their state behind a `RefCell`.
/// - Built-in binders: [`PrepareTracker`] (SQL text for prepared statements and cursors), [`ReturnArity`]
///   (`RETURN` value count) and [`ScopeCollector`] (dialog-local variables).

const KEYWORD_SET_WORDS: usize = keywords::KEYWORDS.len().div_ceil(64);

/// Set of keywords, as a bitset over [`KeywordId`] discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeywordSet([u64; KEYWORD_SET_WORDS]);

impl KeywordSet {
    pub const EMPTY: KeywordSet = KeywordSet([0; KEYWORD_SET_WORDS]);

    pub fn of(ids: &[KeywordId]) -> Self {
        let mut set = Self::EMPTY;
        for &id in ids {
            set.insert(id);
        }
        set
    }

    pub fn with(mut self, id: KeywordId) -> Self {
        self.insert(id);
        self
    }

    pub fn insert(&mut self, id: KeywordId) {
        let (word, bit) = Self::slot(id);
        self.0[word] |= bit;
    }

    pub fn contains(&self, id: KeywordId) -> bool {
        let (word, bit) = Self::slot(id);
        self.0[word] & bit != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|w| *w == 0)
    }

    fn slot(id: KeywordId) -> (usize, u64) {
        let index = id as usize;
        (index / 64, 1u64 << (index % 64))
    }
}

/// Where a `PREPARE` statement takes its SQL text from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareSource {
    Literal(String),
    Variable(String),
    /// Anything else (concatenations, function calls): the text is not known statically.
    Other,
}

/// Observer of string assignments, `PREPARE` and `DECLARE` statements.
pub trait PrepareBinder {
    /// `LET variable = "text"`.
    fn string_assigned(&self, variable: &str, text: &str);
    /// `PREPARE statement FROM source`; `node` is the `PREPARE` statement.
    fn prepared(&self, statement: &str, source: &PrepareSource, node: NodeId);
    /// `DECLARE cursor CURSOR FOR statement`; `node` is the `DECLARE` statement.
    fn cursor_declared(&self, cursor: &str, statement: &str, node: NodeId);
}

/// Checks the value count of each `RETURN` inside a routine.
pub trait ReturnBinder {
    fn check_return(&self, count: usize, span: Span) -> Option<Diagnostic>;
}

/// Receives variables whose scope is limited to the enclosing dialog.
pub trait ScopedVariableRegistrar {
    fn register(&self, name: &Name);
}

/// Context threaded through statement parsing.
#[derive(Clone, Copy)]
pub struct ParseContext<'c> {
    pub prepare_binders: &'c [&'c dyn PrepareBinder],
    pub return_binder: Option<&'c dyn ReturnBinder>,
    pub scoped_registrar: Option<&'c dyn ScopedVariableRegistrar>,
    /// Valid `EXIT`/`CONTINUE` targets at this point.
    pub exit_keywords: KeywordSet,
    /// Keywords that close an enclosing block (`END x`).
    pub end_keywords: KeywordSet,
    /// Clause keywords of enclosing constructs (`ELSE`, `WHEN`, `ON`, ...) that end a body.
    pub clause_keywords: KeywordSet,
}

impl<'c> ParseContext<'c> {
    pub fn new(prepare_binders: &'c [&'c dyn PrepareBinder]) -> Self {
        Self {
            prepare_binders,
            return_binder: None,
            scoped_registrar: None,
            exit_keywords: KeywordSet::of(&[KeywordId::Program]),
            end_keywords: KeywordSet::EMPTY,
            clause_keywords: KeywordSet::EMPTY,
        }
    }

    /// Context for the body of a block closed by `END own`.
    fn block(&self, own: KeywordId) -> Self {
        let mut ctx = *self;
        ctx.end_keywords.insert(own);
        ctx
    }

    /// Context for the body of a loop or dialog that `EXIT own` / `CONTINUE own` may leave.
    fn exitable(&self, own: KeywordId) -> Self {
        let mut ctx = self.block(own);
        ctx.exit_keywords.insert(own);
        ctx
    }

    fn with_clauses(&self, clauses: &[KeywordId]) -> Self {
        let mut ctx = *self;
        for &clause in clauses {
            ctx.clause_keywords.insert(clause);
        }
        ctx
    }

    fn with_return_binder<'l>(&self, binder: Option<&'l dyn ReturnBinder>) -> ParseContext<'l>
    where
        'c: 'l,
    {
        ParseContext {
            prepare_binders: self.prepare_binders,
            return_binder: binder,
            scoped_registrar: self.scoped_registrar,
            exit_keywords: self.exit_keywords,
            end_keywords: self.end_keywords,
            clause_keywords: self.clause_keywords,
        }
    }

    fn with_registrar<'l>(&self, registrar: &'l dyn ScopedVariableRegistrar) -> ParseContext<'l>
    where
        'c: 'l,
    {
        ParseContext {
            prepare_binders: self.prepare_binders,
            return_binder: self.return_binder,
            scoped_registrar: Some(registrar),
            exit_keywords: self.exit_keywords,
            end_keywords: self.end_keywords,
            clause_keywords: self.clause_keywords,
        }
    }
}

#[derive(Debug, Default)]
struct PrepareState {
    /// Last string literal assigned to each variable (lower-case name).
    strings: HashMap<String, String>,
    prepares: Vec<(String, PrepareSource, NodeId)>,
    cursors: Vec<(String, NodeId)>,
}

/// Connects `PREPARE` and `DECLARE` statements to SQL text known within one routine.
///
/// Assignments count whether they appear before or after the `PREPARE`, since loops make source order a poor
/// guide to execution order.
#[derive(Debug, Default)]
pub struct PrepareTracker {
    state: RefCell<PrepareState>,
}

impl PrepareTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved SQL text for every prepared statement and cursor whose source is known.
    pub fn resolve(&self) -> Vec<(NodeId, BoundSql)> {
        let state = self.state.borrow();
        let mut bound = Vec::new();
        let mut by_statement: HashMap<&str, &str> = HashMap::new();
        for (statement, source, node) in &state.prepares {
            let text = match source {
                PrepareSource::Literal(text) => Some(text.as_str()),
                PrepareSource::Variable(variable) => state.strings.get(variable).map(String::as_str),
                PrepareSource::Other => None,
            };
            if let Some(text) = text {
                by_statement.insert(statement.as_str(), text);
                bound.push((
                    *node,
                    BoundSql {
                        statement: statement.clone(),
                        text: text.to_string(),
                    },
                ));
            }
        }
        for (statement, node) in &state.cursors {
            if let Some(text) = by_statement.get(statement.as_str()) {
                bound.push((
                    *node,
                    BoundSql {
                        statement: statement.clone(),
                        text: text.to_string(),
                    },
                ));
            }
        }
        bound
    }
}

impl PrepareBinder for PrepareTracker {
    fn string_assigned(&self, variable: &str, text: &str) {
        self.state
            .borrow_mut()
            .strings
            .insert(variable.to_ascii_lowercase(), text.to_string());
    }

    fn prepared(&self, statement: &str, source: &PrepareSource, node: NodeId) {
        let source = match source {
            PrepareSource::Variable(v) => PrepareSource::Variable(v.to_ascii_lowercase()),
            other => other.clone(),
        };
        self.state
            .borrow_mut()
            .prepares
            .push((statement.to_ascii_lowercase(), source, node));
    }

    fn cursor_declared(&self, _cursor: &str, statement: &str, node: NodeId) {
        self.state
            .borrow_mut()
            .cursors
            .push((statement.to_ascii_lowercase(), node));
    }
}

/// Checks `RETURN` value counts against a routine's declared result count.
#[derive(Debug, Clone)]
pub struct ReturnArity {
    pub routine: String,
    pub expected: usize,
}

impl ReturnBinder for ReturnArity {
    fn check_return(&self, count: usize, span: Span) -> Option<Diagnostic> {
        if count == self.expected {
            return None;
        }
        let values = |n: usize| if n == 1 { "1 value".to_string() } else { format!("{n} values") };
        Some(
            Diagnostic::error(
                format!(
                    "{} returns {}, but this RETURN has {}",
                    self.routine,
                    values(self.expected),
                    values(count)
                ),
                span,
                ErrorCode::ReturnArity,
            )
            .with_note("the count comes from the RETURNS clause"),
        )
    }
}

/// Collects the variables declared inside one dialog.
#[derive(Debug, Default)]
pub struct ScopeCollector {
    names: RefCell<Vec<Name>>,
}

impl ScopeCollector {
    pub fn into_names(self) -> Vec<Name> {
        self.names.into_inner()
    }
}

impl ScopedVariableRegistrar for ScopeCollector {
    fn register(&self, name: &Name) {
        self.names.borrow_mut().push(name.clone());
    }
}
