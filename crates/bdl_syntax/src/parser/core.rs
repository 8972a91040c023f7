/// Parser core types and entrypoint.
///
/// This chunk defines [`ParseOptions`], the [`Parser`] type and its top-level `parse()` entrypoint. It also owns
/// the token buffer: the tokenizer is pulled lazily and only significant tokens are kept, each remembering
/// whether a line break came before it.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a single module.
/// - Error tokens never reach the grammar. They are turned into diagnostics when pulled, so rewinding a
///   speculative parse cannot report them twice.

/// Tokens kept buffered past the cursor; `peek_at(n)` is valid for `n <= LOOKAHEAD`.
const LOOKAHEAD: usize = 4;

/// Deepest nesting of statements, types and expressions the parser descends into.
const MAX_NESTING: usize = 100;

/// Options for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Constructs introduced after this version are not attempted.
    pub language_version: LanguageVersion,
    /// Location of the first byte of the input (for embedded or partial sources).
    pub start: SourceLocation,
    pub tokenizer: TokenizerOptions,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            language_version: LanguageVersion::LATEST,
            start: SourceLocation::START,
            tokenizer: TokenizerOptions::default(),
        }
    }
}

impl ParseOptions {
    pub fn with_language_version(mut self, version: LanguageVersion) -> Self {
        self.language_version = version;
        self
    }

    pub fn with_start(mut self, start: SourceLocation) -> Self {
        self.start = start;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerOptions) -> Self {
        self.tokenizer = tokenizer;
        self
    }
}

/// A significant token and whether a line break preceded it.
#[derive(Debug, Clone)]
struct Buffered {
    token: Token,
    line_break_before: bool,
}

/// Saved position for speculative parsing.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    diagnostics: usize,
    nodes: usize,
}

/// Parser state.
///
/// ## Notes
/// - Single pass, recursive descent; expressions use precedence climbing.
/// - Recovery happens at block boundaries (`END x`, clause keywords, module items) and at statement starts.
pub struct Parser<'p, R> {
    tokenizer: Tokenizer<R>,
    buffer: Vec<Buffered>,
    pos: usize,
    pending_line_break: bool,
    builder: TreeBuilder,
    /// Syntax diagnostics; truncated on rewind.
    diagnostics: Vec<Diagnostic>,
    /// Diagnostics from error tokens; never rewound.
    lexical: Vec<Diagnostic>,
    options: ParseOptions,
    prepare_binders: Vec<&'p dyn PrepareBinder>,
    depth: usize,
}

impl<'p, R: Read> Parser<'p, R> {
    pub fn new(reader: R, options: ParseOptions) -> Self {
        let tokenizer = Tokenizer::starting_at(reader, options.tokenizer, options.start);
        let mut parser = Self {
            tokenizer,
            buffer: Vec::new(),
            pos: 0,
            pending_line_break: true,
            builder: TreeBuilder::new(),
            diagnostics: Vec::new(),
            lexical: Vec::new(),
            options,
            prepare_binders: Vec::new(),
            depth: 0,
        };
        parser.fill_to(LOOKAHEAD);
        parser
    }

    /// Add an observer for string assignments, `PREPARE` and `DECLARE` statements.
    ///
    /// The parser always runs its own binder, which attaches [`BoundSql`] to prepared statements and cursors
    /// whose SQL text is known within the same routine.
    pub fn with_prepare_binder(mut self, binder: &'p dyn PrepareBinder) -> Self {
        self.prepare_binders.push(binder);
        self
    }

    /// Parse the whole input into a [`SyntaxTree`], reporting every diagnostic to `sink`.
    ///
    /// Diagnostics are reported in source order once parsing is finished.
    pub fn parse(mut self, sink: &mut dyn DiagnosticSink) -> SyntaxTree {
        let root = self.module();

        let Parser {
            mut tokenizer,
            builder,
            diagnostics,
            lexical,
            ..
        } = self;

        let mut all = lexical;
        all.extend(tokenizer.take_diagnostics());
        all.extend(diagnostics);
        all.sort_by_key(|d| d.span.start);

        if let Some(err) = tokenizer.take_io_error() {
            tracing::warn!(error = %err, "input ended early");
        }

        let lines = tokenizer.into_line_table();
        debug!(nodes = builder.len(), diagnostics = all.len(), "parse finished");
        for diagnostic in all {
            sink.report_diagnostic(diagnostic, &lines);
        }
        builder.finish(root, lines)
    }

    // ========================================================================
    // Token buffer
    // ========================================================================

    fn fill_to(&mut self, index: usize) {
        while self.buffer.len() <= index {
            if self.buffer.last().is_some_and(|b| b.token.is_eof()) {
                return;
            }
            self.pull();
        }
    }

    /// Pull the next significant token from the tokenizer into the buffer.
    fn pull(&mut self) {
        loop {
            let token = self.tokenizer.next_token();
            match &token.kind {
                TokenKind::Newline => self.pending_line_break = true,
                TokenKind::Indent | TokenKind::Dedent | TokenKind::Comment | TokenKind::Whitespace => {}
                TokenKind::Error(kind) => {
                    trace!(?kind, start = token.span.start, "error token");
                    self.lexical.push(kind.to_diagnostic(token.span));
                }
                _ => {
                    let line_break_before = std::mem::take(&mut self.pending_line_break);
                    self.buffer.push(Buffered {
                        token,
                        line_break_before,
                    });
                    return;
                }
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            diagnostics: self.diagnostics.len(),
            nodes: self.builder.len(),
        }
    }

    /// Enter one level of nesting. At the limit this reports and returns `false`; the caller then gives up on
    /// the construct without calling [`Self::leave`].
    fn enter(&mut self) -> bool {
        if self.depth >= MAX_NESTING {
            let span = self.current_span();
            self.error(
                Diagnostic::error("constructs nested too deeply", span, ErrorCode::UnexpectedToken)
                    .with_note(format!("nesting is limited to {MAX_NESTING} levels")),
            );
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Abandon everything parsed since `checkpoint`: position, diagnostics and nodes.
    fn rewind(&mut self, checkpoint: Checkpoint) {
        trace!(from = self.pos, to = checkpoint.pos, "rewind");
        self.pos = checkpoint.pos;
        self.diagnostics.truncate(checkpoint.diagnostics);
        self.builder.truncate(checkpoint.nodes);
    }
}
