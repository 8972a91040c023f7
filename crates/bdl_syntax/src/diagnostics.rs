//! Diagnostics for the BDL front end.
//!
//! Nothing in the front end aborts on malformed input. Lexical problems become error tokens, syntax and
//! semantic problems become [`Diagnostic`]s handed to a [`DiagnosticSink`], and processing continues.
//!
//! ## Notes
//! - Every diagnostic carries a stable [`ErrorCode`] (`BDL0001` ...), so tooling can filter or suppress by code.
//! - The sink receives the [`LineOffsetTable`] known at report time, which is enough to resolve the reported
//!   span to a line and column even while the input is still being read.

use std::fmt;

use crate::ast::Span;
use crate::source::LineOffsetTable;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexical
    BadCharacter,
    IncompleteString,
    IncompleteComment,
    BadNumber,
    InconsistentIndentation,
    // Syntax
    ExpectedToken,
    UnexpectedToken,
    MissingEnd,
    InvalidTypeConstraint,
    MimicMisuse,
    UnsupportedConstruct,
    ReturnArity,
    MissingType,
    ExpectedExpression,
    InvalidExitTarget,
    StatementOutsideFunction,
    // Semantic
    UnresolvedType,
    DuplicateDeclaration,
    UntypedMember,
    UnknownColumn,
    UnknownTable,
    AmbiguousDefinition,
    UnknownFunction,
    UnresolvedInclude,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadCharacter => "BDL0001",
            ErrorCode::IncompleteString => "BDL0002",
            ErrorCode::IncompleteComment => "BDL0003",
            ErrorCode::BadNumber => "BDL0004",
            ErrorCode::InconsistentIndentation => "BDL0005",
            ErrorCode::ExpectedToken => "BDL0100",
            ErrorCode::UnexpectedToken => "BDL0101",
            ErrorCode::MissingEnd => "BDL0102",
            ErrorCode::InvalidTypeConstraint => "BDL0103",
            ErrorCode::MimicMisuse => "BDL0104",
            ErrorCode::UnsupportedConstruct => "BDL0105",
            ErrorCode::ReturnArity => "BDL0106",
            ErrorCode::MissingType => "BDL0107",
            ErrorCode::ExpectedExpression => "BDL0108",
            ErrorCode::InvalidExitTarget => "BDL0109",
            ErrorCode::StatementOutsideFunction => "BDL0110",
            ErrorCode::UnresolvedType => "BDL0200",
            ErrorCode::DuplicateDeclaration => "BDL0201",
            ErrorCode::UntypedMember => "BDL0202",
            ErrorCode::UnknownColumn => "BDL0203",
            ErrorCode::UnknownTable => "BDL0204",
            ErrorCode::AmbiguousDefinition => "BDL0205",
            ErrorCode::UnknownFunction => "BDL0206",
            ErrorCode::UnresolvedInclude => "BDL0207",
        }
    }

    /// Lexical codes come from error tokens rather than from the parser.
    pub fn is_lexical(self) -> bool {
        matches!(
            self,
            ErrorCode::BadCharacter
                | ErrorCode::IncompleteString
                | ErrorCode::IncompleteComment
                | ErrorCode::BadNumber
                | ErrorCode::InconsistentIndentation
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem found in the input, with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub code: ErrorCode,
    pub severity: Severity,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span, code: ErrorCode, severity: Severity) -> Self {
        Self {
            message: message.into(),
            span,
            code,
            severity,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, span: Span, code: ErrorCode) -> Self {
        Self::new(message, span, code, Severity::Error)
    }

    pub fn warning(message: impl Into<String>, span: Span, code: ErrorCode) -> Self {
        Self::new(message, span, code, Severity::Warning)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

/// Append-only receiver of diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, message: String, lines: &LineOffsetTable, span: Span, code: ErrorCode, severity: Severity);

    /// Report a fully built diagnostic. Sinks that keep notes and hints override this.
    fn report_diagnostic(&mut self, diagnostic: Diagnostic, lines: &LineOffsetTable) {
        self.report(diagnostic.message, lines, diagnostic.span, diagnostic.code, diagnostic.severity);
    }
}

/// A diagnostic together with its resolved 1-based start position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedDiagnostic {
    pub diagnostic: Diagnostic,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for LocatedDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.diagnostic)
    }
}

/// Sink that keeps everything it receives, in report order.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    diagnostics: Vec<LocatedDiagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[LocatedDiagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<LocatedDiagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.diagnostic.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &LocatedDiagnostic> {
        self.diagnostics.iter().filter(|d| d.diagnostic.is_error())
    }

    pub fn with_code(&self, code: ErrorCode) -> impl Iterator<Item = &LocatedDiagnostic> {
        self.diagnostics.iter().filter(move |d| d.diagnostic.code == code)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, message: String, lines: &LineOffsetTable, span: Span, code: ErrorCode, severity: Severity) {
        self.report_diagnostic(Diagnostic::new(message, span, code, severity), lines);
    }

    fn report_diagnostic(&mut self, diagnostic: Diagnostic, lines: &LineOffsetTable) {
        let (line, column) = lines.location_of(diagnostic.span.start);
        self.diagnostics.push(LocatedDiagnostic {
            diagnostic,
            line,
            column,
        });
    }
}

/// Sink that drops everything. Handy for callers that only want the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _: String, _: &LineOffsetTable, _: Span, _: ErrorCode, _: Severity) {}
}

/// A diagnostic bound to its source text, renderable by `miette`'s graphical handler.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SourceDiagnostic {
    pub message: String,
    pub code: String,
    pub severity: miette::Severity,
    pub src: miette::NamedSource<String>,
    pub span: miette::SourceSpan,
    pub label: String,
    pub help: Option<String>,
}

impl miette::Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help.as_ref().map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(miette::LabeledSpan::new_with_span(
            Some(self.label.clone()),
            self.span,
        ))))
    }
}

impl SourceDiagnostic {
    pub fn new(diagnostic: &Diagnostic, name: &str, source: &str) -> Self {
        let severity = match diagnostic.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        };
        let label = diagnostic.notes.first().cloned().unwrap_or_else(|| match diagnostic.severity {
            Severity::Error => "error here".to_string(),
            Severity::Warning => "warning here".to_string(),
            Severity::Info => "here".to_string(),
        });
        let help = (!diagnostic.hints.is_empty()).then(|| diagnostic.hints.join("\n"));
        let start = diagnostic.span.start.min(source.len());
        let end = diagnostic.span.end.clamp(start, source.len());
        Self {
            message: diagnostic.message.clone(),
            code: diagnostic.code.to_string(),
            severity,
            src: miette::NamedSource::new(name, source.to_string()),
            span: (start, end - start).into(),
            label,
            help,
        }
    }
}

/// Common diagnostics with consistent wording.
pub mod errors {
    use super::*;

    pub fn expected(what: &str, found: &str, span: Span) -> Diagnostic {
        Diagnostic::error(format!("expected {what}, found {found}"), span, ErrorCode::ExpectedToken)
    }

    pub fn unexpected(found: &str, span: Span) -> Diagnostic {
        Diagnostic::error(format!("unexpected {found}"), span, ErrorCode::UnexpectedToken)
    }

    pub fn missing_end(block: &str, span: Span) -> Diagnostic {
        Diagnostic::error(format!("missing END {block}"), span, ErrorCode::MissingEnd)
            .with_hint(format!("close the block with `END {block}`"))
    }

    pub fn missing_end_keyword(block: &str, found: &str, span: Span) -> Diagnostic {
        Diagnostic::error(
            format!("expected {block} after END, found {found}"),
            span,
            ErrorCode::MissingEnd,
        )
    }

    pub fn expected_expression(found: &str, span: Span) -> Diagnostic {
        Diagnostic::error(
            format!("expected an expression, found {found}"),
            span,
            ErrorCode::ExpectedExpression,
        )
    }

    pub fn missing_type(name: &str, span: Span) -> Diagnostic {
        Diagnostic::error(format!("missing type for '{name}'"), span, ErrorCode::MissingType)
    }

    pub fn unsupported(construct: &str, since: bdl_core::LanguageVersion, span: Span) -> Diagnostic {
        Diagnostic::error(
            format!("{construct} requires language version {since} or later"),
            span,
            ErrorCode::UnsupportedConstruct,
        )
    }

    pub fn unresolved_type(name: &str, span: Span) -> Diagnostic {
        Diagnostic::error(format!("unknown type '{name}'"), span, ErrorCode::UnresolvedType)
            .with_hint("define it with TYPE, import its module, or check the spelling")
    }

    pub fn duplicate_declaration(name: &str, span: Span) -> Diagnostic {
        Diagnostic::error(
            format!("'{name}' is already declared in this scope"),
            span,
            ErrorCode::DuplicateDeclaration,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_resolves_positions() {
        let lines = LineOffsetTable::from_source("MAIN\n  LET x = \nEND MAIN\n");
        let mut sink = CollectingSink::new();
        sink.report(
            "expected an expression".to_string(),
            &lines,
            Span::new(15, 15),
            ErrorCode::ExpectedExpression,
            Severity::Error,
        );
        let reported = &sink.diagnostics()[0];
        assert_eq!((reported.line, reported.column), (2, 11));
        assert!(sink.has_errors());
    }

    #[test]
    fn test_default_report_diagnostic_forwards_to_report() {
        struct Counting(usize);
        impl DiagnosticSink for Counting {
            fn report(&mut self, _: String, _: &LineOffsetTable, _: Span, _: ErrorCode, _: Severity) {
                self.0 += 1;
            }
        }
        let mut sink = Counting(0);
        sink.report_diagnostic(
            errors::unexpected("ELSE", Span::new(0, 4)),
            &LineOffsetTable::default(),
        );
        assert_eq!(sink.0, 1);
    }

    #[test]
    fn test_source_diagnostic_clamps_span() {
        let diagnostic = errors::missing_end("IF", Span::new(8, 40));
        let rendered = SourceDiagnostic::new(&diagnostic, "main.4gl", "IF x THEN");
        assert_eq!(rendered.span.offset(), 8);
        assert_eq!(rendered.span.len(), 1);
        assert_eq!(rendered.code, "BDL0102");
        assert!(rendered.help.is_some());
    }

    #[test]
    fn test_codes_are_unique() {
        use std::collections::HashSet;
        let all = [
            ErrorCode::BadCharacter,
            ErrorCode::IncompleteString,
            ErrorCode::IncompleteComment,
            ErrorCode::BadNumber,
            ErrorCode::InconsistentIndentation,
            ErrorCode::ExpectedToken,
            ErrorCode::UnexpectedToken,
            ErrorCode::MissingEnd,
            ErrorCode::InvalidTypeConstraint,
            ErrorCode::MimicMisuse,
            ErrorCode::UnsupportedConstruct,
            ErrorCode::ReturnArity,
            ErrorCode::MissingType,
            ErrorCode::ExpectedExpression,
            ErrorCode::InvalidExitTarget,
            ErrorCode::StatementOutsideFunction,
            ErrorCode::UnresolvedType,
            ErrorCode::DuplicateDeclaration,
            ErrorCode::UntypedMember,
            ErrorCode::UnknownColumn,
            ErrorCode::UnknownTable,
            ErrorCode::AmbiguousDefinition,
            ErrorCode::UnknownFunction,
            ErrorCode::UnresolvedInclude,
        ];
        let codes: HashSet<_> = all.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes.len(), all.len());
    }
}
