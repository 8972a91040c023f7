//! `CheckForErrors`: the whole-program pass that runs after every file is parsed.
//!
//! Syntax diagnostics come from the parser. This pass adds the problems that need more than one statement of
//! context: unresolved includes and type names, duplicate declarations, untyped record members, unknown
//! tables and columns (when a schema is available), ambiguous sibling definitions and unknown functions.

use std::sync::Arc;

use bdl_core::lang::keywords::{self, KeywordCategory};
use bdl_syntax::ast::queries;
use bdl_syntax::ast::{MimicTarget, NodeId, NodeKind};
use bdl_syntax::diagnostics::{errors, CollectingSink, Diagnostic, DiagnosticSink, ErrorCode, LocatedDiagnostic};
use rayon::prelude::*;

use super::program::{Program, ProgramError, SourceFile};
use super::providers::SearchMode;
use super::resolver::{FunctionTarget, Origin, Resolution, ResolvedType, Resolver};
use super::symbols::Namespace;

/// Options of the check pass.
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    /// How far function calls are looked up. With [`SearchMode::None`] unknown calls are not reported.
    pub function_search: SearchMode,
    /// Warn when several sibling modules export the name a reference resolves to.
    pub warn_on_ambiguity: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            function_search: SearchMode::Program,
            warn_on_ambiguity: true,
        }
    }
}

impl CheckOptions {
    pub fn with_function_search(mut self, mode: SearchMode) -> Self {
        self.function_search = mode;
        self
    }

    pub fn with_ambiguity_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_ambiguity = enabled;
        self
    }
}

/// Every diagnostic of one file: syntax first-pass results plus this pass, in source order.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file: Arc<SourceFile>,
    pub diagnostics: Vec<LocatedDiagnostic>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.diagnostic.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

pub struct CheckForErrors<'p> {
    program: &'p Program,
    resolver: Resolver<'p>,
    options: CheckOptions,
}

impl<'p> CheckForErrors<'p> {
    pub fn new(program: &'p Program, options: CheckOptions) -> Self {
        Self {
            program,
            resolver: Resolver::new(program),
            options,
        }
    }

    /// Check every published file in parallel.
    ///
    /// ## Errors
    /// - [`ProgramError::Cancelled`] when the program's cancellation flag is raised between files.
    #[tracing::instrument(skip_all, fields(files = self.program.len()))]
    pub fn check_program(&self) -> Result<Vec<FileReport>, ProgramError> {
        let cancel = self.program.cancellation();
        self.program
            .files()
            .par_iter()
            .map(|file| {
                cancel.check()?;
                let mut sink = CollectingSink::new();
                self.check_file(file, &mut sink);
                let mut diagnostics = file.diagnostics.clone();
                diagnostics.extend(sink.into_diagnostics());
                diagnostics.sort_by_key(|d| d.diagnostic.span.start);
                Ok(FileReport {
                    file: Arc::clone(file),
                    diagnostics,
                })
            })
            .collect()
    }

    /// Report the semantic problems of `file` to `sink`, in source order.
    #[tracing::instrument(skip_all, fields(path = %file.path.display()))]
    pub fn check_file(&self, file: &Arc<SourceFile>, sink: &mut dyn DiagnosticSink) {
        let mut found = Vec::new();
        self.check_includes(file, &mut found);
        self.check_duplicates(file, &mut found);
        for id in queries::descendants(&file.tree, file.tree.root()) {
            match file.tree.kind(id) {
                NodeKind::TypeReference(_) => self.check_type_reference(file, id, &mut found),
                NodeKind::RecordDefinition(record) => {
                    if let Some(mimic) = &record.mimic {
                        self.check_mimic(mimic, &mut found);
                    } else if file.tree.node(id).is_complete {
                        for member in record.members.iter().filter(|m| m.type_ref.is_none()) {
                            found.push(
                                Diagnostic::error(
                                    format!("record member '{}' has no type", member.name.node),
                                    member.name.span,
                                    ErrorCode::UntypedMember,
                                )
                                .with_hint(format!("declare it as `{} <type>`", member.name.node)),
                            );
                        }
                    }
                }
                NodeKind::CallExpr(call) => self.check_call(file, call.callee, &mut found),
                _ => {}
            }
        }
        found.sort_by_key(|d| d.span.start);
        tracing::debug!(count = found.len(), "semantic diagnostics");
        for diagnostic in found {
            sink.report_diagnostic(diagnostic, file.tree.line_table());
        }
    }

    fn check_includes(&self, file: &SourceFile, found: &mut Vec<Diagnostic>) {
        for (_, target) in file.includes() {
            if self.program.resolve_include(file, &target.node).is_none() {
                found.push(Diagnostic::error(
                    format!("cannot find included file '{}'", target.node),
                    target.span,
                    ErrorCode::UnresolvedInclude,
                ));
            }
        }
    }

    fn check_duplicates(&self, file: &SourceFile, found: &mut Vec<Diagnostic>) {
        for (first, duplicate) in file.symbols.duplicates() {
            let (line, _) = file.location_of(first.name.span.start);
            found.push(
                errors::duplicate_declaration(&duplicate.name.node, duplicate.name.span).with_hint(format!(
                    "'{}' was first declared as a {} on line {line}",
                    first.name.node,
                    first.kind.describe()
                )),
            );
        }
    }

    fn check_type_reference(&self, file: &Arc<SourceFile>, id: NodeId, found: &mut Vec<Diagnostic>) {
        let NodeKind::TypeReference(type_ref) = file.tree.kind(id) else { return };
        if let Some(mimic) = &type_ref.mimic {
            self.check_mimic(mimic, found);
            return;
        }
        if type_ref.is_composite() || type_ref.base.is_some() {
            return;
        }
        let Some(name) = &type_ref.name else { return };
        if let ResolvedType::Unresolved(_) = self.resolver.resolve_type(file, id) {
            found.push(errors::unresolved_type(&name.node, name.span));
            return;
        }
        if let Some(resolution) = self.resolver.resolve_at(file, id, Namespace::Type, &name.node) {
            self.check_ambiguity(&resolution, name.span, found);
        }
    }

    fn check_mimic(&self, mimic: &MimicTarget, found: &mut Vec<Diagnostic>) {
        let Some(schema) = self.program.schema() else { return };
        let database = mimic.database.as_ref().map(|d| d.node.as_str());
        let Some(columns) = schema.table_columns(database, &mimic.table.node) else {
            found.push(Diagnostic::error(
                format!("unknown table '{}'", mimic.table.node),
                mimic.table.span,
                ErrorCode::UnknownTable,
            ));
            return;
        };
        if !mimic.is_whole_table() && !columns.iter().any(|c| mimic.column.is(&c.name)) {
            found.push(Diagnostic::error(
                format!("table '{}' has no column '{}'", mimic.table.node, mimic.column.node),
                mimic.column.span,
                ErrorCode::UnknownColumn,
            ));
        }
    }

    fn check_call(&self, file: &Arc<SourceFile>, callee: NodeId, found: &mut Vec<Diagnostic>) {
        let mode = self.options.function_search;
        if mode == SearchMode::None {
            return;
        }
        // Method calls (`sb.append()`) are not function lookups.
        let NodeKind::Variable(variable) = file.tree.kind(callee) else { return };
        let name = &variable.name;
        if keywords::from_str(&name.node).is_some_and(|k| keywords::category(k) == KeywordCategory::Report) {
            return;
        }
        // A variable of function type.
        if self.resolver.resolve_at(file, callee, Namespace::Value, &name.node).is_some() {
            return;
        }
        match self.resolver.resolve_function(file, &name.node, mode) {
            Some(FunctionTarget::Defined(resolution)) => self.check_ambiguity(&resolution, name.span, found),
            Some(_) => {}
            None => found.push(
                Diagnostic::warning(format!("unknown function '{}'", name.node), name.span, ErrorCode::UnknownFunction)
                    .with_hint(format!("no module of the program defines '{}' (search mode: {mode})", name.node)),
            ),
        }
    }

    fn check_ambiguity(&self, resolution: &Resolution, span: bdl_syntax::ast::Span, found: &mut Vec<Diagnostic>) {
        if !self.options.warn_on_ambiguity || resolution.origin != Origin::Sibling || resolution.ambiguous.is_empty() {
            return;
        }
        let chosen = &resolution.definition;
        let mut diagnostic = Diagnostic::warning(
            format!(
                "'{}' is defined in several modules; using {}",
                chosen.symbol.name.node,
                chosen.file.display_name()
            ),
            span,
            ErrorCode::AmbiguousDefinition,
        );
        for other in &resolution.ambiguous {
            let (line, _) = other.location();
            diagnostic = diagnostic.with_hint(format!("also defined in {} on line {line}", other.file.display_name()));
        }
        found.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::providers::StaticSchema;

    fn check(program: &Program, path: &str, options: CheckOptions) -> Vec<LocatedDiagnostic> {
        let id = program.file_id(std::path::Path::new(path)).unwrap();
        let file = program.file(id).unwrap();
        let mut sink = CollectingSink::new();
        CheckForErrors::new(program, options).check_file(&file, &mut sink);
        sink.into_diagnostics()
    }

    fn codes(diagnostics: &[LocatedDiagnostic]) -> Vec<ErrorCode> {
        diagnostics.iter().map(|d| d.diagnostic.code).collect()
    }

    #[test]
    fn test_duplicate_declaration_points_at_first() {
        let program = Program::default();
        program.add_source("main.4gl", "DEFINE x INTEGER\nDEFINE X STRING\n");
        let diagnostics = check(&program, "main.4gl", CheckOptions::default());
        assert_eq!(codes(&diagnostics), vec![ErrorCode::DuplicateDeclaration]);
        assert_eq!(diagnostics[0].line, 2);
        assert!(diagnostics[0].diagnostic.hints[0].contains("line 1"));
    }

    #[test]
    fn test_unresolved_type_and_sibling_definition() {
        let program = Program::default();
        program.add_source("main.4gl", "DEFINE c customer_t\nDEFINE o order_t\n");
        program.add_source("types.4gl", "PUBLIC TYPE customer_t RECORD id INTEGER END RECORD\n");
        let diagnostics = check(&program, "main.4gl", CheckOptions::default());
        assert_eq!(codes(&diagnostics), vec![ErrorCode::UnresolvedType]);
        assert!(diagnostics[0].diagnostic.message.contains("order_t"));
    }

    #[test]
    fn test_ambiguous_sibling_definitions_warn() {
        let program = Program::default();
        program.add_source("main.4gl", "DEFINE c customer_t\n");
        program.add_source("a.4gl", "PUBLIC TYPE customer_t INTEGER\n");
        program.add_source("b.4gl", "PUBLIC TYPE customer_t STRING\n");
        let diagnostics = check(&program, "main.4gl", CheckOptions::default());
        assert_eq!(codes(&diagnostics), vec![ErrorCode::AmbiguousDefinition]);
        assert!(!diagnostics[0].diagnostic.is_error());
        assert!(diagnostics[0].diagnostic.message.contains("a.4gl"));

        let quiet = check(&program, "main.4gl", CheckOptions::default().with_ambiguity_warnings(false));
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_untyped_member_only_in_complete_record() {
        let program = Program::default();
        program.add_source("main.4gl", "DEFINE r RECORD a INTEGER, b END RECORD\n");
        let diagnostics = check(&program, "main.4gl", CheckOptions::default());
        assert_eq!(codes(&diagnostics), vec![ErrorCode::UntypedMember]);

        program.add_source("broken.4gl", "DEFINE r RECORD a INTEGER, b END\n");
        assert!(check(&program, "broken.4gl", CheckOptions::default()).is_empty());
    }

    #[test]
    fn test_schema_checks() {
        let schema = StaticSchema::new(None).with_table("customer", &[("id", "INTEGER")]);
        let program = Program::default().with_schema(Arc::new(schema));
        program.add_source(
            "main.4gl",
            "DEFINE a LIKE customer.id\nDEFINE b LIKE customer.zip\nDEFINE c RECORD LIKE orders.*\n",
        );
        let diagnostics = check(&program, "main.4gl", CheckOptions::default());
        assert_eq!(codes(&diagnostics), vec![ErrorCode::UnknownColumn, ErrorCode::UnknownTable]);
    }

    #[test]
    fn test_unknown_function_respects_search_mode() {
        let program = Program::default();
        program.add_source(
            "main.4gl",
            "MAIN\n  CALL helper()\n  CALL missing()\n  DISPLAY length(\"x\")\nEND MAIN\n",
        );
        program.add_source("util.4gl", "FUNCTION helper()\nEND FUNCTION\n");

        let diagnostics = check(&program, "main.4gl", CheckOptions::default());
        assert_eq!(codes(&diagnostics), vec![ErrorCode::UnknownFunction]);
        assert!(diagnostics[0].diagnostic.message.contains("missing"));

        let none = check(&program, "main.4gl", CheckOptions::default().with_function_search(SearchMode::None));
        assert!(none.is_empty());
    }

    #[test]
    fn test_missing_include() {
        let program = Program::default();
        program.add_source("main.4gl", "GLOBALS \"nowhere.4gl\"\nMAIN\nEND MAIN\n");
        let diagnostics = check(&program, "main.4gl", CheckOptions::default());
        assert_eq!(codes(&diagnostics), vec![ErrorCode::UnresolvedInclude]);
    }

    #[test]
    fn test_check_program_merges_syntax_diagnostics() {
        let program = Program::default();
        program.add_source("main.4gl", "DEFINE c unknown_t\nMAIN\n  LET = 1\nEND MAIN\n");
        let reports = CheckForErrors::new(&program, CheckOptions::default()).check_program().unwrap();
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert!(report.has_errors());
        assert_eq!(report.diagnostics[0].diagnostic.code, ErrorCode::UnresolvedType);
        assert!(report.diagnostics.len() >= 2);
        assert!(report.diagnostics.windows(2).all(|w| w[0].diagnostic.span.start <= w[1].diagnostic.span.start));
    }
}
