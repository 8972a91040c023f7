//! Name and type-reference resolution across the files of a [`Program`].
//!
//! A name is looked up, stopping at the first match, in:
//! 1. the scopes enclosing the use (dialog, routine, module including `GLOBALS` blocks),
//! 2. files the current file includes (`&include`, `GLOBALS "file"`), transitively,
//! 3. the other modules of the program (exported names only),
//! 4. referenced projects (exported names only),
//! 5. for type names, the builtin package types.
//!
//! When more than one sibling module exports the name, the first in file order wins and the others are
//! recorded as ambiguous. Results are memoized per `(file, scope, namespace, name)` until the program
//! publishes a new file.
//!
//! ## Examples
//!
//! ```rust
//! use bdl::frontend::program::Program;
//! use bdl::frontend::resolver::Resolver;
//!
//! let program = Program::default();
//! let id = program.add_source("main.4gl", "TYPE money_t DECIMAL(10,2)\nDEFINE total money_t\n");
//! let file = program.file(id).unwrap();
//! let resolver = Resolver::new(&program);
//! let symbol = file.symbols.module().lookup(bdl::frontend::symbols::Namespace::Value, "total").unwrap();
//! let ty = resolver.symbol_type(&file, symbol).unwrap();
//! assert_eq!(ty.expand().to_string(), "DECIMAL(10,2)");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bdl_core::lang::builtins::{self, BuiltinFnId};
use bdl_core::lang::packages::{self, PackageTypeId};
use bdl_core::lang::types::{self, BaseTypeId};
use bdl_syntax::ast::queries;
use bdl_syntax::ast::{ArrayKind, MimicTarget, NodeId, NodeKind, Span, SyntaxTree};
use dashmap::DashMap;

use super::program::{FileId, Program, SourceFile};
use super::providers::{FunctionSignature, SearchMode};
use super::symbols::{scope_at, Namespace, Symbol};

// ============================================================================
// Definitions
// ============================================================================

/// A symbol together with the file that declares it.
#[derive(Debug, Clone)]
pub struct Definition {
    pub file: Arc<SourceFile>,
    pub symbol: Symbol,
}

impl Definition {
    /// 1-based line and column of the declared name.
    pub fn location(&self) -> (u32, u32) {
        self.file.location_of(self.symbol.name.span.start)
    }

    pub fn span(&self) -> Span {
        self.symbol.name.span
    }
}

/// Which step of the lookup produced a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Scope,
    Include,
    Sibling,
    Project,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub definition: Definition,
    pub origin: Origin,
    /// Other sibling modules exporting the same name, in file order.
    pub ambiguous: Vec<Definition>,
}

impl Resolution {
    fn found(definition: Definition, origin: Origin) -> Self {
        Self {
            definition,
            origin,
            ambiguous: Vec::new(),
        }
    }
}

type CacheKey = (PathBuf, Option<NodeId>, Namespace, String);

/// Memoized lookups of one program. Cleared whenever a file is published.
#[derive(Debug, Default)]
pub(crate) struct ResolutionCache {
    entries: DashMap<CacheKey, Option<Resolution>>,
}

impl ResolutionCache {
    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    fn get(&self, key: &CacheKey) -> Option<Option<Resolution>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn insert(&self, key: CacheKey, value: Option<Resolution>) {
        self.entries.insert(key, value);
    }
}

// ============================================================================
// Resolved types
// ============================================================================

/// Members of a resolved record, in declaration (or schema) order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub members: Vec<(String, ResolvedType)>,
    /// `table.*` for `RECORD LIKE table.*`.
    pub mimic: Option<String>,
}

impl RecordType {
    pub fn member(&self, name: &str) -> Option<&ResolvedType> {
        self.members
            .iter()
            .find(|(member, _)| member.eq_ignore_ascii_case(name))
            .map(|(_, ty)| ty)
    }
}

/// What a type reference denotes once names, includes and the schema are taken into account.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Base {
        base: BaseTypeId,
        constraint: Option<String>,
    },
    Array {
        kind: ArrayKind,
        sizes: Vec<i64>,
        dimensions: u8,
        element: Box<ResolvedType>,
    },
    Record(RecordType),
    Dictionary(Box<ResolvedType>),
    Function {
        params: Vec<ResolvedType>,
        returns: Vec<ResolvedType>,
    },
    /// `LIKE [db:]table.column`; `column` is `None` when no schema knows the column.
    Mimic {
        target: String,
        column: Option<Box<ResolvedType>>,
    },
    Package(PackageTypeId),
    /// A user-defined type and what it stands for.
    Named {
        name: String,
        target: Box<ResolvedType>,
    },
    /// A named type whose definition refers back to itself.
    Recursive(String),
    Unresolved(String),
    Missing,
}

impl ResolvedType {
    /// Peel named types and known mimics down to the structural type.
    pub fn expand(&self) -> &ResolvedType {
        match self {
            ResolvedType::Named { target, .. } => target.expand(),
            ResolvedType::Mimic {
                column: Some(column), ..
            } => column.expand(),
            other => other,
        }
    }

    pub fn is_resolved(&self) -> bool {
        match self.expand() {
            ResolvedType::Unresolved(_) | ResolvedType::Missing => false,
            _ => true,
        }
    }

    /// Type of member `name` when this is a record.
    pub fn member(&self, name: &str) -> Option<&ResolvedType> {
        match self.expand() {
            ResolvedType::Record(record) => record.member(name),
            _ => None,
        }
    }

    /// Element type of an array, value type of a dictionary.
    pub fn element(&self) -> Option<&ResolvedType> {
        match self.expand() {
            ResolvedType::Array { element, .. } | ResolvedType::Dictionary(element) => Some(element),
            _ => None,
        }
    }

    /// Description for hovers: the type as written, then its expansion when it differs.
    pub fn describe(&self) -> String {
        let written = self.to_string();
        let expanded = self.expand().to_string();
        if written == expanded { written } else { format!("{written} = {expanded}") }
    }
}

fn join(types: &[ResolvedType]) -> String {
    types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Base { base, constraint } => {
                f.write_str(types::as_str(*base))?;
                match constraint {
                    Some(c) if c.starts_with('(') => f.write_str(c),
                    Some(c) => write!(f, " {c}"),
                    None => Ok(()),
                }
            }
            ResolvedType::Array {
                kind: ArrayKind::Static,
                sizes,
                element,
                ..
            } => {
                let sizes: Vec<String> = sizes.iter().map(ToString::to_string).collect();
                write!(f, "ARRAY[{}] OF {element}", sizes.join(","))
            }
            ResolvedType::Array {
                kind: ArrayKind::Dynamic,
                dimensions,
                element,
                ..
            } => {
                if *dimensions > 1 {
                    write!(f, "DYNAMIC ARRAY WITH DIMENSION {dimensions} OF {element}")
                } else {
                    write!(f, "DYNAMIC ARRAY OF {element}")
                }
            }
            ResolvedType::Record(record) => match &record.mimic {
                Some(target) => write!(f, "RECORD LIKE {target}"),
                None => {
                    let members: Vec<String> = record.members.iter().map(|(n, t)| format!("{n} {t}")).collect();
                    write!(f, "RECORD ({})", members.join(", "))
                }
            },
            ResolvedType::Dictionary(value) => write!(f, "DICTIONARY OF {value}"),
            ResolvedType::Function { params, returns } => {
                write!(f, "FUNCTION ({})", join(params))?;
                if !returns.is_empty() {
                    write!(f, " RETURNS ({})", join(returns))?;
                }
                Ok(())
            }
            ResolvedType::Mimic { target, column } => match column {
                Some(column) => write!(f, "LIKE {target} ({column})"),
                None => write!(f, "LIKE {target}"),
            },
            ResolvedType::Package(id) => f.write_str(&packages::info_for(*id).qualified_name()),
            ResolvedType::Named { name, .. } | ResolvedType::Recursive(name) | ResolvedType::Unresolved(name) => {
                f.write_str(name)
            }
            ResolvedType::Missing => f.write_str("?"),
        }
    }
}

/// Type of a schema column given as text (`DECIMAL(10,2)`, `DATETIME YEAR TO SECOND`).
pub fn parse_type_text(text: &str) -> ResolvedType {
    let text = text.trim();
    let split = text.find(|c: char| c == '(' || c.is_whitespace()).unwrap_or(text.len());
    let (name, rest) = text.split_at(split);
    match types::from_str(name) {
        Some(base) => {
            let rest = rest.trim();
            ResolvedType::Base {
                base,
                constraint: (!rest.is_empty()).then(|| rest.to_string()),
            }
        }
        None => ResolvedType::Unresolved(text.to_string()),
    }
}

// ============================================================================
// Functions
// ============================================================================

/// What a called name refers to.
#[derive(Debug, Clone)]
pub enum FunctionTarget {
    Defined(Resolution),
    External(FunctionSignature),
    Builtin(BuiltinFnId),
}

impl FunctionTarget {
    /// One-line signature for hovers.
    pub fn signature(&self, resolver: &Resolver<'_>) -> String {
        match self {
            FunctionTarget::Defined(resolution) => resolver.routine_signature(&resolution.definition),
            FunctionTarget::External(signature) => signature.to_string(),
            FunctionTarget::Builtin(id) => {
                let info = builtins::info_for(*id);
                format!("FUNCTION {}({}) -- {}", info.canonical, info.params.join(", "), info.description)
            }
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves names and types against a program's published files.
pub struct Resolver<'p> {
    program: &'p Program,
}

/// `(file path, declaring node)` of the named types currently being expanded.
type Visiting = Vec<(PathBuf, NodeId)>;

impl<'p> Resolver<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Resolve `name` as used at `offset` in `file`.
    pub fn resolve(&self, file: &Arc<SourceFile>, name: &str, offset: usize, namespace: Namespace) -> Option<Resolution> {
        let scope = queries::node_at(&file.tree, offset).and_then(|id| scope_at(&file.tree, id));
        self.resolve_in(file, scope, namespace, name)
    }

    /// Resolve `name` as used by node `at` in `file`.
    pub fn resolve_at(&self, file: &Arc<SourceFile>, at: NodeId, namespace: Namespace, name: &str) -> Option<Resolution> {
        self.resolve_in(file, scope_at(&file.tree, at), namespace, name)
    }

    fn resolve_in(
        &self,
        file: &Arc<SourceFile>,
        scope: Option<NodeId>,
        namespace: Namespace,
        name: &str,
    ) -> Option<Resolution> {
        let key = (file.path.clone(), scope, namespace, name.to_ascii_lowercase());
        if let Some(hit) = self.program.cache.get(&key) {
            return hit;
        }
        let result = self.lookup(file, scope, namespace, name);
        self.program.cache.insert(key, result.clone());
        result
    }

    fn lookup(&self, file: &Arc<SourceFile>, scope: Option<NodeId>, namespace: Namespace, name: &str) -> Option<Resolution> {
        for scope in file.symbols.chain(&file.tree, scope) {
            if let Some(symbol) = scope.lookup(namespace, name) {
                return Some(Resolution::found(Self::define(file, symbol), Origin::Scope));
            }
        }

        let mut visited = HashSet::from([file.id]);
        if let Some(definition) = self.lookup_included(file, namespace, name, &mut visited) {
            return Some(Resolution::found(definition, Origin::Include));
        }

        // `module.name` names an exported declaration of one specific module.
        let (module, bare) = match name.rsplit_once('.') {
            Some((module, bare)) => (Some(module), bare),
            None => (None, name),
        };
        let in_module = |f: &SourceFile| {
            module.is_none_or(|m| {
                f.path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| stem.eq_ignore_ascii_case(m))
            })
        };
        let exported = |f: &Arc<SourceFile>| {
            f.symbols
                .module()
                .lookup(namespace, bare)
                .filter(|s| s.is_exported())
                .map(|s| Self::define(f, s))
        };

        let mut siblings = self
            .program
            .siblings(file.id)
            .into_iter()
            .filter(|f| in_module(f))
            .filter_map(|f| exported(&f));
        if let Some(first) = siblings.next() {
            let ambiguous: Vec<Definition> = siblings.collect();
            if !ambiguous.is_empty() {
                tracing::debug!(name, count = ambiguous.len() + 1, "ambiguous sibling definitions");
            }
            return Some(Resolution {
                definition: first,
                origin: Origin::Sibling,
                ambiguous,
            });
        }

        self.program
            .projects()
            .iter()
            .flat_map(|project| project.files())
            .filter(|f| in_module(f))
            .find_map(|f| exported(&f))
            .map(|definition| Resolution::found(definition, Origin::Project))
    }

    fn lookup_included(
        &self,
        file: &SourceFile,
        namespace: Namespace,
        name: &str,
        visited: &mut HashSet<FileId>,
    ) -> Option<Definition> {
        for (_, target) in file.includes() {
            let Some(included) = self.program.resolve_include(file, &target.node) else { continue };
            if !visited.insert(included.id) {
                continue;
            }
            if let Some(symbol) = included.symbols.module().lookup(namespace, name) {
                return Some(Self::define(&included, symbol));
            }
            if let Some(found) = self.lookup_included(&included, namespace, name, visited) {
                return Some(found);
            }
        }
        None
    }

    fn define(file: &Arc<SourceFile>, symbol: &Symbol) -> Definition {
        Definition {
            file: Arc::clone(file),
            symbol: symbol.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    /// Resolve a type node (a type reference or one of its composite children) of `file`.
    pub fn resolve_type(&self, file: &Arc<SourceFile>, type_node: NodeId) -> ResolvedType {
        self.type_of_node(file, type_node, &mut Vec::new())
    }

    /// Declared type of a value or type symbol. `None` for symbols without a type (routines, cursors, untyped
    /// parameters).
    pub fn symbol_type(&self, file: &Arc<SourceFile>, symbol: &Symbol) -> Option<ResolvedType> {
        let type_ref = symbol.kind.type_ref()?;
        Some(self.resolve_type(file, type_ref))
    }

    fn type_of_node(&self, file: &Arc<SourceFile>, id: NodeId, visiting: &mut Visiting) -> ResolvedType {
        let optional = |this: &Self, child: Option<NodeId>, visiting: &mut Visiting| {
            child.map_or(ResolvedType::Missing, |c| this.type_of_node(file, c, visiting))
        };
        match file.tree.kind(id) {
            NodeKind::TypeReference(t) => {
                if let Some(composite) = t.composite {
                    return self.type_of_node(file, composite, visiting);
                }
                if let Some(mimic) = &t.mimic {
                    return self.mimic_type(mimic);
                }
                if let Some(base) = t.base {
                    return ResolvedType::Base {
                        base,
                        constraint: t.constraint.clone(),
                    };
                }
                match &t.name {
                    Some(name) => self.named_type(file, id, &name.node, visiting),
                    None => ResolvedType::Missing,
                }
            }
            NodeKind::ArrayType(a) => ResolvedType::Array {
                kind: a.kind,
                sizes: a.sizes.clone(),
                dimensions: a.dimensions,
                element: Box::new(optional(self, a.element, visiting)),
            },
            NodeKind::RecordDefinition(r) => match &r.mimic {
                Some(mimic) => ResolvedType::Record(self.table_record(mimic)),
                None => ResolvedType::Record(RecordType {
                    members: r
                        .members
                        .iter()
                        .map(|m| (m.name.node.clone(), optional(self, m.type_ref, visiting)))
                        .collect(),
                    mimic: None,
                }),
            },
            NodeKind::DictionaryDefinition(d) => ResolvedType::Dictionary(Box::new(optional(self, d.value, visiting))),
            NodeKind::FunctionType(ft) => ResolvedType::Function {
                params: ft
                    .params
                    .iter()
                    .map(|&p| match file.tree.kind(p) {
                        NodeKind::Parameter(param) => optional(self, param.type_ref, visiting),
                        _ => self.type_of_node(file, p, visiting),
                    })
                    .collect(),
                returns: ft.returns.iter().map(|&r| self.type_of_node(file, r, visiting)).collect(),
            },
            NodeKind::Parameter(p) => optional(self, p.type_ref, visiting),
            _ => ResolvedType::Missing,
        }
    }

    fn named_type(&self, file: &Arc<SourceFile>, at: NodeId, name: &str, visiting: &mut Visiting) -> ResolvedType {
        let Some(resolution) = self.resolve_at(file, at, Namespace::Type, name) else {
            return match packages::from_str(name) {
                Some(id) => ResolvedType::Package(id),
                None => ResolvedType::Unresolved(name.to_string()),
            };
        };
        let definition = resolution.definition;
        let key = (definition.file.path.clone(), definition.symbol.node);
        if visiting.contains(&key) {
            return ResolvedType::Recursive(definition.symbol.name.node.clone());
        }
        let target = match definition.symbol.kind.type_ref() {
            Some(type_ref) => {
                visiting.push(key);
                let target = self.type_of_node(&definition.file, type_ref, visiting);
                visiting.pop();
                target
            }
            None => ResolvedType::Missing,
        };
        ResolvedType::Named {
            name: definition.symbol.name.node.clone(),
            target: Box::new(target),
        }
    }

    fn mimic_type(&self, mimic: &MimicTarget) -> ResolvedType {
        if mimic.is_whole_table() {
            return ResolvedType::Record(self.table_record(mimic));
        }
        let column = self.program.schema().and_then(|schema| {
            schema.column_type(
                mimic.database.as_ref().map(|d| d.node.as_str()),
                &mimic.table.node,
                &mimic.column.node,
            )
        });
        ResolvedType::Mimic {
            target: mimic.display(),
            column: column.map(|text| Box::new(parse_type_text(&text))),
        }
    }

    fn table_record(&self, mimic: &MimicTarget) -> RecordType {
        let columns = self
            .program
            .schema()
            .and_then(|schema| schema.table_columns(mimic.database.as_ref().map(|d| d.node.as_str()), &mimic.table.node))
            .unwrap_or_default();
        RecordType {
            members: columns
                .into_iter()
                .map(|c| (c.name, parse_type_text(&c.type_text)))
                .collect(),
            mimic: Some(format!("{}.*", mimic.table.node)),
        }
    }

    /// Static type of a variable, member or index expression.
    pub fn expression_type(&self, file: &Arc<SourceFile>, expr: NodeId) -> Option<ResolvedType> {
        match file.tree.kind(expr) {
            NodeKind::Variable(v) => {
                let resolution = self.resolve_at(file, expr, Namespace::Value, &v.name.node)?;
                self.symbol_type(&resolution.definition.file, &resolution.definition.symbol)
            }
            NodeKind::Member(m) => {
                let object = self.expression_type(file, m.object)?;
                let member = m.member.as_ref()?;
                object.member(&member.node).cloned()
            }
            NodeKind::Index(i) => self.expression_type(file, i.object)?.element().cloned(),
            NodeKind::Grouped(g) => self.expression_type(file, g.inner),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    /// Resolve a called name. `mode` bounds how far beyond the current file the lookup reaches; builtin
    /// functions are always visible.
    pub fn resolve_function(&self, file: &Arc<SourceFile>, name: &str, mode: SearchMode) -> Option<FunctionTarget> {
        let defined = self.resolve_in(file, None, Namespace::Routine, name).filter(|r| match r.origin {
            Origin::Scope | Origin::Include => true,
            Origin::Sibling => mode.includes_program(),
            Origin::Project => mode.includes_external(),
        });
        if let Some(resolution) = defined {
            return Some(FunctionTarget::Defined(resolution));
        }
        if let Some(signature) = self.program.functions().and_then(|p| p.function(name, mode)) {
            return Some(FunctionTarget::External(signature));
        }
        builtins::from_str(name).map(FunctionTarget::Builtin)
    }

    /// `FUNCTION name(a INTEGER, b) RETURNS (STRING)` for a defined function or report.
    pub fn routine_signature(&self, definition: &Definition) -> String {
        let file = &definition.file;
        let tree: &SyntaxTree = &file.tree;
        let (keyword, params, returns) = match tree.kind(definition.symbol.node) {
            NodeKind::Function(f) => ("FUNCTION", f.params.as_slice(), f.returns.as_deref().unwrap_or(&[])),
            NodeKind::Report(r) => ("REPORT", r.params.as_slice(), &[][..]),
            _ => return definition.symbol.name.node.clone(),
        };
        let routine = Some(definition.symbol.node);
        let params: Vec<String> = params
            .iter()
            .filter_map(|&p| match tree.kind(p) {
                NodeKind::Parameter(param) => {
                    // Parameters are usually typed by a DEFINE in the body.
                    let ty = file
                        .symbols
                        .scope(routine)
                        .and_then(|s| s.lookup(Namespace::Value, &param.name.node))
                        .and_then(|s| self.symbol_type(file, s));
                    Some(match ty {
                        Some(ty) => format!("{} {ty}", param.name.node),
                        None => param.name.node.clone(),
                    })
                }
                _ => None,
            })
            .collect();
        let mut out = format!("{keyword} {}({})", definition.symbol.name.node, params.join(", "));
        if !returns.is_empty() {
            let returns: Vec<String> = returns.iter().map(|&r| self.resolve_type(file, r).to_string()).collect();
            out.push_str(&format!(" RETURNS ({})", returns.join(", ")));
        }
        out
    }

    // ------------------------------------------------------------------------
    // Annotation
    // ------------------------------------------------------------------------

    /// Attach a [`ResolvedType`] attribute to every type reference of `file`, writing into `tree` (a copy of
    /// `file.tree`). Returns the number of annotated nodes.
    pub fn annotate(&self, file: &Arc<SourceFile>, tree: &mut SyntaxTree) -> usize {
        tree.clear_attributes_of::<ResolvedType>();
        let targets: Vec<NodeId> = file
            .tree
            .ids()
            .filter(|&id| matches!(file.tree.kind(id), NodeKind::TypeReference(_)))
            .collect();
        for &id in &targets {
            let resolved = self.resolve_type(file, id);
            tree.attributes_mut(id).insert(resolved);
        }
        tracing::debug!(path = %file.path.display(), count = targets.len(), "annotated type references");
        targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::providers::StaticSchema;

    fn single(source: &str) -> (Program, Arc<SourceFile>) {
        let program = Program::default();
        let id = program.add_source("main.4gl", source);
        let file = program.file(id).unwrap();
        (program, file)
    }

    fn value_type(program: &Program, file: &Arc<SourceFile>, name: &str) -> ResolvedType {
        let offset = file.source.rfind(name).unwrap();
        let resolution = Resolver::new(program).resolve(file, name, offset, Namespace::Value).unwrap();
        Resolver::new(program)
            .symbol_type(&resolution.definition.file, &resolution.definition.symbol)
            .unwrap()
    }

    #[test]
    fn test_parse_type_text() {
        assert_eq!(
            parse_type_text("DECIMAL(10,2)"),
            ResolvedType::Base {
                base: BaseTypeId::Decimal,
                constraint: Some("(10,2)".into())
            }
        );
        assert_eq!(parse_type_text("datetime year to second").to_string(), "DATETIME year to second");
        assert_eq!(parse_type_text("serial"), ResolvedType::Unresolved("serial".into()));
    }

    #[test]
    fn test_forward_type_reference() {
        let (program, file) = single("DEFINE total money_t\nTYPE money_t DECIMAL(10,2)\n");
        let ty = value_type(&program, &file, "total");
        assert_eq!(ty.to_string(), "money_t");
        assert_eq!(ty.expand().to_string(), "DECIMAL(10,2)");
        assert_eq!(ty.describe(), "money_t = DECIMAL(10,2)");
    }

    #[test]
    fn test_recursive_type_is_detected() {
        let (program, file) = single("TYPE a_t b_t\nTYPE b_t a_t\nDEFINE x a_t\n");
        let ty = value_type(&program, &file, "x");
        let ResolvedType::Named { target, .. } = &ty else { panic!("expected a named type, got {ty:?}") };
        let ResolvedType::Named { target: inner, .. } = target.as_ref() else { panic!("expected b_t") };
        assert_eq!(inner.as_ref(), &ResolvedType::Recursive("a_t".into()));
    }

    #[test]
    fn test_local_scope_shadows_module() {
        let source = "DEFINE n STRING\nFUNCTION f()\n  DEFINE n INTEGER\n  DISPLAY n\nEND FUNCTION\n";
        let (program, file) = single(source);
        assert_eq!(value_type(&program, &file, "n").to_string(), "INTEGER");
        let module_use = source.find("n STRING").unwrap();
        let resolution = Resolver::new(&program)
            .resolve(&file, "n", module_use, Namespace::Value)
            .unwrap();
        assert_eq!(resolution.definition.symbol.scope, None);
    }

    #[test]
    fn test_package_type_fallback() {
        let (program, file) = single("DEFINE sb base.StringBuffer, ch Channel\n");
        assert_eq!(
            value_type(&program, &file, "sb"),
            ResolvedType::Package(PackageTypeId::StringBuffer)
        );
        assert_eq!(value_type(&program, &file, "ch").to_string(), "base.Channel");
    }

    #[test]
    fn test_record_member_and_array_element() {
        let source = "DEFINE rows DYNAMIC ARRAY OF RECORD\n  id INTEGER,\n  title STRING\nEND RECORD\n\
                      MAIN\n  DISPLAY rows[1].title\nEND MAIN\n";
        let (program, file) = single(source);
        let offset = source.rfind("title").unwrap();
        let member = queries::enclosing(&file.tree, queries::node_at(&file.tree, offset).unwrap(), |k| {
            matches!(k, NodeKind::Member(_))
        })
        .unwrap();
        let ty = Resolver::new(&program).expression_type(&file, member).unwrap();
        assert_eq!(ty.to_string(), "STRING");
    }

    #[test]
    fn test_mimic_uses_schema() {
        let schema = StaticSchema::new(None).with_table("customer", &[("id", "INTEGER"), ("name", "CHAR(30)")]);
        let program = Program::default().with_schema(Arc::new(schema));
        let id = program.add_source("main.4gl", "DEFINE c_id LIKE customer.id\nDEFINE c RECORD LIKE customer.*\n");
        let file = program.file(id).unwrap();
        assert_eq!(value_type(&program, &file, "c_id").to_string(), "LIKE customer.id (INTEGER)");
        let record = value_type(&program, &file, "c");
        assert_eq!(record.member("NAME").map(ToString::to_string).as_deref(), Some("CHAR(30)"));
    }

    #[test]
    fn test_builtin_and_unknown_functions() {
        let (program, file) = single("MAIN\nEND MAIN\n");
        let resolver = Resolver::new(&program);
        assert!(matches!(
            resolver.resolve_function(&file, "LENGTH", SearchMode::None),
            Some(FunctionTarget::Builtin(BuiltinFnId::Length))
        ));
        assert!(resolver.resolve_function(&file, "nowhere", SearchMode::All).is_none());
    }

    #[test]
    fn test_routine_signature_uses_define_types() {
        let (program, file) = single("FUNCTION add(a, b)\n  DEFINE a, b INTEGER\n  RETURN a + b\nEND FUNCTION\n");
        let resolver = Resolver::new(&program);
        let Some(FunctionTarget::Defined(resolution)) = resolver.resolve_function(&file, "ADD", SearchMode::None) else {
            panic!("add should resolve to its definition");
        };
        assert_eq!(resolver.routine_signature(&resolution.definition), "FUNCTION add(a INTEGER, b INTEGER)");
    }
}
