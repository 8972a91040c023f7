//! Declarations of one file, grouped by the scope that owns them.
//!
//! A scope is owned by the module (`None`), by a routine (`MAIN`, `FUNCTION`, `REPORT`) or by a dialog block
//! whose `DEFINE`s are only visible inside it. Names compare case-insensitively.
//!
//! ## Notes
//! - `GLOBALS ... END GLOBALS` declarations belong to the module scope and are flagged as global.
//! - Cursor and prepared-statement names are module-wide.
//! - A routine parameter is only entered as its own symbol when no `DEFINE` in the routine types it.

use std::collections::HashMap;

use bdl_syntax::ast::queries;
use bdl_syntax::ast::{Name, NodeId, NodeKind, SyntaxTree, Visibility};

/// Which kind of name a lookup is for. Each namespace is searched independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Type,
    Value,
    Routine,
    Cursor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Variable { type_ref: Option<NodeId> },
    Constant { type_ref: Option<NodeId>, value: Option<NodeId> },
    Type { type_ref: Option<NodeId> },
    Parameter { type_ref: Option<NodeId> },
    Function,
    Report,
    Cursor,
    PreparedStatement,
}

impl SymbolKind {
    pub fn namespace(&self) -> Namespace {
        match self {
            SymbolKind::Variable { .. } | SymbolKind::Constant { .. } | SymbolKind::Parameter { .. } => {
                Namespace::Value
            }
            SymbolKind::Type { .. } => Namespace::Type,
            SymbolKind::Function | SymbolKind::Report => Namespace::Routine,
            SymbolKind::Cursor | SymbolKind::PreparedStatement => Namespace::Cursor,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Variable { .. } => "variable",
            SymbolKind::Constant { .. } => "constant",
            SymbolKind::Type { .. } => "type",
            SymbolKind::Parameter { .. } => "parameter",
            SymbolKind::Function => "function",
            SymbolKind::Report => "report",
            SymbolKind::Cursor => "cursor",
            SymbolKind::PreparedStatement => "prepared statement",
        }
    }

    /// Type reference node declaring the symbol's type, if it has one.
    pub fn type_ref(&self) -> Option<NodeId> {
        match self {
            SymbolKind::Variable { type_ref }
            | SymbolKind::Constant { type_ref, .. }
            | SymbolKind::Type { type_ref }
            | SymbolKind::Parameter { type_ref } => *type_ref,
            _ => None,
        }
    }
}

/// A declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,
    /// Declaring node: the variable group, constant or type item, routine, `DECLARE` or `PREPARE`.
    pub node: NodeId,
    pub visibility: Visibility,
    /// Declared in a `GLOBALS` block.
    pub global: bool,
    /// `None` for the module scope.
    pub scope: Option<NodeId>,
}

impl Symbol {
    /// Visible to the other modules of the program.
    pub fn is_exported(&self) -> bool {
        if self.scope.is_some() || self.visibility == Visibility::Private {
            return false;
        }
        match self.kind {
            // Module variables, types and constants are private unless marked PUBLIC or declared global.
            SymbolKind::Variable { .. } | SymbolKind::Constant { .. } | SymbolKind::Type { .. } => {
                self.global || self.visibility == Visibility::Public
            }
            SymbolKind::Function | SymbolKind::Report => true,
            _ => false,
        }
    }
}

/// Symbols declared directly in one scope.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: Vec<Symbol>,
    by_name: HashMap<(Namespace, String), Vec<usize>>,
}

impl Scope {
    fn insert(&mut self, symbol: Symbol) {
        let key = (symbol.kind.namespace(), symbol.name.node.to_ascii_lowercase());
        self.by_name.entry(key).or_default().push(self.symbols.len());
        self.symbols.push(symbol);
    }

    fn contains(&self, namespace: Namespace, name: &str) -> bool {
        self.by_name.contains_key(&(namespace, name.to_ascii_lowercase()))
    }

    /// First declaration of `name` in `namespace`.
    pub fn lookup(&self, namespace: Namespace, name: &str) -> Option<&Symbol> {
        self.by_name
            .get(&(namespace, name.to_ascii_lowercase()))
            .and_then(|indices| indices.first())
            .map(|&i| &self.symbols[i])
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Every scope of one file.
#[derive(Debug, Clone, Default)]
pub struct FileSymbols {
    scopes: HashMap<Option<NodeId>, Scope>,
}

/// Nodes that open a scope of their own.
fn opens_scope(kind: &NodeKind) -> bool {
    kind.is_routine() || matches!(kind, NodeKind::Dialog(_))
}

/// Innermost scope containing `id`, counting `id` itself when it opens a scope.
pub fn scope_at(tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
    queries::enclosing(tree, id, opens_scope)
}

/// Scope a declaration at `id` is entered into: the innermost scope strictly above it.
fn declaring_scope(tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
    tree.node(id).parent().and_then(|parent| scope_at(tree, parent))
}

fn inside_globals(tree: &SyntaxTree, id: NodeId) -> bool {
    queries::enclosing(tree, id, |k| matches!(k, NodeKind::Globals(_))).is_some()
}

impl FileSymbols {
    /// Index every declaration in `tree`.
    pub fn collect(tree: &SyntaxTree) -> Self {
        let mut symbols = FileSymbols::default();
        symbols.scopes.insert(None, Scope::default());
        let mut parameters = Vec::new();

        for id in queries::descendants(tree, tree.root()) {
            match tree.kind(id) {
                NodeKind::Define(define) => {
                    let scope = declaring_scope(tree, id);
                    let global = inside_globals(tree, id);
                    for &group in &define.groups {
                        let NodeKind::VariableGroup(g) = tree.kind(group) else { continue };
                        for name in &g.names {
                            symbols.insert(Symbol {
                                name: name.clone(),
                                kind: SymbolKind::Variable { type_ref: g.type_ref },
                                node: group,
                                visibility: define.visibility,
                                global,
                                scope,
                            });
                        }
                    }
                }
                NodeKind::Constant(constant) => {
                    let scope = declaring_scope(tree, id);
                    let global = inside_globals(tree, id);
                    for &item in &constant.items {
                        let NodeKind::ConstantItem(c) = tree.kind(item) else { continue };
                        symbols.insert(Symbol {
                            name: c.name.clone(),
                            kind: SymbolKind::Constant {
                                type_ref: c.type_ref,
                                value: c.value,
                            },
                            node: item,
                            visibility: constant.visibility,
                            global,
                            scope,
                        });
                    }
                }
                NodeKind::TypeDecl(decl) => {
                    let scope = declaring_scope(tree, id);
                    let global = inside_globals(tree, id);
                    for &item in &decl.items {
                        let NodeKind::TypeItem(t) = tree.kind(item) else { continue };
                        symbols.insert(Symbol {
                            name: t.name.clone(),
                            kind: SymbolKind::Type { type_ref: t.type_ref },
                            node: item,
                            visibility: decl.visibility,
                            global,
                            scope,
                        });
                    }
                }
                NodeKind::Function(f) => {
                    if let Some(name) = &f.name {
                        symbols.insert(Symbol {
                            name: name.clone(),
                            kind: SymbolKind::Function,
                            node: id,
                            visibility: f.visibility,
                            global: false,
                            scope: declaring_scope(tree, id),
                        });
                    }
                    parameters.extend(f.params.iter().map(|&p| (id, p)));
                }
                NodeKind::Report(r) => {
                    if let Some(name) = &r.name {
                        symbols.insert(Symbol {
                            name: name.clone(),
                            kind: SymbolKind::Report,
                            node: id,
                            visibility: r.visibility,
                            global: false,
                            scope: declaring_scope(tree, id),
                        });
                    }
                    parameters.extend(r.params.iter().map(|&p| (id, p)));
                }
                NodeKind::Declare(d) => {
                    if let Some(cursor) = &d.cursor {
                        symbols.insert(Symbol {
                            name: cursor.clone(),
                            kind: SymbolKind::Cursor,
                            node: id,
                            visibility: Visibility::Default,
                            global: false,
                            scope: None,
                        });
                    }
                }
                NodeKind::Prepare(p) => {
                    if let Some(statement) = &p.statement {
                        symbols.insert(Symbol {
                            name: statement.clone(),
                            kind: SymbolKind::PreparedStatement,
                            node: id,
                            visibility: Visibility::Default,
                            global: false,
                            scope: None,
                        });
                    }
                }
                _ => {}
            }
        }

        for (routine, param) in parameters {
            let NodeKind::Parameter(p) = tree.kind(param) else { continue };
            let typed_by_define = symbols
                .scopes
                .get(&Some(routine))
                .is_some_and(|scope| scope.contains(Namespace::Value, &p.name.node));
            if !typed_by_define {
                symbols.insert(Symbol {
                    name: p.name.clone(),
                    kind: SymbolKind::Parameter { type_ref: p.type_ref },
                    node: param,
                    visibility: Visibility::Default,
                    global: false,
                    scope: Some(routine),
                });
            }
        }
        symbols
    }

    fn insert(&mut self, symbol: Symbol) {
        self.scopes.entry(symbol.scope).or_default().insert(symbol);
    }

    pub fn module(&self) -> &Scope {
        static EMPTY: once_cell::sync::Lazy<Scope> = once_cell::sync::Lazy::new(Scope::default);
        self.scopes.get(&None).unwrap_or(&EMPTY)
    }

    pub fn scope(&self, owner: Option<NodeId>) -> Option<&Scope> {
        self.scopes.get(&owner)
    }

    /// Scopes visible from `owner`, innermost first, ending with the module scope.
    pub fn chain<'s>(&'s self, tree: &SyntaxTree, owner: Option<NodeId>) -> Vec<&'s Scope> {
        let mut chain: Vec<&Scope> = match owner {
            Some(id) => queries::ancestors(tree, id)
                .filter(|&a| opens_scope(tree.kind(a)))
                .filter_map(|a| self.scopes.get(&Some(a)))
                .collect(),
            None => Vec::new(),
        };
        chain.push(self.module());
        chain
    }

    /// Every symbol of the file, scope by scope.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.scopes.values().flat_map(|scope| scope.symbols.iter())
    }

    /// `(first, duplicate)` pairs: names declared twice in the same scope and namespace. Cursors may be
    /// re-declared and are not reported.
    pub fn duplicates(&self) -> Vec<(&Symbol, &Symbol)> {
        let mut out = Vec::new();
        for scope in self.scopes.values() {
            for ((namespace, _), indices) in &scope.by_name {
                if *namespace == Namespace::Cursor {
                    continue;
                }
                let first = &scope.symbols[indices[0]];
                out.extend(indices[1..].iter().map(|&i| (first, &scope.symbols[i])));
            }
        }
        out.sort_by_key(|(_, dup)| dup.name.span.start);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdl_syntax::diagnostics::NullSink;
    use bdl_syntax::parser::{self, ParseOptions};

    fn collect(source: &str) -> (SyntaxTree, FileSymbols) {
        let tree = parser::parse(source, &ParseOptions::default(), &mut NullSink);
        let symbols = FileSymbols::collect(&tree);
        (tree, symbols)
    }

    #[test]
    fn test_module_and_routine_scopes() {
        let (tree, symbols) = collect(
            "DEFINE counter INTEGER\nTYPE money_t DECIMAL(12,2)\nFUNCTION total(a)\n  DEFINE a, b money_t\n  RETURN a + b\nEND FUNCTION\n",
        );
        let module = symbols.module();
        assert!(module.lookup(Namespace::Value, "COUNTER").is_some());
        assert!(module.lookup(Namespace::Type, "money_t").is_some());
        let function = module.lookup(Namespace::Routine, "total").unwrap();
        assert_eq!(function.kind, SymbolKind::Function);

        let local = symbols.scope(Some(function.node)).unwrap();
        // `a` is typed by the DEFINE, so no separate parameter symbol.
        assert_eq!(local.len(), 2);
        assert!(matches!(
            local.lookup(Namespace::Value, "a").unwrap().kind,
            SymbolKind::Variable { .. }
        ));
        assert_eq!(symbols.chain(&tree, Some(function.node)).len(), 2);
    }

    #[test]
    fn test_untyped_parameter_is_a_symbol() {
        let (_, symbols) = collect("FUNCTION f(x)\nEND FUNCTION\n");
        let function = symbols.module().lookup(Namespace::Routine, "f").unwrap().node;
        let x = symbols.scope(Some(function)).unwrap().lookup(Namespace::Value, "x").unwrap();
        assert!(matches!(x.kind, SymbolKind::Parameter { type_ref: None }));
    }

    #[test]
    fn test_globals_are_module_scope_and_exported() {
        let (_, symbols) = collect("GLOBALS\n  DEFINE g_user STRING\nEND GLOBALS\nDEFINE m_hidden INTEGER\n");
        let user = symbols.module().lookup(Namespace::Value, "g_user").unwrap();
        assert!(user.global);
        assert!(user.is_exported());
        assert!(!symbols.module().lookup(Namespace::Value, "m_hidden").unwrap().is_exported());
    }

    #[test]
    fn test_dialog_defines_are_scoped_to_the_dialog() {
        let (tree, symbols) = collect(
            "MAIN\n  DEFINE answer STRING\n  DIALOG\n    DEFINE answer INTEGER\n    ON ACTION accept\n      EXIT DIALOG\n  END DIALOG\nEND MAIN\n",
        );
        assert!(symbols.duplicates().is_empty());
        let dialog = tree
            .ids()
            .find(|&id| matches!(tree.kind(id), NodeKind::Dialog(_)))
            .unwrap();
        let chain = symbols.chain(&tree, Some(dialog));
        assert_eq!(chain.len(), 3);
        assert!(chain[0].lookup(Namespace::Value, "answer").is_some());
    }

    #[test]
    fn test_duplicates_are_per_scope() {
        let (_, symbols) = collect(
            "DEFINE x INTEGER\nDEFINE X STRING\nFUNCTION f()\n  DEFINE x INTEGER\nEND FUNCTION\nFUNCTION F()\nEND FUNCTION\n",
        );
        let duplicates: Vec<_> = symbols.duplicates().iter().map(|(_, d)| d.name.node.clone()).collect();
        assert_eq!(duplicates, vec!["X".to_string(), "F".to_string()]);
    }
}
