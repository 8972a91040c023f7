//! Module outline: routines, globals and module-level declarations, with their local declarations nested.

use std::fmt::Write as _;

use bdl_syntax::ast::{NodeId, NodeKind, SyntaxTree};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineKind {
    Main,
    Function,
    Report,
    Globals,
    Variable,
    Constant,
    Type,
    Import,
    Include,
}

impl OutlineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutlineKind::Main => "main",
            OutlineKind::Function => "function",
            OutlineKind::Report => "report",
            OutlineKind::Globals => "globals",
            OutlineKind::Variable => "variable",
            OutlineKind::Constant => "constant",
            OutlineKind::Type => "type",
            OutlineKind::Import => "import",
            OutlineKind::Include => "include",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    pub name: String,
    pub kind: OutlineKind,
    pub start: usize,
    pub end: usize,
    /// 1-based line of `start`.
    pub line: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineItem>,
}

fn item(tree: &SyntaxTree, id: NodeId, name: String, kind: OutlineKind) -> OutlineItem {
    let span = tree.span(id);
    OutlineItem {
        name,
        kind,
        start: span.start,
        end: span.end,
        line: tree.line_table().location_of(span.start).0,
        children: Vec::new(),
    }
}

/// Declarations made directly by `ids` (DEFINE, CONSTANT and TYPE statements).
fn declarations(tree: &SyntaxTree, ids: &[NodeId]) -> Vec<OutlineItem> {
    let mut out = Vec::new();
    for &id in ids {
        match tree.kind(id) {
            NodeKind::Define(define) => {
                for &group in &define.groups {
                    let NodeKind::VariableGroup(g) = tree.kind(group) else { continue };
                    out.extend(
                        g.names
                            .iter()
                            .map(|name| item(tree, group, name.node.clone(), OutlineKind::Variable)),
                    );
                }
            }
            NodeKind::Constant(constant) => {
                for &c in &constant.items {
                    if let NodeKind::ConstantItem(ci) = tree.kind(c) {
                        out.push(item(tree, c, ci.name.node.clone(), OutlineKind::Constant));
                    }
                }
            }
            NodeKind::TypeDecl(decl) => {
                for &t in &decl.items {
                    if let NodeKind::TypeItem(ti) = tree.kind(t) {
                        out.push(item(tree, t, ti.name.node.clone(), OutlineKind::Type));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Outline of the module `tree` holds, in source order.
pub fn outline(tree: &SyntaxTree) -> Vec<OutlineItem> {
    let NodeKind::Module(module) = tree.kind(tree.root()) else {
        return Vec::new();
    };
    let unnamed = |name: &Option<bdl_syntax::ast::Name>| name.as_ref().map_or("?".to_string(), |n| n.node.clone());

    let mut items = Vec::new();
    for &id in &module.items {
        match tree.kind(id) {
            NodeKind::Main(main) => {
                let mut entry = item(tree, id, "MAIN".to_string(), OutlineKind::Main);
                entry.children = declarations(tree, &main.body);
                items.push(entry);
            }
            NodeKind::Function(f) => {
                let mut entry = item(tree, id, unnamed(&f.name), OutlineKind::Function);
                entry.children = declarations(tree, &f.body);
                items.push(entry);
            }
            NodeKind::Report(r) => {
                let mut entry = item(tree, id, unnamed(&r.name), OutlineKind::Report);
                entry.children = declarations(tree, &r.body);
                items.push(entry);
            }
            NodeKind::Globals(g) => {
                let mut entry = item(tree, id, "GLOBALS".to_string(), OutlineKind::Globals);
                entry.children = declarations(tree, &g.items);
                items.push(entry);
            }
            NodeKind::Import(i) => items.push(item(tree, id, i.path.node.clone(), OutlineKind::Import)),
            NodeKind::Include(i) => items.push(item(tree, id, i.path.node.clone(), OutlineKind::Include)),
            NodeKind::GlobalsFile(g) => items.push(item(tree, id, g.path.node.clone(), OutlineKind::Include)),
            _ => items.extend(declarations(tree, &[id])),
        }
    }
    items
}

/// Indented text rendering: `kind name (line N)` per item.
pub fn render_outline(items: &[OutlineItem]) -> String {
    fn render(items: &[OutlineItem], depth: usize, out: &mut String) {
        for item in items {
            let _ = writeln!(
                out,
                "{:indent$}{} {} (line {})",
                "",
                item.kind.as_str(),
                item.name,
                item.line,
                indent = depth * 2
            );
            render(&item.children, depth + 1, out);
        }
    }
    let mut out = String::new();
    render(items, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdl_syntax::diagnostics::NullSink;
    use bdl_syntax::parser::{self, ParseOptions};

    const SOURCE: &str = "\
IMPORT FGL util
GLOBALS
  DEFINE g_user STRING
END GLOBALS
CONSTANT max_rows = 100
TYPE money_t DECIMAL(10,2)
DEFINE total money_t
MAIN
  DEFINE i, j INTEGER
  CALL refresh()
END MAIN
FUNCTION refresh()
  DISPLAY total
END FUNCTION
";

    #[test]
    fn test_outline_text() {
        let tree = parser::parse(SOURCE, &ParseOptions::default(), &mut NullSink);
        insta::assert_snapshot!(render_outline(&outline(&tree)), @r"
        import util (line 1)
        globals GLOBALS (line 2)
          variable g_user (line 3)
        constant max_rows (line 5)
        type money_t (line 6)
        variable total (line 7)
        main MAIN (line 8)
          variable i (line 9)
          variable j (line 9)
        function refresh (line 12)
        ");
    }

    #[test]
    fn test_outline_json_kinds() {
        let tree = parser::parse("FUNCTION f()\nEND FUNCTION\n", &ParseOptions::default(), &mut NullSink);
        let json = serde_json::to_value(outline(&tree)).unwrap();
        assert_eq!(json[0]["kind"], "function");
        assert_eq!(json[0]["name"], "f");
        assert_eq!(json[0]["start"], 0);
        assert!(json[0].get("children").is_none());
    }
}
