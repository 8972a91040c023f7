//! Editor queries over a loaded [`Program`](crate::frontend::program::Program): outline, hover and
//! go-to-definition.
//!
//! All queries take byte offsets and are read-only. Hover prefers the resolved-type attributes that
//! [`Program::annotate`](crate::frontend::program::Program::annotate) attaches and falls back to resolving on
//! demand.

pub mod definition;
pub mod hover;
pub mod outline;

pub use definition::{definition, Location};
pub use hover::{hover, Hover};
pub use outline::{outline, render_outline, OutlineItem, OutlineKind};

use bdl_syntax::ast::queries;
use bdl_syntax::ast::{CursorSource, Name, NodeId, NodeKind, SyntaxTree};

/// What the identifier under the cursor is.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target<'t> {
    /// A variable, constant or parameter, used or declared.
    Value { name: &'t Name, at: NodeId },
    /// `object.member`, with the member name under the cursor.
    Member { name: &'t Name, node: NodeId },
    /// The callee of a call expression.
    Call { name: &'t Name },
    /// A type use: a type reference or one of its composite children.
    TypeUse { node: NodeId },
    /// The name in a `TYPE name ...` declaration.
    TypeName { name: &'t Name, at: NodeId },
    /// A function or report name outside of a call.
    Routine { name: &'t Name },
    /// A cursor or prepared statement name.
    Cursor { name: &'t Name, at: NodeId },
}

impl Target<'_> {
    /// Span to highlight for the hovered item.
    pub(crate) fn span(&self, tree: &SyntaxTree) -> bdl_syntax::ast::Span {
        match self {
            Target::Value { name, .. }
            | Target::Member { name, .. }
            | Target::Call { name, .. }
            | Target::TypeName { name, .. }
            | Target::Routine { name, .. }
            | Target::Cursor { name, .. } => name.span,
            Target::TypeUse { node } => tree.span(*node),
        }
    }
}

pub(crate) fn target_at(tree: &SyntaxTree, offset: usize) -> Option<Target<'_>> {
    let id = queries::node_at(tree, offset)?;
    let hit = |name: &&Name| name.span.contains(offset);
    match tree.kind(id) {
        NodeKind::Variable(v) if hit(&&v.name) => {
            let is_callee = tree
                .node(id)
                .parent()
                .is_some_and(|p| matches!(tree.kind(p), NodeKind::CallExpr(call) if call.callee == id));
            Some(if is_callee {
                Target::Call { name: &v.name }
            } else {
                Target::Value { name: &v.name, at: id }
            })
        }
        NodeKind::Member(m) => m.member.as_ref().filter(hit).map(|name| Target::Member { name, node: id }),
        NodeKind::TypeReference(_)
        | NodeKind::ArrayType(_)
        | NodeKind::RecordDefinition(_)
        | NodeKind::DictionaryDefinition(_)
        | NodeKind::FunctionType(_) => Some(Target::TypeUse { node: id }),
        NodeKind::VariableGroup(g) => g.names.iter().find(hit).map(|name| Target::Value { name, at: id }),
        NodeKind::ConstantItem(c) => Some(&c.name).filter(hit).map(|name| Target::Value { name, at: id }),
        NodeKind::Parameter(p) => Some(&p.name).filter(hit).map(|name| Target::Value { name, at: id }),
        NodeKind::TypeItem(t) => Some(&t.name).filter(hit).map(|name| Target::TypeName { name, at: id }),
        NodeKind::Function(f) => f.name.as_ref().filter(hit).map(|name| Target::Routine { name }),
        NodeKind::Report(r) => r.name.as_ref().filter(hit).map(|name| Target::Routine { name }),
        NodeKind::ReportCall(r) => r.report.as_ref().filter(hit).map(|name| Target::Routine { name }),
        NodeKind::Declare(d) => {
            let prepared = match &d.source {
                CursorSource::Prepared(name) => Some(name),
                _ => None,
            };
            d.cursor
                .as_ref()
                .into_iter()
                .chain(prepared)
                .find(hit)
                .map(|name| Target::Cursor { name, at: id })
        }
        NodeKind::Prepare(p) => p.statement.as_ref().filter(hit).map(|name| Target::Cursor { name, at: id }),
        NodeKind::CursorOp(c) => c.target.as_ref().filter(hit).map(|name| Target::Cursor { name, at: id }),
        NodeKind::Foreach(f) => f.cursor.as_ref().filter(hit).map(|name| Target::Cursor { name, at: id }),
        _ => None,
    }
}
