//! Offset and structure queries over a [`SyntaxTree`].

use std::fmt::Write as _;

use super::{Literal, NodeId, NodeKind, SyntaxTree};

/// Innermost node whose span contains `offset`.
///
/// Each level is a binary search over the children keyed by start offset. When two siblings touch (one ends
/// where the next starts) the later one wins.
pub fn node_at(tree: &SyntaxTree, offset: usize) -> Option<NodeId> {
    let root = tree.root();
    if !tree.span(root).contains(offset) {
        return None;
    }
    let mut current = root;
    'descend: loop {
        let children = tree.node(current).children_by_offset();
        let upper = children.partition_point(|&(start, _)| start <= offset);
        for &(_, child) in children[..upper].iter().rev() {
            if tree.span(child).contains(offset) {
                current = child;
                continue 'descend;
            }
        }
        return Some(current);
    }
}

/// `id` and then its ancestors up to the root.
pub fn ancestors(tree: &SyntaxTree, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(Some(id), move |&current| tree.node(current).parent())
}

/// Closest node (starting with `id` itself) satisfying `pred`.
pub fn enclosing(tree: &SyntaxTree, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
    ancestors(tree, id).find(|&a| pred(tree.kind(a)))
}

/// `MAIN`, `FUNCTION` or `REPORT` containing `id`.
pub fn enclosing_routine(tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
    enclosing(tree, id, NodeKind::is_routine)
}

/// Pre-order walk starting at `id`.
pub fn descendants(tree: &SyntaxTree, id: NodeId) -> Descendants<'_> {
    Descendants { tree, stack: vec![id] }
}

pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = self.tree.node(id).children_by_offset();
        self.stack.extend(children.iter().rev().map(|&(_, child)| child));
        Some(id)
    }
}

/// One-line label for a node, used by tree dumps and outlines.
pub fn label(tree: &SyntaxTree, id: NodeId) -> String {
    let kind = tree.kind(id);
    let name = |n: &Option<super::Name>| n.as_ref().map_or("?".to_string(), |n| n.node.clone());
    match kind {
        NodeKind::Function(f) => format!("FUNCTION {}", name(&f.name)),
        NodeKind::Report(r) => format!("REPORT {}", name(&r.name)),
        NodeKind::Import(i) => format!("IMPORT {}", i.path.node),
        NodeKind::Schema(s) => format!("SCHEMA {}", name(&s.database)),
        NodeKind::GlobalsFile(g) => format!("GLOBALS {:?}", g.path.node),
        NodeKind::Include(i) => format!("&include {:?}", i.path.node),
        NodeKind::Directive(d) => format!("&{}", d.text),
        NodeKind::VariableGroup(g) => {
            let names: Vec<_> = g.names.iter().map(|n| n.node.as_str()).collect();
            format!("variable {}", names.join(", "))
        }
        NodeKind::ConstantItem(c) => format!("constant {}", c.name.node),
        NodeKind::TypeItem(t) => format!("type {}", t.name.node),
        NodeKind::Parameter(p) => format!("parameter {}", p.name.node),
        NodeKind::TypeReference(t) => {
            let mut out = String::from("type reference");
            if let Some(n) = &t.name {
                let _ = write!(out, " {}", n.node);
            }
            if let Some(c) = &t.constraint {
                if c.starts_with('(') {
                    out.push_str(c);
                } else {
                    let _ = write!(out, " {c}");
                }
            }
            if let Some(m) = &t.mimic {
                let _ = write!(out, " LIKE {}", m.display());
            }
            out
        }
        NodeKind::RecordDefinition(r) => {
            let members: Vec<_> = r.members.iter().map(|m| m.name.node.as_str()).collect();
            match &r.mimic {
                Some(m) => format!("RECORD LIKE {}", m.display()),
                None => format!("RECORD ({})", members.join(", ")),
            }
        }
        NodeKind::Sql(s) => format!("SQL {}", s.text),
        NodeKind::Dialog(d) => d.kind.as_str().to_string(),
        NodeKind::DialogBlock(b) => b.header.clone(),
        NodeKind::ReportSection(s) => s.kind.as_str().to_string(),
        NodeKind::Simple(s) => bdl_core::lang::keywords::as_str(s.keyword).to_string(),
        NodeKind::Literal(l) => match l {
            Literal::Int(v) => format!("literal {v}"),
            Literal::Decimal(v) => format!("literal {v}"),
            Literal::String(v) => format!("literal {v:?}"),
            other => format!("literal {other:?}").to_ascii_lowercase(),
        },
        NodeKind::Variable(v) => format!("variable reference {}", v.name.node),
        NodeKind::Member(m) => match &m.member {
            Some(member) => format!("member .{}", member.node),
            None => "member .*".to_string(),
        },
        NodeKind::Binary(b) => format!("binary {}", b.op.as_str()),
        other => other.describe().to_string(),
    }
}

/// Indented dump of the subtree at `id`; incomplete nodes are marked with `!`.
pub fn dump(tree: &SyntaxTree, id: NodeId) -> String {
    let mut out = String::new();
    dump_into(tree, id, 0, &mut out);
    out
}

fn dump_into(tree: &SyntaxTree, id: NodeId, depth: usize, out: &mut String) {
    let node = tree.node(id);
    let _ = writeln!(
        out,
        "{:indent$}{}{} @{}..{}",
        "",
        label(tree, id),
        if node.is_complete { "" } else { " !" },
        node.span.start,
        node.span.end,
        indent = depth * 2
    );
    for child in node.children() {
        dump_into(tree, child, depth + 1, out);
    }
}
