//! Syntax tree for BDL.
//!
//! Nodes live in an arena owned by a [`SyntaxTree`] and are addressed by [`NodeId`]. Every node has a
//! half-open byte span, an `is_complete` flag, a parent link, and its children ordered by start offset, so
//! "which construct contains this offset" is a binary search per level (see [`queries`]).
//!
//! ## Invariants
//! - A node's span contains the spans of all of its children. [`TreeBuilder::alloc`] widens the span if the
//!   parser hands it a narrower one.
//! - `is_complete == false` means the parser reported a problem and recovered instead of finishing the
//!   construct normally.
//! - Nodes are immutable once the tree is built. Analysis results go into the per-tree attribute side table
//!   ([`AttributeBag`]), which needs `&mut SyntaxTree` to write.

pub mod attributes;
pub mod nodes;
pub mod queries;

use std::collections::HashMap;
use std::fmt;

pub use attributes::AttributeBag;
pub use nodes::*;

use crate::source::LineOffsetTable;

/// Source location span (byte offsets, half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty span at `offset`.
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Return `true` if `offset` falls inside the span. The end offset counts as inside, so a cursor placed
    /// right after a word still hits it.
    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn covers(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A value with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A name as written in the source.
pub type Name = Spanned<String>;

impl Name {
    /// Case-insensitive comparison, as BDL names are.
    pub fn is(&self, other: &str) -> bool {
        self.node.eq_ignore_ascii_case(other)
    }
}

/// Stable index of a node inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub is_complete: bool,
    parent: Option<NodeId>,
    /// `(start offset, child)`, ascending by offset.
    children: Vec<(usize, NodeId)>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in source order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.children.iter().map(|&(_, id)| id)
    }

    /// Children keyed by start offset.
    pub fn children_by_offset(&self) -> &[(usize, NodeId)] {
        &self.children
    }
}

/// An immutable arena of nodes plus the side table of analysis attributes.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    lines: LineOffsetTable,
    attributes: HashMap<NodeId, AttributeBag>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id, in allocation order (children before their parents).
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn line_table(&self) -> &LineOffsetTable {
        &self.lines
    }

    /// Analysis attributes attached to `id`, if any were ever written.
    pub fn attributes(&self, id: NodeId) -> Option<&AttributeBag> {
        self.attributes.get(&id)
    }

    /// Mutable attributes of `id`, created on first use.
    pub fn attributes_mut(&mut self, id: NodeId) -> &mut AttributeBag {
        self.attributes.entry(id).or_default()
    }

    /// Drop every attribute so analysis can run again from scratch.
    pub fn clear_attributes(&mut self) {
        self.attributes.clear();
    }

    /// Drop the attributes of type `T` from every node, keeping the others.
    pub fn clear_attributes_of<T: std::any::Any + Send + Sync>(&mut self) {
        for bag in self.attributes.values_mut() {
            bag.remove::<T>();
        }
    }
}

/// Builds a [`SyntaxTree`] bottom-up: children are allocated before their parent.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    attributes: HashMap<NodeId, AttributeBag>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, adopting `children` (which must not have a parent yet).
    ///
    /// The span is widened to cover every child.
    pub fn alloc(&mut self, kind: NodeKind, span: Span, is_complete: bool, children: &[NodeId]) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let mut span = span;
        let mut keyed = Vec::with_capacity(children.len());
        for &child in children {
            let node = &mut self.nodes[child.index()];
            debug_assert!(node.parent.is_none(), "node {child} adopted twice");
            node.parent = Some(id);
            span = span.merge(node.span);
            keyed.push((node.span.start, child));
        }
        keyed.sort_by_key(|&(start, child)| (start, child));
        self.nodes.push(Node {
            kind,
            span,
            is_complete,
            parent: None,
            children: keyed,
        });
        id
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn is_complete(&self, id: NodeId) -> bool {
        self.nodes[id.index()].is_complete
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node allocated after `len` (used when a speculative parse is abandoned).
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
        for node in &mut self.nodes {
            if node.parent.is_some_and(|p| p.index() >= len) {
                node.parent = None;
            }
        }
        self.attributes.retain(|id, _| id.index() < len);
    }

    pub fn attributes_mut(&mut self, id: NodeId) -> &mut AttributeBag {
        self.attributes.entry(id).or_default()
    }

    pub fn finish(self, root: NodeId, lines: LineOffsetTable) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root,
            lines,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(builder: &mut TreeBuilder, value: i64, start: usize, end: usize) -> NodeId {
        builder.alloc(NodeKind::Literal(Literal::Int(value)), Span::new(start, end), true, &[])
    }

    #[test]
    fn test_alloc_sorts_children_and_widens_span() {
        let mut builder = TreeBuilder::new();
        let b = literal(&mut builder, 2, 10, 11);
        let a = literal(&mut builder, 1, 4, 5);
        let parent = builder.alloc(
            NodeKind::Binary(BinaryExpr {
                op: BinaryOp::Add,
                lhs: a,
                rhs: b,
            }),
            Span::new(6, 7),
            true,
            &[b, a],
        );
        let tree = builder.finish(parent, LineOffsetTable::default());
        let node = tree.node(parent);
        assert_eq!(node.span, Span::new(4, 11));
        assert_eq!(node.children().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(tree.node(a).parent(), Some(parent));
    }

    #[test]
    fn test_truncate_releases_adopted_children() {
        let mut builder = TreeBuilder::new();
        let a = literal(&mut builder, 1, 0, 1);
        let mark = builder.len();
        let wrapper = builder.alloc(NodeKind::Grouped(GroupedExpr { inner: a }), Span::new(0, 3), true, &[a]);
        builder.attributes_mut(wrapper);
        builder.truncate(mark);
        assert_eq!(builder.len(), 1);
        let root = builder.alloc(NodeKind::Grouped(GroupedExpr { inner: a }), Span::new(0, 3), true, &[a]);
        let tree = builder.finish(root, LineOffsetTable::default());
        assert_eq!(tree.node(a).parent(), Some(root));
        assert!(tree.attributes(root).is_none());
    }

    #[test]
    fn test_span_contains_end_offset() {
        let span = Span::new(3, 7);
        assert!(span.contains(3));
        assert!(span.contains(7));
        assert!(!span.contains(8));
        assert!(span.covers(Span::new(4, 7)));
    }
}
