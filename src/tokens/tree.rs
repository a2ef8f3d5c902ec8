//! # Tree Builder
//!
//! Rebuilds the nesting of a flat token log from span containment alone.
//!
//! Tokens are visited in emission order. A rule records its token only after
//! its body matched, so every child is emitted before its parent. Pending
//! nodes wait on a stack; when a token arrives, every stack-top node whose
//! span it contains becomes one of its children. Zero-width tokens (actions,
//! empty repetitions) are skipped: they claim no text and would otherwise be
//! adopted by whatever span happens to start at their offset.
//!
//! Nodes live in an arena and link to each other by [`NodeId`].

use super::slice;
use super::token::{OrderedToken, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub token: OrderedToken,
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    roots: Vec<NodeId>,
}

impl SyntaxTree {
    pub fn build(tokens: &[Token]) -> Self {
        let mut nodes: Vec<SyntaxNode> = Vec::with_capacity(tokens.len());
        let mut stack: Vec<NodeId> = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                continue;
            }
            let id = NodeId(nodes.len());
            nodes.push(SyntaxNode {
                token: OrderedToken {
                    token: *token,
                    index,
                },
                first_child: None,
                next_sibling: None,
            });

            // popped latest first, so prepending restores emission order
            let mut first_child = None;
            while let Some(&top) = stack.last() {
                if !nodes[id.0].token.is_parent_of(&nodes[top.0].token) {
                    break;
                }
                stack.pop();
                nodes[top.0].next_sibling = first_child;
                first_child = Some(top);
            }
            nodes[id.0].first_child = first_child;
            stack.push(id);
        }

        Self {
            nodes,
            roots: stack,
        }
    }

    /// The outermost node. For a successful parse this is the start rule.
    pub fn root(&self) -> Option<NodeId> {
        self.roots.last().copied()
    }

    /// Top-level nodes no later token contained, in emission order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.nodes[id.0].first_child,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in pre-order with their distance from the root they hang off.
    pub fn pre_order(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, usize)> =
            self.roots.iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, level)) = stack.pop() {
            out.push((id, level));
            let children: Vec<NodeId> = self.children(id).collect();
            stack.extend(children.into_iter().rev().map(|child| (child, level + 1)));
        }
        out
    }

    /// Indented listing, one node per line: symbol and quoted text.
    pub fn render(&self, buffer: &[char]) -> String {
        self.pre_order()
            .into_iter()
            .map(|(id, level)| {
                let token = &self.node(id).token;
                format!(
                    "{:indent$}{} {:?}\n",
                    "",
                    token.symbol(),
                    slice(buffer, token.begin(), token.end()),
                    indent = level
                )
            })
            .collect()
    }
}

pub struct Children<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.nodes[id.0].next_sibling;
        Some(id)
    }
}
