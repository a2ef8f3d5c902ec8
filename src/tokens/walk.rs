//! # Diagnostics Walker
//!
//! A depth-first, pre-order walk that rebuilds the token nesting straight from
//! the depth buckets, without the arena. Alongside real tokens it yields gap
//! items for text that a parent spans but none of its children claim, so the
//! leaves and gaps of a walk over a successful parse spell out the source.
//!
//! Children of a token recorded at depth `d` sit in bucket `d + 1`, in a
//! contiguous run directly before the run of its next sibling's children. The
//! walk keeps one read position per bucket and never looks back.

use strum_macros::Display;

use super::order::OrderedTokens;
use super::slice;
use super::token::OrderedToken;
use crate::peg::rule::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GapKind {
    /// Before the first child.
    Prefix,
    /// Between two children.
    Infix,
    /// After the last child.
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkKind {
    Token(Symbol),
    Gap(GapKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkItem {
    pub kind: WalkKind,
    pub begin: usize,
    pub end: usize,
    pub level: usize,
    pub leaf: bool,
}

impl WalkItem {
    pub fn is_gap(&self) -> bool {
        matches!(self.kind, WalkKind::Gap(_))
    }

    pub fn label(&self) -> String {
        match self.kind {
            WalkKind::Token(symbol) => symbol.to_string(),
            WalkKind::Gap(gap) => gap.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    token: OrderedToken,
    level: usize,
    claimed_to: usize,
    had_child: bool,
}

pub struct PreOrder<'a> {
    ordered: &'a OrderedTokens,
    read: Vec<usize>,
    stack: Vec<Frame>,
    pending: Option<OrderedToken>,
}

impl<'a> PreOrder<'a> {
    pub fn new(ordered: &'a OrderedTokens) -> Self {
        Self {
            ordered,
            read: vec![0; ordered.depth_count()],
            stack: Vec::new(),
            pending: None,
        }
    }

    fn peek(&self, depth: usize) -> Option<OrderedToken> {
        let position = *self.read.get(depth)?;
        self.ordered.get(depth, position).copied()
    }

    fn belongs_to(parent: Option<&OrderedToken>, token: &OrderedToken) -> bool {
        parent.map_or(true, |parent| parent.is_parent_of(token))
    }

    /// Steps over zero-width tokens under `parent`, together with anything
    /// nested inside them.
    fn skip_hidden(&mut self, depth: usize, parent: Option<OrderedToken>) {
        while let Some(token) = self.peek(depth) {
            if !token.token.is_empty() || !Self::belongs_to(parent.as_ref(), &token) {
                break;
            }
            self.read[depth] += 1;
            self.skip_subtree(token, depth + 1);
        }
    }

    fn skip_subtree(&mut self, parent: OrderedToken, depth: usize) {
        while let Some(token) = self.peek(depth) {
            if !parent.is_parent_of(&token) {
                break;
            }
            self.read[depth] += 1;
            self.skip_subtree(token, depth + 1);
        }
    }

    fn next_child(&mut self, depth: usize, parent: Option<OrderedToken>) -> Option<OrderedToken> {
        self.skip_hidden(depth, parent);
        let token = self.peek(depth)?;
        if !Self::belongs_to(parent.as_ref(), &token) {
            return None;
        }
        self.read[depth] += 1;
        Some(token)
    }

    fn has_child(&mut self, token: OrderedToken) -> bool {
        let depth = token.depth() + 1;
        self.skip_hidden(depth, Some(token));
        self.peek(depth)
            .map_or(false, |child| token.is_parent_of(&child))
    }

    fn open(&mut self, token: OrderedToken) -> WalkItem {
        let leaf = !self.has_child(token);
        if !leaf {
            self.stack.push(Frame {
                token,
                level: token.depth(),
                claimed_to: token.begin(),
                had_child: false,
            });
        }
        WalkItem {
            kind: WalkKind::Token(token.symbol()),
            begin: token.begin(),
            end: token.end(),
            level: token.depth(),
            leaf,
        }
    }

    fn gap(kind: GapKind, begin: usize, end: usize, level: usize) -> WalkItem {
        WalkItem {
            kind: WalkKind::Gap(kind),
            begin,
            end,
            level,
            leaf: true,
        }
    }
}

impl Iterator for PreOrder<'_> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        if let Some(token) = self.pending.take() {
            return Some(self.open(token));
        }
        loop {
            let Some(frame) = self.stack.last().copied() else {
                let root = self.next_child(0, None)?;
                return Some(self.open(root));
            };
            let level = frame.level + 1;
            match self.next_child(level, Some(frame.token)) {
                Some(child) => {
                    if let Some(top) = self.stack.last_mut() {
                        top.claimed_to = child.end();
                        top.had_child = true;
                    }
                    if child.begin() > frame.claimed_to {
                        let kind = if frame.had_child {
                            GapKind::Infix
                        } else {
                            GapKind::Prefix
                        };
                        self.pending = Some(child);
                        return Some(Self::gap(kind, frame.claimed_to, child.begin(), level));
                    }
                    return Some(self.open(child));
                }
                None => {
                    self.stack.pop();
                    if frame.claimed_to < frame.token.end() {
                        return Some(Self::gap(
                            GapKind::Suffix,
                            frame.claimed_to,
                            frame.token.end(),
                            level,
                        ));
                    }
                }
            }
        }
    }
}

/// Concatenates the text of every leaf and gap of a walk.
pub fn leaf_text(ordered: &OrderedTokens, buffer: &[char]) -> String {
    PreOrder::new(ordered)
        .filter(|item| item.leaf)
        .map(|item| slice(buffer, item.begin, item.end))
        .collect()
}

/// Indented listing of a walk: label and quoted text per item.
pub fn render_syntax_tree(ordered: &OrderedTokens, buffer: &[char]) -> String {
    PreOrder::new(ordered)
        .map(|item| {
            format!(
                "{:indent$}{} {:?}\n",
                "",
                item.label(),
                slice(buffer, item.begin, item.end),
                indent = item.level
            )
        })
        .collect()
}
