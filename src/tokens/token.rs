use std::fmt;

use crate::peg::rule::Symbol;

/// One successful match recorded by the rule engine.
///
/// `depth` is the nesting depth at which the match was recorded. The position
/// of the token in emission order is not stored here; it is assigned when the
/// log is regrouped (see [`OrderedToken`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    pub begin: usize,
    pub end: usize,
    pub depth: usize,
}

impl Token {
    pub fn new(symbol: impl Into<Symbol>, begin: usize, end: usize, depth: usize) -> Self {
        Self {
            symbol: symbol.into(),
            begin,
            end,
            depth,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// True when `other` lies within this token's span.
    pub fn contains(&self, other: &Token) -> bool {
        self.begin <= other.begin && self.end >= other.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.symbol, self.begin, self.end, self.depth)
    }
}

/// A token after reordering, carrying its original emission index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedToken {
    pub token: Token,
    pub index: usize,
}

impl OrderedToken {
    pub fn symbol(&self) -> Symbol {
        self.token.symbol
    }

    pub fn begin(&self) -> usize {
        self.token.begin
    }

    pub fn end(&self) -> usize {
        self.token.end
    }

    pub fn depth(&self) -> usize {
        self.token.depth
    }

    /// A parent spans its child and is emitted after it, since rules record
    /// their token only once their body has matched.
    pub fn is_parent_of(&self, other: &OrderedToken) -> bool {
        self.token.contains(&other.token) && self.index > other.index
    }
}
