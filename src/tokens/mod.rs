//! Recorded tokens and the structures derived from them.
//!
//! - [`store`]: the growable log the rule engine writes to.
//! - [`order`]: the log regrouped into one bucket per nesting depth.
//! - [`tree`]: an arena tree rebuilt from span containment.
//! - [`walk`]: a lazy pre-order walk over the buckets, with gap items for text
//!   no child claims.

pub mod order;
pub mod store;
pub mod token;
pub mod tree;
pub mod walk;

pub use order::OrderedTokens;
pub use store::TokenStore;
pub use token::{OrderedToken, Token};
pub use tree::{NodeId, SyntaxNode, SyntaxTree};
pub use walk::{GapKind, PreOrder, WalkItem, WalkKind};

/// Collects `buffer[begin..end]`, clamped to the buffer.
pub(crate) fn slice(buffer: &[char], begin: usize, end: usize) -> String {
    let end = end.min(buffer.len());
    let begin = begin.min(end);
    buffer[begin..end].iter().collect()
}
