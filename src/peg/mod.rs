//! # Rule Engine
//!
//! A packrat-style backtracking matcher. The grammar in [`grammar`] is written
//! as ordinary functions over a [`Cursor`], combined with the operators in
//! [`combinators`]. Matching produces no values; it only records tokens, flat
//! `(symbol, begin, end, depth)` spans, into the cursor's token store. Those
//! tokens are later reordered, assembled into trees and replayed by the action
//! interpreter. Rules that several alternatives revisit at the same offset
//! go through [`Cursor::memoized`] and run once per offset.
//!
//! The grammar is not left-recursive. A left-recursive rule would recurse
//! without consuming input and never terminate; nothing here detects that.

pub mod combinators;
pub mod cursor;
pub mod grammar;
pub mod rule;

pub use cursor::{Checkpoint, Cursor, Frontier, OpenRule, END_SYMBOL};
pub use rule::{Action, Mark, Rule, Symbol};
