//! # Backtracking Cursor
//!
//! The cursor owns everything the rule engine mutates while matching: the
//! character buffer, the current offset, the nesting depth, the count of live
//! tokens and the [`TokenStore`] they are written to.
//!
//! Rules never undo their own side effects piecemeal. Instead every attempt
//! saves a [`Checkpoint`] and restores it wholesale on failure, so a failing
//! alternative always leaves position, token count and depth exactly as they
//! were before it ran.
//!
//! ## Memoisation
//!
//! Rules entered through [`Cursor::memoized`] are evaluated at most once per
//! offset. A success is remembered as its end offset and the tokens it
//! recorded, with depths relative to the rule; a later attempt at the same
//! offset replays them at the current depth. This keeps the cost of nested
//! expressions linear in their nesting instead of doubling per level.
//!
//! ## Frontier
//!
//! The first time a primitive inspects an offset past every earlier one, the
//! cursor snapshots the rules open at that moment and the tokens recorded so
//! far. Slots of that snapshot that later branches overwrite are copied aside
//! first, so [`Cursor::frontier`] returns the live path to the farthest point
//! even after the parse has backtracked away from it.

use std::collections::HashMap;

use tracing::trace;

use crate::peg::rule::{Action, Rule, Symbol};
use crate::tokens::{Token, TokenStore};

/// Appended after the last character of every source buffer.
pub const END_SYMBOL: char = '\u{4}';

pub const DEFAULT_TOKEN_CAPACITY: usize = 1024;

/// The saved `(position, token_count, depth)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub position: usize,
    pub token_count: usize,
    pub depth: usize,
}

/// A rule that was entered and has not returned yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRule {
    pub rule: Rule,
    pub begin: usize,
    pub depth: usize,
}

/// The farthest offset inspected, and the path that first reached it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    pub offset: usize,
    /// Open rules, outermost first.
    pub open: Vec<OpenRule>,
    /// Tokens recorded before the offset was reached, in emission order.
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone)]
enum Memo {
    Failed,
    Matched { end: usize, tokens: Vec<Token> },
}

// snapshot = store[..len] ++ displaced
#[derive(Debug, Clone)]
struct Snapshot {
    offset: usize,
    open: Vec<OpenRule>,
    len: usize,
    displaced: Vec<Token>,
}

#[derive(Debug, Clone)]
pub struct Cursor {
    buffer: Vec<char>,
    position: usize,
    depth: usize,
    token_count: usize,
    tokens: TokenStore,
    open: Vec<OpenRule>,
    snapshot: Option<Snapshot>,
    memo: HashMap<(Rule, usize), Memo>,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self::with_capacity(source, DEFAULT_TOKEN_CAPACITY)
    }

    pub fn with_capacity(source: &str, token_capacity: usize) -> Self {
        let mut buffer: Vec<char> = source.chars().collect();
        buffer.push(END_SYMBOL);
        Self {
            buffer,
            position: 0,
            depth: 0,
            token_count: 0,
            tokens: TokenStore::with_capacity(token_capacity),
            open: Vec::new(),
            snapshot: None,
            memo: HashMap::new(),
        }
    }

    /// Number of source characters, excluding the sentinel.
    pub fn input_len(&self) -> usize {
        self.buffer.len() - 1
    }

    /// The source characters, excluding the sentinel.
    pub fn source(&self) -> &[char] {
        &self.buffer[..self.input_len()]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// The farthest offset any primitive inspected.
    pub fn farthest(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |snapshot| snapshot.offset)
    }

    /// The path to the farthest offset, as it was when first reached.
    pub fn frontier(&self) -> Frontier {
        let Some(snapshot) = &self.snapshot else {
            return Frontier::default();
        };
        let live = self.tokens.as_slice();
        let mut tokens = live[..snapshot.len.min(live.len())].to_vec();
        tokens.extend_from_slice(&snapshot.displaced);
        Frontier {
            offset: snapshot.offset,
            open: snapshot.open.clone(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            token_count: self.token_count,
            depth: self.depth,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.token_count = checkpoint.token_count;
        self.depth = checkpoint.depth;
    }

    /// Drops the slots written by abandoned branches. Called once the top rule
    /// has matched.
    pub fn commit(&mut self) {
        self.tokens.trim(self.token_count);
    }

    /// Hands over the buffer (without sentinel) and the token store.
    pub fn into_parts(mut self) -> (Vec<char>, TokenStore) {
        self.buffer.pop();
        (self.buffer, self.tokens)
    }

    fn current(&mut self) -> Option<char> {
        let advanced = self
            .snapshot
            .as_ref()
            .map_or(true, |snapshot| self.position > snapshot.offset);
        if advanced {
            self.snapshot = Some(Snapshot {
                offset: self.position,
                open: self.open.clone(),
                len: self.token_count,
                displaced: Vec::new(),
            });
        }
        if self.position < self.input_len() {
            Some(self.buffer[self.position])
        } else {
            None
        }
    }

    /// Matches one character satisfying `predicate`.
    pub fn char_if(&mut self, predicate: impl Fn(char) -> bool) -> bool {
        match self.current() {
            Some(c) if predicate(c) => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    pub fn char(&mut self, expected: char) -> bool {
        self.char_if(|c| c == expected)
    }

    /// Matches one character in the inclusive range `low..=high`.
    pub fn range(&mut self, low: char, high: char) -> bool {
        self.char_if(|c| (low..=high).contains(&c))
    }

    /// Matches `text` exactly; on a partial match the position is reset.
    pub fn literal(&mut self, text: &str) -> bool {
        let start = self.position;
        for expected in text.chars() {
            if !self.char(expected) {
                self.position = start;
                return false;
            }
        }
        true
    }

    /// The dot: any character except the end of input.
    pub fn any(&mut self) -> bool {
        self.char_if(|_| true)
    }

    pub fn end_of_input(&mut self) -> bool {
        self.current().is_none()
    }

    fn emit(&mut self, token: Token) {
        let index = self.token_count;
        if let Some(snapshot) = self.snapshot.as_mut() {
            if index < snapshot.len {
                let overwritten = &self.tokens.as_slice()[index..snapshot.len];
                snapshot.displaced.splice(0..0, overwritten.iter().copied());
                snapshot.len = index;
            }
        }
        self.tokens.record(index, token);
        self.token_count += 1;
    }

    /// Runs `body` one level deeper and records a token for `rule` spanning
    /// whatever it consumed. On failure the checkpoint taken on entry is
    /// restored.
    pub fn rule(&mut self, rule: Rule, body: impl FnOnce(&mut Cursor) -> bool) -> bool {
        self.capture(Symbol::Rule(rule), body)
    }

    /// Like [`Cursor::rule`], but records a [`Symbol::Text`] capture.
    pub fn text(&mut self, body: impl FnOnce(&mut Cursor) -> bool) -> bool {
        self.capture(Symbol::Text, body)
    }

    fn capture(&mut self, symbol: Symbol, body: impl FnOnce(&mut Cursor) -> bool) -> bool {
        let checkpoint = self.checkpoint();
        if let Some(rule) = symbol.rule() {
            self.open.push(OpenRule {
                rule,
                begin: self.position,
                depth: self.depth,
            });
        }
        self.depth += 1;
        let matched = body(self);
        if symbol.rule().is_some() {
            self.open.pop();
        }
        if matched {
            self.depth -= 1;
            self.emit(Token::new(symbol, checkpoint.position, self.position, self.depth));
            trace!(%symbol, begin = checkpoint.position, end = self.position, "matched");
            true
        } else {
            self.restore(checkpoint);
            false
        }
    }

    /// Like [`Cursor::rule`], but evaluated once per offset. Repeated attempts
    /// replay the first outcome.
    pub fn memoized(&mut self, rule: Rule, body: impl FnOnce(&mut Cursor) -> bool) -> bool {
        let key = (rule, self.position);
        if let Some(memo) = self.memo.get(&key).cloned() {
            trace!(%rule, at = self.position, "memo hit");
            return match memo {
                Memo::Failed => false,
                Memo::Matched { end, tokens } => {
                    for token in tokens {
                        self.emit(Token {
                            depth: token.depth + self.depth,
                            ..token
                        });
                    }
                    self.position = end;
                    true
                }
            };
        }

        let start = self.token_count;
        let depth = self.depth;
        let memo = if self.rule(rule, body) {
            let tokens = self.tokens.as_slice()[start..self.token_count]
                .iter()
                .map(|token| Token {
                    depth: token.depth - depth,
                    ..*token
                })
                .collect();
            Memo::Matched {
                end: self.position,
                tokens,
            }
        } else {
            Memo::Failed
        };
        let matched = matches!(memo, Memo::Matched { .. });
        self.memo.insert(key, memo);
        matched
    }

    /// Records a zero-width action token at the current depth. Always matches.
    pub fn action(&mut self, action: Action) -> bool {
        self.emit(Token::new(action, self.position, self.position, self.depth));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peg::rule::Mark;
    use std::cell::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitives() {
        let mut cursor = Cursor::new("ab9");
        assert!(cursor.char('a'));
        assert!(!cursor.char('a'));
        assert!(cursor.range('a', 'c'));
        assert!(cursor.char_if(|c| c.is_ascii_digit()));
        assert!(cursor.end_of_input());
        assert!(!cursor.any());
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_sentinel_is_not_matchable() {
        let mut cursor = Cursor::new("");
        assert!(!cursor.char(END_SYMBOL));
        assert!(!cursor.any());
        assert!(cursor.end_of_input());
    }

    #[test]
    fn test_partial_literal_resets_position() {
        let mut cursor = Cursor::new("=x");
        assert!(!cursor.literal("=>"));
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.farthest(), 1);
        assert!(cursor.literal("=x"));
    }

    #[test]
    fn test_rule_records_at_entry_depth() {
        let mut cursor = Cursor::new("ab");
        let matched = cursor.rule(Rule::Name, |c| {
            c.rule(Rule::Digit, |c| c.char('a')) && c.action(Action::Mark(Mark::Scoped)) && c.char('b')
        });
        assert!(matched);
        let tokens = cursor.tokens().as_slice();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], Token::new(Rule::Digit, 0, 1, 1));
        assert_eq!(tokens[1], Token::new(Action::Mark(Mark::Scoped), 1, 1, 1));
        assert_eq!(tokens[2], Token::new(Rule::Name, 0, 2, 0));
        assert_eq!(cursor.depth(), 0);
    }

    #[test]
    fn test_failed_rule_restores_checkpoint() {
        let mut cursor = Cursor::new("abc");
        assert!(cursor.char('a'));
        let before = cursor.checkpoint();
        let matched = cursor.rule(Rule::Name, |c| {
            c.rule(Rule::Digit, |c| c.char('b')) && c.char('x')
        });
        assert!(!matched);
        assert_eq!(cursor.checkpoint(), before);
        // the abandoned slot stays behind until it is overwritten
        assert_eq!(cursor.tokens().len(), 1);
        cursor.commit();
        assert!(cursor.tokens().is_empty());
    }

    #[test]
    fn test_memo_replays_at_the_current_depth() {
        let runs = Cell::new(0);
        let digit = |c: &mut Cursor| {
            c.memoized(Rule::Digit, |c| {
                runs.set(runs.get() + 1);
                c.text(|c| c.range('0', '9'))
            })
        };

        let mut cursor = Cursor::new("7");
        assert!(!cursor.rule(Rule::Name, |c| digit(c) && c.char('x')));
        let first = cursor.tokens().as_slice()[..2].to_vec();
        assert_eq!(first[1], Token::new(Rule::Digit, 0, 1, 1));

        assert!(cursor.rule(Rule::Integer, |c| c.rule(Rule::WholeNum, digit)));
        assert_eq!(runs.get(), 1);
        let tokens = cursor.tokens().as_slice();
        assert_eq!(tokens[0], Token::new(Symbol::Text, 0, 1, first[0].depth + 1));
        assert_eq!(tokens[1], Token::new(Rule::Digit, 0, 1, 2));
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_memo_remembers_failure() {
        let runs = Cell::new(0);
        let mut cursor = Cursor::new("a");
        for _ in 0..3 {
            assert!(!cursor.memoized(Rule::Digit, |c| {
                runs.set(runs.get() + 1);
                c.range('0', '9')
            }));
        }
        assert_eq!(runs.get(), 1);
        assert_eq!(cursor.checkpoint(), Cursor::new("a").checkpoint());
    }

    #[test]
    fn test_frontier_survives_backtracking() {
        let mut cursor = Cursor::new("ab");
        let matched = cursor.rule(Rule::Line, |c| {
            let deep = c.rule(Rule::Assignment, |c| {
                c.rule(Rule::Name, |c| c.char('a')) && c.char('x')
            });
            deep || (c.rule(Rule::Digit, |c| c.char('a')) && c.rule(Rule::Sp, |c| c.char('b')))
        });
        assert!(matched);

        // the first branch reached offset 1, and the second overwrote its slot
        let frontier = cursor.frontier();
        assert_eq!(frontier.offset, 1);
        assert_eq!(
            frontier.open,
            vec![
                OpenRule { rule: Rule::Line, begin: 0, depth: 0 },
                OpenRule { rule: Rule::Assignment, begin: 0, depth: 1 },
            ]
        );
        assert_eq!(frontier.tokens, vec![Token::new(Rule::Name, 0, 1, 2)]);
        assert_eq!(cursor.tokens().as_slice()[0], Token::new(Rule::Digit, 0, 1, 1));
    }

    #[test]
    fn test_frontier_before_any_input_is_empty() {
        let cursor = Cursor::new("abc");
        assert_eq!(cursor.frontier(), Frontier::default());
        assert_eq!(cursor.farthest(), 0);
    }
}
