//! # Token Recorder
//!
//! An append-only log of successful matches. The rule engine writes tokens at
//! its current token count; when an alternative fails the count is rewound and
//! later matches overwrite the abandoned slots. Once the top rule succeeds the
//! store is trimmed to the count reached, which drops every slot written by an
//! abandoned branch.
//!
//! On failure the store is left untrimmed. The cursor's frontier reads its
//! live prefix from here.

use tracing::debug;

use super::token::Token;

#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Vec<Token>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tokens: Vec::with_capacity(capacity.max(1)),
        }
    }

    /// Writes `token` at `index`.
    ///
    /// `index` is at most the current length: either a slot left behind by a
    /// rewound branch is overwritten, or the token is appended. Appending into
    /// a full store doubles its capacity first.
    pub fn record(&mut self, index: usize, token: Token) {
        if self.set(index, token) {
            return;
        }
        debug_assert_eq!(index, self.tokens.len(), "token slots must be contiguous");
        if self.tokens.len() == self.tokens.capacity() {
            let additional = self.tokens.capacity().max(1);
            self.tokens.reserve_exact(additional);
            debug!(capacity = self.tokens.capacity(), "token store grown");
        }
        self.tokens.push(token);
    }

    /// Overwrites an existing slot.
    ///
    /// Returns `false` when `index` is past the written slots.
    pub(crate) fn set(&mut self, index: usize, token: Token) -> bool {
        match self.tokens.get_mut(index) {
            Some(slot) => {
                *slot = token;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Drops every slot at or past `len`.
    pub fn trim(&mut self, len: usize) {
        self.tokens.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tokens.capacity()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peg::rule::Rule;
    use pretty_assertions::assert_eq;

    fn token(begin: usize) -> Token {
        Token::new(Rule::Digit, begin, begin + 1, 1)
    }

    #[test]
    fn test_growth_preserves_entries() {
        let mut store = TokenStore::with_capacity(2);
        for i in 0..9 {
            store.record(i, token(i));
        }
        assert_eq!(store.len(), 9);
        assert!(store.capacity() >= 9);
        let begins: Vec<usize> = store.as_slice().iter().map(|t| t.begin).collect();
        assert_eq!(begins, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_capacity_doubles() {
        let mut store = TokenStore::with_capacity(4);
        for i in 0..4 {
            store.record(i, token(i));
        }
        let before = store.capacity();
        store.record(4, token(4));
        assert!(store.capacity() >= before * 2);
    }

    #[test]
    fn test_record_overwrites_rewound_slots() {
        let mut store = TokenStore::new();
        store.record(0, token(0));
        store.record(1, token(1));
        store.record(2, token(2));
        // a branch failed and the count went back to 1
        store.record(1, token(7));
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(1).map(|t| t.begin), Some(7));
        store.trim(2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2), None);
    }

    #[test]
    fn test_set() {
        let mut store = TokenStore::new();
        store.record(0, token(0));
        assert!(store.set(0, token(5)));
        assert!(!store.set(3, token(5)));
        assert_eq!(store.get(0).map(|t| t.begin), Some(5));
    }
}
