use super::token::{OrderedToken, Token};

/// Tokens regrouped by the depth they were recorded at.
///
/// Within a bucket tokens keep their emission order, and each one carries its
/// flat emission index. Built in a single pass after counting, with one extra
/// empty bucket past the deepest depth so that `bucket(depth + 1)` is always
/// valid for a populated depth.
#[derive(Debug, Clone, Default)]
pub struct OrderedTokens {
    buckets: Vec<Vec<OrderedToken>>,
}

impl OrderedTokens {
    pub fn new(tokens: &[Token]) -> Self {
        let mut counts: Vec<usize> = Vec::new();
        for token in tokens {
            if token.depth >= counts.len() {
                counts.resize(token.depth + 1, 0);
            }
            counts[token.depth] += 1;
        }
        counts.push(0);

        let mut buckets: Vec<Vec<OrderedToken>> = counts
            .iter()
            .map(|&count| Vec::with_capacity(count))
            .collect();
        for (index, token) in tokens.iter().enumerate() {
            buckets[token.depth].push(OrderedToken {
                token: *token,
                index,
            });
        }
        Self { buckets }
    }

    /// Number of buckets, including the trailing empty one.
    pub fn depth_count(&self) -> usize {
        self.buckets.len()
    }

    /// Tokens recorded at `depth`; empty past the deepest depth.
    pub fn bucket(&self, depth: usize) -> &[OrderedToken] {
        self.buckets.get(depth).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, depth: usize, position: usize) -> Option<&OrderedToken> {
        self.buckets.get(depth)?.get(position)
    }

    /// Buckets from depth zero down.
    pub fn iter(&self) -> impl Iterator<Item = &[OrderedToken]> + '_ {
        self.buckets.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
