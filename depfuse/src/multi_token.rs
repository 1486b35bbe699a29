use std::ops::RangeInclusive;

use crate::Token;

/// Multi-word token.
///
/// A `MultiToken` records a surface form spanning the tokens `start..=end`, e.g. Spanish
/// *del* covering *de* and *el*. It references the underlying tokens by id, the annotation of
/// the range row itself is kept in `token` so the row can be written again.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MultiToken {
    start: usize,
    end: usize,
    token: Token,
}

impl MultiToken {
    /// Construct a new `MultiToken` over `start..=end`.
    ///
    /// Panics if `start >= end`.
    pub fn new(start: usize, end: usize, token: Token) -> Self {
        assert!(start < end, "Multi token start has to be smaller than end.");
        MultiToken { start, end, token }
    }

    /// First token id covered by the multi token.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last token id covered by the multi token.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The covered token ids.
    pub fn span(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Returns whether `id` is covered by the multi token.
    pub fn covers(&self, id: usize) -> bool {
        self.start <= id && id <= self.end
    }

    /// The fused surface form.
    pub fn form(&self) -> Option<&str> {
        self.token.form()
    }

    /// Annotation of the range row.
    pub fn token(&self) -> &Token {
        &self.token
    }
}
