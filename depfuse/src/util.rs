use std::borrow::Borrow;
use std::collections::HashSet;
use std::io::BufRead;

use failure::Error;

use crate::DependencyTree;

/// Struct to climb up a `DependencyTree`.
///
/// This struct does not borrow from the tree in order to allow mutation during climbing.
///
/// `Climber` advances to the next head before returning the previous one. Re-attaching the
/// token returned from `next` is not reflected in the path, re-initialize the climber with the
/// previously returned token if the updated path matters.
///
/// The climber follows primary edges only and does not detect cycles.
pub struct Climber {
    cur: Option<usize>,
}

impl Climber {
    /// Constructs a new `Climber` starting below the head of `id`.
    pub fn new(id: usize, tree: &DependencyTree) -> Self {
        let cur = tree.head(id).map(|(head, _)| head);
        Climber { cur }
    }

    /// Moves up the tree by following the primary incoming edge.
    ///
    /// This method behaves like an iterator, returning `Some(id)` before reaching the root.
    /// Calling this method again in the final state will return `None`.
    pub fn next(&mut self, tree: &DependencyTree) -> Option<usize> {
        if let Some(id) = self.cur {
            self.cur = tree.head(id).map(|(head, _)| head);
            Some(id)
        } else {
            None
        }
    }
}

/// LabelSet.
#[derive(Clone, Debug)]
pub enum LabelSet {
    /// Variant used for positive matching.
    Positive(HashSet<String>),
    /// Variant used for negative matching.
    Negative(HashSet<String>),
}

impl LabelSet {
    /// Read a positive `LabelSet` from whitespace separated labels.
    pub fn positive_from_reader(reader: impl BufRead) -> Result<Self, Error> {
        let mut set = HashSet::new();
        for line in reader.lines() {
            set.extend(line?.split_whitespace().map(ToOwned::to_owned));
        }
        Ok(LabelSet::Positive(set))
    }

    /// Returns whether the query matched the `LabelSet`.
    ///
    /// If `self` is `LabelSet::Positive`, `true` is returned if the query was found, `false`
    /// otherwise. If `self` is `LabelSet::Negative`, `true` is returned if the query was not found.
    pub fn matches(&self, q: impl Borrow<str>) -> bool {
        match self {
            LabelSet::Positive(ref set) => set.contains(q.borrow()),
            LabelSet::Negative(ref set) => !set.contains(q.borrow()),
        }
    }
}
