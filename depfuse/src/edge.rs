use std::fmt;
use std::mem;

/// Enum representing dependency relations.
///
/// The label of an edge is its dependency relation, `None` if the relation is unlabeled.
/// `Primary` edges form the dependency tree, `Secondary` edges carry enhanced dependencies and
/// may add further heads to a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Primary(Option<String>),
    Secondary(Option<String>),
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.deprel() {
            Some(deprel) => write!(f, "{}", deprel),
            None => write!(f, "_"),
        }
    }
}

impl Edge {
    /// Create a new primary Edge with the given relation.
    pub fn new_primary<S>(deprel: Option<S>) -> Self
    where
        S: Into<String>,
    {
        Edge::Primary(deprel.map(Into::into))
    }

    /// Create a new secondary Edge with the given relation.
    pub fn new_secondary<S>(deprel: Option<S>) -> Self
    where
        S: Into<String>,
    {
        Edge::Secondary(deprel.map(Into::into))
    }

    /// Return whether the Edge is primary.
    pub fn is_primary(&self) -> bool {
        match self {
            Edge::Primary(_) => true,
            Edge::Secondary(_) => false,
        }
    }

    /// Return whether the Edge is secondary.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary()
    }

    /// Get the dependency relation.
    pub fn deprel(&self) -> Option<&str> {
        match self {
            Edge::Primary(e) => e.as_ref().map(String::as_str),
            Edge::Secondary(e) => e.as_ref().map(String::as_str),
        }
    }

    /// Replace the dependency relation.
    ///
    /// Returns the replaced relation.
    pub fn set_deprel<S>(&mut self, new_deprel: Option<S>) -> Option<String>
    where
        S: Into<String>,
    {
        match self {
            Edge::Primary(e) => mem::replace(e, new_deprel.map(Into::into)),
            Edge::Secondary(e) => mem::replace(e, new_deprel.map(Into::into)),
        }
    }
}
