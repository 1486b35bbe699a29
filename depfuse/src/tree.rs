use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::{Index, IndexMut};

use petgraph::prelude::{Direction, EdgeIndex, EdgeRef, NodeIndex, StableGraph};

use crate::util::Climber;
use crate::{Edge, MultiToken, Token};

/// Violations of the single-root tree property.
#[derive(Clone, Debug, Eq, PartialEq, Fail)]
pub enum TreeError {
    #[fail(display = "Token {} has no head", _0)]
    MissingHead(usize),
    #[fail(display = "The root has a head")]
    RootWithHead,
    #[fail(display = "Token {} is not connected to the root", _0)]
    Unreachable(usize),
}

/// `DependencyTree`
///
/// A `DependencyTree` represents one sentence. Tokens are stored in a `StableGraph` whose node
/// indices are the token ids: `0` is the virtual root, `1..=n_tokens()` are the words in
/// sentence order. Dependency relations are `Edge`s pointing from head to dependent.
///
/// Besides the graph, a tree keeps the comment lines preceding the sentence and the
/// multi-word tokens of the sentence, keyed by the first id they cover.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    graph: StableGraph<Token, Edge>,
    comments: Vec<String>,
    multi_tokens: BTreeMap<usize, MultiToken>,
}

impl Default for DependencyTree {
    fn default() -> Self {
        DependencyTree::new()
    }
}

impl DependencyTree {
    /// Construct a tree consisting of the virtual root.
    pub fn new() -> Self {
        let mut graph = StableGraph::new();
        graph.add_node(Token::root());
        DependencyTree {
            graph,
            comments: Vec::new(),
            multi_tokens: BTreeMap::new(),
        }
    }

    /// Append `token` to the sentence.
    ///
    /// Returns the id of the token.
    pub fn push(&mut self, token: Token) -> usize {
        self.graph.add_node(token).index()
    }

    /// Get the number of tokens, the root excluded.
    pub fn n_tokens(&self) -> usize {
        self.graph.node_count() - 1
    }

    /// Returns whether the tree holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.n_tokens() == 0
    }

    /// Get an iterator over the token ids in ascending order, the root excluded.
    pub fn ids<'a>(&'a self) -> impl Iterator<Item = usize> + 'a {
        self.graph
            .node_indices()
            .map(NodeIndex::index)
            .filter(|&id| id != 0)
    }

    /// Get the token with `id`.
    pub fn token(&self, id: usize) -> Option<&Token> {
        self.graph.node_weight(NodeIndex::new(id))
    }

    /// Get the token with `id` mutably.
    pub fn token_mut(&mut self, id: usize) -> Option<&mut Token> {
        self.graph.node_weight_mut(NodeIndex::new(id))
    }

    /// Attach `dependent` to `head`.
    ///
    /// A previous primary head of `dependent` is detached and returned together with its
    /// relation.
    ///
    /// Panics if `dependent` or `head` are not in the tree.
    pub fn set_head<S>(
        &mut self,
        dependent: usize,
        head: usize,
        deprel: Option<S>,
    ) -> Option<(usize, Option<String>)>
    where
        S: Into<String>,
    {
        let previous = self.primary_edge(dependent).and_then(|(old_head, edge)| {
            self.graph
                .remove_edge(edge)
                .map(|mut weight| (old_head, weight.set_deprel::<String>(None)))
        });
        self.graph.add_edge(
            NodeIndex::new(head),
            NodeIndex::new(dependent),
            Edge::new_primary(deprel),
        );
        previous
    }

    /// Add a secondary edge from `head` to `dependent`.
    ///
    /// Panics if `dependent` or `head` are not in the tree.
    pub fn add_secondary<S>(&mut self, dependent: usize, head: usize, deprel: Option<S>)
    where
        S: Into<String>,
    {
        self.graph.add_edge(
            NodeIndex::new(head),
            NodeIndex::new(dependent),
            Edge::new_secondary(deprel),
        );
    }

    /// Get the head and relation of `id`.
    ///
    /// Returns `None` for the root and for tokens without a primary head.
    pub fn head(&self, id: usize) -> Option<(usize, Option<&str>)> {
        self.graph
            .edges_directed(NodeIndex::new(id), Direction::Incoming)
            .find(|edge_ref| edge_ref.weight().is_primary())
            .map(|edge_ref| (edge_ref.source().index(), edge_ref.weight().deprel()))
    }

    fn primary_edge(&self, id: usize) -> Option<(usize, EdgeIndex)> {
        self.graph
            .edges_directed(NodeIndex::new(id), Direction::Incoming)
            .find(|edge_ref| edge_ref.weight().is_primary())
            .map(|edge_ref| (edge_ref.source().index(), edge_ref.id()))
    }

    /// Get the ids of the tokens attached to `id` through primary edges, in ascending order.
    pub fn dependents(&self, id: usize) -> Vec<usize> {
        let mut dependents = self
            .graph
            .edges_directed(NodeIndex::new(id), Direction::Outgoing)
            .filter(|edge_ref| edge_ref.weight().is_primary())
            .map(|edge_ref| edge_ref.target().index())
            .collect::<Vec<_>>();
        dependents.sort();
        dependents
    }

    /// Get the secondary heads and relations of `id` in the order they were added.
    pub fn secondary_heads(&self, id: usize) -> Vec<(usize, Option<&str>)> {
        let mut heads = self
            .graph
            .edges_directed(NodeIndex::new(id), Direction::Incoming)
            .filter(|edge_ref| edge_ref.weight().is_secondary())
            .map(|edge_ref| (edge_ref.id(), edge_ref.source().index(), edge_ref.weight()))
            .collect::<Vec<_>>();
        heads.sort_by_key(|&(edge, _, _)| edge);
        heads
            .into_iter()
            .map(|(_, head, edge)| (head, edge.deprel()))
            .collect()
    }

    /// Get the comment lines of the sentence.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Get the comment lines of the sentence mutably.
    pub fn comments_mut(&mut self) -> &mut Vec<String> {
        &mut self.comments
    }

    /// Get an iterator over the multi tokens ordered by their first token.
    pub fn multi_tokens<'a>(&'a self) -> impl Iterator<Item = &'a MultiToken> + 'a {
        self.multi_tokens.values()
    }

    /// Get the multi token starting at `start`.
    pub fn multi_token(&self, start: usize) -> Option<&MultiToken> {
        self.multi_tokens.get(&start)
    }

    /// Add a multi token.
    ///
    /// Returns the multi token previously starting at the same id.
    pub fn add_multi_token(&mut self, multi_token: MultiToken) -> Option<MultiToken> {
        self.multi_tokens.insert(multi_token.start(), multi_token)
    }

    /// Remove all multi tokens.
    pub fn clear_multi_tokens(&mut self) {
        self.multi_tokens.clear()
    }

    /// Get the ancestors of `id`, starting with its head and ending with the root.
    ///
    /// Climbing stops once the path is longer than the sentence, i.e. a token on a cycle gets a
    /// path of length `n_tokens() + 1` that does not end in the root.
    pub fn path_to_root(&self, id: usize) -> Vec<usize> {
        let mut path = Vec::new();
        let mut climber = Climber::new(id, self);
        while let Some(head) = climber.next(self) {
            path.push(head);
            if path.len() > self.n_tokens() {
                break;
            }
        }
        path
    }

    /// Get the number of ancestors of `id`.
    pub fn depth(&self, id: usize) -> usize {
        self.path_to_root(id).len()
    }

    /// Returns whether `head` is an ancestor of `dependent`.
    pub fn dominates(&self, head: usize, dependent: usize) -> bool {
        self.path_to_root(dependent).contains(&head)
    }

    /// Get the first id in `span` that is closest to the root.
    pub fn highest_in_span(&self, span: &[usize]) -> Option<usize> {
        let depths = span.iter().map(|&id| self.depth(id)).collect::<Vec<_>>();
        let min = depths.iter().min()?;
        depths
            .iter()
            .position(|depth| depth == min)
            .map(|idx| span[idx])
    }

    /// Get the first id in `span` that is farthest from the root.
    pub fn deepest_in_span(&self, span: &[usize]) -> Option<usize> {
        let depths = span.iter().map(|&id| self.depth(id)).collect::<Vec<_>>();
        let max = depths.iter().max()?;
        depths
            .iter()
            .position(|depth| depth == max)
            .map(|idx| span[idx])
    }

    /// Get the sentence as space separated forms.
    ///
    /// With `with_ids`, every form is prefixed by `id:`.
    pub fn sentence_string(&self, with_ids: bool) -> String {
        self.ids()
            .map(|id| {
                let form = self[id].form().unwrap_or("_");
                if with_ids {
                    format!("{}:{}", id, form)
                } else {
                    form.to_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Get the token ids in breadth-first order starting at the root.
    ///
    /// Every head precedes its dependents. Tokens that are not connected to the root follow in
    /// ascending order.
    pub fn topological_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut seen = vec![false; self.max_id() + 1];
        let mut queue = VecDeque::new();
        queue.push_back(0);
        seen[0] = true;
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for dependent in self.dependents(id) {
                if !seen[dependent] {
                    seen[dependent] = true;
                    queue.push_back(dependent);
                }
            }
        }
        order.extend(self.ids().filter(|&id| !seen[id]));
        order
    }

    /// Check that the primary edges form a tree rooted at `0`.
    ///
    /// Every token needs exactly one head, the root none, and every token has to be reachable
    /// from the root.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.head(0).is_some() {
            return Err(TreeError::RootWithHead);
        }
        for id in self.ids() {
            if self.head(id).is_none() {
                return Err(TreeError::MissingHead(id));
            }
        }
        let order = self.topological_order();
        let mut reachable = vec![false; self.max_id() + 1];
        let mut queue = vec![0];
        while let Some(id) = queue.pop() {
            reachable[id] = true;
            queue.extend(self.dependents(id));
        }
        match order.into_iter().find(|&id| !reachable[id]) {
            Some(id) => Err(TreeError::Unreachable(id)),
            None => Ok(()),
        }
    }

    /// Returns whether the primary edges form a tree rooted at `0`.
    pub fn is_tree(&self) -> bool {
        self.validate().is_ok()
    }

    /// Apply `f` to every primary and secondary edge.
    pub(crate) fn for_each_edge_mut(&mut self, mut f: impl FnMut(&mut Edge)) {
        for edge in self.edge_indices() {
            f(&mut self.graph[edge]);
        }
    }

    /// Remove the edges for which `remove` returns `true`.
    pub(crate) fn remove_edges(&mut self, remove: impl Fn(&Edge) -> bool) {
        for edge in self.edge_indices() {
            if remove(&self.graph[edge]) {
                self.graph.remove_edge(edge);
            }
        }
    }

    fn edge_indices(&self) -> Vec<EdgeIndex> {
        self.graph
            .node_indices()
            .flat_map(move |node| {
                self.graph
                    .edges_directed(node, Direction::Incoming)
                    .map(|edge_ref| edge_ref.id())
            })
            .collect()
    }

    /// Remove token `id` and all edges attached to it.
    pub(crate) fn remove_token(&mut self, id: usize) -> Option<Token> {
        self.graph.remove_node(NodeIndex::new(id))
    }

    /// Build a tree with contiguous ids from the tokens that are left.
    ///
    /// Surviving tokens keep their order, edges are rewritten to the new ids. Comments are
    /// carried over, multi tokens are dropped.
    pub(crate) fn renumbered(&self) -> DependencyTree {
        let mut tree = DependencyTree::new();
        tree.comments = self.comments.clone();

        let mut mapping = HashMap::new();
        mapping.insert(0, 0);
        for id in self.ids() {
            mapping.insert(id, tree.push(self[id].clone()));
        }

        for old_id in self.ids() {
            let new_id = mapping[&old_id];
            if let Some((head, deprel)) = self.head(old_id) {
                tree.set_head(new_id, mapping[&head], deprel);
            }
            for (head, deprel) in self.secondary_heads(old_id) {
                tree.add_secondary(new_id, mapping[&head], deprel);
            }
        }
        tree
    }

    fn max_id(&self) -> usize {
        self.graph
            .node_indices()
            .map(NodeIndex::index)
            .max()
            .unwrap_or(0)
    }
}

impl PartialEq for DependencyTree {
    fn eq(&self, other: &DependencyTree) -> bool {
        // cheap checks first
        if self.n_tokens() != other.n_tokens()
            || self.comments != other.comments
            || self.multi_tokens != other.multi_tokens
        {
            return false;
        }

        let ids = self.ids().collect::<Vec<_>>();
        if ids != other.ids().collect::<Vec<_>>() {
            return false;
        }

        ids.into_iter().all(|id| {
            self[id] == other[id]
                && self.head(id) == other.head(id)
                && self.secondary_heads(id) == other.secondary_heads(id)
        })
    }
}

impl Index<usize> for DependencyTree {
    type Output = Token;

    fn index(&self, index: usize) -> &<Self as Index<usize>>::Output {
        &self.graph[NodeIndex::new(index)]
    }
}

impl IndexMut<usize> for DependencyTree {
    fn index_mut(&mut self, index: usize) -> &mut Token {
        &mut self.graph[NodeIndex::new(index)]
    }
}

#[cfg(test)]
mod tests {
    use crate::{DependencyTree, MultiToken, Token, TreeError};

    #[test]
    fn heads_and_dependents() {
        let tree = some_tree();
        assert_eq!(tree.n_tokens(), 5);
        assert_eq!(tree.head(0), None);
        assert_eq!(tree.head(2), Some((0, Some("root"))));
        assert_eq!(tree.head(1), Some((2, Some("nsubj"))));
        assert_eq!(tree.dependents(2), vec![1, 4]);
        assert_eq!(tree.dependents(4), vec![3, 5]);
        assert!(tree.dependents(5).is_empty());
        assert_eq!(tree.secondary_heads(5), vec![(2, Some("obl")), (4, None)]);
        assert!(tree.secondary_heads(1).is_empty());
    }

    #[test]
    fn set_head_replaces_primary_only() {
        let mut tree = some_tree();
        let previous = tree.set_head(5, 2, Some("obl"));
        assert_eq!(previous, Some((4, Some("nmod".to_string()))));
        assert_eq!(tree.head(5), Some((2, Some("obl"))));
        assert_eq!(tree.secondary_heads(5), vec![(2, Some("obl")), (4, None)]);
        assert_eq!(tree.dependents(4), vec![3]);
    }

    #[test]
    fn paths() {
        let tree = some_tree();
        assert_eq!(tree.path_to_root(3), vec![4, 2, 0]);
        assert_eq!(tree.depth(3), 3);
        assert_eq!(tree.depth(2), 1);
        assert!(tree.path_to_root(0).is_empty());
        assert!(tree.dominates(2, 3));
        assert!(tree.dominates(0, 3));
        assert!(!tree.dominates(3, 2));
        assert!(!tree.dominates(1, 3));
        assert_eq!(tree.highest_in_span(&[3, 4]), Some(4));
        assert_eq!(tree.highest_in_span(&[1, 4]), Some(1));
        assert_eq!(tree.deepest_in_span(&[3, 4, 5]), Some(3));
        assert_eq!(tree.highest_in_span(&[]), None);
    }

    #[test]
    fn cyclic_path_terminates() {
        let mut tree = DependencyTree::new();
        let a = tree.push(Token::new("a"));
        let b = tree.push(Token::new("b"));
        tree.set_head(a, b, Some("dep"));
        tree.set_head(b, a, Some("dep"));
        assert_eq!(tree.depth(a), 3);
        assert_eq!(tree.validate(), Err(TreeError::Unreachable(1)));
        assert_eq!(tree.topological_order(), vec![0, 1, 2]);
    }

    #[test]
    fn validation() {
        let tree = some_tree();
        assert!(tree.is_tree());

        let mut headless = some_tree();
        headless.push(Token::new("."));
        assert_eq!(headless.validate(), Err(TreeError::MissingHead(6)));

        let mut rooted = some_tree();
        rooted.set_head(0, 1, Some("dep"));
        assert_eq!(rooted.validate(), Err(TreeError::RootWithHead));
    }

    #[test]
    fn topological_order() {
        let tree = some_tree();
        assert_eq!(tree.topological_order(), vec![0, 2, 1, 4, 3, 5]);
    }

    #[test]
    fn sentence_string() {
        let tree = some_tree();
        assert_eq!(tree.sentence_string(false), "Vamos a la playa hoy");
        assert_eq!(
            tree.sentence_string(true),
            "1:Vamos 2:a 3:la 4:playa 5:hoy"
        );
    }

    #[test]
    fn renumbered() {
        let mut tree = some_tree();
        tree.comments_mut().push("# sent_id = 1".into());
        tree.add_multi_token(MultiToken::new(2, 3, Token::new("ala")));
        tree.set_head(5, 2, Some("advmod"));
        tree.set_head(3, 2, Some("det"));
        tree.remove_token(4);
        let renumbered = tree.renumbered();
        assert_eq!(renumbered.n_tokens(), 4);
        assert_eq!(renumbered.ids().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(renumbered[4].form(), Some("hoy"));
        assert_eq!(renumbered.head(4), Some((2, Some("advmod"))));
        assert_eq!(renumbered.secondary_heads(4), vec![(2, Some("obl"))]);
        assert_eq!(renumbered.comments(), &["# sent_id = 1".to_string()]);
        assert_eq!(renumbered.multi_tokens().count(), 0);
        assert!(renumbered.is_tree());
    }

    #[test]
    fn equality() {
        let tree = some_tree();
        let mut other = some_tree();
        assert_eq!(tree, other);
        other[3].set_lemma(Some("el"));
        assert_ne!(tree, other);
        let mut other = some_tree();
        other.set_head(5, 2, Some("nmod"));
        assert_ne!(tree, other);
        let mut other = some_tree();
        other.comments_mut().push("# text = Vamos a la playa hoy".into());
        assert_ne!(tree, other);
    }

    fn some_tree() -> DependencyTree {
        // Vamos <-nsubj- a -root-> ...; a -obj-> playa -det-> la; playa -nmod-> hoy
        let mut tree = DependencyTree::new();
        for form in &["Vamos", "a", "la", "playa", "hoy"] {
            tree.push(Token::new(*form));
        }
        tree.set_head(1, 2, Some("nsubj"));
        tree.set_head(2, 0, Some("root"));
        tree.set_head(3, 4, Some("det"));
        tree.set_head(4, 2, Some("obj"));
        tree.set_head(5, 4, Some("nmod"));
        tree.add_secondary(5, 2, Some("obl"));
        tree.add_secondary::<String>(5, 4, None);
        tree
    }
}
