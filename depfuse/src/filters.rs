use crate::util::LabelSet;
use crate::{DependencyTree, Field};

/// Trait to filter the annotation of a tree.
///
/// Filters change annotation only. They never add or remove tokens and applying a filter twice
/// has the same effect as applying it once.
pub trait FilterFields {
    /// Reset `fields` of every token to absent.
    fn strip_fields(&mut self, fields: &[Field]);

    /// Cut every dependency relation at the first `separator`.
    ///
    /// E.g. with `':'`, `nmod:poss` becomes `nmod`.
    fn truncate_deprels(&mut self, separator: char);

    /// Remove features whose name is not matched by `keep`.
    ///
    /// Tokens left without features get absent features.
    fn filter_features(&mut self, keep: &LabelSet);

    /// Remove all secondary edges.
    fn remove_secondary_edges(&mut self);
}

impl FilterFields for DependencyTree {
    fn strip_fields(&mut self, fields: &[Field]) {
        let ids = self.ids().collect::<Vec<_>>();
        for id in ids {
            for &field in fields {
                self[id].clear(field);
            }
        }
    }

    fn truncate_deprels(&mut self, separator: char) {
        self.for_each_edge_mut(|edge| {
            let truncated = edge
                .deprel()
                .and_then(|deprel| deprel.find(separator).map(|idx| deprel[..idx].to_owned()));
            if let Some(truncated) = truncated {
                edge.set_deprel(Some(truncated));
            }
        });
    }

    fn filter_features(&mut self, keep: &LabelSet) {
        let ids = self.ids().collect::<Vec<_>>();
        for id in ids {
            let token = &mut self[id];
            let now_empty = match token.features_mut() {
                Some(features) => {
                    features.retain(|name| keep.matches(name));
                    features.is_empty()
                }
                None => false,
            };
            if now_empty {
                token.set_features(None);
            }
        }
    }

    fn remove_secondary_edges(&mut self) {
        self.remove_edges(|edge| edge.is_secondary());
    }
}
