use conllx::graph::{DepTriple, Sentence};
use conllx::token::{Features, Token};

use crate::DependencyTree;

/// Conversion Trait to CONLLX.
///
/// Creates a `conllx` token for each token in the tree. Form, lemma, both part-of-speech
/// layers, features and the primary dependency relations are carried over.
pub trait ToConllx {
    /// Nonconsuming conversion to CONLLX.
    fn to_conllx(&self) -> Sentence;
    /// Consuming conversion to CONLLX.
    fn into_conllx(self) -> Sentence;
}

impl ToConllx for DependencyTree {
    fn to_conllx(&self) -> Sentence {
        self.into()
    }

    fn into_conllx(self) -> Sentence {
        (&self).into()
    }
}

impl<'a> From<&'a crate::Token> for Token {
    fn from(token: &crate::Token) -> Self {
        let mut conllx_token = Token::new(token.form().unwrap_or("_"));
        conllx_token.set_lemma(token.lemma());
        conllx_token.set_cpos(token.cpos());
        conllx_token.set_pos(token.pos());
        if let Some(features) = token.features() {
            conllx_token.set_features(Some(Features::from_string(features.to_string())));
        }
        conllx_token
    }
}

impl<'a> From<&'a DependencyTree> for Sentence {
    fn from(tree: &'a DependencyTree) -> Self {
        let mut sentence = Sentence::new();
        for id in tree.ids() {
            sentence.push(Token::from(&tree[id]));
        }
        for id in tree.ids() {
            if let Some((head, deprel)) = tree.head(id) {
                sentence
                    .dep_graph_mut()
                    .add_deprel(DepTriple::new(head, deprel, id));
            }
        }
        sentence
    }
}
