use std::io::Write;

use failure::Error;
use itertools::Itertools;

use crate::io::{Column, Schema};
use crate::{DependencyTree, MultiToken};

/// Trait to write a `DependencyTree`.
pub trait WriteTree {
    fn write_tree(&mut self, tree: &DependencyTree) -> Result<(), Error>;
}

/// Writer for CoNLL-style files.
///
/// Every sentence is followed by a single blank line.
pub struct Writer<W>
where
    W: Write,
{
    writer: W,
    schema: Schema,
    keep_multi_tokens: bool,
}

impl<W> Writer<W>
where
    W: Write,
{
    /// Constructs a new `Writer` writing lines in `schema`.
    ///
    /// Multi-word token rows are only written if `keep_multi_tokens` is set.
    pub fn new(writer: W, schema: Schema, keep_multi_tokens: bool) -> Self {
        Writer {
            writer,
            schema,
            keep_multi_tokens,
        }
    }

    /// Render a tree as it is written by this writer.
    pub fn tree_to_string(&self, tree: &DependencyTree) -> String {
        let mut lines = Vec::with_capacity(tree.comments().len() + tree.n_tokens());
        if self.schema.has_comments() {
            lines.extend(tree.comments().iter().cloned());
        }
        for id in tree.ids() {
            if self.keep_multi_tokens {
                if let Some(multi_token) = tree.multi_token(id) {
                    lines.push(self.multi_token_line(multi_token));
                }
            }
            lines.push(self.token_line(tree, id));
        }

        let mut sentence = lines.join("\n");
        sentence.push_str("\n\n");
        sentence
    }

    /// Get the wrapped writer back.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn token_line(&self, tree: &DependencyTree, id: usize) -> String {
        let token = &tree[id];
        let head = tree.head(id);
        self.schema
            .columns()
            .iter()
            .map(|column| match column {
                Column::Id => id.to_string(),
                Column::Form => absent_or(token.form()),
                Column::Lemma => absent_or(token.lemma()),
                Column::CoarsePos => absent_or(token.cpos()),
                Column::FinePos => absent_or(token.pos()),
                Column::Features => token
                    .features()
                    .filter(|features| !features.is_empty())
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "_".to_owned()),
                Column::Head => head
                    .map(|(head, _)| head.to_string())
                    .unwrap_or_else(|| "_".to_owned()),
                Column::Deprel => absent_or(head.and_then(|(_, deprel)| deprel)),
                Column::Deps => {
                    let deps = tree.secondary_heads(id);
                    if deps.is_empty() {
                        "_".to_owned()
                    } else {
                        deps.into_iter()
                            .map(|(head, deprel)| format!("{}:{}", head, deprel.unwrap_or("_")))
                            .join("|")
                    }
                }
                Column::Misc => absent_or(token.misc()),
                Column::PHead => absent_or(token.phead()),
                Column::PDeprel => absent_or(token.pdeprel()),
            })
            .join("\t")
    }

    fn multi_token_line(&self, multi_token: &MultiToken) -> String {
        let token = multi_token.token();
        self.schema
            .columns()
            .iter()
            .map(|column| match column {
                Column::Id => format!("{}-{}", multi_token.start(), multi_token.end()),
                Column::Form => absent_or(token.form()),
                Column::Lemma => absent_or(token.lemma()),
                Column::CoarsePos => absent_or(token.cpos()),
                Column::FinePos => absent_or(token.pos()),
                Column::Misc => absent_or(token.misc()),
                _ => "_".to_owned(),
            })
            .join("\t")
    }
}

impl<W> WriteTree for Writer<W>
where
    W: Write,
{
    fn write_tree(&mut self, tree: &DependencyTree) -> Result<(), Error> {
        let sentence = self.tree_to_string(tree);
        self.writer.write_all(sentence.as_bytes())?;
        Ok(())
    }
}

fn absent_or(value: Option<&str>) -> String {
    value.unwrap_or("_").to_owned()
}
