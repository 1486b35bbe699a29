use std::collections::HashMap;
use std::io::BufRead;

use failure::Error;

use crate::{DependencyTree, MultiToken, TreeError};

/// Prefix added to the first form of a sentence that is no tree after fusion.
pub static MALFORMED_MARKER: &str = "NOT_A_TREE:";

/// Errors of fused-form resolution.
#[derive(Clone, Debug, Eq, PartialEq, Fail)]
pub enum FusionError {
    #[fail(display = "Resolving fused forms did not result in a tree: {}", _0)]
    NotATree(TreeError),
}

/// Handling of sentences that are not a tree after resolving fused forms.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Malformed {
    /// Prefix the first form with `MALFORMED_MARKER`, log a warning and keep the sentence.
    Annotate,
    /// Return `FusionError::NotATree`.
    Fail,
}

impl Default for Malformed {
    fn default() -> Self {
        Malformed::Annotate
    }
}

/// Part of speech precedence lists per language.
///
/// `PrecedenceTable::default()` holds the built-in lists, languages without a list get an
/// empty one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrecedenceTable {
    table: HashMap<String, Vec<String>>,
}

impl Default for PrecedenceTable {
    fn default() -> Self {
        let mut table = PrecedenceTable::new();
        for lang in &["none", "bg", "da", "el", "en", "sv"] {
            table.insert(*lang, Vec::<String>::new());
        }
        table.insert("de", vec!["PROPN", "ADP", "DET"]);
        table.insert("es", vec!["VERB", "AUX", "PRON", "ADP", "DET"]);
        table.insert(
            "fr",
            vec![
                "VERB", "AUX", "PRON", "NOUN", "ADJ", "ADV", "ADP", "DET", "PART", "SCONJ", "CONJ",
            ],
        );
        table.insert("it", vec!["VERB", "AUX", "ADV", "PRON", "ADP", "DET"]);
        table
    }
}

impl PrecedenceTable {
    /// Construct an empty table.
    pub fn new() -> Self {
        PrecedenceTable {
            table: HashMap::new(),
        }
    }

    /// Set the precedence list of `lang`.
    ///
    /// Returns the replaced list.
    pub fn insert<S>(
        &mut self,
        lang: impl Into<String>,
        precedence: impl IntoIterator<Item = S>,
    ) -> Option<Vec<String>>
    where
        S: Into<String>,
    {
        self.table.insert(
            lang.into(),
            precedence.into_iter().map(Into::into).collect(),
        )
    }

    /// Get the precedence list of `lang`, empty if `lang` is unknown.
    pub fn get(&self, lang: &str) -> &[String] {
        self.table.get(lang).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns whether the table has an entry for `lang`.
    pub fn contains(&self, lang: &str) -> bool {
        self.table.contains_key(lang)
    }

    /// Add the lists in `reader`.
    ///
    /// Each line holds a language followed by its tags, separated by whitespace. Empty lines and
    /// lines starting with `#` are skipped. Existing entries are replaced.
    pub fn extend_from_reader(&mut self, reader: impl BufRead) -> Result<(), Error> {
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            if let Some(lang) = parts.next() {
                self.insert(lang, parts);
            }
        }
        Ok(())
    }
}

/// Configuration of fused-form resolution.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FusionConfig {
    language: String,
    precedence: Vec<String>,
    on_malformed: Malformed,
}

impl FusionConfig {
    /// Construct a configuration with an explicit precedence list.
    pub fn new<S>(language: impl Into<String>, precedence: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        FusionConfig {
            language: language.into(),
            precedence: precedence.into_iter().map(Into::into).collect(),
            on_malformed: Malformed::default(),
        }
    }

    /// Construct a configuration with the precedence list of `language` in `table`.
    pub fn for_language(table: &PrecedenceTable, language: &str) -> Self {
        FusionConfig::new(language, table.get(language).iter().cloned())
    }

    /// Set the handling of sentences that are no tree after fusion.
    pub fn on_malformed(mut self, on_malformed: Malformed) -> Self {
        self.on_malformed = on_malformed;
        self
    }

    /// Get the language identifier.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get the precedence list.
    pub fn precedence(&self) -> &[String] {
        &self.precedence
    }

    /// Get the handling of malformed results.
    pub fn malformed(&self) -> Malformed {
        self.on_malformed
    }

    // tags missing from the list rank after all listed tags
    fn rank(&self, pos: Option<&str>) -> usize {
        pos.and_then(|pos| self.precedence.iter().position(|p| p == pos))
            .unwrap_or_else(|| self.precedence.len())
    }
}

/// Trait to collapse multi-word tokens into single tokens.
pub trait ResolveFusedForms {
    /// Select the token representing `span` after fusion.
    ///
    /// The token closest to the root is selected. Ties are broken by the position of the coarse
    /// part of speech in the precedence list, then by the lowest id. Ids in `span` that are not
    /// in the tree are ignored, `None` is returned if none is left.
    fn spanhead(&self, span: &[usize], config: &FusionConfig) -> Option<usize>;

    /// Collapse every multi token into its spanhead.
    ///
    /// Dependents of absorbed tokens that lie outside the span are attached to the spanhead
    /// with their relation, the spanhead takes the fused form and the absorbed tokens are
    /// removed. The returned tree has contiguous ids and no multi tokens. A tree without multi
    /// tokens is returned unchanged.
    ///
    /// Returns `FusionError::NotATree` if the result is no tree and `config` asks for
    /// `Malformed::Fail`.
    fn resolve_fused_forms(&self, config: &FusionConfig) -> Result<DependencyTree, FusionError>;
}

impl ResolveFusedForms for DependencyTree {
    fn spanhead(&self, span: &[usize], config: &FusionConfig) -> Option<usize> {
        let members = span
            .iter()
            .cloned()
            .filter(|&id| id != 0 && self.token(id).is_some())
            .map(|id| (id, self.depth(id)))
            .collect::<Vec<_>>();
        let min_depth = members.iter().map(|&(_, depth)| depth).min()?;
        members
            .into_iter()
            .filter(|&(_, depth)| depth == min_depth)
            .map(|(id, _)| id)
            .min_by_key(|&id| (config.rank(self[id].cpos()), id))
    }

    fn resolve_fused_forms(&self, config: &FusionConfig) -> Result<DependencyTree, FusionError> {
        if self.multi_tokens().next().is_none() {
            return Ok(self.clone());
        }

        // spanheads are selected on the unmodified tree
        let position = self
            .topological_order()
            .into_iter()
            .enumerate()
            .map(|(position, id)| (id, position))
            .collect::<HashMap<_, _>>();
        let mut spans = Vec::new();
        for multi in self.multi_tokens() {
            let members = multi.span().collect::<Vec<_>>();
            match self.spanhead(&members, config) {
                Some(spanhead) => {
                    debug!(
                        "Multi token {}-{} '{}': spanhead {}",
                        multi.start(),
                        multi.end(),
                        multi.form().unwrap_or("_"),
                        spanhead
                    );
                    spans.push((multi, members, spanhead))
                }
                None => warn!(
                    "Multi token {}-{} does not cover any token",
                    multi.start(),
                    multi.end()
                ),
            }
        }
        spans.sort_by_key(|&(_, _, spanhead)| position[&spanhead]);

        let mut fused = self.clone();
        fused.clear_multi_tokens();
        for (multi, members, spanhead) in spans {
            if fused.token(spanhead).is_none() {
                warn!(
                    "Spanhead {} of multi token {}-{} was absorbed by an overlapping multi token",
                    spanhead,
                    multi.start(),
                    multi.end()
                );
                continue;
            }
            absorb(&mut fused, multi, &members, spanhead);
        }

        let mut fused = fused.renumbered();
        if let Err(err) = fused.validate() {
            match config.malformed() {
                Malformed::Fail => return Err(FusionError::NotATree(err)),
                Malformed::Annotate => {
                    warn!(
                        "Resolving fused forms did not result in a tree ({}): {}",
                        err,
                        fused.sentence_string(true)
                    );
                    let first = fused.ids().next();
                    if let Some(first) = first {
                        let form =
                            format!("{}{}", MALFORMED_MARKER, fused[first].form().unwrap_or("_"));
                        fused[first].set_form(Some(form));
                    }
                }
            }
        }
        Ok(fused)
    }
}

// Collapse the members of `multi` into `spanhead`. Members that were removed before are skipped.
fn absorb(tree: &mut DependencyTree, multi: &MultiToken, members: &[usize], spanhead: usize) {
    let internal = members
        .iter()
        .cloned()
        .filter(|&id| id != spanhead && tree.token(id).is_some())
        .collect::<Vec<_>>();

    for &member in &internal {
        for dependent in tree.dependents(member) {
            if multi.covers(dependent) {
                continue;
            }
            let deprel = tree
                .head(dependent)
                .and_then(|(_, deprel)| deprel.map(ToOwned::to_owned));
            tree.set_head(dependent, spanhead, deprel);
        }
    }

    tree[spanhead].set_form(multi.form());

    for member in internal {
        tree.remove_token(member);
    }
}
