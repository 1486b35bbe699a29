use std::convert::TryFrom;

use failure::Error;

/// Columns of the CoNLL family of formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Column {
    Id,
    Form,
    Lemma,
    CoarsePos,
    FinePos,
    Features,
    Head,
    Deprel,
    Deps,
    Misc,
    PHead,
    PDeprel,
}

static CONLLU_COLUMNS: &[Column] = &[
    Column::Id,
    Column::Form,
    Column::Lemma,
    Column::CoarsePos,
    Column::FinePos,
    Column::Features,
    Column::Head,
    Column::Deprel,
    Column::Deps,
    Column::Misc,
];

static CONLL2006_COLUMNS: &[Column] = &[
    Column::Id,
    Column::Form,
    Column::Lemma,
    Column::CoarsePos,
    Column::FinePos,
    Column::Features,
    Column::Head,
    Column::Deprel,
    Column::PHead,
    Column::PDeprel,
];

/// Column layout of a treebank file.
///
/// * `Conllu`: CoNLL-U with comments, multi-word token ranges and secondary dependencies.
/// * `Conll2006`: the ten column CoNLL-X format.
/// * `Conll2006Dense`: the first eight columns of `Conll2006`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Schema {
    Conllu,
    Conll2006,
    Conll2006Dense,
}

impl Schema {
    /// The columns of a line in this schema.
    pub fn columns(self) -> &'static [Column] {
        match self {
            Schema::Conllu => CONLLU_COLUMNS,
            Schema::Conll2006 => CONLL2006_COLUMNS,
            Schema::Conll2006Dense => &CONLL2006_COLUMNS[..8],
        }
    }

    /// Number of tab separated fields per line.
    pub fn n_columns(self) -> usize {
        self.columns().len()
    }

    /// Returns whether lines starting with `#` are comments.
    pub fn has_comments(self) -> bool {
        self == Schema::Conllu
    }

    /// Returns whether `start-end` ids mark multi-word tokens.
    pub fn has_multi_tokens(self) -> bool {
        self == Schema::Conllu
    }

    /// Returns whether features have to be `name=value` pairs.
    pub fn strict_features(self) -> bool {
        self == Schema::Conllu
    }
}

impl<'a> TryFrom<&'a str> for Schema {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "conllu" => Ok(Schema::Conllu),
            "conll2006" | "conllx" => Ok(Schema::Conll2006),
            "conll2006dense" => Ok(Schema::Conll2006Dense),
            _ => Err(format_err!("Unknown format: {}", value)),
        }
    }
}
