use std::io::{BufRead, Lines};

use failure::Error;

use crate::io::{Column, Schema};
use crate::{DependencyTree, Features, MultiToken, Token};

/// Malformed input.
///
/// Every variant carries the 1-based number of the offending line.
#[derive(Clone, Debug, Eq, PartialEq, Fail)]
pub enum FormatError {
    #[fail(
        display = "Line {}: expected {} columns, found {}",
        line, expected, found
    )]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[fail(display = "Line {}: invalid {}: {}", line, field, value)]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[fail(display = "Line {}: {}", line, message)]
    Structure { line: usize, message: String },
}

impl FormatError {
    /// The line the error occured on.
    pub fn line(&self) -> usize {
        match self {
            FormatError::ColumnCount { line, .. } => *line,
            FormatError::InvalidField { line, .. } => *line,
            FormatError::Structure { line, .. } => *line,
        }
    }
}

/// Iterator over the sentences of a CoNLL-style file.
///
/// Sentences are separated by blank lines. The first malformed line ends the iteration:
/// the error is returned once, afterwards `next()` returns `None`.
pub struct Reader<R>
where
    R: BufRead,
{
    inner: Lines<R>,
    schema: Schema,
    line: usize,
    failed: bool,
}

impl<R> Reader<R>
where
    R: BufRead,
{
    /// Creates a new `Reader` over the sentences in `reader`.
    pub fn new(reader: R, schema: Schema) -> Self {
        Reader {
            inner: reader.lines(),
            schema,
            line: 0,
            failed: false,
        }
    }

    fn fail(&mut self, err: impl Into<Error>) -> Option<Result<DependencyTree, Error>> {
        self.failed = true;
        Some(Err(err.into()))
    }
}

impl<R> Iterator for Reader<R>
where
    R: BufRead,
{
    type Item = Result<DependencyTree, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut sentence = PendingSentence::default();
        while let Some(line) = self.inner.next() {
            self.line += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => return self.fail(e),
            };
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                // comments before an empty sentence belong to the next one
                if sentence.is_empty() {
                    continue;
                }
                return match sentence.finish() {
                    Ok(tree) => Some(Ok(tree)),
                    Err(e) => self.fail(e),
                };
            }

            if self.schema.has_comments() && line.starts_with('#') {
                sentence.comments.push(line.to_owned());
                continue;
            }

            if let Err(e) = sentence.parse_line(line, self.line, self.schema) {
                return self.fail(e);
            }
        }

        if sentence.is_empty() {
            return None;
        }
        match sentence.finish() {
            Ok(tree) => Some(Ok(tree)),
            Err(e) => self.fail(e),
        }
    }
}

/// Read all sentences from `reader`.
///
/// Returns the first error encountered.
pub fn read_trees(reader: impl BufRead, schema: Schema) -> Result<Vec<DependencyTree>, Error> {
    Reader::new(reader, schema).collect()
}

/// Trait to parse a single sentence.
pub trait ReadTree {
    fn string_to_tree(&self, string: &str) -> Result<DependencyTree, Error>;
}

impl ReadTree for Schema {
    fn string_to_tree(&self, string: &str) -> Result<DependencyTree, Error> {
        Reader::new(string.as_bytes(), *self)
            .next()
            .unwrap_or_else(|| Err(format_err!("No sentence in input")))
    }
}

enum Id {
    Token(usize),
    Range(usize, usize),
}

struct TokenLine {
    line: usize,
    token: Token,
    head: usize,
    deprel: Option<String>,
    deps: Vec<(usize, Option<String>)>,
}

#[derive(Default)]
struct PendingSentence {
    comments: Vec<String>,
    tokens: Vec<TokenLine>,
    multi_tokens: Vec<(usize, MultiToken)>,
}

impl PendingSentence {
    fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.multi_tokens.is_empty()
    }

    fn parse_line(&mut self, line: &str, line_no: usize, schema: Schema) -> Result<(), FormatError> {
        let fields = line.split('\t').collect::<Vec<_>>();
        if fields.len() != schema.n_columns() {
            return Err(FormatError::ColumnCount {
                line: line_no,
                expected: schema.n_columns(),
                found: fields.len(),
            });
        }

        let id = parse_id(fields[0], line_no, schema)?;
        let mut token = Token::default();
        let mut head = "_";
        let mut deprel = None;
        let mut deps = "_";
        for (&column, &value) in schema.columns().iter().zip(&fields) {
            match column {
                Column::Id => (),
                Column::Form => {
                    token.set_form(optional(value));
                }
                Column::Lemma => {
                    token.set_lemma(optional(value));
                }
                Column::CoarsePos => {
                    token.set_cpos(optional(value));
                }
                Column::FinePos => {
                    token.set_pos(optional(value));
                }
                Column::Features => {
                    token.set_features(parse_features(value, line_no, schema)?);
                }
                Column::Head => head = value,
                Column::Deprel => deprel = optional(value),
                Column::Deps => deps = value,
                Column::Misc => {
                    token.set_misc(optional(value));
                }
                Column::PHead => {
                    token.set_phead(optional(value));
                }
                Column::PDeprel => {
                    token.set_pdeprel(optional(value));
                }
            }
        }

        match id {
            Id::Token(id) => {
                let expected = self.tokens.len() + 1;
                if id != expected {
                    return Err(FormatError::Structure {
                        line: line_no,
                        message: format!("expected token id {}, found {}", expected, id),
                    });
                }
                self.tokens.push(TokenLine {
                    line: line_no,
                    token,
                    head: parse_head(head, line_no)?,
                    deprel: deprel.map(ToOwned::to_owned),
                    deps: parse_deps(deps, line_no)?,
                });
            }
            Id::Range(start, end) => self
                .multi_tokens
                .push((line_no, MultiToken::new(start, end, token))),
        }

        Ok(())
    }

    fn finish(self) -> Result<DependencyTree, FormatError> {
        let n_tokens = self.tokens.len();
        for token_line in &self.tokens {
            let heads = std::iter::once(token_line.head)
                .chain(token_line.deps.iter().map(|(head, _)| *head));
            for head in heads {
                if head > n_tokens {
                    return Err(FormatError::Structure {
                        line: token_line.line,
                        message: format!(
                            "head {} outside of sentence with {} tokens",
                            head, n_tokens
                        ),
                    });
                }
            }
        }
        for (line, multi_token) in &self.multi_tokens {
            if multi_token.end() > n_tokens {
                return Err(FormatError::Structure {
                    line: *line,
                    message: format!(
                        "multi-word token {}-{} outside of sentence with {} tokens",
                        multi_token.start(),
                        multi_token.end(),
                        n_tokens
                    ),
                });
            }
        }

        let mut tree = DependencyTree::new();
        *tree.comments_mut() = self.comments;
        let mut edges = Vec::with_capacity(n_tokens);
        for token_line in self.tokens {
            let id = tree.push(token_line.token);
            edges.push((id, token_line.head, token_line.deprel, token_line.deps));
        }
        for (id, head, deprel, deps) in edges {
            tree.set_head(id, head, deprel);
            for (head, deprel) in deps {
                tree.add_secondary(id, head, deprel);
            }
        }
        for (line, multi_token) in self.multi_tokens {
            let start = multi_token.start();
            if tree.add_multi_token(multi_token).is_some() {
                return Err(FormatError::Structure {
                    line,
                    message: format!("second multi-word token starting at {}", start),
                });
            }
        }

        Ok(tree)
    }
}

fn optional(value: &str) -> Option<&str> {
    if value == "_" {
        None
    } else {
        Some(value)
    }
}

fn invalid(field: &'static str, value: &str, line: usize) -> FormatError {
    FormatError::InvalidField {
        line,
        field,
        value: value.to_owned(),
    }
}

fn parse_id(value: &str, line: usize, schema: Schema) -> Result<Id, FormatError> {
    if let Ok(id) = value.parse::<usize>() {
        if id > 0 {
            return Ok(Id::Token(id));
        }
    } else if schema.has_multi_tokens() {
        let mut parts = value.splitn(2, '-');
        let start = parts.next().and_then(|start| start.parse::<usize>().ok());
        let end = parts.next().and_then(|end| end.parse::<usize>().ok());
        if let (Some(start), Some(end)) = (start, end) {
            if start > 0 && start < end {
                return Ok(Id::Range(start, end));
            }
        }
    }

    Err(invalid("id", value, line))
}

fn parse_head(value: &str, line: usize) -> Result<usize, FormatError> {
    value.parse().map_err(|_| invalid("head", value, line))
}

fn parse_features(value: &str, line: usize, schema: Schema) -> Result<Option<Features>, FormatError> {
    if value == "_" {
        return Ok(None);
    }
    let features = Features::from(value);
    if features.inner().iter().any(|(name, _)| name.is_empty())
        || (schema.strict_features() && !features.is_attribute_value())
    {
        return Err(invalid("feats", value, line));
    }
    Ok(Some(features))
}

fn parse_deps(value: &str, line: usize) -> Result<Vec<(usize, Option<String>)>, FormatError> {
    if value == "_" {
        return Ok(Vec::new());
    }
    value
        .split('|')
        .map(|dep| {
            let mut parts = dep.splitn(2, ':');
            let head = parts
                .next()
                .and_then(|head| head.parse::<usize>().ok())
                .ok_or_else(|| invalid("deps", value, line))?;
            let deprel = parts
                .next()
                .ok_or_else(|| invalid("deps", value, line))?;
            Ok((head, optional(deprel).map(ToOwned::to_owned)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::{BufReader, Cursor};

    use crate::io::{read_trees, FormatError, ReadTree, Reader, Schema};
    use crate::ROOT;

    static SENTENCE: &str = "# sent_id = 1
# text = Vamos al mar.
1\tVamos\tir\tVERB\t_\tMood=Imp|Number=Plur|Person=1\t0\troot\t0:root\t_
2-3\tal\t_\t_\t_\t_\t_\t_\t_\t_
2\ta\ta\tADP\t_\t_\t4\tcase\t4:case\t_
3\tel\tel\tDET\t_\tDefinite=Def\t4\tdet\t4:det\t_
4\tmar\tmar\tNOUN\t_\tGender=Masc|Number=Sing\t1\tobl\t1:obl:a\tSpaceAfter=No
5\t.\t.\tPUNCT\t_\t_\t1\tpunct\t1:punct\t_
";

    #[test]
    fn read_conllu() {
        let tree = Schema::Conllu.string_to_tree(SENTENCE).unwrap();
        assert_eq!(tree.n_tokens(), 5);
        assert_eq!(
            tree.comments(),
            &["# sent_id = 1".to_string(), "# text = Vamos al mar.".to_string()]
        );
        assert_eq!(tree[0].form(), Some(ROOT));
        assert_eq!(tree[1].form(), Some("Vamos"));
        assert_eq!(tree[1].lemma(), Some("ir"));
        assert_eq!(tree[1].pos(), None);
        assert_eq!(
            tree[1].features().and_then(|f| f.get_val("Mood")),
            Some("Imp")
        );
        assert_eq!(tree[4].misc(), Some("SpaceAfter=No"));
        assert_eq!(tree.head(1), Some((0, Some("root"))));
        assert_eq!(tree.head(3), Some((4, Some("det"))));
        assert_eq!(tree.secondary_heads(4), vec![(1, Some("obl:a"))]);
        assert!(tree.is_tree());

        let multi = tree.multi_token(2).unwrap();
        assert_eq!(multi.end(), 3);
        assert_eq!(multi.form(), Some("al"));
        assert_eq!(tree.multi_tokens().count(), 1);
    }

    #[test]
    fn read_sentences() {
        let input = format!("\n\n{}\n{}\n\n", SENTENCE, SENTENCE);
        let trees = read_trees(Cursor::new(input), Schema::Conllu).unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0], trees[1]);

        // last sentence without trailing blank line
        let input = SENTENCE.trim_end();
        let trees = read_trees(Cursor::new(input), Schema::Conllu).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].n_tokens(), 5);
    }

    #[test]
    fn comments_carry_over() {
        let input = "# orphan\n\n1\tja\t_\t_\t_\t_\t0\troot\t_\t_\n";
        let tree = Schema::Conllu.string_to_tree(input).unwrap();
        assert_eq!(tree.comments(), &["# orphan".to_string()]);
        assert_eq!(tree.n_tokens(), 1);
    }

    #[test]
    fn read_conll2006() {
        let input = "1\tDer\tder\tART\tART\tcase=nom\t2\tDET\t_\t_\n\
                     2\tHund\tHund\tN\tNN\t_\t3\tSUBJ\t3\tSUBJ\n\
                     3\tbellt\tbellen\tV\tVVFIN\t_\t0\tROOT\t_\t_\n\n";
        let tree = Schema::Conll2006.string_to_tree(input).unwrap();
        assert_eq!(tree.n_tokens(), 3);
        assert_eq!(tree[1].cpos(), Some("ART"));
        assert_eq!(tree[1].pos(), Some("ART"));
        assert_eq!(
            tree[1].features().map(ToString::to_string),
            Some("case=nom".to_string())
        );
        assert_eq!(tree[2].phead(), Some("3"));
        assert_eq!(tree[2].pdeprel(), Some("SUBJ"));
        assert_eq!(tree.head(2), Some((3, Some("SUBJ"))));
        assert!(tree.comments().is_empty());
    }

    #[test]
    fn legacy_features_without_values() {
        let input = "1\tDer\tder\tART\tART\tnom|sg\t0\tROOT\n";
        let tree = Schema::Conll2006Dense.string_to_tree(input).unwrap();
        assert_eq!(
            tree[1].features().map(ToString::to_string),
            Some("nom|sg".to_string())
        );
        assert!(Schema::Conllu
            .string_to_tree("1\tDer\tder\tDET\t_\tnom|sg\t0\troot\t_\t_\n")
            .is_err());
    }

    #[test]
    fn legacy_has_no_comments() {
        let input = "# comment\n1\tDer\tder\tART\tART\t_\t0\tROOT\n";
        let err = Schema::Conll2006Dense.string_to_tree(input).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::ColumnCount {
                line: 1,
                expected: 8,
                found: 1
            })
        );
    }

    #[test]
    fn wrong_column_count() {
        let input = "# sent_id = 1\n\
                     1\tVamos\tir\tVERB\t_\t_\t0\troot\t_\t_\n\
                     2\t.\t.\tPUNCT\t_\t_\t1\tpunct\t_\n\n";
        let mut reader = Reader::new(Cursor::new(input), Schema::Conllu);
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::ColumnCount {
                line: 3,
                expected: 10,
                found: 9
            })
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn line_numbers_across_sentences() {
        let input = format!("{}\n1\tja\t_\t_\t_\t_\tx\troot\t_\t_\n", SENTENCE);
        let mut reader = Reader::new(Cursor::new(input), Schema::Conllu);
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        let err = err.downcast_ref::<FormatError>().unwrap();
        assert_eq!(err.line(), 10);
        assert_eq!(
            err,
            &FormatError::InvalidField {
                line: 10,
                field: "head",
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn invalid_structure() {
        // gap in ids
        let input = "1\ta\t_\t_\t_\t_\t0\troot\t_\t_\n3\tb\t_\t_\t_\t_\t1\tdep\t_\t_\n";
        let err = Schema::Conllu.string_to_tree(input).unwrap_err();
        assert_eq!(err.downcast_ref::<FormatError>().map(FormatError::line), Some(2));

        // head outside of the sentence
        let input = "1\ta\t_\t_\t_\t_\t0\troot\t_\t_\n2\tb\t_\t_\t_\t_\t3\tdep\t_\t_\n";
        let err = Schema::Conllu.string_to_tree(input).unwrap_err();
        assert_eq!(err.downcast_ref::<FormatError>().map(FormatError::line), Some(2));

        // multi-word token reaching past the last token
        let input = "1-2\tab\t_\t_\t_\t_\t_\t_\t_\t_\n1\ta\t_\t_\t_\t_\t0\troot\t_\t_\n";
        let err = Schema::Conllu.string_to_tree(input).unwrap_err();
        assert_eq!(err.downcast_ref::<FormatError>().map(FormatError::line), Some(1));

        // ranges are not allowed in legacy files
        let input = "1-2\tab\t_\t_\t_\t_\t_\t_\n";
        let err = Schema::Conll2006Dense.string_to_tree(input).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::InvalidField {
                line: 1,
                field: "id",
                value: "1-2".to_string()
            })
        );

        // secondary dependency without relation
        let input = "1\ta\t_\t_\t_\t_\t0\troot\t0\t_\n";
        assert!(Schema::Conllu.string_to_tree(input).is_err());
    }

    #[test]
    fn multi_tokens_with_same_start() {
        let input = "1-2\tdel\t_\t_\t_\t_\t_\t_\t_\t_\n\
                     1-3\tdela\t_\t_\t_\t_\t_\t_\t_\t_\n\
                     1\tde\t_\t_\t_\t_\t0\troot\t_\t_\n\
                     2\tel\t_\t_\t_\t_\t1\tdet\t_\t_\n\
                     3\ta\t_\t_\t_\t_\t1\tdep\t_\t_\n";
        let err = Schema::Conllu.string_to_tree(input).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&FormatError::Structure {
                line: 2,
                message: "second multi-word token starting at 1".to_string()
            })
        );
    }

    #[test]
    fn read_fixture() {
        let reader = BufReader::new(File::open("testdata/es.conllu").unwrap());
        let trees = Reader::new(reader, Schema::Conllu)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(trees.len(), 3);
        assert!(trees.iter().all(|tree| tree.is_tree()));
        assert_eq!(trees.iter().map(|t| t.multi_tokens().count()).sum::<usize>(), 4);
    }
}
