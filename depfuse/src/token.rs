use std::convert::TryFrom;
use std::fmt;
use std::mem;

use failure::Error;

use crate::Features;

/// Value of the virtual root's string fields.
pub static ROOT: &str = "ROOT";

/// Struct representing a token.
///
/// A `Token` holds the non-structural annotation of one word in a sentence:
/// * `form` - word form
/// * `lemma` - lemma
/// * `cpos` - coarse-grained part of speech tag
/// * `pos` - fine-grained part of speech tag
/// * `features` - morphological features
/// * `misc` - miscellaneous annotation
/// * `phead`, `pdeprel` - projective head and relation of legacy treebanks
///
/// Every field is optional, absent fields are written as `_`. A token's position in the
/// sentence and its head are properties of the `DependencyTree` it belongs to.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Token {
    form: Option<String>,
    lemma: Option<String>,
    cpos: Option<String>,
    pos: Option<String>,
    features: Option<Features>,
    misc: Option<String>,
    phead: Option<String>,
    pdeprel: Option<String>,
}

impl Token {
    /// Construct a new token with the given form.
    pub fn new(form: impl Into<String>) -> Self {
        Token {
            form: Some(form.into()),
            ..Token::default()
        }
    }

    /// Construct the virtual root token.
    pub fn root() -> Self {
        Token {
            form: Some(ROOT.into()),
            lemma: Some(ROOT.into()),
            cpos: Some(ROOT.into()),
            pos: Some(ROOT.into()),
            ..Token::default()
        }
    }

    /// Return form if present, else `None`.
    pub fn form(&self) -> Option<&str> {
        self.form.as_ref().map(String::as_str)
    }

    /// Replace form with `new_form`. Return old value.
    pub fn set_form(&mut self, new_form: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.form, new_form.map(Into::into))
    }

    /// Return lemma if present, else `None`.
    pub fn lemma(&self) -> Option<&str> {
        self.lemma.as_ref().map(String::as_str)
    }

    /// Replace lemma with `new_lemma`. Return old value.
    pub fn set_lemma(&mut self, new_lemma: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.lemma, new_lemma.map(Into::into))
    }

    /// Return coarse-grained part of speech if present, else `None`.
    pub fn cpos(&self) -> Option<&str> {
        self.cpos.as_ref().map(String::as_str)
    }

    /// Replace coarse-grained part of speech with `new_cpos`. Return old value.
    pub fn set_cpos(&mut self, new_cpos: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.cpos, new_cpos.map(Into::into))
    }

    /// Return fine-grained part of speech if present, else `None`.
    pub fn pos(&self) -> Option<&str> {
        self.pos.as_ref().map(String::as_str)
    }

    /// Replace fine-grained part of speech with `new_pos`. Return old value.
    pub fn set_pos(&mut self, new_pos: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.pos, new_pos.map(Into::into))
    }

    /// Return features if present, else `None`.
    pub fn features(&self) -> Option<&Features> {
        self.features.as_ref()
    }

    /// Return features mutably if present, else `None`.
    pub fn features_mut(&mut self) -> Option<&mut Features> {
        self.features.as_mut()
    }

    /// Replace features with `new_features`. Return old value.
    pub fn set_features(&mut self, new_features: Option<Features>) -> Option<Features> {
        mem::replace(&mut self.features, new_features)
    }

    /// Return miscellaneous annotation if present, else `None`.
    pub fn misc(&self) -> Option<&str> {
        self.misc.as_ref().map(String::as_str)
    }

    /// Replace miscellaneous annotation with `new_misc`. Return old value.
    pub fn set_misc(&mut self, new_misc: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.misc, new_misc.map(Into::into))
    }

    /// Return projective head if present, else `None`.
    pub fn phead(&self) -> Option<&str> {
        self.phead.as_ref().map(String::as_str)
    }

    /// Replace projective head with `new_phead`. Return old value.
    pub fn set_phead(&mut self, new_phead: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.phead, new_phead.map(Into::into))
    }

    /// Return projective relation if present, else `None`.
    pub fn pdeprel(&self) -> Option<&str> {
        self.pdeprel.as_ref().map(String::as_str)
    }

    /// Replace projective relation with `new_pdeprel`. Return old value.
    pub fn set_pdeprel(&mut self, new_pdeprel: Option<impl Into<String>>) -> Option<String> {
        mem::replace(&mut self.pdeprel, new_pdeprel.map(Into::into))
    }

    /// Reset `field` to absent.
    pub fn clear(&mut self, field: Field) {
        match field {
            Field::Form => self.form = None,
            Field::Lemma => self.lemma = None,
            Field::CoarsePos => self.cpos = None,
            Field::FinePos => self.pos = None,
            Field::Features => self.features = None,
            Field::Misc => self.misc = None,
            Field::PHead => self.phead = None,
            Field::PDeprel => self.pdeprel = None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.cpos().unwrap_or("_"),
            self.form().unwrap_or("_")
        )
    }
}

/// Scalar fields of a `Token`.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Field {
    Form,
    Lemma,
    CoarsePos,
    FinePos,
    Features,
    Misc,
    PHead,
    PDeprel,
}

impl<'a> TryFrom<&'a str> for Field {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        use Field::*;
        match value.to_lowercase().as_str() {
            "form" => Ok(Form),
            "lemma" => Ok(Lemma),
            "cpos" | "upos" => Ok(CoarsePos),
            "pos" | "xpos" => Ok(FinePos),
            "feats" | "features" => Ok(Features),
            "misc" => Ok(Misc),
            "phead" => Ok(PHead),
            "pdeprel" => Ok(PDeprel),
            _ => Err(format_err!("Unknown field: {}", value)),
        }
    }
}
