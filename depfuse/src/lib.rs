#[macro_use]
extern crate failure;

#[macro_use]
extern crate log;

pub mod io;
pub use io::{Reader, Schema, WriteTree, Writer};

mod tree;
pub use tree::{DependencyTree, TreeError};

mod edge;
pub use edge::Edge;

mod features;
pub use features::Features;

mod filters;
pub use filters::FilterFields;

mod fusion;
pub use fusion::{
    FusionConfig, FusionError, Malformed, PrecedenceTable, ResolveFusedForms, MALFORMED_MARKER,
};

mod multi_token;
pub use multi_token::MultiToken;

mod token;
pub use token::{Field, Token, ROOT};

pub mod util;
