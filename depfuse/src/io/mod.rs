mod conllx;
pub use crate::io::conllx::ToConllx;

mod reader;
pub use crate::io::reader::{read_trees, FormatError, ReadTree, Reader};

mod schema;
pub use crate::io::schema::{Column, Schema};

mod writer;
pub use crate::io::writer::{WriteTree, Writer};
