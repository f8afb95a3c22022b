// Level-5 MAT container reader for Content Tree
// Parses the tagged data element stream of a MAT file into named values.

mod element;
mod error;
mod reader;

#[cfg(any(test, feature = "test-support"))]
pub mod writer;

pub use error::MatError;
pub use reader::MatFile;
