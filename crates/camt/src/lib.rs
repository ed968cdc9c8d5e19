pub mod decode;

pub use decode::{read_document, read_str, DecodeError, StatementEntry};
