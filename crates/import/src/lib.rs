pub mod record;
pub mod source;
pub mod stream;

pub use record::build_transaction;
pub use source::InputKind;
pub use stream::{ImportError, TransactionStream};
