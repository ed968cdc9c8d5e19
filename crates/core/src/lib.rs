pub mod money;
pub mod rules;
pub mod transaction;

pub use money::{Amount, CurrencyMismatch, CURRENCY};
pub use rules::{Rule, RuleError, RuleSet};
pub use transaction::Transaction;
