//! Types that represent the data model, such as `TransactionRecord`, `Legend` and
//! `FilterCriterion`.
mod amount;
mod category;
mod filter;
mod store;
mod transaction;

pub use amount::{Amount, AmountError, AmountStyle, SymbolPosition};
pub use category::{CategoryConfig, CategoryDefinition, Legend, UNCATEGORIZED};
pub use filter::{Dimension, FilterCriterion};
pub use store::TransactionStore;
pub use transaction::{Annotations, TransactionEntry, TransactionRecord, TxDate};
