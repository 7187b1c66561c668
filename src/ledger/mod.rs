//! Budget domain models, persistence-friendly types, and helpers.

pub mod budget;
pub mod category;
pub mod recurring;
pub mod time_interval;
pub mod transaction;

pub use budget::BudgetMap;
pub use category::{Category, TransactionKind};
pub use recurring::{materialize_due, Materialized, RecurringRule};
pub use time_interval::{advance, Frequency};
pub use transaction::Transaction;
