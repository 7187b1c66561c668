pub mod summary_service;

pub use summary_service::{BudgetProgress, CategorySpending, SummaryService};
