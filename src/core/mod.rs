pub mod budget_manager;
pub mod services;
pub mod time;
pub mod utils;

pub use budget_manager::{BudgetManager, RequestKind, RequestTicket};
pub use time::{Clock, FixedClock, SystemClock};
