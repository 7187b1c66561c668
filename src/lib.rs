#![doc(test(attr(deny(warnings))))]

//! iBudget Core keeps a personal budget: transactions, category limits, and
//! recurring rules that materialize into concrete entries as time passes.
//! Derived views (balance, category spend, budget progress) are recomputed on
//! demand, and an optional hosted model assists with categorization and tips.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod insights;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("iBudget Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
