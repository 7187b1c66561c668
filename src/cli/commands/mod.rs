pub mod budget;
pub mod insights;
pub mod recurring;
pub mod system;
pub mod transaction;

use crate::cli::context::CommandError;
use crate::cli::registry::{CommandGroup, CommandRegistry};
use crate::ledger::Category;

pub fn register_all(registry: &mut CommandRegistry) {
    let groups = [
        (CommandGroup::Transactions, transaction::definitions()),
        (CommandGroup::Recurring, recurring::definitions()),
        (CommandGroup::Budgets, budget::definitions()),
        (CommandGroup::Assistant, insights::definitions()),
        (CommandGroup::Shell, system::definitions()),
    ];
    for (group, entries) in groups {
        for entry in entries {
            registry.register(group, entry);
        }
    }
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let cleaned = input.trim().trim_start_matches('$');
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

pub(crate) fn parse_category(input: &str) -> Result<Category, CommandError> {
    Category::parse_loose(input).ok_or_else(|| {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        CommandError::InvalidArguments(format!(
            "unknown category `{}` (expected one of: {})",
            input,
            labels.join(", ")
        ))
    })
}

pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {}", text))
}
