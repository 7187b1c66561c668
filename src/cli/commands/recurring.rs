use crate::cli::context::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::ledger::Frequency;

use super::{parse_amount, parse_category, usage};

const USAGE: &str = "recurring <add <amount> <category> <frequency> <note...>|list|remove <id>>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "recurring",
        "Manage recurring transactions",
        USAGE,
        cmd_recurring,
    )]
}

fn cmd_recurring(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return handle_list(context);
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "list" => handle_list(context),
        "remove" => handle_remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown recurring subcommand `{}`",
            other
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [amount, category, frequency, note @ ..] = args else {
        return Err(usage(USAGE));
    };
    if note.is_empty() {
        return Err(usage(USAGE));
    }
    let amount = parse_amount(amount)?;
    let category = parse_category(category)?;
    let frequency: Frequency = frequency.parse().map_err(CommandError::InvalidArguments)?;
    let note = note.join(" ");

    let id = context
        .manager
        .create_recurring_rule(amount, category, &note, frequency)?;
    let next = context
        .manager
        .recurring_rules()
        .iter()
        .find(|rule| rule.id == id)
        .map(|rule| rule.next_due());
    output::success(format!(
        "{} recurring {} in {} saved ({}).",
        frequency,
        context.money(amount),
        category,
        short_id(&id)
    ));
    if let Some(next) = next {
        output::info(format!("First entry on {}.", next.format("%Y-%m-%d")));
    }
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    output::section("Recurring");
    let rules = context.manager.recurring_rules();
    if rules.is_empty() {
        output::info("No recurring transactions.");
        return Ok(());
    }
    for rule in rules {
        output::info(format!(
            "{:<10} {:<8} {:>12}  {:<14} {}  next {}",
            short_id(&rule.id),
            rule.frequency,
            context.money(rule.amount),
            rule.category.label(),
            rule.note,
            rule.next_due().format("%Y-%m-%d")
        ));
    }
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage("recurring remove <id>"));
    };
    let id = context.resolve_rule_id(id)?;
    if context.manager.remove_recurring_rule(&id) {
        output::success("Recurring transaction removed.");
    }
    Ok(())
}
