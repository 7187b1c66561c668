use crate::cli::context::{describe, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::{parse_amount, parse_category, usage};

const DEFAULT_RECENT: usize = 5;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Record a transaction dated now",
            "add <amount> <category> <note...>",
            cmd_add,
        ),
        CommandEntry::new(
            "quick",
            "Describe a transaction in plain text and let the assistant file it",
            "quick <text...>",
            cmd_quick,
        ),
        CommandEntry::new("remove", "Delete a transaction", "remove <id>", cmd_remove),
        CommandEntry::new("clear", "Delete every transaction", "clear", cmd_clear),
        CommandEntry::new(
            "history",
            "List transactions, optionally filtered by note or category",
            "history [query...]",
            cmd_history,
        ),
        CommandEntry::new("recent", "Show the newest transactions", "recent [count]", cmd_recent),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [amount, category, note @ ..] = args else {
        return Err(usage("add <amount> <category> <note...>"));
    };
    if note.is_empty() {
        return Err(usage("add <amount> <category> <note...>"));
    }
    let amount = parse_amount(amount)?;
    let category = parse_category(category)?;
    let note = note.join(" ");
    context.manager.record(amount, category, &note)?;
    output::success(format!(
        "Added {} in {}: {}",
        context.money(amount),
        category,
        note.trim()
    ));
    Ok(())
}

fn cmd_quick(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage("quick <text...>"));
    }
    let text = args.join(" ");
    let id = context.manager.quick_add(&context.advisor, &text)?;
    if let Some(added) = context.manager.transactions().iter().find(|t| t.id == id) {
        output::success(format!(
            "Added {} in {}: {}",
            context.money(added.amount),
            added.category,
            added.note
        ));
    }
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage("remove <id>"));
    };
    let id = context.resolve_transaction_id(id)?;
    if context.manager.remove_transaction(&id) {
        output::success("Transaction removed.");
    }
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.manager.transactions().is_empty() {
        output::info("No transactions to clear.");
        return Ok(());
    }
    if !context.confirm("Delete every transaction?")? {
        output::info("Nothing removed.");
        return Ok(());
    }
    let removed = context.manager.clear_transactions();
    output::success(format!("Removed {} transaction(s).", removed));
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let query = args.join(" ");
    let matches = context.manager.history(&query);
    if query.trim().is_empty() {
        output::section("History");
    } else {
        output::section(format!("History matching `{}`", query.trim()));
    }
    if matches.is_empty() {
        output::info("No transactions found.");
        return Ok(());
    }
    for transaction in matches {
        output::info(describe(transaction, context.money(transaction.signed_amount())));
    }
    Ok(())
}

fn cmd_recent(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let count = match args.first() {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| usage("recent [count]"))?,
        None => DEFAULT_RECENT,
    };
    output::section("Recent");
    let recent = context.manager.recent(count);
    if recent.is_empty() {
        output::info("No transactions yet.");
    }
    for transaction in recent {
        output::info(describe(transaction, context.money(transaction.signed_amount())));
    }
    Ok(())
}
