use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::{parse_amount, parse_category, usage};

const BAR_WIDTH: usize = 20;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "budget",
            "Set or review category spending limits",
            "budget <set <category> <limit>|list>",
            cmd_budget,
        ),
        CommandEntry::new("balance", "Show the total balance", "balance", cmd_balance),
        CommandEntry::new(
            "spending",
            "Show expenses grouped by category",
            "spending",
            cmd_spending,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return handle_list(context);
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "set" => handle_set(context, rest),
        "list" => handle_list(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown budget subcommand `{}`",
            other
        ))),
    }
}

fn handle_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [category, limit] = args else {
        return Err(usage("budget set <category> <limit>"));
    };
    let category = parse_category(category)?;
    let limit = parse_amount(limit)?;
    let stored = context.manager.set_budget_limit(category, limit)?;
    if stored > 0.0 {
        output::success(format!("{} limit set to {}.", category, context.money(stored)));
    } else {
        output::success(format!("{} limit cleared.", category));
    }
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    output::section("Budgets");
    for progress in context.manager.budget_overview() {
        let line = match progress.limit {
            Some(limit) => format!(
                "{:<14} {} {:>5.0}%  {} of {}",
                progress.category.label(),
                output::progress_bar(progress.display_percent(), BAR_WIDTH),
                progress.percent.unwrap_or(0.0),
                context.money(progress.spent),
                context.money(limit)
            ),
            None => format!(
                "{:<14} no goal  {} spent",
                progress.category.label(),
                context.money(progress.spent)
            ),
        };
        if progress.over_budget {
            output::warning(format!("{line}  over budget"));
        } else {
            output::info(line);
        }
    }
    Ok(())
}

fn cmd_balance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(format!("Balance: {}", context.money(context.manager.balance())));
    Ok(())
}

fn cmd_spending(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Spending");
    let breakdown = context.manager.expense_breakdown();
    if breakdown.is_empty() {
        output::info("No expenses yet.");
        return Ok(());
    }
    let total = breakdown.iter().fold(0.0, |acc, (_, amount)| acc + amount);
    for (category, amount) in breakdown {
        output::info(format!(
            "{:<14} {:>12}  {:>5.1}%",
            category.label(),
            context.money(amount),
            amount / total * 100.0
        ));
    }
    output::info(format!("{:<14} {:>12}", "Total", context.money(total)));
    Ok(())
}
