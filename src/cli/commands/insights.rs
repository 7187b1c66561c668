use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "insights",
        "Ask the assistant for spending tips",
        "insights",
        cmd_insights,
    )]
}

fn cmd_insights(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let applied = context.manager.refresh_insights(&context.advisor)?;
    if !applied {
        output::warning("Transactions changed while insights were loading; showing previous tips.");
    }
    output::section("Insights");
    for item in context.manager.insight_items() {
        output::info(format!("- {}", item));
    }
    Ok(())
}
