use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};

use super::usage;

const CONFIG_USAGE: &str = "config [show|set <currency|ai|model|endpoint|timeout> <value>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("config", "Show or change settings", CONFIG_USAGE, cmd_config),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            show_config(context);
            Ok(())
        }
        ["set", key, value @ ..] if !value.is_empty() => {
            set_config(context, key, &value.join(" "))
        }
        _ => Err(usage(CONFIG_USAGE)),
    }
}

fn show_config(context: &ShellContext) {
    let config = &context.config;
    output::section("Configuration");
    output::info(format!("  currency : {}", config.currency_symbol));
    output::info(format!(
        "  ai       : {} ({})",
        if config.ai.enabled { "on" } else { "off" },
        if context.advisor.is_online() {
            "connected"
        } else {
            "offline"
        }
    ));
    output::info(format!("  model    : {}", config.ai.model));
    output::info(format!("  endpoint : {}", config.ai.endpoint));
    output::info(format!("  key env  : {}", config.ai.api_key_env));
    output::info(format!("  timeout  : {}s", config.ai.timeout_secs));
}

fn set_config(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let value = value.trim();
    let mut reconnect = false;
    match key.to_ascii_lowercase().as_str() {
        "currency" => context.config.currency_symbol = value.to_string(),
        "ai" => {
            context.config.ai.enabled = parse_toggle(value)?;
            reconnect = true;
        }
        "model" => {
            context.config.ai.model = value.to_string();
            reconnect = true;
        }
        "endpoint" => {
            context.config.ai.endpoint = value.to_string();
            reconnect = true;
        }
        "timeout" => {
            context.config.ai.timeout_secs = value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!("invalid timeout `{}`", value))
                })?;
            reconnect = true;
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown setting `{}`",
                other
            )))
        }
    }
    context.save_config()?;
    if reconnect {
        context.reload_advisor();
    }
    output::success(format!("Setting `{}` updated.", key));
    Ok(())
}

fn parse_toggle(value: &str) -> Result<bool, CommandError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(CommandError::InvalidArguments(format!(
            "expected on or off, got `{}`",
            other
        ))),
    }
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section(format!("iBudget Core {}", env!("CARGO_PKG_VERSION")));
    output::info(format!(
        "  Build hash   : {} ({})",
        env!("IBUDGET_BUILD_HASH"),
        env!("IBUDGET_BUILD_STATUS")
    ));
    output::info(format!("  Built at     : {}", env!("IBUDGET_BUILD_TIMESTAMP")));
    output::info(format!("  Target       : {}", env!("IBUDGET_BUILD_TARGET")));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(entry) => print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    print_overview(&context.registry);
    Ok(())
}

fn print_overview(registry: &CommandRegistry) {
    output::section("Available commands");
    for (group, entries) in registry.grouped() {
        output::info(format!("{group}:"));
        for entry in entries {
            output::info(format!("  {:<10} {}", entry.name, entry.description));
        }
    }
    output::info("Use `help <command>` for details.");
}

fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    output::info(format!("  Description: {}", entry.description));
    output::info(format!("  Usage: {}", entry.usage));
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
