//! Shell state, dispatch, and error reporting.

use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;

use crate::config::{Config, ConfigManager};
use crate::core::{BudgetManager, SystemClock};
use crate::errors::BudgetError;
use crate::insights::Advisor;
use crate::ledger::Transaction;
use crate::storage::JsonStorage;

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Fatal shell errors; the loop stops on these.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Line editor failed: {0}")]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
}

/// Per-command failures; reported and the loop continues.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) manager: BudgetManager,
    pub(crate) advisor: Advisor,
    pub(crate) config: Config,
    config_manager: ConfigManager,
    theme: ColorfulTheme,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let storage = JsonStorage::new(Some(config_manager.data_dir(&config)))?;
        tracing::info!(root = %storage.root().display(), "opening budget data");

        let manager = BudgetManager::open(Box::new(storage), Box::new(SystemClock));
        let advisor = Advisor::from_settings(&config.ai);

        output::set_preferences(output::OutputPreferences {
            plain: mode == CliMode::Script,
        });

        Ok(Self {
            mode,
            registry,
            manager,
            advisor,
            config,
            config_manager,
            theme: ColorfulTheme::default(),
            running: true,
        })
    }

    pub(crate) fn prompt(&self) -> String {
        "ibudget> ".to_string()
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        output::money(&self.config.currency_symbol, amount)
    }

    pub(crate) fn save_config(&mut self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Rebuilds the advisor after the assistant settings changed.
    pub(crate) fn reload_advisor(&mut self) {
        self.advisor = Advisor::from_settings(&self.config.ai);
    }

    /// Resolves a full id or a unique prefix of one.
    pub(crate) fn resolve_transaction_id(&self, input: &str) -> Result<String, CommandError> {
        resolve_id(
            self.manager.transactions().iter().map(|t| t.id.as_str()),
            input,
            "transaction",
        )
    }

    pub(crate) fn resolve_rule_id(&self, input: &str) -> Result<String, CommandError> {
        resolve_id(
            self.manager.recurring_rules().iter().map(|r| r.id.as_str()),
            input,
            "recurring rule",
        )
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", best));
            }
        }
    }

    /// Yes/no prompt in interactive mode; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Exit iBudget?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((idx, _)) if !id.starts_with("rec-gen-") => &id[..idx],
        _ => id,
    }
}

pub(crate) fn describe(transaction: &Transaction, money: String) -> String {
    let marker = if transaction.is_recurring { " (auto)" } else { "" };
    format!(
        "{:<10} {}  {:>12}  {:<14} {}{}",
        short_id(&transaction.id),
        transaction.date.format("%Y-%m-%d"),
        money,
        transaction.category.label(),
        transaction.note,
        marker
    )
}

fn resolve_id<'a>(
    ids: impl Iterator<Item = &'a str>,
    input: &str,
    what: &str,
) -> Result<String, CommandError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandError::InvalidArguments(format!("missing {what} id")));
    }
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(input)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == input) {
        return Ok(exact.to_string());
    }
    match matches.as_slice() {
        [only] => Ok(only.to_string()),
        [] => Err(CommandError::InvalidArguments(format!(
            "no {what} matches `{input}`"
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{input}` matches {} {what}s; use a longer id",
            matches.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_keep_generated_ids_whole() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("rec-gen-r1-1700000000000"), "rec-gen-r1-1700000000000");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn resolve_by_unique_prefix() {
        let ids = ["abc123", "abd456", "zzz"];
        assert_eq!(resolve_id(ids.into_iter(), "abc", "x").unwrap(), "abc123");
        assert!(resolve_id(ids.into_iter(), "ab", "x").is_err());
        assert!(resolve_id(ids.into_iter(), "q", "x").is_err());
        assert_eq!(resolve_id(ids.into_iter(), "zzz", "x").unwrap(), "zzz");
    }
}
