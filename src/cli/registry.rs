use std::collections::HashMap;
use std::fmt;

use crate::cli::context::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Heading a command is listed under in `help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandGroup {
    Transactions,
    Recurring,
    Budgets,
    Assistant,
    Shell,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommandGroup::Transactions => "Transactions",
            CommandGroup::Recurring => "Recurring",
            CommandGroup::Budgets => "Budgets",
            CommandGroup::Assistant => "Assistant",
            CommandGroup::Shell => "Shell",
        };
        f.write_str(label)
    }
}

#[derive(Clone)]
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

/// Commands looked up by lowercase name. Listing keeps registration order
/// within each group.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, (CommandGroup, CommandEntry)>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations under an existing name replace the handler but
    /// keep the original position.
    pub fn register(&mut self, group: CommandGroup, entry: CommandEntry) {
        let name = entry.name;
        if self.commands.insert(name, (group, entry)).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name).map(|(_, entry)| entry)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }

    /// Groups in display order, each with its commands.
    pub fn grouped(&self) -> Vec<(CommandGroup, Vec<&CommandEntry>)> {
        let mut groups: Vec<(CommandGroup, Vec<&CommandEntry>)> = Vec::new();
        for name in &self.order {
            let Some((group, entry)) = self.commands.get(name) else {
                continue;
            };
            match groups.iter_mut().find(|(existing, _)| existing == group) {
                Some((_, entries)) => entries.push(entry),
                None => groups.push((*group, vec![entry])),
            }
        }
        groups.sort_by_key(|(group, _)| *group);
        groups
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}
