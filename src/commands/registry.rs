// src/commands/registry.rs
use std::collections::HashMap;

use super::types::Command;
use crate::ast::CommandKind;

use super::cd::{CdCommand, CwdCommand, HomeCommand};
use super::clear_cmd::ClearCommand;
use super::ls::LsCommand;
use super::mkdir::{MkdirCommand, RmdirCommand};
use super::mkfile::MkfileCommand;
use super::print::PrintCommand;
use super::rm::RmCommand;
use super::show_cmd::ShowCommand;
use super::whoami_cmd::WhoamiCommand;

pub struct CommandRegistry {
    commands: HashMap<CommandKind, Box<dyn Command>>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// A registry holding every builtin command.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(CommandKind::List, Box::new(LsCommand));
        registry.register(CommandKind::ChangeDir, Box::new(CdCommand));
        registry.register(CommandKind::CurrentDir, Box::new(CwdCommand));
        registry.register(CommandKind::Home, Box::new(HomeCommand));
        registry.register(CommandKind::MakeDir, Box::new(MkdirCommand));
        registry.register(CommandKind::RemoveDir, Box::new(RmdirCommand));
        registry.register(CommandKind::Remove, Box::new(RmCommand));
        registry.register(CommandKind::MakeFile, Box::new(MkfileCommand));
        registry.register(CommandKind::WhoAmI, Box::new(WhoamiCommand));
        registry.register(CommandKind::Print, Box::new(PrintCommand { name: "print" }));
        registry.register(CommandKind::Output, Box::new(PrintCommand { name: "output" }));
        registry.register(CommandKind::Show, Box::new(ShowCommand));
        registry.register(CommandKind::Clear, Box::new(ClearCommand));
        registry
    }

    pub fn register(&mut self, kind: CommandKind, cmd: Box<dyn Command>) {
        self.commands.insert(kind, cmd);
    }

    pub fn get(&self, kind: CommandKind) -> Option<&dyn Command> {
        self.commands.get(&kind).map(|c| c.as_ref())
    }

    pub fn contains(&self, kind: CommandKind) -> bool {
        self.commands.contains_key(&kind)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_kind_is_registered() {
        let registry = CommandRegistry::with_builtins();
        let kinds = [
            CommandKind::List,
            CommandKind::Remove,
            CommandKind::ChangeDir,
            CommandKind::RemoveDir,
            CommandKind::MakeDir,
            CommandKind::WhoAmI,
            CommandKind::CurrentDir,
            CommandKind::MakeFile,
            CommandKind::Output,
            CommandKind::Print,
            CommandKind::Show,
            CommandKind::Clear,
            CommandKind::Home,
        ];
        for kind in kinds {
            assert!(registry.contains(kind), "{} not registered", kind);
        }
        assert_eq!(registry.get(CommandKind::Home).unwrap().name(), "home");
        assert_eq!(registry.get(CommandKind::Output).unwrap().name(), "output");
    }

    #[test]
    fn test_empty_registry() {
        assert!(!CommandRegistry::new().contains(CommandKind::List));
    }
}
