//! Command registry - name to command lookup.
//!
//! Command modules live under `src/commands/`. The build script discovers
//! every module there (skipping files whose name starts with `_`) and
//! generates `commands::discover`, which calls each module's
//! `register(&mut Registry)` once.
//!
//! To add a new command:
//! 1. Create a new file in `src/commands/` (any depth)
//! 2. Implement one of the command traits
//! 3. Export `pub fn register(registry: &mut Registry)` registering it

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::command::{Command, Forwarded, ForwardingCommand, Parsed, ParsedCommand};
use crate::error::{TaskError, TaskResult};
use crate::exec::{Exec, ExecCommand};
use crate::workflow::{Action, ActionDocument, Pipeline, Workflow};

#[derive(Default)]
pub struct Registry {
    commands: BTreeMap<&'static str, Box<dyn Command>>,
}

lazy_static! {
    static ref REGISTRY: Registry = Registry::discover();
}

/// The process-wide registry, populated on first use.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every discovered command.
    pub fn discover() -> Self {
        let mut registry = Self::new();
        crate::commands::discover(&mut registry);
        debug!(
            "discovered {} commands from {} modules",
            registry.commands.len(),
            crate::commands::MODULES.len()
        );
        registry
    }

    /// Register `command` under its name; a later registration replaces an earlier one.
    pub fn register<C: Command + 'static>(&mut self, command: C) {
        let name = command.name();
        if name.is_empty() {
            return;
        }
        if self.commands.insert(name, Box::new(command)).is_some() {
            debug!("command `{}` replaced", name);
        }
    }

    pub fn parsed<C: ParsedCommand + 'static>(&mut self, command: C) {
        self.register(Parsed(command));
    }

    pub fn forwarded<C: ForwardingCommand + 'static>(&mut self, command: C) {
        self.register(Forwarded(command));
    }

    pub fn exec<C: ExecCommand + 'static>(&mut self, command: C) {
        self.register(Parsed(Exec(command)));
    }

    pub fn workflow<W: Workflow + 'static>(&mut self, workflow: W) {
        self.register(Parsed(Pipeline(workflow)));
    }

    pub fn action<A: Action + 'static>(&mut self, action: A) {
        self.register(Parsed(ActionDocument(action)));
    }

    pub fn find(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|command| command.as_ref())
    }

    pub fn resolve(&self, name: &str) -> TaskResult<&dyn Command> {
        self.find(name)
            .ok_or_else(|| TaskError::CommandNotFound(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }

    pub fn commands(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.values().map(|command| command.as_ref())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
