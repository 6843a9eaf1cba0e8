//! Name -> command factory table.
//!
//! Built once in the entry point and passed by reference into dispatch; it is
//! only read after start-up.
use super::{Command, CommandOutput, Deploy, Diff, List, Rollback};
use crate::config::Config;
use crate::context::{Context, Invocation};
use crate::deployers;
use crate::error::CckError;
use crate::hooks::{self, HookSource};
use crate::manifest;
use std::collections::BTreeMap;

/// Zero-argument constructor for a command.
pub type CommandFactory = Box<dyn Fn() -> Box<dyn Command>>;

pub struct CommandRegistry {
    factories: BTreeMap<String, CommandFactory>,
    hook_source: HookSource,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
            hook_source: Box::new(hooks::from_manifest),
        }
    }
}

impl CommandRegistry {
    /// Registry holding deploy, diff, list and rollback backed by the default
    /// deployer source.
    pub fn builtin() -> Result<Self, CckError> {
        let mut registry = Self::default();
        registry.register(
            "deploy",
            Box::new(|| -> Box<dyn Command> {
                Box::new(Deploy::new(Box::new(deployers::from_manifest)))
            }),
        )?;
        registry.register(
            "diff",
            Box::new(|| -> Box<dyn Command> {
                Box::new(Diff::new(Box::new(deployers::from_manifest)))
            }),
        )?;
        registry.register(
            "list",
            Box::new(|| -> Box<dyn Command> {
                Box::new(List::new(Box::new(deployers::from_manifest)))
            }),
        )?;
        registry.register(
            "rollback",
            Box::new(|| -> Box<dyn Command> {
                Box::new(Rollback::new(Box::new(deployers::from_manifest)))
            }),
        )?;
        Ok(registry)
    }

    /// Register `factory` under `name`. Names are unique; registering an
    /// existing name fails.
    pub fn register(&mut self, name: &str, factory: CommandFactory) -> Result<(), CckError> {
        if self.factories.contains_key(name) {
            return Err(CckError::DuplicateCommand {
                name: name.to_string(),
            });
        }
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Look up `name`, then run the fill pipeline: load the service manifest,
    /// build the context (constructing and initializing hooks) and fill the
    /// command with it. Unknown names fail before any manifest is read.
    pub fn instantiate(
        &self,
        name: &str,
        config: &Config,
        invocation: Invocation,
    ) -> Result<Box<dyn Command>, CckError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CckError::CommandNotFound {
                name: name.to_string(),
            })?;
        let mut command = factory();

        let manifest = manifest::load(config, &invocation.service)?;
        let context = Context::build(config, manifest, invocation, self.hook_source.as_ref())?;
        tracing::debug!(
            command = name,
            hooks = ?context.hook_kinds(),
            "command filled"
        );
        command.fill(context)?;
        Ok(command)
    }

    pub fn execute(&self, command: Box<dyn Command>) -> Result<CommandOutput, CckError> {
        let name = command.name();
        let outcome = command.execute();
        if let Err(err) = &outcome {
            tracing::debug!(command = name, error = %err, "command failed");
        }
        outcome
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
