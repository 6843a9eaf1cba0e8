//! Per-invocation execution context.
//!
//! A context is built once per command invocation: every hook declared by the
//! manifest is constructed in order, then initialized in order under its own
//! failure policy. The hook list is fixed once the context exists.
use crate::config::Config;
use crate::error::CckError;
use crate::hooks::{self, DeploymentEvent, Hook, HookConstructor, HookStage};
use crate::manifest::Manifest;

/// The service/environment pair an invocation targets, plus who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub service: String,
    pub env: String,
    pub user: String,
    /// Explicit version requested by the operator, if any.
    pub version: Option<String>,
}

impl Invocation {
    pub fn new(service: &str, env: &str, user: &str) -> Self {
        Self {
            service: service.to_string(),
            env: env.to_string(),
            user: user.to_string(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn event(&self, version: &str) -> DeploymentEvent {
        DeploymentEvent {
            user: self.user.clone(),
            env: self.env.clone(),
            service: self.service.clone(),
            version: version.to_string(),
        }
    }
}

pub struct Context {
    config: Config,
    manifest: Manifest,
    hooks: Vec<Box<dyn Hook>>,
    invocation: Invocation,
}

impl Context {
    /// Build using `hook_source` to turn manifest entries into hooks.
    pub fn build(
        config: &Config,
        manifest: Manifest,
        invocation: Invocation,
        hook_source: &HookConstructor,
    ) -> Result<Self, CckError> {
        let mut hooks = manifest
            .hooks
            .iter()
            .map(|entry| hook_source(config, entry))
            .collect::<Result<Vec<_>, _>>()?;

        hooks::run_stage(&mut hooks, HookStage::Init, None)?;
        tracing::debug!(
            service = %invocation.service,
            env = %invocation.env,
            hooks = hooks.len(),
            "context built"
        );

        Ok(Self {
            config: config.clone(),
            manifest,
            hooks,
            invocation,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn hook_kinds(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.kind()).collect()
    }

    /// Run a deployment stage across the hooks in declared order. `Init` ran
    /// while building and is rejected here.
    pub fn run_hooks(&mut self, stage: HookStage, event: &DeploymentEvent) -> Result<(), CckError> {
        if stage == HookStage::Init {
            return Err(CckError::InvalidState(
                "hooks are initialized once, while the context is built".to_string(),
            ));
        }
        hooks::run_stage(&mut self.hooks, stage, Some(event))
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
