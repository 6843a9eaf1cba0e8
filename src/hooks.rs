//! Hook lifecycle protocol.
//!
//! Hooks are integrations invoked at fixed points around a deployment. Each
//! hook carries its own failure policy, and every lifecycle call site goes
//! through [`run_stage`] so the policy is applied the same way for `Init`,
//! `PreDeployment` and `PostDeployment`.
use crate::config::Config;
use crate::error::CckError;
use crate::manifest::HookManifest;
use anyhow::Result;
use std::fmt;

mod filter;
mod new_relic;

pub use filter::render_filter;
pub use new_relic::NewRelicHook;

/// Deployment being announced to hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentEvent {
    pub user: String,
    pub env: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Init,
    PreDeployment,
    PostDeployment,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HookStage::Init => "init",
            HookStage::PreDeployment => "pre-deployment",
            HookStage::PostDeployment => "post-deployment",
        };
        f.write_str(label)
    }
}

/// What a failing hook does to the enclosing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Abort,
    ContinueAndLog,
}

impl FailurePolicy {
    pub fn from_stop_on_error(stop_on_error: bool) -> Self {
        if stop_on_error {
            FailurePolicy::Abort
        } else {
            FailurePolicy::ContinueAndLog
        }
    }
}

pub trait Hook {
    /// Short identifier used in logs and errors.
    fn kind(&self) -> &str;

    /// One-time setup, called by the context builder before any command runs.
    fn init(&mut self) -> Result<()>;

    fn pre_deployment(&mut self, event: &DeploymentEvent) -> Result<()>;

    fn post_deployment(&mut self, event: &DeploymentEvent) -> Result<()>;

    fn stop_on_error(&self) -> bool;

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::from_stop_on_error(self.stop_on_error())
    }
}

/// Constructs a hook from its manifest entry.
pub type HookConstructor = dyn Fn(&Config, &HookManifest) -> Result<Box<dyn Hook>, CckError>;

/// Owned hook constructor; swappable so tests can inject recording hooks.
pub type HookSource = Box<HookConstructor>;

/// Default hook source: one concrete hook type per manifest variant.
pub fn from_manifest(config: &Config, manifest: &HookManifest) -> Result<Box<dyn Hook>, CckError> {
    match manifest {
        HookManifest::NewRelic(hook) => {
            let settings = config.hooks.new_relic.clone().unwrap_or_default();
            Ok(Box::new(NewRelicHook::new(&settings, hook)?))
        }
    }
}

/// Run one lifecycle stage across `hooks` in order, applying each hook's
/// failure policy. Stops at the first aborting failure.
pub fn run_stage(
    hooks: &mut [Box<dyn Hook>],
    stage: HookStage,
    event: Option<&DeploymentEvent>,
) -> Result<(), CckError> {
    for hook in hooks.iter_mut() {
        let outcome = match (stage, event) {
            (HookStage::Init, _) => hook.init(),
            (HookStage::PreDeployment, Some(event)) => hook.pre_deployment(event),
            (HookStage::PostDeployment, Some(event)) => hook.post_deployment(event),
            (_, None) => {
                return Err(CckError::InvalidState(format!(
                    "{stage} requires a deployment event"
                )))
            }
        };
        apply_policy(hook.as_ref(), stage, outcome)?;
    }
    Ok(())
}

fn apply_policy(hook: &dyn Hook, stage: HookStage, outcome: Result<()>) -> Result<(), CckError> {
    let Err(source) = outcome else {
        return Ok(());
    };
    match hook.policy() {
        FailurePolicy::Abort => Err(CckError::HookFailed {
            hook: hook.kind().to_string(),
            stage,
            source,
        }),
        FailurePolicy::ContinueAndLog => {
            tracing::warn!(
                hook = hook.kind(),
                stage = %stage,
                error = %format!("{source:#}"),
                "hook failed; continuing"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
pub(crate) mod tests;
