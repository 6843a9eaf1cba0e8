//! Commands dispatched by name.
//!
//! Every command moves through `constructed -> filled -> executed`. Filling
//! twice or executing an unfilled command is rejected, and `execute` consumes
//! the command so it cannot run again.
use crate::context::Context;
use crate::deployers::{Deployer, DeployerConstructor};
use crate::error::CckError;
use crate::hooks::HookStage;
use std::collections::BTreeMap;
use std::fmt;

mod deploy;
mod diff;
mod list;
mod registry;
mod rollback;

pub use deploy::Deploy;
pub use diff::Diff;
pub use list::List;
pub use registry::CommandRegistry;
pub use rollback::Rollback;

pub trait Command {
    fn name(&self) -> &'static str;

    /// Bind the command to a built context. Called exactly once.
    fn fill(&mut self, context: Context) -> Result<(), CckError>;

    fn execute(self: Box<Self>) -> Result<CommandOutput, CckError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Deployed {
        service: String,
        env: String,
        version: String,
    },
    RolledBack {
        service: String,
        env: String,
        from: String,
        to: String,
    },
    Versions(BTreeMap<String, String>),
    Diff(Vec<DiffEntry>),
}

/// Deployed vs. newest available version for one deployable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub unit: String,
    pub deployed: Option<String>,
    pub latest: Option<String>,
}

impl DiffEntry {
    pub fn is_current(&self) -> bool {
        self.deployed.is_some() && self.deployed == self.latest
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Deployed {
                service,
                env,
                version,
            } => write!(f, "deployed {service} {version} on {env}"),
            CommandOutput::RolledBack {
                service,
                env,
                from,
                to,
            } => write!(f, "rolled back {service} on {env} from {from} to {to}"),
            CommandOutput::Versions(versions) => {
                if versions.is_empty() {
                    return write!(f, "nothing deployed");
                }
                let lines: Vec<String> = versions
                    .iter()
                    .map(|(unit, version)| format!("{unit}\t{version}"))
                    .collect();
                write!(f, "{}", lines.join("\n"))
            }
            CommandOutput::Diff(entries) => {
                if entries.is_empty() {
                    return write!(f, "nothing to compare");
                }
                let lines: Vec<String> = entries
                    .iter()
                    .map(|entry| {
                        let deployed = entry.deployed.as_deref().unwrap_or("-");
                        let latest = entry.latest.as_deref().unwrap_or("-");
                        let marker = if entry.is_current() { "up to date" } else { "outdated" };
                        format!("{}\t{deployed}\t{latest}\t{marker}", entry.unit)
                    })
                    .collect();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}

/// Slot holding the context between `fill` and `execute`.
#[derive(Default)]
struct FillSlot(Option<Context>);

impl FillSlot {
    fn fill(&mut self, command: &str, context: Context) -> Result<(), CckError> {
        if self.0.is_some() {
            return Err(CckError::InvalidState(format!(
                "{command} command is already filled"
            )));
        }
        self.0 = Some(context);
        Ok(())
    }

    fn take(&mut self, command: &str) -> Result<Context, CckError> {
        self.0.take().ok_or_else(|| {
            CckError::InvalidState(format!("{command} command executed before fill"))
        })
    }
}

fn resolve_deployer(
    source: &DeployerConstructor,
    context: &Context,
) -> Result<Box<dyn Deployer>, CckError> {
    source(
        context.config(),
        &context.invocation().service,
        &context.manifest().deployer,
    )
}

/// Pre-deployment hooks, the deployment action, then post-deployment hooks.
/// An aborting pre-deployment failure means the action never runs.
fn deploy_with_hooks(
    context: &mut Context,
    deployer: &mut dyn Deployer,
    version: &str,
) -> Result<(), CckError> {
    let event = context.invocation().event(version);
    context.run_hooks(HookStage::PreDeployment, &event)?;
    deployer
        .deploy(&event.env, version)
        .map_err(CckError::deployer)?;
    context.run_hooks(HookStage::PostDeployment, &event)?;
    Ok(())
}
