use super::{deploy_with_hooks, resolve_deployer, Command, CommandOutput, FillSlot};
use crate::context::Context;
use crate::deployers::DeployerSource;
use crate::error::CckError;

const NAME: &str = "rollback";

/// Redeploy the version just before the one currently running.
pub struct Rollback {
    deployers: DeployerSource,
    slot: FillSlot,
}

impl Rollback {
    pub fn new(deployers: DeployerSource) -> Self {
        Self {
            deployers,
            slot: FillSlot::default(),
        }
    }
}

impl Command for Rollback {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fill(&mut self, context: Context) -> Result<(), CckError> {
        self.slot.fill(NAME, context)
    }

    fn execute(mut self: Box<Self>) -> Result<CommandOutput, CckError> {
        let mut context = self.slot.take(NAME)?;
        let mut deployer = resolve_deployer(self.deployers.as_ref(), &context)?;
        let invocation = context.invocation().clone();

        let mut deployed = deployer
            .list_versions(&invocation.env)
            .map_err(CckError::deployer)?;
        // Prefer the unit named after the service; fall back to the first unit.
        let current = deployed
            .remove(&invocation.service)
            .or_else(|| deployed.into_values().next())
            .ok_or_else(|| {
                CckError::Execution(format!(
                    "nothing deployed for {} on {}",
                    invocation.service, invocation.env
                ))
            })?;

        let available = deployer
            .list_vcs_versions(&invocation.env)
            .map_err(CckError::deployer)?;
        let position = available
            .iter()
            .position(|version| *version == current)
            .ok_or_else(|| {
                CckError::Execution(format!(
                    "deployed version {current} is unknown to the version source"
                ))
            })?;
        let target = available.get(position + 1).cloned().ok_or_else(|| {
            CckError::Execution(format!("no version older than {current} to roll back to"))
        })?;

        tracing::info!(
            service = %invocation.service,
            env = %invocation.env,
            from = %current,
            to = %target,
            "rolling back"
        );
        deploy_with_hooks(&mut context, deployer.as_mut(), &target)?;

        Ok(CommandOutput::RolledBack {
            service: invocation.service,
            env: invocation.env,
            from: current,
            to: target,
        })
    }
}
