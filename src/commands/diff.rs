use super::{resolve_deployer, Command, CommandOutput, DiffEntry, FillSlot};
use crate::context::Context;
use crate::deployers::DeployerSource;
use crate::error::CckError;

const NAME: &str = "diff";

/// Compare what is deployed against the newest available version.
pub struct Diff {
    deployers: DeployerSource,
    slot: FillSlot,
}

impl Diff {
    pub fn new(deployers: DeployerSource) -> Self {
        Self {
            deployers,
            slot: FillSlot::default(),
        }
    }
}

impl Command for Diff {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fill(&mut self, context: Context) -> Result<(), CckError> {
        self.slot.fill(NAME, context)
    }

    fn execute(mut self: Box<Self>) -> Result<CommandOutput, CckError> {
        let context = self.slot.take(NAME)?;
        let deployer = resolve_deployer(self.deployers.as_ref(), &context)?;
        let invocation = context.invocation();

        let deployed = deployer
            .list_versions(&invocation.env)
            .map_err(CckError::deployer)?;
        let latest = deployer
            .list_vcs_versions(&invocation.env)
            .map_err(CckError::deployer)?
            .into_iter()
            .next();

        let entries = if deployed.is_empty() {
            // Nothing running yet: report the service itself as undeployed.
            latest
                .map(|latest| DiffEntry {
                    unit: invocation.service.clone(),
                    deployed: None,
                    latest: Some(latest),
                })
                .into_iter()
                .collect()
        } else {
            deployed
                .into_iter()
                .map(|(unit, version)| DiffEntry {
                    unit,
                    deployed: Some(version),
                    latest: latest.clone(),
                })
                .collect()
        };
        Ok(CommandOutput::Diff(entries))
    }
}
