use super::{resolve_deployer, Command, CommandOutput, FillSlot};
use crate::context::Context;
use crate::deployers::DeployerSource;
use crate::error::CckError;

const NAME: &str = "list";

/// Report the versions currently deployed in the target environment.
pub struct List {
    deployers: DeployerSource,
    slot: FillSlot,
}

impl List {
    pub fn new(deployers: DeployerSource) -> Self {
        Self {
            deployers,
            slot: FillSlot::default(),
        }
    }
}

impl Command for List {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fill(&mut self, context: Context) -> Result<(), CckError> {
        self.slot.fill(NAME, context)
    }

    fn execute(mut self: Box<Self>) -> Result<CommandOutput, CckError> {
        let context = self.slot.take(NAME)?;
        let deployer = resolve_deployer(self.deployers.as_ref(), &context)?;
        let versions = deployer
            .list_versions(&context.invocation().env)
            .map_err(CckError::deployer)?;
        Ok(CommandOutput::Versions(versions))
    }
}
