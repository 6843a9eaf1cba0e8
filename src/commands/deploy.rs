use super::{deploy_with_hooks, resolve_deployer, Command, CommandOutput, FillSlot};
use crate::context::Context;
use crate::deployers::DeployerSource;
use crate::error::CckError;

const NAME: &str = "deploy";

/// Deploy the requested version, or the newest available one.
pub struct Deploy {
    deployers: DeployerSource,
    slot: FillSlot,
}

impl Deploy {
    pub fn new(deployers: DeployerSource) -> Self {
        Self {
            deployers,
            slot: FillSlot::default(),
        }
    }
}

impl Command for Deploy {
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

        let version = match invocation.version.clone() {
            Some(version) => version,
            None => deployer
                .list_vcs_versions(&invocation.env)
                .map_err(CckError::deployer)?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    CckError::Execution(format!(
                        "no version available for {} on {}",
                        invocation.service, invocation.env
                    ))
                })?,
        };

        tracing::info!(
            service = %invocation.service,
            env = %invocation.env,
            version = %version,
            "deploying"
        );
        deploy_with_hooks(&mut context, deployer.as_mut(), &version)?;

        Ok(CommandOutput::Deployed {
            service: invocation.service,
            env: invocation.env,
            version,
        })
    }
}
