//! Version-source backends.
//!
//! A deployer reports what is running in an environment, what could be
//! running, and performs the deployment action itself. Commands resolve the
//! deployer they need from config and manifest; the context does not own one.
use crate::config::Config;
use crate::error::CckError;
use crate::manifest::DeployerManifest;
use anyhow::Result;
use std::collections::BTreeMap;

mod local;

pub use local::LocalDeployer;

pub trait Deployer {
    /// Currently deployed version per deployable unit in `env`.
    fn list_versions(&self, env: &str) -> Result<BTreeMap<String, String>>;

    /// Versions available upstream for `env`, newest first.
    fn list_vcs_versions(&self, env: &str) -> Result<Vec<String>>;

    fn deploy(&mut self, env: &str, version: &str) -> Result<()>;
}

/// Resolves the deployer for a service from config and its manifest entry.
pub type DeployerConstructor =
    dyn Fn(&Config, &str, &DeployerManifest) -> Result<Box<dyn Deployer>, CckError>;

pub type DeployerSource = Box<DeployerConstructor>;

/// Default deployer source keyed on the manifest's deployer type.
pub fn from_manifest(
    config: &Config,
    service: &str,
    manifest: &DeployerManifest,
) -> Result<Box<dyn Deployer>, CckError> {
    match manifest {
        DeployerManifest::Local(local) => Ok(Box::new(LocalDeployer::new(
            config.local_state_dir(),
            service,
            local,
        ))),
    }
}
