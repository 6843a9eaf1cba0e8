//! Filesystem-backed deployer.
//!
//! Deployed versions live in `<stateDir>/<service>.json` as
//! `{ "<env>": { "<unit>": "<version>" } }`; available versions come from the
//! manifest.
use super::Deployer;
use crate::manifest::LocalDeployerManifest;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

type DeploymentState = BTreeMap<String, BTreeMap<String, String>>;

pub struct LocalDeployer {
    state_path: PathBuf,
    units: Vec<String>,
    versions: Vec<String>,
}

impl LocalDeployer {
    pub fn new(state_dir: PathBuf, service: &str, manifest: &LocalDeployerManifest) -> Self {
        let units = if manifest.units.is_empty() {
            vec![service.to_string()]
        } else {
            manifest.units.clone()
        };
        Self {
            state_path: state_dir.join(format!("{service}.json")),
            units,
            versions: manifest.versions.clone(),
        }
    }

    fn load_state(&self) -> Result<DeploymentState> {
        if !self.state_path.is_file() {
            return Ok(DeploymentState::new());
        }
        let bytes = fs::read(&self.state_path)
            .with_context(|| format!("read {}", self.state_path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parse deployment state {}", self.state_path.display()))
    }

    fn write_state(&self, state: &DeploymentState) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            fs::create_dir_all(parent).context("create deployer state dir")?;
        }
        let text = serde_json::to_string_pretty(state).context("serialize deployment state")?;
        fs::write(&self.state_path, text.as_bytes())
            .with_context(|| format!("write {}", self.state_path.display()))?;
        Ok(())
    }
}

impl Deployer for LocalDeployer {
    fn list_versions(&self, env: &str) -> Result<BTreeMap<String, String>> {
        let mut state = self.load_state()?;
        Ok(state.remove(env).unwrap_or_default())
    }

    fn list_vcs_versions(&self, _env: &str) -> Result<Vec<String>> {
        Ok(self.versions.clone())
    }

    fn deploy(&mut self, env: &str, version: &str) -> Result<()> {
        let mut state = self.load_state()?;
        let deployed = state.entry(env.to_string()).or_default();
        for unit in &self.units {
            deployed.insert(unit.clone(), version.to_string());
        }
        self.write_state(&state)?;
        tracing::info!(env, version, units = self.units.len(), "recorded deployment");
        Ok(())
    }
}
