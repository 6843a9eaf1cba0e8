//! Per-service manifest loading.
use crate::config::Config;
use crate::error::CckError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Declarative description of one service: its hooks in declared order and
/// the deployer that knows its versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub hooks: Vec<HookManifest>,
    pub deployer: DeployerManifest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HookManifest {
    NewRelic(NewRelicManifest),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRelicManifest {
    #[serde(default)]
    pub application_filter: String,
    #[serde(default)]
    pub stop_on_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DeployerManifest {
    Local(LocalDeployerManifest),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocalDeployerManifest {
    /// Available versions, newest first.
    #[serde(default)]
    pub versions: Vec<String>,
    /// Deployable units; defaults to the service itself.
    #[serde(default)]
    pub units: Vec<String>,
}

/// Read and decode `<workPath>/<service>.json`.
pub fn load(config: &Config, service: &str) -> Result<Manifest, CckError> {
    validate_service_name(service)?;
    let path = config.manifest_path(service);
    tracing::debug!(path = %path.display(), "loading manifest");
    let bytes = fs::read(&path).map_err(|err| CckError::ManifestLoad {
        path: path.clone(),
        reason: err.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| CckError::ManifestLoad {
        path,
        reason: format!("parse: {err}"),
    })
}

/// Service names become file names under the work path and the deployer
/// state dir, so they must stay a single plain path component.
fn validate_service_name(service: &str) -> Result<(), CckError> {
    let reason = if service.trim().is_empty() {
        Some("must not be empty")
    } else if service.contains(['/', '\\']) {
        Some("must not contain a path separator")
    } else if service.starts_with('.') {
        Some("must not start with '.'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(CckError::Config(format!(
            "invalid service name {service:?}: {reason}"
        ))),
        None => Ok(()),
    }
}
