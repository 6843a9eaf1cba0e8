//! Process-wide configuration.
//!
//! Resolved once per invocation and read-only afterwards. Backend settings for
//! hooks and deployers live here; per-service choices live in the manifest.
use crate::error::CckError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "CCK_CONFIG";
const CONFIG_DIR: &str = ".contactkey";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Directory holding one `<service>.json` manifest per service.
    pub work_path: PathBuf,
    /// Name reported to hooks as the deploying user.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub deployers: DeployersConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HooksConfig {
    #[serde(default)]
    pub new_relic: Option<NewRelicConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRelicConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeployersConfig {
    #[serde(default)]
    pub local: Option<LocalDeployerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocalDeployerConfig {
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

impl Config {
    /// Locate and load the config: explicit path, then `$CCK_CONFIG`, then the
    /// per-user default under the home directory.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, CckError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, CckError> {
        let bytes = fs::read(path)
            .map_err(|err| CckError::Config(format!("read {}: {err}", path.display())))?;
        let mut config: Config = serde_json::from_slice(&bytes)
            .map_err(|err| CckError::Config(format!("parse {}: {err}", path.display())))?;
        config.validate()?;
        if config.work_path.is_relative() {
            if let Some(base) = path.parent() {
                config.work_path = base.join(&config.work_path);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CckError> {
        if self.work_path.as_os_str().is_empty() {
            return Err(CckError::Config("workPath must be set".to_string()));
        }
        Ok(())
    }

    /// Path of the manifest describing `service`.
    pub fn manifest_path(&self, service: &str) -> PathBuf {
        self.work_path.join(format!("{service}.json"))
    }

    /// User recorded on deployment markers.
    pub fn deploying_user(&self) -> String {
        self.user
            .clone()
            .filter(|user| !user.trim().is_empty())
            .or_else(|| env::var("USER").ok().filter(|user| !user.is_empty()))
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn local_state_dir(&self) -> PathBuf {
        self.deployers
            .local
            .as_ref()
            .and_then(|local| local.state_dir.clone())
            .map(|dir| {
                if dir.is_relative() {
                    self.work_path.join(dir)
                } else {
                    dir
                }
            })
            .unwrap_or_else(|| self.work_path.join(".state"))
    }
}

fn default_config_path() -> Result<PathBuf, CckError> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        CckError::Config(format!(
            "no home directory; pass --config or set {CONFIG_ENV}"
        ))
    })?;
    Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
