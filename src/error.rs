//! Error taxonomy for the dispatch and hook orchestration core.
//!
//! Hook and deployer implementations report opaque `anyhow` causes; the core
//! wraps them here so callers can tell configuration problems apart from
//! runtime failures.
use crate::hooks::HookStage;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CckError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unable to load manifest {}: {reason}", path.display())]
    ManifestLoad { path: PathBuf, reason: String },

    #[error("invalid {kind} hook configuration: {reason}")]
    HookConstruction { kind: String, reason: String },

    #[error("{hook} hook failed during {stage}: {source}")]
    HookFailed {
        hook: String,
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("command not found: {name}")]
    CommandNotFound { name: String },

    #[error("command '{name}' is already registered")]
    DuplicateCommand { name: String },

    #[error("deployer error: {source}")]
    Deployer {
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    Execution(String),

    #[error("invalid command state: {0}")]
    InvalidState(String),
}

impl CckError {
    pub(crate) fn deployer(source: anyhow::Error) -> Self {
        CckError::Deployer { source }
    }

    pub(crate) fn hook_construction(kind: &str, reason: impl Into<String>) -> Self {
        CckError::HookConstruction {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}
