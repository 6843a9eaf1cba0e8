//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Work directory holding a config file and service manifests.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    /// Workspace whose config points `workPath` at the temp dir itself. Extra
    /// top-level config keys are merged in from `extra`.
    pub fn new(extra: serde_json::Value) -> Self {
        let temp = tempfile::tempdir().expect("temp dir");
        let mut config = serde_json::json!({ "workPath": ".", "user": "ci" });
        if let (Some(target), Some(source)) = (config.as_object_mut(), extra.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        std::fs::write(
            temp.path().join("config.json"),
            serde_json::to_vec_pretty(&config).expect("serialize config"),
        )
        .expect("write config");
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.json")
    }

    pub fn write_manifest(&self, service: &str, manifest: serde_json::Value) {
        std::fs::write(
            self.root().join(format!("{service}.json")),
            serde_json::to_vec_pretty(&manifest).expect("serialize manifest"),
        )
        .expect("write manifest");
    }

    /// Run `cck` with the workspace config and `args`.
    pub fn cck(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_cck"))
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .env_remove("CCK_CONFIG")
            .env_remove("RUST_LOG")
            .output()
            .expect("spawn cck")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Assert success and return trimmed stdout.
pub fn expect_success(output: &Output) -> String {
    assert!(
        output.status.success(),
        "cck failed: status={:?}\nstderr:\n{}",
        output.status,
        stderr(output)
    );
    stdout(output)
}
