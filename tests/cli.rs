//! End-to-end runs of the `cck` binary against a local deployer.

mod common;

use common::{expect_success, stderr, stdout, Workspace};
use serde_json::json;

fn local_manifest() -> serde_json::Value {
    json!({
        "deployer": { "type": "local", "versions": ["3.0.0", "2.0.0", "1.0.0"] }
    })
}

#[test]
fn deploy_list_diff_and_rollback_share_state() {
    let workspace = Workspace::new(json!({}));
    workspace.write_manifest("billing", local_manifest());

    let out = expect_success(&workspace.cck(&["list", "billing", "prod"]));
    assert_eq!(out, "nothing deployed");

    let out = expect_success(&workspace.cck(&["diff", "billing", "prod"]));
    assert_eq!(out, "billing\t-\t3.0.0\toutdated");

    let out = expect_success(&workspace.cck(&["deploy", "billing", "prod", "--version", "2.0.0"]));
    assert_eq!(out, "deployed billing 2.0.0 on prod");

    let out = expect_success(&workspace.cck(&["list", "billing", "prod"]));
    assert_eq!(out, "billing\t2.0.0");

    let out = expect_success(&workspace.cck(&["diff", "billing", "prod"]));
    assert_eq!(out, "billing\t2.0.0\t3.0.0\toutdated");

    let out = expect_success(&workspace.cck(&["deploy", "billing", "prod"]));
    assert_eq!(out, "deployed billing 3.0.0 on prod");

    let out = expect_success(&workspace.cck(&["diff", "billing", "prod"]));
    assert_eq!(out, "billing\t3.0.0\t3.0.0\tup to date");

    let out = expect_success(&workspace.cck(&["rollback", "billing", "prod"]));
    assert_eq!(out, "rolled back billing on prod from 3.0.0 to 2.0.0");

    let out = expect_success(&workspace.cck(&["list", "billing", "prod"]));
    assert_eq!(out, "billing\t2.0.0");

    // Other environments are untouched.
    let out = expect_success(&workspace.cck(&["list", "billing", "staging"]));
    assert_eq!(out, "nothing deployed");

    assert!(workspace.root().join(".state/billing.json").is_file());
}

#[test]
fn rollback_from_oldest_version_fails() {
    let workspace = Workspace::new(json!({}));
    workspace.write_manifest("billing", local_manifest());
    expect_success(&workspace.cck(&["deploy", "billing", "prod", "--version", "1.0.0"]));

    let output = workspace.cck(&["rollback", "billing", "prod"]);

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("no version older than 1.0.0"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn missing_manifest_exits_non_zero() {
    let workspace = Workspace::new(json!({}));

    let output = workspace.cck(&["list", "ghost", "prod"]);

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(
        stderr(&output).contains("ghost.json"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn missing_config_exits_non_zero() {
    let workspace = Workspace::new(json!({}));
    std::fs::remove_file(workspace.config_path()).expect("remove config");

    let output = workspace.cck(&["list", "billing", "prod"]);

    assert!(!output.status.success());
}

#[test]
fn non_fatal_hook_failure_is_logged_and_deploy_proceeds() {
    // Nothing listens on the discard port, so every hook call fails.
    let workspace = Workspace::new(json!({
        "hooks": { "newRelic": { "url": "http://127.0.0.1:9", "apiKey": "key" } }
    }));
    workspace.write_manifest(
        "billing",
        json!({
            "hooks": [
                { "type": "newRelic", "applicationFilter": "{{service}}-{{env}}", "stopOnError": false }
            ],
            "deployer": { "type": "local", "versions": ["2.0.0", "1.0.0"] }
        }),
    );

    let output = workspace.cck(&["deploy", "billing", "prod"]);

    let out = expect_success(&output);
    assert_eq!(out, "deployed billing 2.0.0 on prod");
    assert!(
        stderr(&output).contains("pre-deployment"),
        "warning should name the stage: {}",
        stderr(&output)
    );
}

#[test]
fn fatal_hook_failure_stops_before_deploying() {
    let workspace = Workspace::new(json!({
        "hooks": { "newRelic": { "url": "http://127.0.0.1:9", "apiKey": "key" } }
    }));
    workspace.write_manifest(
        "billing",
        json!({
            "hooks": [
                { "type": "newRelic", "applicationFilter": "{{service}}", "stopOnError": true }
            ],
            "deployer": { "type": "local", "versions": ["2.0.0", "1.0.0"] }
        }),
    );

    let output = workspace.cck(&["deploy", "billing", "prod"]);

    assert!(!output.status.success());
    let out = expect_success(&workspace.cck(&["list", "billing", "prod"]));
    assert_eq!(out, "nothing deployed");
}

#[test]
fn hook_without_integration_config_fails_construction() {
    let workspace = Workspace::new(json!({}));
    workspace.write_manifest(
        "billing",
        json!({
            "hooks": [{ "type": "newRelic", "applicationFilter": "{{service}}" }],
            "deployer": { "type": "local", "versions": ["1.0.0"] }
        }),
    );

    let output = workspace.cck(&["list", "billing", "prod"]);

    assert!(!output.status.success());
}

#[test]
fn service_names_cannot_escape_the_work_path() {
    let workspace = Workspace::new(json!({ "workPath": "manifests" }));
    std::fs::create_dir(workspace.root().join("manifests")).expect("work dir");
    workspace.write_manifest("evil", local_manifest());

    let output = workspace.cck(&["deploy", "../evil", "prod"]);

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(!workspace.root().join("manifests/evil.json").exists());
    assert!(!workspace.root().join("manifests/.state").exists());
}
