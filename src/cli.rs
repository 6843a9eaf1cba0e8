//! CLI argument parsing.
//!
//! The CLI only selects a command name and its target; everything else goes
//! through the command registry.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cck",
    version,
    about = "Deploy services and notify integrations around each deployment",
    after_help = "Examples:\n  cck list billing prod\n  cck diff billing staging\n  cck deploy billing prod --version 1.4.0\n  cck rollback billing prod",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Config file (defaults to $CCK_CONFIG, then ~/.contactkey/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy a version, running hooks before and after
    Deploy(DeployArgs),
    /// Compare deployed versions against the newest available one
    Diff(TargetArgs),
    /// List versions currently deployed
    List(TargetArgs),
    /// Redeploy the version preceding the current one
    Rollback(TargetArgs),
}

#[derive(Parser, Debug)]
pub struct TargetArgs {
    /// Service whose manifest drives the command
    pub service: String,

    /// Target environment
    pub env: String,
}

#[derive(Parser, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Version to deploy (defaults to the newest available)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,
}

impl Command {
    /// Registry name of the selected command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Deploy(_) => "deploy",
            Command::Diff(_) => "diff",
            Command::List(_) => "list",
            Command::Rollback(_) => "rollback",
        }
    }

    pub fn target(&self) -> &TargetArgs {
        match self {
            Command::Deploy(args) => &args.target,
            Command::Diff(args) | Command::List(args) | Command::Rollback(args) => args,
        }
    }

    pub fn version(&self) -> Option<String> {
        match self {
            Command::Deploy(args) => args.version.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_deploy_with_version_and_global_flags() {
        let args = RootArgs::try_parse_from([
            "cck", "deploy", "billing", "prod", "--version", "1.4.0", "--config", "/tmp/c.json", "-v",
        ])
        .expect("parse");

        assert_eq!(args.command.name(), "deploy");
        assert_eq!(args.command.target().service, "billing");
        assert_eq!(args.command.target().env, "prod");
        assert_eq!(args.command.version().as_deref(), Some("1.4.0"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(args.verbose);
    }

    #[test]
    fn every_command_requires_service_and_env() {
        for name in ["deploy", "diff", "list", "rollback"] {
            assert!(RootArgs::try_parse_from(["cck", name, "billing"]).is_err());
            let args = RootArgs::try_parse_from(["cck", name, "billing", "prod"]).expect("parse");
            assert_eq!(args.command.name(), name);
            assert_eq!(args.command.version(), None);
        }
    }
}
