use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod context;
mod deployers;
mod error;
mod hooks;
mod manifest;

use crate::cli::RootArgs;
use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::context::Invocation;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let registry = CommandRegistry::builtin()?;
    tracing::debug!(commands = ?registry.names(), "registry ready");

    let config = Config::resolve(args.config.as_deref())?;
    let target = args.command.target();
    let invocation = Invocation::new(&target.service, &target.env, &config.deploying_user())
        .with_version(args.command.version());

    let command = registry.instantiate(args.command.name(), &config, invocation)?;
    let output = registry.execute(command)?;
    println!("{output}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
