//! gw: Google Workspace from the command line
//!
//! `gw <namespace> <action> [args]` maps onto one Workspace REST call (or a
//! short sequence of them) and prints a simplified JSON result on stdout.

pub mod auth;
pub mod commands;
pub mod common;
pub mod config;
pub mod context;
pub mod google;

use anyhow::Context as _;
use clap::FromArgMatches;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use commands::{dispatch, params_from_matches, CommandRegistry, GlobalOpts};
use config::Config;
use context::AppContext;

/// Parse the command line, run one command, and print its result
pub async fn run() -> anyhow::Result<()> {
    let registry = CommandRegistry::builtin()?;
    let matches = registry.build_cli().get_matches();
    let globals = GlobalOpts::from_arg_matches(&matches)?;

    init_tracing(globals.verbose);

    let (namespace, namespace_matches) = matches
        .subcommand()
        .context("no command given")?;
    let (action, action_matches) = namespace_matches
        .subcommand()
        .with_context(|| format!("no {} command given", namespace))?;
    let spec = registry
        .get(namespace, action)
        .with_context(|| format!("unknown command: {} {}", namespace, action))?;
    let params = params_from_matches(spec, action_matches);

    let config = Config::load(globals.config.as_deref())?;
    debug!("Loaded config: {:?}", config);

    let ctx = AppContext::new(config, registry, globals.access_token);
    let result = match dispatch(&ctx, namespace, action, &params).await {
        Ok(result) => result,
        Err(err) => {
            if let Some(data) = &err.data {
                error!("{} {} failed: {}", namespace, action, data);
            }
            return Err(err.into());
        }
    };

    let output = if globals.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{}", output);
    Ok(())
}

/// Logs go to stderr so stdout stays pure JSON. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
