//! Capsule CLI - sealed messages to your future self, encrypted at rest
//!
//! This is the command-line interface for Capsule. It provides a
//! user-friendly interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use capsule_core::{CapsuleError, VERSION};

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{capsules, init, maintenance, misc, notify};
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        exit_with_error(&e);
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over `-v`.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with_error(err: &anyhow::Error) -> ! {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        cli_err.exit();
    }
    if let Some(core_err) = err.downcast_ref::<CapsuleError>() {
        if let Some(mapped) = CliError::from_core(core_err) {
            mapped.exit();
        }
    }
    eprintln!("Error: {:#}", err);
    std::process::exit(1)
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => {
            init::handle_init(ctx, args)?;
        }
        Some(Commands::Create(args)) => {
            capsules::handle_create(ctx, args)?;
        }
        Some(Commands::List(args)) => {
            capsules::handle_list(ctx, args)?;
        }
        Some(Commands::Show(args)) => {
            capsules::handle_show(ctx, args)?;
        }
        Some(Commands::Delete(args)) => {
            capsules::handle_delete(ctx, args)?;
        }
        Some(Commands::Migrate(args)) => {
            maintenance::handle_migrate(ctx, args)?;
        }
        Some(Commands::Due(args)) => {
            notify::handle_due(ctx, args)?;
        }
        Some(Commands::Inspect(args)) => {
            maintenance::handle_inspect(ctx, args)?;
        }
        Some(Commands::Backup(args)) => {
            maintenance::handle_backup(ctx, args)?;
        }
        Some(Commands::Completions(args)) => {
            misc::handle_completions(args)?;
        }
        None => {
            println!("Capsule v{}", VERSION);
            println!("\nQuickstart:");
            println!("  export ENCRYPTION_SECRET=...");
            println!("  capsule init");
            println!("  capsule create --user me --title \"Goals\" --message \"Hello\" --unlock 2030-01-01");
            println!("  capsule list --user me");
            println!("  capsule show --user me <id>");
            println!("\nRun `capsule --help` for full usage.");
        }
    }

    Ok(())
}
