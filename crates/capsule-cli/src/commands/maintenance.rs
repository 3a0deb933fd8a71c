use std::io::IsTerminal;
use std::path::Path;

use capsule_core::backup::export_backup;
use capsule_core::diagnostics::inspect_recent;
use capsule_core::{migrate_capsules, MigrationScope};

use crate::app::AppContext;
use crate::cli::{BackupArgs, InspectArgs, MigrateArgs};
use crate::errors::CliError;
use crate::output::{inspection_table, print_json, print_migration_report};

pub fn handle_migrate(ctx: &AppContext, args: &MigrateArgs) -> anyhow::Result<()> {
    let scope = match &args.user {
        Some(user) => MigrationScope::User(user.clone()),
        None => MigrationScope::AllUsers,
    };
    let report = migrate_capsules(ctx.store()?, ctx.cipher()?, &scope)?;

    if args.json {
        print_json(&report)?;
    } else if !ctx.quiet() {
        print_migration_report(&report);
    }

    if !report.is_complete() {
        return Err(CliError::MigrationIncomplete(format!(
            "{} of {} capsules could not be encrypted",
            report.failed.len(),
            report.total
        ))
        .into());
    }
    Ok(())
}

pub fn handle_inspect(ctx: &AppContext, args: &InspectArgs) -> anyhow::Result<()> {
    if args.limit == 0 {
        return Err(CliError::invalid_input("--limit must be at least 1").into());
    }
    let inspections = inspect_recent(ctx.store()?, ctx.cipher()?, args.limit)?;

    if args.json {
        return print_json(&inspections);
    }
    if inspections.is_empty() {
        if !ctx.quiet() {
            println!("No capsules to inspect");
        }
        return Ok(());
    }
    println!("{}", inspection_table(&inspections));
    let unhealthy = inspections.iter().filter(|i| !i.is_healthy()).count();
    if unhealthy > 0 && !ctx.quiet() {
        println!("{} of {} capsules failed the check", unhealthy, inspections.len());
    }
    Ok(())
}

pub fn handle_backup(ctx: &AppContext, args: &BackupArgs) -> anyhow::Result<()> {
    let store = ctx.store()?;
    if std::io::stdin().is_terminal() && !ctx.quiet() {
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!("Export capsules to {}?", args.destination))
            .default(true)
            .interact()?;
        if !proceed {
            return Err(anyhow::anyhow!("Backup cancelled"));
        }
    }

    let count = export_backup(store, Path::new(&args.destination))?;
    if !ctx.quiet() {
        println!("Exported {} capsules to {}", count, args.destination);
    }
    Ok(())
}
