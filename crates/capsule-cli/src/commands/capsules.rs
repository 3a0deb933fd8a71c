//! Owner-facing capsule commands.

use std::io::IsTerminal;
use std::path::Path;

use chrono::Utc;

use capsule_core::{NewCapsule, Vault};

use crate::app::AppContext;
use crate::cli::{CreateArgs, DeleteArgs, ListArgs, ShowArgs};
use crate::helpers::{load_attachment, parse_capsule_id, parse_datetime, save_attachment};
use crate::output::{print_capsule, print_json, summary_table};

pub fn handle_create(ctx: &AppContext, args: &CreateArgs) -> anyhow::Result<()> {
    let unlock_date = parse_datetime(&args.unlock)?;
    let mut capsule = NewCapsule::new(
        args.user.as_str(),
        args.title.as_str(),
        args.message.as_str(),
        unlock_date,
    );
    if let Some(path) = &args.attachment {
        let attachment = load_attachment(Path::new(path), args.attachment_type.as_deref())?;
        capsule = capsule.with_attachment(attachment);
    }

    let vault = Vault::new(ctx.store()?, ctx.cipher()?);
    let record = vault.create_capsule(capsule)?;

    if ctx.quiet() {
        println!("{}", record.id);
    } else {
        println!("Sealed capsule {}", record.id);
        println!("Unlocks {}", record.unlock_date.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let vault = Vault::new(ctx.store()?, ctx.cipher()?);
    let summaries = vault.list_capsules(&args.user, Utc::now())?;

    if args.json {
        return print_json(&summaries);
    }
    if summaries.is_empty() {
        if !ctx.quiet() {
            println!("No capsules for {}", args.user);
        }
        return Ok(());
    }
    println!("{}", summary_table(&summaries));
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let id = parse_capsule_id(&args.id)?;
    let vault = Vault::new(ctx.store()?, ctx.cipher()?);
    let capsule = vault.open_capsule(&args.user, &id, Utc::now())?;

    if let Some(dest) = &args.save_attachment {
        let payload = capsule.attachment.as_deref().ok_or_else(|| {
            anyhow::anyhow!("Capsule {} has no readable attachment to save", capsule.id)
        })?;
        let bytes = save_attachment(payload, Path::new(dest))?;
        if !ctx.quiet() && !args.json {
            eprintln!("Saved attachment ({} bytes) to {}", bytes, dest);
        }
    }

    if args.json {
        return print_json(&capsule);
    }
    print_capsule(&capsule);
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let id = parse_capsule_id(&args.id)?;
    if !args.yes && std::io::stdin().is_terminal() && !ctx.quiet() {
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete capsule {}? This cannot be undone.", id))
            .default(false)
            .interact()?;
        if !proceed {
            return Err(anyhow::anyhow!("Delete cancelled"));
        }
    }

    let vault = Vault::new(ctx.store()?, ctx.cipher()?);
    vault.delete_capsule(&args.user, &id, Utc::now())?;

    if !ctx.quiet() {
        println!("Deleted capsule {}", id);
    }
    Ok(())
}
