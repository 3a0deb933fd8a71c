use chrono::Utc;

use capsule_core::notify::{due_notifications, mark_notified};

use crate::app::AppContext;
use crate::cli::DueArgs;
use crate::helpers::parse_day;
use crate::output::{notice_table, print_json};

/// List capsules unlocking on the given day whose owners have not been told.
///
/// With `--mark-sent` every listed capsule is marked afterwards, so the next
/// run for the same day comes back empty.
pub fn handle_due(ctx: &AppContext, args: &DueArgs) -> anyhow::Result<()> {
    let day = match &args.date {
        Some(value) => parse_day(value)?,
        None => Utc::now().date_naive(),
    };
    let store = ctx.store()?;
    let base_url = ctx.base_url()?;
    let notices = due_notifications(store, ctx.cipher()?, day, &base_url)?;

    if args.json {
        print_json(&notices)?;
    } else if notices.is_empty() {
        if !ctx.quiet() {
            println!("No capsules due on {}", day);
        }
    } else {
        println!("{}", notice_table(&notices));
    }

    if args.mark_sent {
        for notice in &notices {
            mark_notified(store, &notice.capsule_id)?;
        }
        if !ctx.quiet() && !args.json {
            println!("Marked {} capsules as notified", notices.len());
        }
    }
    Ok(())
}
