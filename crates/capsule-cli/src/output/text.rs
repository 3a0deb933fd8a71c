//! Text and table output formatting.

use chrono::{DateTime, SecondsFormat, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use capsule_core::diagnostics::RecordInspection;
use capsule_core::notify::UnlockNotice;
use capsule_core::{CapsuleSummary, MigrationReport, RevealedCapsule};

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

fn format_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Table of a user's capsules.
pub fn summary_table(summaries: &[CapsuleSummary]) -> String {
    let mut table = new_table(&["ID", "Title", "Unlocks", "Status", "Attachment"]);
    for summary in summaries {
        let status = match &summary.countdown {
            Some(countdown) => format!("locked ({} left)", countdown),
            None => "unlocked".to_string(),
        };
        let attachment = if summary.has_attachment {
            summary
                .attachment_name
                .clone()
                .unwrap_or_else(|| "yes".to_string())
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            summary.id.to_string(),
            summary.title.clone(),
            format_time(&summary.unlock_date),
            status,
            attachment,
        ]);
    }
    table.to_string()
}

/// Print an opened capsule.
pub fn print_capsule(capsule: &RevealedCapsule) {
    println!("{}", capsule.title);
    println!("ID:       {}", capsule.id);
    println!("Sealed:   {}", format_time(&capsule.created_at));
    println!("Unlocked: {}", format_time(&capsule.unlock_date));
    if let Some(name) = &capsule.attachment_name {
        let media_type = capsule.attachment_type.as_deref().unwrap_or("unknown type");
        let state = if capsule.attachment.is_some() {
            ""
        } else {
            " (unreadable)"
        };
        println!("Attached: {} ({}){}", name, media_type, state);
    }
    if !capsule.unreadable.is_empty() {
        let fields: Vec<&str> = capsule.unreadable.iter().map(|f| f.as_str()).collect();
        println!("Warning:  could not decrypt {}", fields.join(", "));
    }
    println!();
    println!("{}", capsule.message);
}

/// Table of capsules due for a notification.
pub fn notice_table(notices: &[UnlockNotice]) -> String {
    let mut table = new_table(&["ID", "User", "Title", "Sealed", "Link"]);
    for notice in notices {
        table.add_row(vec![
            notice.capsule_id.to_string(),
            notice.user_id.clone(),
            notice.title.clone(),
            format_time(&notice.sealed_on),
            notice.unlock_url.clone(),
        ]);
    }
    table.to_string()
}

/// Table of encryption checks.
pub fn inspection_table(inspections: &[RecordInspection]) -> String {
    let mut table = new_table(&["ID", "User", "Flag", "Title parts", "Title", "Message"]);
    for inspection in inspections {
        let flag = match inspection.is_encrypted {
            Some(true) => "encrypted",
            Some(false) => "plaintext",
            None => "unset",
        };
        table.add_row(vec![
            inspection.capsule_id.to_string(),
            inspection.user_id.clone(),
            flag.to_string(),
            inspection.title_parts.to_string(),
            inspection.title.to_string(),
            inspection.message.to_string(),
        ]);
    }
    table.to_string()
}

/// Print a migration summary.
pub fn print_migration_report(report: &MigrationReport) {
    if report.total == 0 {
        println!("No capsules need encryption");
        return;
    }
    println!(
        "Encrypted {} of {} capsules",
        report.encrypted, report.total
    );
    for failure in &report.failed {
        println!("  failed {}: {}", failure.capsule_id, failure.reason);
    }
}
