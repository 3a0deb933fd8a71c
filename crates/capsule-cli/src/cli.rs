use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use capsule_core::VERSION;

use crate::constants::DEFAULT_INSPECT_LIMIT;

/// Capsule - sealed messages to your future self, encrypted at rest
#[derive(Parser)]
#[command(name = "capsule")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the capsule database
    #[arg(long, global = true, env = "CAPSULE_DB")]
    pub db: Option<String>,

    /// Path to the config file
    #[arg(long, global = true, env = "CAPSULE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the database will be created
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Base URL used in unlock links
    #[arg(long)]
    pub base_url: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `create` command
#[derive(Args)]
pub struct CreateArgs {
    /// Owning user identifier
    #[arg(long)]
    pub user: String,

    /// Capsule title (at most 100 characters)
    #[arg(long)]
    pub title: String,

    /// Message to your future self
    #[arg(long)]
    pub message: String,

    /// Unlock date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub unlock: String,

    /// File to attach
    #[arg(long, value_name = "FILE")]
    pub attachment: Option<String>,

    /// Media type of the attachment (guessed from the extension if omitted)
    #[arg(long, requires = "attachment")]
    pub attachment_type: Option<String>,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Owning user identifier
    #[arg(long)]
    pub user: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Capsule ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Owning user identifier
    #[arg(long)]
    pub user: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the decoded attachment to this path
    #[arg(long, value_name = "PATH")]
    pub save_attachment: Option<String>,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Capsule ID (full UUID)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Owning user identifier
    #[arg(long)]
    pub user: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `migrate` command
#[derive(Args)]
pub struct MigrateArgs {
    /// Only migrate this user's capsules
    #[arg(long)]
    pub user: Option<String>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `due` command
#[derive(Args)]
pub struct DueArgs {
    /// Day to check (YYYY-MM-DD, UTC; defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Mark the listed capsules as notified
    #[arg(long)]
    pub mark_sent: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `inspect` command
#[derive(Args)]
pub struct InspectArgs {
    /// Number of most recent capsules to check
    #[arg(long, default_value_t = DEFAULT_INSPECT_LIMIT)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `backup` command
#[derive(Args)]
pub struct BackupArgs {
    /// Destination path for the JSON export
    #[arg(value_name = "DEST")]
    pub destination: String,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the config file and create the capsule database
    Init(InitArgs),

    /// Seal a new capsule
    Create(CreateArgs),

    /// List a user's capsules
    List(ListArgs),

    /// Open an unlocked capsule
    Show(ShowArgs),

    /// Delete an unlocked capsule
    Delete(DeleteArgs),

    /// Encrypt legacy plaintext capsules
    Migrate(MigrateArgs),

    /// List capsules unlocking on a day that still need a notification
    Due(DueArgs),

    /// Check that recent capsules decrypt
    Inspect(InspectArgs),

    /// Export all capsules (still encrypted) to a JSON file
    Backup(BackupArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
