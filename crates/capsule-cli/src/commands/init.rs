use std::path::PathBuf;

use capsule_core::storage::FORMAT_VERSION;
use capsule_core::SqliteCapsuleStore;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{write_config, CapsuleConfig};

/// Write the config file and create the database with its schema.
///
/// An existing database is opened rather than replaced, so running `init`
/// twice never loses capsules.
pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path(ctx.cli())?;
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ));
    }

    let store_path = match &args.path {
        Some(path) => PathBuf::from(path),
        None => ctx.store_path()?,
    };

    let existed = store_path.exists();
    let store = SqliteCapsuleStore::open(&store_path)?;
    let version = store.format_version()?;
    tracing::debug!(path = %store_path.display(), %version, existed, "capsule database ready");
    if version != FORMAT_VERSION {
        tracing::warn!(
            found = %version,
            expected = FORMAT_VERSION,
            "capsule database format differs from this build"
        );
    }

    let config = CapsuleConfig::new(store_path.clone(), args.base_url.clone());
    write_config(&config_path, &config)?;

    if !ctx.quiet() {
        if existed {
            println!("Using existing database at {}", store_path.display());
        } else {
            println!("Created database at {}", store_path.display());
        }
        println!("Config written to {}", config_path.display());
        if std::env::var("ENCRYPTION_SECRET").map_or(true, |v| v.is_empty()) {
            println!("Next: export ENCRYPTION_SECRET before creating capsules.");
        }
    }
    Ok(())
}
