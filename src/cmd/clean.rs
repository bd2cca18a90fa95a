//! CLI handler for the clean command.

use crate::config::SeederConfig;
use crate::storage::LocalFileStore;
use anyhow::Context;
use std::path::PathBuf;

pub fn run(config: Option<PathBuf>, seeder_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = SeederConfig::discover(config.as_deref())?;
    let path = seeder_path.unwrap_or_else(|| config.seeder_path.clone());

    let changed = config
        .registrar()
        .clean_file(&LocalFileStore, &path)
        .with_context(|| format!("Failed to clean {}", path.display()))?;

    if changed {
        println!("Cleaned seeder section in {}", path.display());
    } else {
        println!("Nothing to clean in {}", path.display());
    }

    Ok(())
}
