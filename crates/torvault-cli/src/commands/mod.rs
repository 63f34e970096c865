pub mod backup;
pub mod restore;

use anyhow::Context;
use rusqlite::Connection;
use std::path::PathBuf;
use torvault_engine::RestoreSettings;
use torvault_store::cas::FsStore;

/// Options shared by every subcommand
#[derive(Debug)]
pub struct Global {
    pub db: PathBuf,
    pub cas: PathBuf,
    pub json: bool,
    pub settings: RestoreSettings,
}

impl Global {
    /// Open (creating if needed) the ledger and blob store
    pub fn open_ledger(&self) -> anyhow::Result<(Connection, FsStore)> {
        if let Some(parent) = self.db.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let conn = torvault_store::db::open_ledger(&self.db)?;
        Ok((conn, FsStore::new(self.cas.clone())))
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
