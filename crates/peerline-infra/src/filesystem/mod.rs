//! Filesystem layout for Peerline.
//!
//! Resolves the data directory that holds `peerline.db` and `config.toml`.

use std::path::{Path, PathBuf};

/// Name of the SQLite database file inside the data directory.
pub const DATABASE_FILE: &str = "peerline.db";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PEERLINE_DATA_DIR` environment variable
/// 2. `~/.peerline`
/// 3. `.peerline` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PEERLINE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".peerline");
    }

    PathBuf::from(".peerline")
}

/// SQLite connection URL for the database in `data_dir`, created on first use.
pub fn database_url(data_dir: &Path) -> String {
    format!(
        "sqlite://{}?mode=rwc",
        data_dir.join(DATABASE_FILE).display()
    )
}
