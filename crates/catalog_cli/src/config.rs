//! Runtime settings resolved from flags, environment and defaults.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE: &str = "catalog.sqlite3";

/// Effective settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    /// `None` keeps file logging off.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Settings {
    /// Builds settings from already-parsed flag/env values.
    ///
    /// Relative paths are anchored at the current working directory.
    pub fn resolve(
        db_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to read the working directory")?;
        Ok(Self::resolve_in(&cwd, db_path, log_dir, log_level))
    }

    fn resolve_in(
        cwd: &Path,
        db_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Self {
        let db_path = db_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));
        Self {
            db_path: anchor(cwd, db_path),
            log_dir: log_dir.map(|dir| anchor(cwd, dir)),
            log_level: log_level
                .filter(|level| !level.trim().is_empty())
                .unwrap_or_else(|| catalog_core::default_log_level().to_string()),
        }
    }
}

fn anchor(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
