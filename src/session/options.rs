use crate::config::{SessionConfig, SessionStorageMode};
use crate::util::expand_tilde;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

/// Slot name used when none is configured.
pub const DEFAULT_SLOT: &str = "saved-canvas";

/// Runtime options derived from configuration for the persisted canvas slot.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub base_dir: PathBuf,
    pub slot: String,
    pub restore_on_start: bool,
    pub max_file_size_bytes: u64,
    pub backup_retention: usize,
}

impl SessionOptions {
    /// Creates a basic options struct with sensible defaults. Intended mainly for tests.
    pub fn new(base_dir: PathBuf, slot: impl Into<String>) -> Self {
        let raw_slot = slot.into();
        Self {
            base_dir,
            slot: sanitize_identifier(&raw_slot),
            restore_on_start: true,
            max_file_size_bytes: 64 * 1024 * 1024,
            backup_retention: 1,
        }
    }

    pub fn slot_file_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.snapshot", self.slot))
    }

    pub fn backup_file_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.snapshot.bak", self.slot))
    }

    pub fn lock_file_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.lock", self.slot))
    }
}

/// Build runtime session options from configuration values.
pub fn options_from_config(session_cfg: &SessionConfig, config_dir: &Path) -> Result<SessionOptions> {
    let base_dir = match session_cfg.storage {
        SessionStorageMode::Auto => {
            let root = dirs::data_dir().unwrap_or_else(|| config_dir.to_path_buf());
            root.join("doodlepad")
        }
        SessionStorageMode::Config => config_dir.to_path_buf(),
        SessionStorageMode::Custom => {
            let raw = session_cfg.custom_directory.as_ref().ok_or_else(|| {
                anyhow!("session.custom_directory must be set when storage = \"custom\"")
            })?;
            let expanded = expand_tilde(raw);
            if expanded.as_os_str().is_empty() {
                return Err(anyhow!("session.custom_directory resolved to an empty path"));
            }
            expanded
        }
    };

    let mut options = SessionOptions::new(base_dir, session_cfg.slot.as_str());
    options.restore_on_start = session_cfg.restore_on_start;
    options.max_file_size_bytes = session_cfg
        .max_file_size_mb
        .saturating_mul(1024 * 1024)
        .max(1);
    options.backup_retention = session_cfg.backup_retention;

    Ok(options)
}

pub(crate) fn sanitize_identifier(raw: &str) -> String {
    if raw.is_empty() {
        return DEFAULT_SLOT.to_string();
    }

    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
