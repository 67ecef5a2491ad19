use super::options::SessionOptions;
use crate::draw::Snapshot;
use anyhow::{Context, Result};
use fs2::FileExt;
use log::{debug, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Durable single-slot storage for the latest explicitly saved snapshot.
///
/// The slot is independent of the undo/redo history: it only changes when a
/// caller asks to persist.
pub trait SnapshotStore {
    /// Replaces the stored snapshot.
    fn persist(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Returns the stored snapshot, or `None` when nothing usable is stored.
    fn load(&self) -> Result<Option<Snapshot>>;
}

/// In-memory slot, useful for tests and embedders without a file system.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slot: Option<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn persist(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.slot = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.slot.clone())
    }
}

/// File-backed slot under the session directory.
///
/// Writes go to a temporary file that is renamed into place while holding an
/// exclusive lock; the previous file is rotated to a backup when enabled.
#[derive(Debug, Clone)]
pub struct FileStore {
    options: SessionOptions,
}

impl FileStore {
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn open_lock(&self) -> Result<File> {
        let lock_path = self.options.lock_file_path();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("failed to open session lock file {}", lock_path.display()))
    }
}

impl SnapshotStore for FileStore {
    fn persist(&mut self, snapshot: &Snapshot) -> Result<()> {
        let bytes = snapshot.as_bytes();
        if bytes.len() as u64 > self.options.max_file_size_bytes {
            warn!(
                "Snapshot size {} bytes exceeds the configured limit of {} bytes; skipping save",
                bytes.len(),
                self.options.max_file_size_bytes
            );
            return Ok(());
        }

        fs::create_dir_all(&self.options.base_dir).with_context(|| {
            format!(
                "failed to create session directory {}",
                self.options.base_dir.display()
            )
        })?;

        let lock_file = self.open_lock()?;
        FileExt::lock_exclusive(&lock_file).with_context(|| {
            format!(
                "failed to lock session file {}",
                self.options.lock_file_path().display()
            )
        })?;

        let result = write_slot(bytes, &self.options);

        FileExt::unlock(&lock_file)
            .unwrap_or_else(|err| warn!("failed to unlock session lock file: {}", err));

        result
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        let slot_path = self.options.slot_file_path();
        if !slot_path.exists() {
            debug!("No saved canvas at {}, starting blank", slot_path.display());
            return Ok(None);
        }

        let metadata = fs::metadata(&slot_path)
            .with_context(|| format!("failed to stat session file {}", slot_path.display()))?;
        if metadata.len() > self.options.max_file_size_bytes {
            warn!(
                "Session file {} is {} bytes which exceeds the configured limit ({} bytes); refusing to load",
                slot_path.display(),
                metadata.len(),
                self.options.max_file_size_bytes
            );
            return Ok(None);
        }

        let lock_file = self.open_lock()?;
        FileExt::lock_shared(&lock_file)
            .with_context(|| format!("failed to acquire shared lock for {}", slot_path.display()))?;

        let result = read_slot(&slot_path);

        FileExt::unlock(&lock_file)
            .unwrap_or_else(|err| warn!("failed to unlock session lock file: {}", err));

        let bytes = result?;
        match Snapshot::from_bytes(bytes) {
            Ok(snapshot) => {
                info!(
                    "Loaded saved canvas from {} ({}x{})",
                    slot_path.display(),
                    snapshot.width(),
                    snapshot.height()
                );
                Ok(Some(snapshot))
            }
            Err(err) => {
                warn!(
                    "Ignoring unreadable saved canvas {}: {}",
                    slot_path.display(),
                    err
                );
                Ok(None)
            }
        }
    }
}

fn read_slot(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    File::open(path)
        .with_context(|| format!("failed to open session file {}", path.display()))?
        .read_to_end(&mut bytes)
        .context("failed to read session file")?;
    Ok(bytes)
}

fn write_slot(bytes: &[u8], options: &SessionOptions) -> Result<()> {
    let slot_path = options.slot_file_path();
    let backup_path = options.backup_file_path();

    let tmp_path = temp_path(&slot_path);
    {
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .with_context(|| {
                format!(
                    "failed to open temporary session file {}",
                    tmp_path.display()
                )
            })?;
        tmp_file
            .write_all(bytes)
            .context("failed to write snapshot payload")?;
        tmp_file
            .sync_all()
            .context("failed to sync temporary session file")?;
    }

    if slot_path.exists() {
        if options.backup_retention > 0 {
            if backup_path.exists() {
                fs::remove_file(&backup_path).ok();
            }
            fs::rename(&slot_path, &backup_path).with_context(|| {
                format!(
                    "failed to rotate previous session file {} -> {}",
                    slot_path.display(),
                    backup_path.display()
                )
            })?;
        } else {
            fs::remove_file(&slot_path).ok();
        }
    }

    fs::rename(&tmp_path, &slot_path).with_context(|| {
        format!(
            "failed to move temporary session file {} -> {}",
            tmp_path.display(),
            slot_path.display()
        )
    })?;

    info!(
        "Canvas saved to {} ({} bytes)",
        slot_path.display(),
        bytes.len()
    );
    Ok(())
}

fn temp_path(target: &Path) -> PathBuf {
    let mut candidate = target.with_extension("snapshot.tmp");
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = target.with_extension(format!("snapshot.tmp{}", counter));
    }
    candidate
}

/// Result of clearing on-disk session data.
#[derive(Debug, Clone, Copy)]
pub struct ClearOutcome {
    pub removed_session: bool,
    pub removed_backup: bool,
    pub removed_lock: bool,
}

/// Summary information about the saved canvas slot.
#[derive(Debug, Clone)]
pub struct SessionInspection {
    pub slot_path: PathBuf,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub modified: Option<SystemTime>,
    pub backup_path: PathBuf,
    pub backup_exists: bool,
    pub backup_size_bytes: Option<u64>,
    /// Stored canvas dimensions when the slot holds a readable snapshot
    pub dimensions: Option<(u32, u32)>,
}

/// Remove persisted session files (slot, backup, and lock).
pub fn clear_session(options: &SessionOptions) -> Result<ClearOutcome> {
    Ok(ClearOutcome {
        removed_session: remove_file_if_exists(&options.slot_file_path())?,
        removed_backup: remove_file_if_exists(&options.backup_file_path())?,
        removed_lock: remove_file_if_exists(&options.lock_file_path())?,
    })
}

/// Inspect the saved canvas slot for CLI reporting.
pub fn inspect_session(options: &SessionOptions) -> Result<SessionInspection> {
    let slot_path = options.slot_file_path();
    let metadata = fs::metadata(&slot_path).ok();
    let backup_path = options.backup_file_path();
    let backup_meta = fs::metadata(&backup_path).ok();

    let dimensions = if metadata.is_some() {
        FileStore::new(options.clone())
            .load()?
            .map(|snapshot| (snapshot.width(), snapshot.height()))
    } else {
        None
    };

    Ok(SessionInspection {
        exists: metadata.is_some(),
        size_bytes: metadata.as_ref().map(|m| m.len()),
        modified: metadata.as_ref().and_then(|m| m.modified().ok()),
        slot_path,
        backup_exists: backup_meta.is_some(),
        backup_size_bytes: backup_meta.as_ref().map(|m| m.len()),
        backup_path,
        dimensions,
    })
}

fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}
