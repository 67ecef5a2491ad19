//! Session persistence (save/restore) support.
//!
//! Keeps the latest explicitly saved canvas in a single durable slot: a file
//! under the session directory, written with locking, atomic replacement and
//! backup rotation, and read back on startup when requested.

mod options;
mod storage;

pub use options::{DEFAULT_SLOT, SessionOptions, options_from_config};
pub use storage::{
    ClearOutcome, FileStore, MemoryStore, SessionInspection, SnapshotStore, clear_session,
    inspect_session,
};
