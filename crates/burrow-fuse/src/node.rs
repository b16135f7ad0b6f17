//! Per-node bookkeeping of open sessions.
//!
//! The directory tree itself (children, name resolution) lives in the
//! dispatch layer; the bridge only tracks which sessions are open on each
//! node so tree mutation and unmount can refuse while a node is busy.

use crate::handles::OpenedFile;
use parking_lot::Mutex;
use std::sync::Arc;

/// A directory-tree node as seen by the mount bridge.
///
/// Lock order: the mount's tree lock is acquired (at least for reading)
/// before this node's own lock, never the reverse. The list is unordered;
/// removal swaps with the last element.
pub struct DirNode {
    ino: u64,
    open_files: Mutex<Vec<Arc<OpenedFile>>>,
}

impl DirNode {
    /// Creates a node for inode `ino` with no open sessions.
    pub fn new(ino: u64) -> Self {
        Self {
            ino,
            open_files: Mutex::new(Vec::new()),
        }
    }

    /// The inode number this node serves.
    pub fn ino(&self) -> u64 {
        self.ino
    }

    pub(crate) fn attach(&self, file: Arc<OpenedFile>) {
        self.open_files.lock().push(file);
    }

    /// Removes `file` from the open list by identity. Returns false when
    /// the record was not attached here.
    pub(crate) fn detach(&self, file: &Arc<OpenedFile>) -> bool {
        let mut open_files = self.open_files.lock();
        match open_files.iter().position(|f| Arc::ptr_eq(f, file)) {
            Some(idx) => {
                open_files.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of sessions currently open on this node.
    pub fn open_file_count(&self) -> usize {
        self.open_files.lock().len()
    }

    /// True while any session is open on this node.
    pub fn has_open_files(&self) -> bool {
        self.open_file_count() > 0
    }
}
