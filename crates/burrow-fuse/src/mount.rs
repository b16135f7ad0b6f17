//! The mount: one backing filesystem bound to a point in the served tree.
//!
//! A [`Mount`] owns the configuration, the tree lock, and the handle table
//! for every session opened beneath it. Dispatch resolves a path to a node
//! under the tree lock, then calls in here to register or unregister
//! sessions and to build attribute replies. Nothing in this module
//! performs I/O.
//!
//! # Lock order
//!
//! Three synchronization domains, in fixed order:
//!
//! 1. the mount's tree lock (read for lookups, write for tree mutation)
//! 2. a node's own open-file lock
//! 3. the handle table's internal lock
//!
//! A thread that needs both (1) and (2) must take (1) first. (3) may be
//! entered holding none, either, or both. No blocking I/O happens under
//! (1) or (2).

use crate::attr::{self, AttrReply, EntryReply, FileAttr, split_duration};
use crate::backend::{Backend, FileInfo};
use crate::config::MountConfig;
use crate::error::{FuseError, FuseResult};
use crate::handles::{OpenedFile, Session};
use crate::node::DirNode;
use burrow_mount::{Handle, HandleTable};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// One backing filesystem attached to the served directory tree.
pub struct Mount {
    /// The filesystem serving this mount.
    backend: Arc<dyn Backend>,

    /// Immutable after attachment; read without locking.
    config: MountConfig,

    /// Guards directory structure beneath this mount. Acquired before any
    /// node's own lock.
    tree_lock: RwLock<()>,

    /// Every open session under this mount, keyed by the ID the kernel
    /// holds.
    open_files: HandleTable<Arc<OpenedFile>>,
}

impl Mount {
    /// Attaches `backend` with the given configuration.
    pub fn new(backend: Arc<dyn Backend>, config: MountConfig) -> Self {
        debug!(
            entry_ttl_ms = config.entry_ttl.as_millis() as u64,
            attr_ttl_ms = config.attr_ttl.as_millis() as u64,
            forced_owner = config.owner.is_some(),
            "mount attached"
        );
        Self {
            backend,
            config,
            tree_lock: RwLock::new(()),
            open_files: HandleTable::new(),
        }
    }

    /// The backing filesystem serving this mount.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// The mount's configuration.
    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// Takes the tree lock for reading. Lookups and open/close paths hold
    /// this while touching nodes.
    pub fn tree_read(&self) -> RwLockReadGuard<'_, ()> {
        self.tree_lock.read()
    }

    /// Takes the tree lock for writing. Tree mutation (rename, unlink,
    /// mkdir) holds this exclusively.
    pub fn tree_write(&self) -> RwLockWriteGuard<'_, ()> {
        self.tree_lock.write()
    }

    /// Registers a new session opened on `node` and returns the ID to hand
    /// to the kernel along with the live record.
    ///
    /// Protocol flags riding on a decorated file handle are extracted into
    /// the record here, exactly once; the backing handle kept for I/O is
    /// the undecorated one. The caller holds the tree lock at least for
    /// reading.
    ///
    /// # Errors
    ///
    /// Only [`FuseError::TooManyHandles`] when the table is full.
    pub fn register_file_handle(
        &self,
        node: &DirNode,
        session: Session,
        open_flags: u32,
    ) -> FuseResult<(Handle, Arc<OpenedFile>)> {
        let opened = Arc::new(OpenedFile::new(session, open_flags));
        node.attach(Arc::clone(&opened));

        let handle = match self.open_files.register(Arc::clone(&opened)) {
            Ok(handle) => handle,
            Err(e) => {
                // The kernel never saw an ID, so the list entry just goes
                // away again.
                node.detach(&opened);
                return Err(e.into());
            }
        };

        trace!(
            ino = node.ino(),
            handle = handle.as_raw(),
            open_flags,
            fuse_flags = opened.fuse_flags(),
            "registered file handle"
        );
        Ok((handle, opened))
    }

    /// Closes the session `handle` refers to, detaching it from `node` and
    /// invalidating the ID.
    ///
    /// The caller holds the tree lock at least for reading.
    ///
    /// # Errors
    ///
    /// [`FuseError::UnknownHandle`] when the ID was never issued or was
    /// already closed. [`FuseError::Inconsistency`] when the table knew the
    /// ID but `node`'s list did not contain the record; the pairing
    /// invariant is broken and the caller must treat the mount as corrupt.
    pub fn unregister_file_handle(
        &self,
        handle: Handle,
        node: &DirNode,
    ) -> FuseResult<Arc<OpenedFile>> {
        let opened = self.open_files.forget(handle).map_err(FuseError::from)?;

        if !node.detach(&opened) {
            error!(
                handle = handle.as_raw(),
                ino = node.ino(),
                "handle resolved in the table but is missing from its node's open-file list"
            );
            return Err(FuseError::Inconsistency {
                handle: handle.as_raw(),
                ino: node.ino(),
            });
        }

        trace!(
            ino = node.ino(),
            handle = handle.as_raw(),
            "unregistered file handle"
        );
        Ok(opened)
    }

    /// Resolves a kernel-supplied ID to its live session record.
    ///
    /// # Errors
    ///
    /// [`FuseError::UnknownHandle`] for unissued or already-closed IDs,
    /// including stale IDs whose slot has been reused since.
    pub fn lookup_handle(&self, handle: Handle) -> FuseResult<Arc<OpenedFile>> {
        Ok(self.open_files.lookup(handle)?)
    }

    /// Number of sessions currently open under this mount.
    pub fn open_handle_count(&self) -> usize {
        self.open_files.len()
    }

    /// True when no session is open. Unmount requires this.
    pub fn is_idle(&self) -> bool {
        self.open_files.is_empty()
    }

    /// Builds the reply for a resolved name: attributes plus validity
    /// windows for both the entry cache and the attribute cache.
    pub fn entry_reply(&self, ino: u64, info: &FileInfo) -> EntryReply {
        let (entry_valid, entry_valid_nsec) = split_duration(self.config.entry_ttl);
        let (attr_valid, attr_valid_nsec) = split_duration(self.config.attr_ttl);
        let mut file_attr = attr::fill_attr(info, ino);
        attr::apply_owner(&mut file_attr, self.config.owner);
        EntryReply {
            ino,
            generation: 0,
            entry_valid,
            entry_valid_nsec,
            attr_valid,
            attr_valid_nsec,
            attr: file_attr,
        }
    }

    /// Builds the reply for an attribute refresh. Same attribute
    /// population and ownership override as [`Mount::entry_reply`], but no
    /// entry-cache window.
    pub fn attr_reply(&self, ino: u64, info: &FileInfo) -> AttrReply {
        let (attr_valid, attr_valid_nsec) = split_duration(self.config.attr_ttl);
        let mut file_attr = attr::fill_attr(info, ino);
        attr::apply_owner(&mut file_attr, self.config.owner);
        AttrReply {
            attr_valid,
            attr_valid_nsec,
            attr: file_attr,
        }
    }

    /// Builds the cached-ENOENT reply for a failed lookup, or `None` when
    /// negative caching is disabled.
    pub fn negative_reply(&self) -> Option<EntryReply> {
        if self.config.negative_ttl.is_zero() {
            return None;
        }
        let (entry_valid, entry_valid_nsec) = split_duration(self.config.negative_ttl);
        Some(EntryReply {
            ino: 0,
            generation: 0,
            entry_valid,
            entry_valid_nsec,
            attr_valid: 0,
            attr_valid_nsec: 0,
            attr: FileAttr::zeroed(),
        })
    }
}
