//! Translation from backing-store metadata to protocol attribute replies.
//!
//! Two reply shapes leave this layer: [`EntryReply`] when a name is
//! resolved (it carries a validity window for the name-cache entry as well
//! as one for the attributes) and [`AttrReply`] when only cached attributes
//! are refreshed. Both windows travel as whole seconds plus sub-second
//! nanoseconds, split from the mount's configured [`Duration`]s.

use crate::backend::{FileInfo, FileKind};
use crate::config::Owner;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The attribute block shared by both reply shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileAttr {
    /// Inode number.
    pub ino: u64,
    /// Size in bytes.
    pub size: u64,
    /// Size in 512-byte blocks.
    pub blocks: u64,
    /// Last access time.
    pub atime: SystemTime,
    /// Last content modification time.
    pub mtime: SystemTime,
    /// Last status change time.
    pub ctime: SystemTime,
    /// Object kind.
    pub kind: FileKind,
    /// Permission bits.
    pub perm: u16,
    /// Hard-link count. Never 0 for non-directories; see [`fill_attr`].
    pub nlink: u32,
    /// Owning user, possibly overridden by the mount configuration.
    pub uid: u32,
    /// Owning group, possibly overridden by the mount configuration.
    pub gid: u32,
    /// Device number for device nodes.
    pub rdev: u32,
}

impl FileAttr {
    /// The all-zero attribute block used in negative entry replies.
    pub(crate) fn zeroed() -> Self {
        Self {
            ino: 0,
            size: 0,
            blocks: 0,
            atime: UNIX_EPOCH,
            mtime: UNIX_EPOCH,
            ctime: UNIX_EPOCH,
            kind: FileKind::File,
            perm: 0,
            nlink: 0,
            uid: 0,
            gid: 0,
            rdev: 0,
        }
    }
}

/// Reply to a name lookup.
///
/// Carries the resolved inode and attributes plus two cache-validity
/// windows: one for the name-cache entry, one for the attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryReply {
    /// Resolved inode number; 0 marks a cached negative entry.
    pub ino: u64,
    /// Inode generation. Backends that reuse inode numbers bump this; the
    /// bridge emits 0.
    pub generation: u64,
    /// Whole seconds of the entry-cache validity window.
    pub entry_valid: u64,
    /// Sub-second nanoseconds of the entry-cache validity window.
    pub entry_valid_nsec: u32,
    /// Whole seconds of the attribute-cache validity window.
    pub attr_valid: u64,
    /// Sub-second nanoseconds of the attribute-cache validity window.
    pub attr_valid_nsec: u32,
    /// The attribute block.
    pub attr: FileAttr,
}

/// Reply to an attribute-only refresh. No name-cache window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttrReply {
    /// Whole seconds of the attribute-cache validity window.
    pub attr_valid: u64,
    /// Sub-second nanoseconds of the attribute-cache validity window.
    pub attr_valid_nsec: u32,
    /// The attribute block.
    pub attr: FileAttr,
}

/// Splits a duration into whole seconds and sub-second nanoseconds.
///
/// The nanoseconds component is always in `[0, 1_000_000_000)`.
pub fn split_duration(d: Duration) -> (u64, u32) {
    (d.as_secs(), d.subsec_nanos())
}

/// Populates an attribute block from a backing-store snapshot.
///
/// Non-directories always report a hard-link count of at least 1; backends
/// that do not track links report 0, and clients treat nlink 0 as a deleted
/// file. Directories are passed through exactly as reported.
pub(crate) fn fill_attr(info: &FileInfo, ino: u64) -> FileAttr {
    let nlink = if info.is_dir() {
        info.nlink
    } else {
        info.nlink.max(1)
    };
    FileAttr {
        ino,
        size: info.size,
        blocks: info.blocks,
        atime: info.atime,
        mtime: info.mtime,
        ctime: info.ctime,
        kind: info.kind,
        perm: info.perm,
        nlink,
        uid: info.uid,
        gid: info.gid,
        rdev: info.rdev,
    }
}

/// Applies the mount's forced-owner override, if configured. User and
/// group are replaced together or not at all.
pub(crate) fn apply_owner(attr: &mut FileAttr, owner: Option<Owner>) {
    if let Some(owner) = owner {
        attr.uid = owner.uid;
        attr.gid = owner.gid;
    }
}
