//! Mount-level bridge for a user-space filesystem driver.
//!
//! This crate sits between the request-dispatch loop and the pluggable
//! backing filesystems. It tracks every open file and directory session
//! exchanged with the kernel as an opaque 64-bit handle, keeps the
//! per-node open-file bookkeeping consistent with the handle table, and
//! translates backing-store metadata into the protocol's entry and
//! attribute reply shapes.
//!
//! # Components
//!
//! - [`Mount`] - one backing filesystem bound to a point in the served
//!   tree, with its configuration and handle table
//! - [`OpenedFile`] - one open session: backing cursor or handle, open
//!   flags, protocol flags
//! - [`DirNode`] - the per-inode open-session list the bridge maintains
//! - [`Backend`] - the trait the pluggable backing filesystems implement
//! - [`EntryReply`] / [`AttrReply`] - the outward attribute shapes
//!
//! Request parsing, the dispatch loop, mount(2)/umount(2), and name
//! resolution live in neighboring crates; nothing here performs I/O.
//!
//! # Usage
//!
//! ```ignore
//! use burrow_fuse::{Mount, MountConfig, Session};
//!
//! let mount = Mount::new(backend, MountConfig::default());
//! let tree = mount.tree_read();
//! let opened = mount.backend().open("file.txt", flags)?;
//! let (handle, _) = mount.register_file_handle(&node, Session::File(opened), flags)?;
//! // ... hand `handle` to the kernel ...
//! mount.unregister_file_handle(handle, &node)?;
//! ```

pub mod attr;
pub mod backend;
pub mod config;
pub mod error;
pub mod handles;
pub mod mount;
pub mod node;

pub use attr::{AttrReply, EntryReply, FileAttr, split_duration};
pub use backend::{
    Backend, DirEntry, DirStream, FileHandle, FileInfo, FileKind, OpenedHandle, fopen,
};
pub use config::{MountConfig, Owner};
pub use error::{FuseError, FuseResult, ToErrno};
pub use handles::{OpenedFile, Session, SessionKind};
pub use mount::Mount;
pub use node::DirNode;

pub use burrow_mount::{Handle, HandleError, HandleTable};
