//! The backing-filesystem seam.
//!
//! A mount is polymorphic over one [`Backend`]: the pluggable implementation
//! (local directory, network share, encrypted store, ...) that produces
//! metadata snapshots, opened file handles, and directory cursors. The
//! bridge never performs I/O itself; it only carries what a backend hands
//! out.

use std::io;
use std::time::SystemTime;

/// Protocol-level behavioral flags a backend may attach to an opened file.
///
/// These hint at how the kernel should treat the open session; they do not
/// change the I/O semantics of the handle itself. Values match the kernel
/// ABI.
pub mod fopen {
    /// Bypass the kernel page cache for this session.
    pub const DIRECT_IO: u32 = 1 << 0;
    /// Keep cached pages from earlier opens of the same file.
    pub const KEEP_CACHE: u32 = 1 << 1;
    /// The session does not support seeking.
    pub const NONSEEKABLE: u32 = 1 << 2;
}

/// Kind of filesystem object, as reported by the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Block device node.
    BlockDevice,
    /// Character device node.
    CharDevice,
    /// Named pipe (FIFO).
    NamedPipe,
    /// Unix domain socket.
    Socket,
}

/// A point-in-time metadata snapshot produced by the backing store.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
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
    /// Hard-link count as the backing store reports it. Backends that do
    /// not track links may report 0; see the attribute translator for how
    /// that is presented outward.
    pub nlink: u32,
    /// Owning user as reported by the backing store.
    pub uid: u32,
    /// Owning group as reported by the backing store.
    pub gid: u32,
    /// Device number for device nodes, 0 otherwise.
    pub rdev: u32,
}

impl FileInfo {
    /// True when the snapshot describes a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// One open file session on the backing store.
///
/// The bridge stores these inside [`crate::OpenedFile`] records; dispatch
/// drives the actual reads and writes.
pub trait FileHandle: Send {
    /// Reads up to `buf.len()` bytes at `offset`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes `data` at `offset`, returning the number of bytes written.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<usize>;

    /// Flushes buffered state to the backing store.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One entry yielded by a directory cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Inode number of the entry.
    pub ino: u64,
    /// Kind of the entry.
    pub kind: FileKind,
    /// Entry name, without any path components.
    pub name: String,
}

/// Iteration cursor over a directory on the backing store.
pub trait DirStream: Send {
    /// Yields the next entry, or `None` once the directory is exhausted.
    fn next_entry(&mut self) -> Option<DirEntry>;
}

/// An opened backing file together with its optional protocol flags.
///
/// The backend decides at open time whether the session carries behavioral
/// flags ([`fopen`]); the bridge extracts them exactly once at registration
/// and keeps only the undecorated handle for I/O. This replaces any runtime
/// probing of the handle for a decoration capability.
pub struct OpenedHandle {
    file: Box<dyn FileHandle>,
    fuse_flags: Option<u32>,
}

impl OpenedHandle {
    /// An opened file with no protocol flags.
    pub fn new(file: Box<dyn FileHandle>) -> Self {
        Self {
            file,
            fuse_flags: None,
        }
    }

    /// An opened file decorated with [`fopen`] flags.
    pub fn with_flags(file: Box<dyn FileHandle>, flags: u32) -> Self {
        Self {
            file,
            fuse_flags: Some(flags),
        }
    }

    /// The protocol flags attached at open time, if any.
    pub fn fuse_flags(&self) -> Option<u32> {
        self.fuse_flags
    }

    /// Splits into the undecorated handle and the effective flags.
    pub(crate) fn into_parts(self) -> (Box<dyn FileHandle>, u32) {
        (self.file, self.fuse_flags.unwrap_or(0))
    }
}

/// The capability set a mounted backing filesystem provides.
///
/// Paths are relative to the backend's own root; name resolution down to a
/// backend-relative path happens in the dispatch layer.
pub trait Backend: Send + Sync {
    /// Produces a metadata snapshot for the object at `path`.
    fn metadata(&self, path: &str) -> io::Result<FileInfo>;

    /// Opens the file at `path` with open(2)-style `flags`.
    fn open(&self, path: &str, flags: u32) -> io::Result<OpenedHandle>;

    /// Begins iterating the directory at `path`.
    fn open_dir(&self, path: &str) -> io::Result<Box<dyn DirStream>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullFile;

    impl FileHandle for NullFile {
        fn read_at(&mut self, _offset: u64, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn write_at(&mut self, _offset: u64, data: &[u8]) -> io::Result<usize> {
            Ok(data.len())
        }
    }

    #[test]
    fn test_opened_handle_undecorated() {
        let opened = OpenedHandle::new(Box::new(NullFile));
        assert_eq!(opened.fuse_flags(), None);

        let (_, flags) = opened.into_parts();
        assert_eq!(flags, 0);
    }

    #[test]
    fn test_opened_handle_with_flags() {
        let opened = OpenedHandle::with_flags(Box::new(NullFile), fopen::KEEP_CACHE);
        assert_eq!(opened.fuse_flags(), Some(fopen::KEEP_CACHE));

        let (_, flags) = opened.into_parts();
        assert_eq!(flags, fopen::KEEP_CACHE);
    }

    #[test]
    fn test_fopen_flags_distinct() {
        assert_eq!(fopen::DIRECT_IO & fopen::KEEP_CACHE, 0);
        assert_eq!(fopen::KEEP_CACHE & fopen::NONSEEKABLE, 0);
    }

    #[test]
    fn test_file_info_is_dir() {
        let now = SystemTime::now();
        let mut info = FileInfo {
            size: 0,
            blocks: 0,
            atime: now,
            mtime: now,
            ctime: now,
            kind: FileKind::Directory,
            perm: 0o755,
            nlink: 2,
            uid: 0,
            gid: 0,
            rdev: 0,
        };
        assert!(info.is_dir());

        info.kind = FileKind::File;
        assert!(!info.is_dir());
    }
}
