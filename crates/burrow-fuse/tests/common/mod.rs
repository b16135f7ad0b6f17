//! Common test infrastructure for the mount bridge integration tests.
//!
//! Provides [`MemBackend`], an in-memory backing filesystem, plus snapshot
//! helpers. The backend exists only for tests; it implements just enough
//! of the [`Backend`] capability set to drive the bridge end to end.

use burrow_fuse::{
    Backend, DirEntry, DirStream, FileHandle, FileInfo, FileKind, OpenedHandle,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

/// Installs a tracing subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A backing-store metadata snapshot with the given shape.
pub fn snapshot(kind: FileKind, size: u64, nlink: u32, uid: u32, gid: u32) -> FileInfo {
    FileInfo {
        size,
        blocks: size.div_ceil(512),
        atime: UNIX_EPOCH,
        mtime: UNIX_EPOCH,
        ctime: UNIX_EPOCH,
        kind,
        perm: if kind == FileKind::Directory { 0o755 } else { 0o644 },
        nlink,
        uid,
        gid,
        rdev: 0,
    }
}

enum MemEntry {
    File {
        data: Arc<Mutex<Vec<u8>>>,
        fuse_flags: Option<u32>,
    },
    Dir {
        entries: Vec<DirEntry>,
    },
}

/// In-memory backing filesystem.
#[derive(Default)]
pub struct MemBackend {
    entries: Mutex<HashMap<String, MemEntry>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a regular file with the given content.
    pub fn add_file(&self, path: &str, content: &[u8]) {
        self.entries.lock().insert(
            path.to_string(),
            MemEntry::File {
                data: Arc::new(Mutex::new(content.to_vec())),
                fuse_flags: None,
            },
        );
    }

    /// Adds a regular file whose opens are decorated with protocol flags.
    pub fn add_file_with_flags(&self, path: &str, content: &[u8], fuse_flags: u32) {
        self.entries.lock().insert(
            path.to_string(),
            MemEntry::File {
                data: Arc::new(Mutex::new(content.to_vec())),
                fuse_flags: Some(fuse_flags),
            },
        );
    }

    /// Adds a directory with a fixed listing.
    pub fn add_dir(&self, path: &str, entries: Vec<DirEntry>) {
        self.entries
            .lock()
            .insert(path.to_string(), MemEntry::Dir { entries });
    }
}

struct MemFile {
    data: Arc<Mutex<Vec<u8>>>,
}

impl FileHandle for MemFile {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.lock();
        let offset = offset as usize;
        if offset >= data.len() {
            return Ok(0);
        }
        let end = (offset + buf.len()).min(data.len());
        buf[..end - offset].copy_from_slice(&data[offset..end]);
        Ok(end - offset)
    }

    fn write_at(&mut self, offset: u64, chunk: &[u8]) -> io::Result<usize> {
        let mut data = self.data.lock();
        let offset = offset as usize;
        let end = offset + chunk.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(chunk);
        Ok(chunk.len())
    }
}

struct MemDirStream {
    entries: Vec<DirEntry>,
    next: usize,
}

impl DirStream for MemDirStream {
    fn next_entry(&mut self) -> Option<DirEntry> {
        let entry = self.entries.get(self.next).cloned();
        self.next += 1;
        entry
    }
}

impl Backend for MemBackend {
    fn metadata(&self, path: &str) -> io::Result<FileInfo> {
        match self.entries.lock().get(path) {
            Some(MemEntry::File { data, .. }) => Ok(snapshot(
                FileKind::File,
                data.lock().len() as u64,
                1,
                1000,
                1000,
            )),
            Some(MemEntry::Dir { entries }) => Ok(snapshot(
                FileKind::Directory,
                0,
                2 + entries.len() as u32,
                1000,
                1000,
            )),
            None => Err(io::Error::from_raw_os_error(libc::ENOENT)),
        }
    }

    fn open(&self, path: &str, _flags: u32) -> io::Result<OpenedHandle> {
        match self.entries.lock().get(path) {
            Some(MemEntry::File { data, fuse_flags }) => {
                let file = Box::new(MemFile {
                    data: Arc::clone(data),
                });
                Ok(match fuse_flags {
                    Some(flags) => OpenedHandle::with_flags(file, *flags),
                    None => OpenedHandle::new(file),
                })
            }
            Some(MemEntry::Dir { .. }) => Err(io::Error::from_raw_os_error(libc::EISDIR)),
            None => Err(io::Error::from_raw_os_error(libc::ENOENT)),
        }
    }

    fn open_dir(&self, path: &str) -> io::Result<Box<dyn DirStream>> {
        match self.entries.lock().get(path) {
            Some(MemEntry::Dir { entries }) => Ok(Box::new(MemDirStream {
                entries: entries.clone(),
                next: 0,
            })),
            Some(MemEntry::File { .. }) => Err(io::Error::from_raw_os_error(libc::ENOTDIR)),
            None => Err(io::Error::from_raw_os_error(libc::ENOENT)),
        }
    }
}
