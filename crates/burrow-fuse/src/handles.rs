//! Open-session records.
//!
//! An [`OpenedFile`] represents one open file-or-directory session under a
//! mount. The record is referenced from two places at once: the owning
//! node's open-file list and the mount's handle table. Both references are
//! created by `Mount::register_file_handle` and dropped together by
//! `Mount::unregister_file_handle`.

use crate::backend::{DirStream, FileHandle, OpenedHandle, fopen};
use parking_lot::Mutex;

/// The backing side of a session: a file handle or a directory cursor,
/// never both.
pub enum SessionKind {
    /// An open file on the backing store.
    File(Box<dyn FileHandle>),
    /// A directory iteration cursor.
    Dir(Box<dyn DirStream>),
}

/// What dispatch hands the mount when a session is opened.
pub enum Session {
    /// A file open, possibly decorated with protocol flags.
    File(OpenedHandle),
    /// A directory open.
    Dir(Box<dyn DirStream>),
}

/// One open file-or-directory session.
pub struct OpenedFile {
    /// The backing cursor or handle. Dispatch serializes I/O per session
    /// through this lock; the bridge itself never holds it across a call
    /// into the backing store.
    session: Mutex<SessionKind>,

    /// open(2)-style flags supplied by the opener (O_CREAT, O_TRUNC, ...).
    open_flags: u32,

    /// FOPEN_KEEP_CACHE and friends, extracted once at registration.
    fuse_flags: u32,
}

impl std::fmt::Debug for OpenedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedFile")
            .field("open_flags", &self.open_flags)
            .field("fuse_flags", &self.fuse_flags)
            .finish_non_exhaustive()
    }
}

impl OpenedFile {
    pub(crate) fn new(session: Session, open_flags: u32) -> Self {
        let (session, fuse_flags) = match session {
            Session::File(opened) => {
                let (file, flags) = opened.into_parts();
                (SessionKind::File(file), flags)
            }
            Session::Dir(dir) => (SessionKind::Dir(dir), 0),
        };
        Self {
            session: Mutex::new(session),
            open_flags,
            fuse_flags,
        }
    }

    /// The open-mode flags supplied when the session was opened.
    pub fn open_flags(&self) -> u32 {
        self.open_flags
    }

    /// The protocol behavioral flags attached by the backend at open time.
    pub fn fuse_flags(&self) -> u32 {
        self.fuse_flags
    }

    /// True when the kernel was asked to keep cached pages across opens.
    pub fn keeps_page_cache(&self) -> bool {
        self.fuse_flags & fopen::KEEP_CACHE != 0
    }

    /// True for directory sessions.
    pub fn is_dir_session(&self) -> bool {
        matches!(&*self.session.lock(), SessionKind::Dir(_))
    }

    /// Runs `f` against the backing file handle. `None` for directory
    /// sessions.
    pub fn with_file<R>(&self, f: impl FnOnce(&mut dyn FileHandle) -> R) -> Option<R> {
        match &mut *self.session.lock() {
            SessionKind::File(file) => Some(f(file.as_mut())),
            SessionKind::Dir(_) => None,
        }
    }

    /// Runs `f` against the directory cursor. `None` for file sessions.
    pub fn with_dir<R>(&self, f: impl FnOnce(&mut dyn DirStream) -> R) -> Option<R> {
        match &mut *self.session.lock() {
            SessionKind::Dir(dir) => Some(f(dir.as_mut())),
            SessionKind::File(_) => None,
        }
    }
}
