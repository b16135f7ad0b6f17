//! Error handling and errno mapping for the mount bridge.
//!
//! Bridge errors are surfaced to the dispatch layer, which answers the
//! kernel with a POSIX errno. The mapping lives here so every caller
//! reports the same codes.

use burrow_mount::HandleError;
use std::io;
use thiserror::Error;

/// Errors produced by the mount bridge.
#[derive(Debug, Error)]
pub enum FuseError {
    /// A handle ID the kernel presented was never issued or was already
    /// closed. Recoverable; answered as an invalid-handle error.
    #[error("unknown file handle {0:#x}")]
    UnknownHandle(u64),

    /// A handle resolved in the table but its record was missing from the
    /// owning node's open-file list (or vice versa). The
    /// register/unregister pairing is broken; callers must treat this as
    /// fatal rather than continue on possibly-freed state.
    #[error("open-file bookkeeping out of sync for handle {handle:#x} on inode {ino}")]
    Inconsistency {
        /// The raw handle ID involved.
        handle: u64,
        /// The inode whose open-file list disagreed with the table.
        ino: u64,
    },

    /// No free slot was available for a new registration. Recoverable; the
    /// originating open fails and may be retried.
    #[error("too many open handles")]
    TooManyHandles,

    /// An I/O error from the backing filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl FuseError {
    /// Converts this error to a libc errno for the protocol reply.
    pub fn to_errno(&self) -> i32 {
        match self {
            FuseError::UnknownHandle(_) => libc::EBADF,
            FuseError::Inconsistency { .. } => libc::EIO,
            FuseError::TooManyHandles => libc::EMFILE,
            FuseError::Io(e) => io_error_to_errno(e),
        }
    }

    /// True for errors that indicate internal state corruption. A fatal
    /// error must abort the serving loop instead of being answered and
    /// forgotten.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FuseError::Inconsistency { .. })
    }
}

impl From<HandleError> for FuseError {
    fn from(e: HandleError) -> Self {
        match e {
            HandleError::Unknown(id) => FuseError::UnknownHandle(id),
            HandleError::Exhausted => FuseError::TooManyHandles,
        }
    }
}

/// Converts an I/O error to a libc errno.
pub fn io_error_to_errno(e: &io::Error) -> i32 {
    e.raw_os_error().unwrap_or(libc::EIO)
}

/// Result type for bridge operations.
pub type FuseResult<T> = Result<T, FuseError>;

/// Extension trait to convert errors to errno.
pub trait ToErrno {
    /// Converts this error to a libc errno.
    fn to_errno(&self) -> i32;
}

impl ToErrno for io::Error {
    fn to_errno(&self) -> i32 {
        io_error_to_errno(self)
    }
}

impl ToErrno for FuseError {
    fn to_errno(&self) -> i32 {
        FuseError::to_errno(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(FuseError::UnknownHandle(42).to_errno(), libc::EBADF);
        assert_eq!(FuseError::TooManyHandles.to_errno(), libc::EMFILE);
        assert_eq!(
            FuseError::Inconsistency { handle: 1, ino: 2 }.to_errno(),
            libc::EIO
        );
    }

    #[test]
    fn test_io_errno_passthrough() {
        let e = FuseError::Io(io::Error::from_raw_os_error(libc::ENOSPC));
        assert_eq!(e.to_errno(), libc::ENOSPC);

        let e = FuseError::Io(io::Error::other("no os code"));
        assert_eq!(e.to_errno(), libc::EIO);
    }

    #[test]
    fn test_only_inconsistency_is_fatal() {
        assert!(FuseError::Inconsistency { handle: 1, ino: 2 }.is_fatal());
        assert!(!FuseError::UnknownHandle(1).is_fatal());
        assert!(!FuseError::TooManyHandles.is_fatal());
        assert!(!FuseError::Io(io::Error::other("x")).is_fatal());
    }

    #[test]
    fn test_handle_error_conversion() {
        let e: FuseError = HandleError::Unknown(7).into();
        assert!(matches!(e, FuseError::UnknownHandle(7)));

        let e: FuseError = HandleError::Exhausted.into();
        assert!(matches!(e, FuseError::TooManyHandles));
    }

    #[test]
    fn test_display_carries_handle_id() {
        let e = FuseError::UnknownHandle(0xdead);
        assert!(e.to_string().contains("0xdead"));
    }

    #[test]
    fn test_to_errno_trait_io_error() {
        let e = io::Error::from_raw_os_error(libc::EACCES);
        assert_eq!(ToErrno::to_errno(&e), libc::EACCES);
    }
}
