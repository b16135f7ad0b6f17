//! Mount-wide configuration.
//!
//! A [`MountConfig`] is attached to a mount at construction and never
//! mutated afterward, so readers need no lock. Cache lifetimes control how
//! long the kernel may serve lookups and attributes without asking again;
//! too long and clients see stale metadata, too short and every stat hits
//! the backing store.

use burrow_mount::{
    DEFAULT_ATTR_TTL, DEFAULT_ENTRY_TTL, DEFAULT_NEGATIVE_TTL, NETWORK_ATTR_TTL,
    NETWORK_ENTRY_TTL, NETWORK_NEGATIVE_TTL,
};
use std::time::Duration;

/// A fixed identity reported as the owner of every file under a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    /// User ID.
    pub uid: u32,
    /// Group ID.
    pub gid: u32,
}

impl Owner {
    /// The identity of the current process.
    pub fn current() -> Self {
        // SAFETY: getuid/getgid are always safe to call.
        unsafe {
            Self {
                uid: libc::getuid(),
                gid: libc::getgid(),
            }
        }
    }
}

/// Configuration options for a mount.
///
/// Defaults suit local backends with fresh metadata; use
/// [`MountConfig::network()`] for high-latency backends where longer cache
/// lifetimes matter more than freshness.
#[derive(Debug, Clone)]
pub struct MountConfig {
    /// How long the kernel may cache a name-lookup result.
    pub entry_ttl: Duration,

    /// How long the kernel may cache file attributes.
    pub attr_ttl: Duration,

    /// How long the kernel may cache a negative (ENOENT) lookup. Zero
    /// disables negative caching.
    pub negative_ttl: Duration,

    /// When set, every attribute reply reports this identity as the file
    /// owner, regardless of what the backing store says. Both user and
    /// group are replaced together.
    pub owner: Option<Owner>,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            entry_ttl: DEFAULT_ENTRY_TTL,
            attr_ttl: DEFAULT_ATTR_TTL,
            negative_ttl: DEFAULT_NEGATIVE_TTL,
            owner: None,
        }
    }
}

impl MountConfig {
    /// Configuration suited to high-latency (network) backends.
    pub fn network() -> Self {
        Self {
            entry_ttl: NETWORK_ENTRY_TTL,
            attr_ttl: NETWORK_ATTR_TTL,
            negative_ttl: NETWORK_NEGATIVE_TTL,
            owner: None,
        }
    }

    /// Sets the entry-cache lifetime.
    #[must_use]
    pub fn entry_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// Sets the attribute-cache lifetime.
    #[must_use]
    pub fn attr_ttl(mut self, ttl: Duration) -> Self {
        self.attr_ttl = ttl;
        self
    }

    /// Sets the negative-entry lifetime.
    #[must_use]
    pub fn negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl = ttl;
        self
    }

    /// Forces every reply under this mount to report `owner`.
    #[must_use]
    pub fn owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_local_fresh() {
        let config = MountConfig::default();
        assert_eq!(config.entry_ttl, Duration::from_secs(1));
        assert_eq!(config.attr_ttl, Duration::from_secs(1));
        assert_eq!(config.negative_ttl, Duration::ZERO);
        assert_eq!(config.owner, None);
    }

    #[test]
    fn test_network_mode() {
        let config = MountConfig::network();
        assert_eq!(config.entry_ttl, Duration::from_secs(60));
        assert_eq!(config.attr_ttl, Duration::from_secs(60));
        assert_eq!(config.negative_ttl, Duration::from_secs(3));
    }

    #[test]
    fn test_builder_pattern() {
        let config = MountConfig::default()
            .entry_ttl(Duration::from_secs(2))
            .attr_ttl(Duration::from_secs(5))
            .owner(Owner { uid: 42, gid: 7 });
        assert_eq!(config.entry_ttl, Duration::from_secs(2));
        assert_eq!(config.attr_ttl, Duration::from_secs(5));
        assert_eq!(config.owner, Some(Owner { uid: 42, gid: 7 }));
    }

    #[test]
    fn test_current_owner_matches_process() {
        let owner = Owner::current();
        // SAFETY: getuid/getgid are always safe to call.
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        assert_eq!(owner, Owner { uid, gid });
    }
}
