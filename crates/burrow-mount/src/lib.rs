//! Shared plumbing for burrow mount backends.
//!
//! This crate holds the pieces of a mount implementation that do not depend
//! on any particular wire protocol:
//!
//! - [`HandleTable`] - generation-counted registry for the opaque 64-bit
//!   handle IDs exchanged with the kernel
//! - cache lifetime defaults shared by the protocol-facing crates
//!
//! # Why a generation-counted table?
//!
//! The kernel caches handle IDs and may present one at any point until it
//! observes the close. A table keyed by slot index alone would let a stale
//! ID resolve to whatever record reuses the slot next. Packing a per-slot
//! generation into the ID makes every reuse observable: a stale ID fails
//! with [`HandleError::Unknown`] instead of aliasing the new occupant.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod handle_table;

pub use handle_table::{Handle, HandleError, HandleTable};

use std::time::Duration;

/// Default lifetime for cached name-lookup entries.
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(1);

/// Default lifetime for cached file attributes.
pub const DEFAULT_ATTR_TTL: Duration = Duration::from_secs(1);

/// Default lifetime for negative (ENOENT) lookup entries. Zero disables
/// negative caching entirely.
pub const DEFAULT_NEGATIVE_TTL: Duration = Duration::ZERO;

/// Entry lifetime suited to high-latency (network) backends.
pub const NETWORK_ENTRY_TTL: Duration = Duration::from_secs(60);

/// Attribute lifetime suited to high-latency (network) backends.
pub const NETWORK_ATTR_TTL: Duration = Duration::from_secs(60);

/// Negative-entry lifetime suited to high-latency (network) backends.
pub const NETWORK_NEGATIVE_TTL: Duration = Duration::from_secs(3);
