//! Thread-safe, generation-counted table for kernel-visible handle IDs.
//!
//! Every open file or directory session is registered here and identified
//! by an opaque 64-bit ID handed to the kernel. The kernel returns the ID
//! verbatim on every later operation and may keep it cached long after the
//! session is closed, so IDs must stay unambiguous across slot reuse.
//!
//! # Handle lifecycle
//!
//! 1. **Register**: the record takes a free slot (or a fresh one) and the
//!    returned ID packs the slot index with the slot's current generation
//! 2. **Lookup**: resolves the ID to a clone of the record, O(1)
//! 3. **Forget**: removes the record and bumps the slot's generation, so
//!    every previously issued ID for that slot is dead from then on

use parking_lot::RwLock;
use thiserror::Error;

/// Errors from handle registration and resolution.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum HandleError {
    /// The ID was never issued, or its session was already forgotten.
    #[error("unknown handle {0:#x}")]
    Unknown(u64),

    /// Every slot expressible in the 32-bit index space is occupied.
    #[error("handle table exhausted")]
    Exhausted,
}

/// An opaque 64-bit handle ID exchanged with the kernel.
///
/// The low 32 bits carry the slot index plus one, the high 32 bits the
/// slot's generation at registration time. `0` is reserved as "no handle"
/// and is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    /// Wraps a raw ID received from the kernel. No validation happens here;
    /// an arbitrary value simply fails [`HandleTable::lookup`].
    pub fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    /// The raw 64-bit value sent to the kernel.
    pub fn as_raw(self) -> u64 {
        self.0
    }

    fn pack(index: u32, generation: u32) -> Self {
        Handle((u64::from(generation) << 32) | u64::from(index + 1))
    }

    /// Splits into (slot index, generation). `None` for IDs whose low half
    /// is zero, which includes the reserved null handle.
    fn unpack(self) -> Option<(u32, u32)> {
        let index = (self.0 as u32).checked_sub(1)?;
        Some((index, (self.0 >> 32) as u32))
    }
}

struct Slot<T> {
    generation: u32,
    record: Option<T>,
}

struct Slots<T> {
    slots: Vec<Slot<T>>,
    /// Indices of vacated slots, reused before the arena grows.
    free: Vec<u32>,
    live: usize,
}

/// Thread-safe registry mapping opaque 64-bit IDs to live session records.
///
/// Records are cloned out on lookup (in practice they are `Arc`s), so no
/// reference into the table outlives the internal lock and a concurrent
/// forget can never be observed as anything but a clean
/// [`HandleError::Unknown`].
///
/// # Example
///
/// ```
/// use burrow_mount::HandleTable;
///
/// let table: HandleTable<String> = HandleTable::new();
///
/// let id = table.register("session".to_string()).unwrap();
/// assert_ne!(id.as_raw(), 0);
/// assert_eq!(table.lookup(id).unwrap(), "session");
///
/// assert_eq!(table.forget(id).unwrap(), "session");
/// assert!(table.lookup(id).is_err());
/// ```
pub struct HandleTable<T> {
    inner: RwLock<Slots<T>>,
}

/// Largest usable slot index; `index + 1` must still fit in 32 bits.
const MAX_SLOTS: usize = u32::MAX as usize;

impl<T> HandleTable<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Slots {
                slots: Vec::new(),
                free: Vec::new(),
                live: 0,
            }),
        }
    }

    /// Registers `record` and returns a fresh, currently-unused ID.
    ///
    /// # Errors
    ///
    /// [`HandleError::Exhausted`] when no free slot fits in the 32-bit
    /// index space.
    pub fn register(&self, record: T) -> Result<Handle, HandleError> {
        let mut inner = self.inner.write();
        let index = match inner.free.pop() {
            Some(index) => {
                let slot = &mut inner.slots[index as usize];
                debug_assert!(slot.record.is_none());
                slot.record = Some(record);
                index
            }
            None => {
                if inner.slots.len() >= MAX_SLOTS {
                    return Err(HandleError::Exhausted);
                }
                inner.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                (inner.slots.len() - 1) as u32
            }
        };
        inner.live += 1;
        Ok(Handle::pack(index, inner.slots[index as usize].generation))
    }

    /// Resolves `handle` to a clone of its record.
    ///
    /// # Errors
    ///
    /// [`HandleError::Unknown`] when the ID was never issued or was already
    /// forgotten, including IDs whose slot has since been reused.
    pub fn lookup(&self, handle: Handle) -> Result<T, HandleError>
    where
        T: Clone,
    {
        let inner = self.inner.read();
        let Some((index, generation)) = handle.unpack() else {
            return Err(HandleError::Unknown(handle.as_raw()));
        };
        inner
            .slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.record.clone())
            .ok_or(HandleError::Unknown(handle.as_raw()))
    }

    /// Removes and returns the record for `handle`, invalidating the ID.
    ///
    /// The slot's generation is bumped before the slot is recycled, so the
    /// forgotten ID can never resolve again, even once a later registration
    /// occupies the same slot.
    ///
    /// # Errors
    ///
    /// [`HandleError::Unknown`] under the same conditions as
    /// [`HandleTable::lookup`].
    pub fn forget(&self, handle: Handle) -> Result<T, HandleError> {
        let mut inner = self.inner.write();
        let Some((index, generation)) = handle.unpack() else {
            return Err(HandleError::Unknown(handle.as_raw()));
        };
        let slot = inner
            .slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == generation)
            .ok_or(HandleError::Unknown(handle.as_raw()))?;
        let record = slot
            .record
            .take()
            .ok_or(HandleError::Unknown(handle.as_raw()))?;
        slot.generation = slot.generation.wrapping_add(1);
        inner.free.push(index);
        inner.live -= 1;
        Ok(record)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.inner.read().live
    }

    /// True when no registration is live. Unmount requires this.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
