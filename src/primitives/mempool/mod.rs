#![forbid(unsafe_code)]
//! Growable slab of fixed-size slots addressed by index.
//!
//! Every slot is a [`SLOT_HEADER_SIZE`]-byte header followed by the record
//! payload. Field offsets handed to the read/write methods are relative to
//! the payload. Slot indices are stable: nothing is ever compacted, deleted
//! slots go onto a free-index stack and are handed out again (LIFO) by
//! [`MemPool::allocate_slot`].
//!
//! ```text
//! data: | hdr | payload | hdr | payload | hdr | payload | ...
//!         slot 0          slot 1 (Free)   slot 2
//! free: [1]
//! ```

mod field;
mod record;

use tracing::{debug, trace, warn};

use crate::error::{GraphError, Result};

pub use field::FieldValue;
pub use record::{RecordKind, SLOT_HEADER_SIZE};

/// Hard upper bound on the number of slots in one slab.
///
/// Links between records are stored as `i32` with `-1` meaning "none".
pub const MAX_SLOTS: usize = i32::MAX as usize;

const MIN_GROWTH: usize = 16;

/// A rebindable view onto one slot.
///
/// Only the slot index and the byte offset of its payload are cached, never
/// an address, so a window stays valid across slab growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteWindow {
    index: usize,
    base: usize,
}

impl ByteWindow {
    const UNBOUND: usize = usize::MAX;

    /// Creates a window that is not bound to any slot.
    pub const fn unbound() -> Self {
        Self {
            index: Self::UNBOUND,
            base: 0,
        }
    }

    /// Index of the bound slot (`usize::MAX` when unbound).
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the window currently points at a slot.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.index != Self::UNBOUND
    }

    /// Detaches the window from its slot.
    #[inline]
    pub fn unbind(&mut self) {
        *self = Self::unbound();
    }
}

impl Default for ByteWindow {
    fn default() -> Self {
        Self::unbound()
    }
}

/// Slab storage for records of a single payload size.
#[derive(Debug)]
pub struct MemPool {
    data: Vec<u8>,
    payload_size: usize,
    slot_size: usize,
    capacity: usize,
    allocated: usize,
    live: usize,
    free: Vec<usize>,
    limit: usize,
}

impl MemPool {
    /// Creates a slab for `payload_size`-byte records with room for
    /// `initial_capacity` slots, never growing past `limit` slots.
    pub fn new(payload_size: usize, initial_capacity: usize, limit: usize) -> Result<Self> {
        let limit = limit.min(MAX_SLOTS);
        let slot_size = SLOT_HEADER_SIZE + payload_size;
        let capacity = initial_capacity.min(limit);
        let mut data = Vec::new();
        data.try_reserve_exact(capacity * slot_size)?;
        debug!(payload_size, capacity, limit, "slab created");
        Ok(Self {
            data,
            payload_size,
            slot_size,
            capacity,
            allocated: 0,
            live: 0,
            free: Vec::new(),
            limit,
        })
    }

    /// Payload bytes per slot.
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Number of slots ever allocated (live plus free).
    pub fn len(&self) -> usize {
        self.allocated
    }

    /// Whether no slot was ever allocated since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Number of live slots.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of indices waiting on the free-index stack.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Slots that fit without reallocating.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum number of slots this slab may hold.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Allocates a slot tagged with `kind` and returns its index.
    ///
    /// Reuses the most recently freed index if there is one, otherwise
    /// appends, growing the backing storage when needed. The payload of the
    /// returned slot is all zeroes.
    pub fn allocate_slot(&mut self, kind: RecordKind) -> Result<usize> {
        debug_assert!(kind != RecordKind::Free, "cannot allocate a free slot");
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                if self.allocated >= self.limit {
                    return Err(GraphError::CapacityExhausted { limit: self.limit });
                }
                if self.allocated == self.capacity {
                    self.grow()?;
                }
                let index = self.allocated;
                self.allocated += 1;
                self.data.resize(self.allocated * self.slot_size, 0);
                index
            }
        };
        self.data[index * self.slot_size] = kind.to_byte();
        self.live += 1;
        trace!(index, ?kind, "slot allocated");
        Ok(index)
    }

    /// Clears the slot and pushes its index onto the free-index stack.
    ///
    /// Returns `false` without touching anything if the index is out of
    /// range or already free.
    pub fn free_slot(&mut self, index: usize) -> bool {
        if !self.is_live(index) {
            warn!(index, "free of a slot that is not live ignored");
            return false;
        }
        let base = index * self.slot_size;
        self.data[base..base + self.slot_size].fill(0);
        self.free.push(index);
        self.live -= 1;
        trace!(index, "slot freed");
        true
    }

    /// Whether `index` refers to an allocated, non-free slot.
    #[inline]
    pub fn is_live(&self, index: usize) -> bool {
        index < self.allocated && self.data[index * self.slot_size] != RecordKind::Free.to_byte()
    }

    /// Header tag of the slot, or `None` if the index was never allocated.
    pub fn kind(&self, index: usize) -> Option<RecordKind> {
        if index >= self.allocated {
            return None;
        }
        RecordKind::from_byte(self.data[index * self.slot_size])
    }

    /// Points `window` at the payload of slot `index`.
    #[inline]
    pub fn bind_window(&self, window: &mut ByteWindow, index: usize) {
        window.index = index;
        window.base = index * self.slot_size + SLOT_HEADER_SIZE;
    }

    /// Reads a field of slot `index`.
    #[inline]
    pub fn read_field<T: FieldValue>(&self, index: usize, offset: usize) -> T {
        debug_assert!(offset + T::WIDTH <= self.payload_size, "field outside record");
        let at = index * self.slot_size + SLOT_HEADER_SIZE + offset;
        T::read_from(&self.data[at..at + T::WIDTH])
    }

    /// Writes a field of slot `index`.
    #[inline]
    pub fn write_field<T: FieldValue>(&mut self, index: usize, offset: usize, value: T) {
        debug_assert!(offset + T::WIDTH <= self.payload_size, "field outside record");
        let at = index * self.slot_size + SLOT_HEADER_SIZE + offset;
        value.write_to(&mut self.data[at..at + T::WIDTH]);
    }

    /// Reads a field through a bound window.
    #[inline]
    pub fn read_window<T: FieldValue>(&self, window: &ByteWindow, offset: usize) -> T {
        debug_assert!(window.is_bound(), "read through unbound window");
        debug_assert!(offset + T::WIDTH <= self.payload_size, "field outside record");
        let at = window.base + offset;
        T::read_from(&self.data[at..at + T::WIDTH])
    }

    /// Writes a field through a bound window.
    #[inline]
    pub fn write_window<T: FieldValue>(&mut self, window: &ByteWindow, offset: usize, value: T) {
        debug_assert!(window.is_bound(), "write through unbound window");
        debug_assert!(offset + T::WIDTH <= self.payload_size, "field outside record");
        let at = window.base + offset;
        value.write_to(&mut self.data[at..at + T::WIDTH]);
    }

    /// Iterates the indices of live slots in ascending order.
    pub fn live_indices(&self) -> LiveIndices<'_> {
        LiveIndices {
            memory: self,
            next: 0,
            remaining: self.live,
        }
    }

    /// Drops every slot. Keeps the allocation for reuse.
    pub fn clear(&mut self) {
        debug!(
            allocated = self.allocated,
            live = self.live,
            "slab cleared"
        );
        self.data.clear();
        self.free.clear();
        self.allocated = 0;
        self.live = 0;
    }

    fn grow(&mut self) -> Result<()> {
        let target = self
            .capacity
            .saturating_mul(2)
            .max(MIN_GROWTH)
            .min(self.limit);
        let additional = (target - self.allocated) * self.slot_size;
        self.data.try_reserve_exact(additional)?;
        debug!(from = self.capacity, to = target, "slab grown");
        self.capacity = target;
        Ok(())
    }
}

/// Iterator over live slot indices; see [`MemPool::live_indices`].
pub struct LiveIndices<'a> {
    memory: &'a MemPool,
    next: usize,
    remaining: usize,
}

impl Iterator for LiveIndices<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        while self.next < self.memory.allocated {
            let index = self.next;
            self.next += 1;
            if self.memory.is_live(index) {
                self.remaining -= 1;
                return Some(index);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LiveIndices<'_> {}
