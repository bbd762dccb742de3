//! Concurrency building blocks.
//!
//! Two resources are synchronized independently:
//!
//! - [`RefRecycler`] holds idle ref wrappers. It is a lock-free
//!   multi-producer/multi-consumer queue and never touches slot content, so
//!   borrowing and returning refs is safe from any thread without the graph
//!   lock.
//! - [`SharedGraph`] wraps a graph in the single reader/writer lock that
//!   serializes structural edits. Writers take it exclusively for any add or
//!   remove, readers share it for the duration of a traversal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_queue::SegQueue;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock-free queue of idle wrappers available for reuse.
pub struct RefRecycler<T> {
    idle: SegQueue<T>,
    allocated: AtomicUsize,
    recycled: AtomicUsize,
}

impl<T> RefRecycler<T> {
    /// Creates an empty recycler.
    pub fn new() -> Self {
        Self {
            idle: SegQueue::new(),
            allocated: AtomicUsize::new(0),
            recycled: AtomicUsize::new(0),
        }
    }

    /// Pops an idle wrapper, or builds a new one with `make`.
    #[inline]
    pub fn acquire(&self, make: impl FnOnce() -> T) -> T {
        match self.idle.pop() {
            Some(item) => {
                self.recycled.fetch_add(1, Ordering::Relaxed);
                item
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                make()
            }
        }
    }

    /// Returns a wrapper to the idle queue.
    #[inline]
    pub fn release(&self, item: T) {
        self.idle.push(item);
    }

    /// Wrappers currently idle.
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Wrappers built because the idle queue was empty.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Acquisitions served from the idle queue.
    pub fn recycled(&self) -> usize {
        self.recycled.load(Ordering::Relaxed)
    }
}

impl<T> Default for RefRecycler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for RefRecycler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefRecycler")
            .field("idle", &self.idle())
            .field("allocated", &self.allocated())
            .field("recycled", &self.recycled())
            .finish()
    }
}

/// A graph behind the process-wide reader/writer lock.
///
/// Cloning is cheap and yields another handle to the same graph.
pub struct SharedGraph<G> {
    inner: Arc<RwLock<G>>,
}

impl<G> SharedGraph<G> {
    /// Wraps `graph` in a fresh lock.
    pub fn new(graph: G) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Acquires the shared lock, blocking while a writer holds it.
    pub fn read(&self) -> RwLockReadGuard<'_, G> {
        self.inner.read()
    }

    /// Acquires the exclusive lock, blocking until all readers are gone.
    pub fn write(&self) -> RwLockWriteGuard<'_, G> {
        self.inner.write()
    }

    /// Attempts the exclusive lock without blocking.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, G>> {
        self.inner.try_write()
    }

    /// Number of handles to this graph.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<G> Clone for SharedGraph<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
