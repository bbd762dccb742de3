use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::primitives::mempool::{ByteWindow, RecordKind};

/// Layout of a record type stored in a [`super::Pool`].
///
/// Implemented by zero-sized marker types; field offsets are plain
/// constants next to the implementation.
pub trait Record: Send + Sync + 'static {
    /// Header tag written into every slot of this type.
    const KIND: RecordKind;
    /// Payload size of one record in bytes.
    const SIZE_IN_BYTES: usize;
}

/// Process-unique identity of a pool.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PoolId(pub u64);

impl PoolId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A flyweight ref: a reusable view bound to at most one slot at a time.
///
/// Identity is `(pool, slot index)`. Two refs bound to the same slot compare
/// and hash equal even if they were obtained independently, and a write made
/// through one is visible through the other since neither holds a copy of
/// the record.
pub struct PoolObject<R: Record> {
    pool: PoolId,
    window: ByteWindow,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> PoolObject<R> {
    pub(crate) fn unbound(pool: PoolId) -> Self {
        Self {
            pool,
            window: ByteWindow::unbound(),
            _record: PhantomData,
        }
    }

    /// Slot index this ref is bound to.
    #[inline]
    pub fn index(&self) -> usize {
        debug_assert!(self.window.is_bound(), "index of an unbound ref");
        self.window.index()
    }

    /// Pool this ref belongs to.
    #[inline]
    pub fn pool_id(&self) -> PoolId {
        self.pool
    }

    /// Whether the ref currently points at a slot.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.window.is_bound()
    }

    /// Repoints this ref at the slot `other` is bound to, without copying
    /// any record content.
    #[inline]
    pub fn ref_to(&mut self, other: &Self) -> &mut Self {
        debug_assert_eq!(self.pool, other.pool, "ref_to across pools");
        self.window = other.window;
        self
    }

    /// Detaches this ref from its slot.
    #[inline]
    pub fn unbind(&mut self) {
        self.window.unbind();
    }

    #[inline]
    pub(crate) fn window(&self) -> &ByteWindow {
        &self.window
    }

    #[inline]
    pub(crate) fn window_mut(&mut self) -> &mut ByteWindow {
        &mut self.window
    }
}

impl<R: Record> Clone for PoolObject<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool,
            window: self.window,
            _record: PhantomData,
        }
    }
}

impl<R: Record> PartialEq for PoolObject<R> {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.window.index() == other.window.index()
    }
}

impl<R: Record> Eq for PoolObject<R> {}

impl<R: Record> Hash for PoolObject<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.hash(state);
        self.window.index().hash(state);
    }
}

impl<R: Record> fmt::Debug for PoolObject<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.window.is_bound() {
            write!(f, "PoolObject(pool={}, index={})", self.pool, self.window.index())
        } else {
            write!(f, "PoolObject(pool={}, unbound)", self.pool)
        }
    }
}
