//! Record pools: a slab plus the lifecycle of its records and of the
//! flyweight refs that view them.
//!
//! A [`Pool`] owns one [`MemPool`], the free-index stack inside it, and a
//! lock-free queue of idle [`PoolObject`] wrappers. Refs are borrowed with
//! [`Pool::create_ref`], pointed at records with [`Pool::create`] or
//! [`Pool::get_by_index`], and handed back with [`Pool::release_ref`].
//! Wrapper lifetime is independent of slot lifetime: one wrapper views many
//! different records over time.

mod id_bimap;
mod object;

use crate::error::Result;
use crate::primitives::concurrency::RefRecycler;
use crate::primitives::mempool::{FieldValue, LiveIndices, MemPool, MAX_SLOTS};

pub use id_bimap::{GraphIdBimap, IdBimap, PoolObjectIdBimap};
pub use object::{PoolId, PoolObject, Record};

/// Owner of all records of type `R`.
pub struct Pool<R: Record> {
    id: PoolId,
    memory: MemPool,
    refs: RefRecycler<PoolObject<R>>,
}

impl<R: Record> Pool<R> {
    /// Creates a pool with room for `initial_capacity` records.
    pub fn new(initial_capacity: usize) -> Result<Self> {
        Self::with_limit(initial_capacity, MAX_SLOTS)
    }

    /// Creates a pool that refuses to hold more than `limit` records.
    pub fn with_limit(initial_capacity: usize, limit: usize) -> Result<Self> {
        Ok(Self {
            id: PoolId::next(),
            memory: MemPool::new(R::SIZE_IN_BYTES, initial_capacity, limit)?,
            refs: RefRecycler::new(),
        })
    }

    /// Identity of this pool, shared by all refs it hands out.
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.memory.live()
    }

    /// Whether the pool holds no live record.
    pub fn is_empty(&self) -> bool {
        self.memory.live() == 0
    }

    /// Number of slots ever allocated (live plus free).
    pub fn allocated_slots(&self) -> usize {
        self.memory.len()
    }

    /// Number of freed slots awaiting reuse.
    pub fn free_slots(&self) -> usize {
        self.memory.free_count()
    }

    /// The underlying slab.
    pub fn memory(&self) -> &MemPool {
        &self.memory
    }

    /// The idle-ref queue, for wrapper statistics.
    pub fn recycler(&self) -> &RefRecycler<PoolObject<R>> {
        &self.refs
    }

    /// Borrows an unbound ref, reusing an idle wrapper when one is queued.
    #[inline]
    pub fn create_ref(&self) -> PoolObject<R> {
        let id = self.id;
        self.refs.acquire(|| PoolObject::unbound(id))
    }

    /// Unbinds `obj` and returns it to the idle queue.
    #[inline]
    pub fn release_ref(&self, mut obj: PoolObject<R>) {
        debug_assert_eq!(obj.pool_id(), self.id, "ref released to a foreign pool");
        obj.unbind();
        self.refs.release(obj);
    }

    /// Allocates a record and binds `obj` to it.
    ///
    /// The record's payload is zeroed; initializing its fields is up to the
    /// caller.
    pub fn create<'r>(&mut self, obj: &'r mut PoolObject<R>) -> Result<&'r mut PoolObject<R>> {
        debug_assert_eq!(obj.pool_id(), self.id, "ref from a foreign pool");
        let index = self.memory.allocate_slot(R::KIND)?;
        self.memory.bind_window(obj.window_mut(), index);
        Ok(obj)
    }

    /// Frees the record at `index`.
    ///
    /// Returns `false` and does nothing if the slot is already free.
    pub fn delete(&mut self, index: usize) -> bool {
        self.memory.free_slot(index)
    }

    /// Frees the record `obj` is bound to. `obj` stays bound to the now
    /// free slot and must not be read through until rebound.
    pub fn release(&mut self, obj: &PoolObject<R>) -> bool {
        debug_assert_eq!(obj.pool_id(), self.id, "ref from a foreign pool");
        self.delete(obj.index())
    }

    /// Binds `obj` to the record at `index`.
    ///
    /// `index` must come from a live record or from an id mapping; binding
    /// to a free slot is not detected.
    #[inline]
    pub fn get_by_index<'r>(&self, index: usize, obj: &'r mut PoolObject<R>) -> &'r mut PoolObject<R> {
        debug_assert_eq!(obj.pool_id(), self.id, "ref from a foreign pool");
        self.memory.bind_window(obj.window_mut(), index);
        obj
    }

    /// Whether a live record occupies `index`.
    #[inline]
    pub fn is_live(&self, index: usize) -> bool {
        self.memory.is_live(index)
    }

    /// Whether `obj` belongs to this pool and is bound to a live record.
    pub fn contains(&self, obj: &PoolObject<R>) -> bool {
        obj.pool_id() == self.id && obj.is_bound() && self.memory.is_live(obj.index())
    }

    /// Reads a field of the record `obj` is bound to.
    #[inline]
    pub fn get_field<T: FieldValue>(&self, obj: &PoolObject<R>, offset: usize) -> T {
        self.memory.read_window(obj.window(), offset)
    }

    /// Writes a field of the record `obj` is bound to.
    #[inline]
    pub fn set_field<T: FieldValue>(&mut self, obj: &PoolObject<R>, offset: usize, value: T) {
        self.memory.write_window(obj.window(), offset, value);
    }

    /// Reads a field of the record at `index`.
    #[inline]
    pub(crate) fn field_at<T: FieldValue>(&self, index: usize, offset: usize) -> T {
        self.memory.read_field(index, offset)
    }

    /// Writes a field of the record at `index`.
    #[inline]
    pub(crate) fn set_field_at<T: FieldValue>(&mut self, index: usize, offset: usize, value: T) {
        self.memory.write_field(index, offset, value);
    }

    /// Live records in slot order.
    ///
    /// Each call starts a fresh traversal; every live record is yielded
    /// exactly once. No order is promised relative to creation order.
    pub fn iter(&self) -> PoolIter<'_, R> {
        PoolIter {
            pool: self,
            indices: self.memory.live_indices(),
        }
    }

    /// Indices of live records in slot order.
    pub fn indices(&self) -> LiveIndices<'_> {
        self.memory.live_indices()
    }

    /// Frees every record at once. Outstanding refs keep their indices but
    /// must be rebound before use.
    pub fn clear(&mut self) {
        self.memory.clear();
    }
}

impl<R: Record> std::fmt::Debug for Pool<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("live", &self.len())
            .field("free", &self.free_slots())
            .field("refs", &self.refs)
            .finish()
    }
}

/// Iterator over live records; see [`Pool::iter`].
pub struct PoolIter<'a, R: Record> {
    pool: &'a Pool<R>,
    indices: LiveIndices<'a>,
}

impl<R: Record> Iterator for PoolIter<'_, R> {
    type Item = PoolObject<R>;

    fn next(&mut self) -> Option<PoolObject<R>> {
        let index = self.indices.next()?;
        let mut obj = PoolObject::unbound(self.pool.id);
        self.pool.get_by_index(index, &mut obj);
        Some(obj)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<R: Record> ExactSizeIterator for PoolIter<'_, R> {}

impl<'a, R: Record> IntoIterator for &'a Pool<R> {
    type Item = PoolObject<R>;
    type IntoIter = PoolIter<'a, R>;

    fn into_iter(self) -> PoolIter<'a, R> {
        self.iter()
    }
}
