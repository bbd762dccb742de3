//! Collections of records keyed by slot.
//!
//! Two refs bound to the same slot are the same element here, whichever
//! wrappers they are. Entries are stored as slot indices and materialized on
//! demand by binding a ref, so iteration never allocates per element.
//!
//! Deleting a record does not remove it from collections holding it. Call
//! `retain_live` after structural edits (e.g. from a
//! [`GraphListener`](crate::storage::GraphListener)) before dereferencing.

use std::marker::PhantomData;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::pool::{Pool, PoolId, PoolObject, Record};

/// Set of records of one pool.
pub struct RefSet<R: Record> {
    pool: PoolId,
    indices: FxHashSet<usize>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RefSet<R> {
    /// Creates an empty set for records of `pool`.
    pub fn new(pool: &Pool<R>) -> Self {
        Self {
            pool: pool.id(),
            indices: FxHashSet::default(),
            _record: PhantomData,
        }
    }

    /// Adds `obj`; returns `false` if its slot was already present.
    pub fn insert(&mut self, obj: &PoolObject<R>) -> bool {
        debug_assert_eq!(obj.pool_id(), self.pool, "ref from a foreign pool");
        self.indices.insert(obj.index())
    }

    /// Removes `obj`; returns whether its slot was present.
    pub fn remove(&mut self, obj: &PoolObject<R>) -> bool {
        obj.pool_id() == self.pool && self.indices.remove(&obj.index())
    }

    /// Whether the slot `obj` is bound to is present.
    pub fn contains(&self, obj: &PoolObject<R>) -> bool {
        obj.pool_id() == self.pool && self.indices.contains(&obj.index())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Slot indices of the entries, in no particular order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Entries bound as refs of `pool`, in no particular order.
    pub fn iter<'a>(&'a self, pool: &'a Pool<R>) -> impl Iterator<Item = PoolObject<R>> + 'a {
        debug_assert_eq!(pool.id(), self.pool, "set read through a foreign pool");
        self.indices.iter().map(move |&index| {
            let mut obj = PoolObject::unbound(pool.id());
            pool.get_by_index(index, &mut obj);
            obj
        })
    }

    /// Drops entries whose slots are no longer live in `pool`. Returns the
    /// number dropped.
    pub fn retain_live(&mut self, pool: &Pool<R>) -> usize {
        let before = self.indices.len();
        self.indices.retain(|&index| pool.is_live(index));
        before - self.indices.len()
    }
}

impl<R: Record> std::fmt::Debug for RefSet<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefSet")
            .field("pool", &self.pool)
            .field("len", &self.indices.len())
            .finish()
    }
}

/// Ordered list of records of one pool. Duplicates are allowed.
pub struct RefList<R: Record> {
    pool: PoolId,
    indices: SmallVec<[usize; 8]>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RefList<R> {
    /// Creates an empty list for records of `pool`.
    pub fn new(pool: &Pool<R>) -> Self {
        Self {
            pool: pool.id(),
            indices: SmallVec::new(),
            _record: PhantomData,
        }
    }

    /// Appends `obj`.
    pub fn push(&mut self, obj: &PoolObject<R>) {
        debug_assert_eq!(obj.pool_id(), self.pool, "ref from a foreign pool");
        self.indices.push(obj.index());
    }

    /// Binds `obj` to the entry at `position`, or returns `None` past the end.
    pub fn get<'r>(
        &self,
        position: usize,
        pool: &Pool<R>,
        obj: &'r mut PoolObject<R>,
    ) -> Option<&'r mut PoolObject<R>> {
        let index = *self.indices.get(position)?;
        Some(pool.get_by_index(index, obj))
    }

    /// Removes the entry at `position` and returns its slot index.
    pub fn remove(&mut self, position: usize) -> Option<usize> {
        (position < self.indices.len()).then(|| self.indices.remove(position))
    }

    /// Removes the first entry bound to the slot of `obj`.
    pub fn remove_ref(&mut self, obj: &PoolObject<R>) -> bool {
        match self.position(obj) {
            Some(at) => {
                self.indices.remove(at);
                true
            }
            None => false,
        }
    }

    /// Position of the first entry bound to the slot of `obj`.
    pub fn position(&self, obj: &PoolObject<R>) -> Option<usize> {
        if obj.pool_id() != self.pool {
            return None;
        }
        self.indices.iter().position(|&index| index == obj.index())
    }

    /// Whether any entry is bound to the slot of `obj`.
    pub fn contains(&self, obj: &PoolObject<R>) -> bool {
        self.position(obj).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Entries in order, bound as refs of `pool`.
    pub fn iter<'a>(&'a self, pool: &'a Pool<R>) -> impl Iterator<Item = PoolObject<R>> + 'a {
        debug_assert_eq!(pool.id(), self.pool, "list read through a foreign pool");
        self.indices.iter().map(move |&index| {
            let mut obj = PoolObject::unbound(pool.id());
            pool.get_by_index(index, &mut obj);
            obj
        })
    }

    /// Drops entries whose slots are no longer live in `pool`, keeping the
    /// order of the rest. Returns the number dropped.
    pub fn retain_live(&mut self, pool: &Pool<R>) -> usize {
        let before = self.indices.len();
        self.indices.retain(|index| pool.is_live(*index));
        before - self.indices.len()
    }
}

impl<R: Record> std::fmt::Debug for RefList<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefList")
            .field("pool", &self.pool)
            .field("indices", &self.indices)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::mempool::RecordKind;
    use crate::storage::{
        GraphListener, GraphOptions, ListenableGraph, EDGE_BASE_SIZE, VERTEX_BASE_SIZE,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Spot;
    struct Link;

    impl Record for Spot {
        const KIND: RecordKind = RecordKind::Vertex;
        const SIZE_IN_BYTES: usize = VERTEX_BASE_SIZE;
    }

    impl Record for Link {
        const KIND: RecordKind = RecordKind::Edge;
        const SIZE_IN_BYTES: usize = EDGE_BASE_SIZE;
    }

    fn graph() -> ListenableGraph<Spot, Link> {
        ListenableGraph::new(GraphOptions::new().initial_vertex_capacity(8)).unwrap()
    }

    #[test]
    fn distinct_wrappers_are_one_element() {
        let mut graph = graph();
        let a = graph.add_vertex().unwrap();
        let mut view = graph.vertex_ref();
        graph.vertex_store().get_by_index(a.index(), &mut view);

        let mut set = RefSet::new(graph.vertex_store());
        assert!(set.insert(&a));
        assert!(!set.insert(&view));
        assert!(set.contains(&view));
        assert_eq!(set.len(), 1);
        assert!(set.remove(&view));
        assert!(set.is_empty());
    }

    #[test]
    fn iteration_binds_stored_slots() {
        let mut graph = graph();
        let vertices: Vec<_> = (0..4).map(|_| graph.add_vertex().unwrap()).collect();
        let mut set = RefSet::new(graph.vertex_store());
        set.insert(&vertices[1]);
        set.insert(&vertices[3]);
        let mut seen: Vec<usize> = set.iter(graph.vertex_store()).map(|v| v.index()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![vertices[1].index(), vertices[3].index()]);
    }

    #[test]
    fn retain_live_prunes_deleted_slots() {
        let mut graph = graph();
        let vertices: Vec<_> = (0..5).map(|_| graph.add_vertex().unwrap()).collect();
        let mut set = RefSet::new(graph.vertex_store());
        let mut list = RefList::new(graph.vertex_store());
        for v in &vertices {
            set.insert(v);
            list.push(v);
        }
        graph.remove_vertex(&vertices[0]);
        graph.remove_vertex(&vertices[3]);

        assert_eq!(set.retain_live(graph.vertex_store()), 2);
        assert_eq!(list.retain_live(graph.vertex_store()), 2);
        assert_eq!(set.len(), 3);
        let order: Vec<_> = list.iter(graph.vertex_store()).collect();
        assert_eq!(order, vec![vertices[1].clone(), vertices[2].clone(), vertices[4].clone()]);
    }

    #[test]
    fn list_keeps_order_and_duplicates() {
        let mut graph = graph();
        let a = graph.add_vertex().unwrap();
        let b = graph.add_vertex().unwrap();
        let mut list = RefList::new(graph.vertex_store());
        list.push(&b);
        list.push(&a);
        list.push(&b);
        assert_eq!(list.len(), 3);
        assert_eq!(list.position(&a), Some(1));

        let mut scratch = graph.vertex_ref();
        assert_eq!(*list.get(2, graph.vertex_store(), &mut scratch).unwrap(), b);
        assert!(list.get(3, graph.vertex_store(), &mut scratch).is_none());

        assert!(list.remove_ref(&b));
        assert_eq!(list.position(&b), Some(1));
        assert_eq!(list.remove(0), Some(a.index()));
        assert_eq!(list.remove(5), None);
        assert!(!list.contains(&a));
        list.clear();
        assert!(list.is_empty());
    }

    struct Selection {
        selected: Mutex<RefSet<Spot>>,
    }

    impl GraphListener<Spot, Link> for Selection {
        fn vertex_removed(&self, _graph: &ListenableGraph<Spot, Link>, vertex: &PoolObject<Spot>) {
            self.selected.lock().remove(vertex);
        }

        fn graph_rebuilt(&self, _graph: &ListenableGraph<Spot, Link>) {
            self.selected.lock().clear();
        }
    }

    #[test]
    fn listener_keeps_selection_consistent() {
        let mut graph = graph();
        let a = graph.add_vertex().unwrap();
        let b = graph.add_vertex().unwrap();
        let selection = Arc::new(Selection {
            selected: Mutex::new(RefSet::new(graph.vertex_store())),
        });
        graph.add_graph_listener(selection.clone());
        selection.selected.lock().insert(&a);
        selection.selected.lock().insert(&b);

        graph.remove_vertex(&a);
        assert!(!selection.selected.lock().contains(&a));
        assert!(selection.selected.lock().contains(&b));

        graph.clear();
        assert!(selection.selected.lock().is_empty());
    }
}
