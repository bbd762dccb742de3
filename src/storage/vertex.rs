use tracing::debug;

use crate::error::{GraphError, Result};
use crate::pool::{Pool, PoolObject, Record};
use crate::primitives::mempool::MAX_SLOTS;

use super::adjacency::{Dir, IncidentEdges, NO_LINK};
use super::edge::AbstractEdgePool;

/// Offset of the first incoming edge index (i32).
pub const FIRST_IN_EDGE_INDEX_OFFSET: usize = 0;
/// Offset of the first outgoing edge index (i32).
pub const FIRST_OUT_EDGE_INDEX_OFFSET: usize = 4;
/// Size of the vertex base fields; user vertex fields start here.
pub const VERTEX_BASE_SIZE: usize = 8;

/// Pool of vertex records, optionally linked to the edge pool holding the
/// edges between them.
///
/// Linking hands ownership of the edge pool to the vertex pool. From then on
/// releasing a vertex first releases every incident edge, so an edge never
/// outlives one of its endpoints.
pub struct AbstractVertexPool<V: Record, E: Record> {
    pool: Pool<V>,
    edge_pool: Option<AbstractEdgePool<E>>,
}

impl<V: Record, E: Record> AbstractVertexPool<V, E> {
    /// Creates an unlinked vertex pool with room for `initial_capacity`
    /// vertices.
    pub fn new(initial_capacity: usize) -> Result<Self> {
        Self::with_limit(initial_capacity, MAX_SLOTS)
    }

    /// Creates an unlinked vertex pool holding at most `limit` vertices.
    pub fn with_limit(initial_capacity: usize, limit: usize) -> Result<Self> {
        if V::SIZE_IN_BYTES < VERTEX_BASE_SIZE {
            return Err(GraphError::InvalidLayout(format!(
                "vertex record of {} bytes is smaller than the {VERTEX_BASE_SIZE}-byte base",
                V::SIZE_IN_BYTES
            )));
        }
        Ok(Self {
            pool: Pool::with_limit(initial_capacity, limit)?,
            edge_pool: None,
        })
    }

    /// Links `edges` as the companion edge pool, returning the previously
    /// linked one.
    ///
    /// `edges` must not hold edges yet: existing ones would refer to another
    /// vertex pool. Every live vertex starts over with empty incidence lists,
    /// since its old list heads index into the pool being replaced.
    pub fn link_edge_pool(&mut self, mut edges: AbstractEdgePool<E>) -> Option<AbstractEdgePool<E>> {
        debug_assert!(edges.is_empty(), "linking an edge pool that already holds edges");
        edges.set_vertex_pool(self.pool.id());
        let live: Vec<usize> = self.pool.indices().collect();
        for &index in &live {
            self.pool.set_field_at(index, FIRST_IN_EDGE_INDEX_OFFSET, NO_LINK);
            self.pool.set_field_at(index, FIRST_OUT_EDGE_INDEX_OFFSET, NO_LINK);
        }
        if !live.is_empty() {
            debug!(vertices = live.len(), "incidence lists reset for new edge pool");
        }
        debug!(vertices = %self.pool.id(), edges = %edges.pool().id(), "edge pool linked");
        self.edge_pool.replace(edges)
    }

    /// The linked edge pool, if any.
    pub fn edge_pool(&self) -> Option<&AbstractEdgePool<E>> {
        self.edge_pool.as_ref()
    }

    /// The underlying record pool.
    pub fn pool(&self) -> &Pool<V> {
        &self.pool
    }

    pub(crate) fn pool_mut(&mut self) -> &mut Pool<V> {
        &mut self.pool
    }

    /// Number of live vertices.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether there are no live vertices.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Borrows an unbound vertex ref.
    pub fn create_ref(&self) -> PoolObject<V> {
        self.pool.create_ref()
    }

    /// Returns a vertex ref to the idle queue.
    pub fn release_ref(&self, vertex: PoolObject<V>) {
        self.pool.release_ref(vertex);
    }

    /// Allocates a vertex with empty incidence lists and binds `vertex` to it.
    pub fn create<'r>(&mut self, vertex: &'r mut PoolObject<V>) -> Result<&'r mut PoolObject<V>> {
        self.pool.create(vertex)?;
        self.pool.set_field(vertex, FIRST_IN_EDGE_INDEX_OFFSET, NO_LINK);
        self.pool.set_field(vertex, FIRST_OUT_EDGE_INDEX_OFFSET, NO_LINK);
        Ok(vertex)
    }

    /// Releases every incident edge, then frees the vertex.
    ///
    /// Returns `false` if the vertex was already free.
    pub fn release(&mut self, vertex: &PoolObject<V>) -> bool {
        if !self.pool.is_live(vertex.index()) {
            return false;
        }
        if let Some(edges) = self.edge_pool.as_mut() {
            edges.release_all_linked_edges(&mut self.pool, vertex);
        }
        self.pool.release(vertex)
    }

    /// Index of the first incoming edge, or `-1`.
    pub fn first_in_edge_index(&self, vertex: &PoolObject<V>) -> i32 {
        self.pool.get_field(vertex, FIRST_IN_EDGE_INDEX_OFFSET)
    }

    /// Index of the first outgoing edge, or `-1`.
    pub fn first_out_edge_index(&self, vertex: &PoolObject<V>) -> i32 {
        self.pool.get_field(vertex, FIRST_OUT_EDGE_INDEX_OFFSET)
    }

    /// Creates an edge from `source` to `target` in the linked edge pool.
    pub fn add_edge<'r>(
        &mut self,
        source: &PoolObject<V>,
        target: &PoolObject<V>,
        edge: &'r mut PoolObject<E>,
    ) -> Result<&'r mut PoolObject<E>> {
        let edges = self.edge_pool.as_mut().ok_or(GraphError::EdgePoolNotLinked)?;
        edges.add_edge(&mut self.pool, source, target, edge)
    }

    /// Unlinks and frees `edge`.
    pub fn release_edge(&mut self, edge: &PoolObject<E>) -> bool {
        match self.edge_pool.as_mut() {
            Some(edges) => edges.release(&mut self.pool, edge),
            None => false,
        }
    }

    /// Frees every edge incident to `vertex`, keeping the vertex.
    pub fn release_all_linked_edges(&mut self, vertex: &PoolObject<V>) -> usize {
        match self.edge_pool.as_mut() {
            Some(edges) => edges.release_all_linked_edges(&mut self.pool, vertex),
            None => 0,
        }
    }

    /// Binds `edge` to the first edge from `source` to `target`.
    pub fn get_edge(
        &self,
        source: &PoolObject<V>,
        target: &PoolObject<V>,
        edge: &mut PoolObject<E>,
    ) -> bool {
        match self.edge_pool.as_ref() {
            Some(edges) => edges.get_edge(&self.pool, source, target, edge),
            None => false,
        }
    }

    /// Edges incident to `vertex` in direction `dir`.
    pub fn incident_edges(&self, vertex: &PoolObject<V>, dir: Dir) -> IncidentEdges<'_, E> {
        match self.edge_pool.as_ref() {
            Some(edges) => edges.incident_edges(&self.pool, vertex, dir),
            None => IncidentEdges::empty(dir),
        }
    }

    /// Number of edges incident to `vertex` in direction `dir`.
    pub fn degree(&self, vertex: &PoolObject<V>, dir: Dir) -> usize {
        self.incident_edges(vertex, dir).count()
    }

    /// Binds `vertex` to the source of `edge`.
    pub fn edge_source<'r>(
        &self,
        edge: &PoolObject<E>,
        vertex: &'r mut PoolObject<V>,
    ) -> Result<&'r mut PoolObject<V>> {
        let edges = self.edge_pool.as_ref().ok_or(GraphError::EdgePoolNotLinked)?;
        Ok(self.pool.get_by_index(edges.source_index(edge), vertex))
    }

    /// Binds `vertex` to the target of `edge`.
    pub fn edge_target<'r>(
        &self,
        edge: &PoolObject<E>,
        vertex: &'r mut PoolObject<V>,
    ) -> Result<&'r mut PoolObject<V>> {
        let edges = self.edge_pool.as_ref().ok_or(GraphError::EdgePoolNotLinked)?;
        Ok(self.pool.get_by_index(edges.target_index(edge), vertex))
    }

    /// Frees every vertex and every linked edge.
    pub fn clear(&mut self) {
        if let Some(edges) = self.edge_pool.as_mut() {
            edges.pool_mut().clear();
        }
        self.pool.clear();
    }

    pub(crate) fn split_mut(&mut self) -> (&mut Pool<V>, Option<&mut AbstractEdgePool<E>>) {
        (&mut self.pool, self.edge_pool.as_mut())
    }
}
