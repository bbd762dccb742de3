use tracing::trace;

use crate::error::{GraphError, Result};
use crate::pool::{Pool, PoolId, PoolObject, Record};
use crate::primitives::mempool::MAX_SLOTS;

use super::adjacency::{self, Chain, Dir, IncidentEdges, NO_LINK};

/// Offset of the source vertex index (i32).
pub const SOURCE_INDEX_OFFSET: usize = 0;
/// Offset of the target vertex index (i32).
pub const TARGET_INDEX_OFFSET: usize = 4;
/// Offset of the next edge in the source's outgoing list (i32).
pub const NEXT_SOURCE_EDGE_INDEX_OFFSET: usize = 8;
/// Offset of the next edge in the target's incoming list (i32).
pub const NEXT_TARGET_EDGE_INDEX_OFFSET: usize = 12;
/// Size of the edge base fields; user edge fields start here.
pub const EDGE_BASE_SIZE: usize = 16;

/// Pool of edge records.
///
/// Edges only make sense next to the vertices they connect, so every
/// operation that touches incidence lists takes the vertex pool as an
/// argument. Normally it is reached through the
/// [`AbstractVertexPool`](super::AbstractVertexPool) it is linked to.
pub struct AbstractEdgePool<E: Record> {
    pool: Pool<E>,
    vertex_pool: Option<PoolId>,
}

impl<E: Record> AbstractEdgePool<E> {
    /// Creates an edge pool with room for `initial_capacity` edges.
    pub fn new(initial_capacity: usize) -> Result<Self> {
        Self::with_limit(initial_capacity, MAX_SLOTS)
    }

    /// Creates an edge pool holding at most `limit` edges.
    pub fn with_limit(initial_capacity: usize, limit: usize) -> Result<Self> {
        if E::SIZE_IN_BYTES < EDGE_BASE_SIZE {
            return Err(GraphError::InvalidLayout(format!(
                "edge record of {} bytes is smaller than the {EDGE_BASE_SIZE}-byte base",
                E::SIZE_IN_BYTES
            )));
        }
        Ok(Self {
            pool: Pool::with_limit(initial_capacity, limit)?,
            vertex_pool: None,
        })
    }

    /// The underlying record pool.
    pub fn pool(&self) -> &Pool<E> {
        &self.pool
    }

    pub(crate) fn pool_mut(&mut self) -> &mut Pool<E> {
        &mut self.pool
    }

    /// Vertex pool this edge pool was linked to, if any.
    pub fn linked_vertex_pool(&self) -> Option<PoolId> {
        self.vertex_pool
    }

    pub(crate) fn set_vertex_pool(&mut self, id: PoolId) {
        self.vertex_pool = Some(id);
    }

    /// Number of live edges.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether there are no live edges.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Borrows an unbound edge ref.
    pub fn create_ref(&self) -> PoolObject<E> {
        self.pool.create_ref()
    }

    /// Returns an edge ref to the idle queue.
    pub fn release_ref(&self, edge: PoolObject<E>) {
        self.pool.release_ref(edge);
    }

    /// Slot index of the source vertex of `edge`.
    #[inline]
    pub fn source_index(&self, edge: &PoolObject<E>) -> usize {
        self.pool.get_field::<i32>(edge, SOURCE_INDEX_OFFSET) as usize
    }

    /// Slot index of the target vertex of `edge`.
    #[inline]
    pub fn target_index(&self, edge: &PoolObject<E>) -> usize {
        self.pool.get_field::<i32>(edge, TARGET_INDEX_OFFSET) as usize
    }

    /// Creates an edge from `source` to `target` and binds `edge` to it.
    ///
    /// Both endpoints must be bound to live records of `vertices`. The new
    /// edge is appended to the source's outgoing and the target's incoming
    /// list.
    pub fn add_edge<'r, V: Record>(
        &mut self,
        vertices: &mut Pool<V>,
        source: &PoolObject<V>,
        target: &PoolObject<V>,
        edge: &'r mut PoolObject<E>,
    ) -> Result<&'r mut PoolObject<E>> {
        if self.vertex_pool.is_some_and(|id| id != vertices.id()) {
            return Err(GraphError::ForeignRef);
        }
        let s = live_endpoint(vertices, source)?;
        let t = live_endpoint(vertices, target)?;
        self.pool.create(edge)?;
        let e = edge.index();
        self.pool.set_field_at(e, SOURCE_INDEX_OFFSET, s as i32);
        self.pool.set_field_at(e, TARGET_INDEX_OFFSET, t as i32);
        adjacency::append(vertices, &mut self.pool, s, Chain::Out, e);
        adjacency::append(vertices, &mut self.pool, t, Chain::In, e);
        trace!(edge = e, source = s, target = t, "edge linked");
        Ok(edge)
    }

    /// Unlinks `edge` from both endpoints and frees it.
    pub fn release<V: Record>(&mut self, vertices: &mut Pool<V>, edge: &PoolObject<E>) -> bool {
        self.release_index(vertices, edge.index())
    }

    pub(crate) fn release_index<V: Record>(&mut self, vertices: &mut Pool<V>, e: usize) -> bool {
        if !self.pool.is_live(e) {
            return false;
        }
        let s: i32 = self.pool.field_at(e, SOURCE_INDEX_OFFSET);
        let t: i32 = self.pool.field_at(e, TARGET_INDEX_OFFSET);
        adjacency::unlink(vertices, &mut self.pool, s as usize, Chain::Out, e);
        adjacency::unlink(vertices, &mut self.pool, t as usize, Chain::In, e);
        trace!(edge = e, source = s, target = t, "edge unlinked");
        self.pool.delete(e)
    }

    /// Frees every edge incident to `vertex`, incoming and outgoing.
    ///
    /// Returns the number of edges freed. Afterwards no live edge refers to
    /// `vertex`.
    pub fn release_all_linked_edges<V: Record>(
        &mut self,
        vertices: &mut Pool<V>,
        vertex: &PoolObject<V>,
    ) -> usize {
        let v = vertex.index();
        let mut released = 0;
        for chain in [Chain::Out, Chain::In] {
            loop {
                let head: i32 = vertices.field_at(v, chain.head_offset());
                if head == NO_LINK {
                    break;
                }
                self.release_index(vertices, head as usize);
                released += 1;
            }
        }
        released
    }

    /// Binds `edge` to the first edge from `source` to `target`.
    ///
    /// Returns `false`, leaving `edge` untouched, when there is none.
    pub fn get_edge<V: Record>(
        &self,
        vertices: &Pool<V>,
        source: &PoolObject<V>,
        target: &PoolObject<V>,
        edge: &mut PoolObject<E>,
    ) -> bool {
        let t = target.index() as i32;
        let mut next: i32 = vertices.field_at(source.index(), Chain::Out.head_offset());
        while next != NO_LINK {
            let index = next as usize;
            if self.pool.field_at::<i32>(index, TARGET_INDEX_OFFSET) == t {
                self.pool.get_by_index(index, edge);
                return true;
            }
            next = self.pool.field_at(index, NEXT_SOURCE_EDGE_INDEX_OFFSET);
        }
        false
    }

    /// Edges incident to `vertex` in direction `dir`.
    pub fn incident_edges<'a, V: Record>(
        &'a self,
        vertices: &Pool<V>,
        vertex: &PoolObject<V>,
        dir: Dir,
    ) -> IncidentEdges<'a, E> {
        IncidentEdges::new(vertices, &self.pool, vertex, dir)
    }
}

fn live_endpoint<V: Record>(vertices: &Pool<V>, vertex: &PoolObject<V>) -> Result<usize> {
    if vertex.pool_id() != vertices.id() {
        return Err(GraphError::ForeignRef);
    }
    if !vertex.is_bound() {
        return Err(GraphError::DeadVertex { index: usize::MAX });
    }
    let index = vertex.index();
    if !vertices.is_live(index) {
        return Err(GraphError::DeadVertex { index });
    }
    Ok(index)
}
