use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::pool::{GraphIdBimap, Pool, PoolObject, PoolObjectIdBimap, PoolIter, Record};
use crate::primitives::concurrency::SharedGraph;
use crate::primitives::mempool::FieldValue;

use super::adjacency::{Dir, IncidentEdges};
use super::edge::{AbstractEdgePool, EDGE_BASE_SIZE};
use super::metrics::{default_metrics, StorageMetrics};
use super::options::GraphOptions;
use super::vertex::{AbstractVertexPool, VERTEX_BASE_SIZE};

mod edge_ops;
mod listeners;
mod vertex_ops;

pub use listeners::{GraphChangeListener, GraphListener, Listeners};

/// Whether edits are currently reported to listeners.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Emission {
    Emitting,
    Paused { edits: usize },
}

/// A vertex pool with its linked edge pool, plus listener notification.
///
/// Structural edits go through `&mut self`; listeners receive the graph by
/// shared reference together with the affected element. Wrap the graph in a
/// [`SharedGraph`] to share it between an editing thread and readers.
pub struct ListenableGraph<V: Record, E: Record> {
    vertices: AbstractVertexPool<V, E>,
    listeners: Listeners<dyn GraphListener<V, E>>,
    change_listeners: Listeners<dyn GraphChangeListener>,
    emission: Emission,
    metrics: Arc<dyn StorageMetrics>,
}

impl<V: Record, E: Record> ListenableGraph<V, E> {
    /// Creates an empty graph.
    pub fn new(options: GraphOptions) -> Result<Self> {
        let mut vertices =
            AbstractVertexPool::with_limit(options.initial_vertex_capacity, options.max_vertices)?;
        let edges = AbstractEdgePool::with_limit(options.initial_edge_capacity, options.max_edges)?;
        vertices.link_edge_pool(edges);
        debug!(?options, "graph created");
        Ok(Self {
            vertices,
            listeners: Listeners::new(),
            change_listeners: Listeners::new(),
            emission: Emission::Emitting,
            metrics: options.metrics.unwrap_or_else(default_metrics),
        })
    }

    /// The vertex pool, with the edge pool linked to it.
    pub fn vertex_pool(&self) -> &AbstractVertexPool<V, E> {
        &self.vertices
    }

    /// Vertex records.
    pub fn vertex_store(&self) -> &Pool<V> {
        self.vertices.pool()
    }

    /// Edge records.
    pub fn edge_store(&self) -> &Pool<E> {
        self.edge_pool().pool()
    }

    fn edge_pool(&self) -> &AbstractEdgePool<E> {
        match self.vertices.edge_pool() {
            Some(edges) => edges,
            None => unreachable!("graph edge pool is linked on construction"),
        }
    }

    /// Borrows an unbound vertex ref.
    pub fn vertex_ref(&self) -> PoolObject<V> {
        self.vertices.create_ref()
    }

    /// Borrows an unbound edge ref.
    pub fn edge_ref(&self) -> PoolObject<E> {
        self.edge_pool().create_ref()
    }

    /// Returns a vertex ref to the idle queue.
    pub fn release_vertex_ref(&self, vertex: PoolObject<V>) {
        self.vertices.release_ref(vertex);
    }

    /// Returns an edge ref to the idle queue.
    pub fn release_edge_ref(&self, edge: PoolObject<E>) {
        self.edge_pool().release_ref(edge);
    }

    /// Number of live vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edge_pool().len()
    }

    /// Live vertices. Each call is a fresh, finite traversal.
    pub fn vertices(&self) -> PoolIter<'_, V> {
        self.vertex_store().iter()
    }

    /// Live edges. Each call is a fresh, finite traversal.
    pub fn edges(&self) -> PoolIter<'_, E> {
        self.edge_store().iter()
    }

    /// Whether `vertex` is bound to a live vertex of this graph.
    pub fn contains_vertex(&self, vertex: &PoolObject<V>) -> bool {
        self.vertex_store().contains(vertex)
    }

    /// Whether `edge` is bound to a live edge of this graph.
    pub fn contains_edge(&self, edge: &PoolObject<E>) -> bool {
        self.edge_store().contains(edge)
    }

    /// Id mapping for vertices.
    pub fn vertex_id_bimap(&self) -> PoolObjectIdBimap<'_, V> {
        PoolObjectIdBimap::new(self.vertex_store())
    }

    /// Id mapping for edges.
    pub fn edge_id_bimap(&self) -> PoolObjectIdBimap<'_, E> {
        PoolObjectIdBimap::new(self.edge_store())
    }

    /// Both id mappings, as handed to a serializer.
    pub fn id_bimap(&self) -> GraphIdBimap<'_, V, E> {
        GraphIdBimap::new(self.vertex_store(), self.edge_store())
    }

    /// Reads a user field of `vertex`. `offset` is relative to the record
    /// start and must lie past the vertex base fields.
    #[inline]
    pub fn vertex_field<T: FieldValue>(&self, vertex: &PoolObject<V>, offset: usize) -> T {
        debug_assert!(offset >= VERTEX_BASE_SIZE, "offset overlaps vertex base fields");
        self.vertex_store().get_field(vertex, offset)
    }

    /// Writes a user field of `vertex`.
    #[inline]
    pub fn set_vertex_field<T: FieldValue>(&mut self, vertex: &PoolObject<V>, offset: usize, value: T) {
        debug_assert!(offset >= VERTEX_BASE_SIZE, "offset overlaps vertex base fields");
        self.vertices.pool_mut().set_field(vertex, offset, value);
    }

    /// Reads a user field of `edge`.
    #[inline]
    pub fn edge_field<T: FieldValue>(&self, edge: &PoolObject<E>, offset: usize) -> T {
        debug_assert!(offset >= EDGE_BASE_SIZE, "offset overlaps edge base fields");
        self.edge_store().get_field(edge, offset)
    }

    /// Writes a user field of `edge`.
    #[inline]
    pub fn set_edge_field<T: FieldValue>(&mut self, edge: &PoolObject<E>, offset: usize, value: T) {
        debug_assert!(offset >= EDGE_BASE_SIZE, "offset overlaps edge base fields");
        if let (_, Some(edges)) = self.vertices.split_mut() {
            edges.pool_mut().set_field(edge, offset, value);
        }
    }

    /// Binds `edge` to the first edge from `source` to `target`.
    pub fn get_edge(
        &self,
        source: &PoolObject<V>,
        target: &PoolObject<V>,
        edge: &mut PoolObject<E>,
    ) -> bool {
        self.vertices.get_edge(source, target, edge)
    }

    /// Binds `vertex` to the source of `edge`.
    pub fn edge_source<'r>(
        &self,
        edge: &PoolObject<E>,
        vertex: &'r mut PoolObject<V>,
    ) -> &'r mut PoolObject<V> {
        self.vertex_store()
            .get_by_index(self.edge_pool().source_index(edge), vertex)
    }

    /// Binds `vertex` to the target of `edge`.
    pub fn edge_target<'r>(
        &self,
        edge: &PoolObject<E>,
        vertex: &'r mut PoolObject<V>,
    ) -> &'r mut PoolObject<V> {
        self.vertex_store()
            .get_by_index(self.edge_pool().target_index(edge), vertex)
    }

    /// Edges leaving `vertex`, in insertion order.
    pub fn outgoing_edges(&self, vertex: &PoolObject<V>) -> IncidentEdges<'_, E> {
        self.vertices.incident_edges(vertex, Dir::Out)
    }

    /// Edges entering `vertex`, in insertion order.
    pub fn incoming_edges(&self, vertex: &PoolObject<V>) -> IncidentEdges<'_, E> {
        self.vertices.incident_edges(vertex, Dir::In)
    }

    /// Edges touching `vertex` in direction `dir`; self-loops appear once.
    pub fn edges_of(&self, vertex: &PoolObject<V>, dir: Dir) -> IncidentEdges<'_, E> {
        self.vertices.incident_edges(vertex, dir)
    }

    /// Removes every vertex and edge.
    ///
    /// No per-element callbacks fire. While emitting, listeners receive one
    /// `graph_rebuilt`; while paused the clear counts as an edit.
    pub fn clear(&mut self) {
        debug!(
            vertices = self.vertex_count(),
            edges = self.edge_count(),
            "graph cleared"
        );
        self.vertices.clear();
        if self.record_edit() {
            self.broadcast_rebuilt("clear");
        }
    }

    /// Moves the graph behind a shared reader/writer lock.
    pub fn into_shared(self) -> SharedGraph<Self> {
        SharedGraph::new(self)
    }

    /// Returns `true` if listeners should hear about the edit, otherwise
    /// counts it against the current pause.
    fn record_edit(&mut self) -> bool {
        match &mut self.emission {
            Emission::Emitting => true,
            Emission::Paused { edits } => {
                *edits += 1;
                false
            }
        }
    }

    fn notify(&self, mut f: impl FnMut(&dyn GraphListener<V, E>)) {
        let snapshot = self.listeners.snapshot();
        for listener in snapshot.iter() {
            f(listener.as_ref());
        }
    }

    fn broadcast_rebuilt(&self, cause: &'static str) {
        self.metrics.graph_rebuilt(cause);
        self.notify(|listener| listener.graph_rebuilt(self));
    }
}

impl<V: Record, E: Record> std::fmt::Debug for ListenableGraph<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenableGraph")
            .field("vertices", &self.vertex_count())
            .field("edges", &self.edge_count())
            .field("listeners", &self.listeners.len())
            .field("change_listeners", &self.change_listeners.len())
            .field("emission", &self.emission)
            .finish()
    }
}
