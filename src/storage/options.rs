use std::sync::Arc;

use crate::primitives::mempool::MAX_SLOTS;

use super::metrics::StorageMetrics;

/// Default number of vertex slots reserved up front.
pub const DEFAULT_VERTEX_CAPACITY: usize = 1024;
/// Default number of edge slots reserved up front.
pub const DEFAULT_EDGE_CAPACITY: usize = 1024;

/// Configuration options supplied when creating a [`super::ListenableGraph`].
#[derive(Clone)]
pub struct GraphOptions {
    /// Vertex slots reserved when the graph is created.
    pub initial_vertex_capacity: usize,
    /// Edge slots reserved when the graph is created.
    pub initial_edge_capacity: usize,
    /// Hard cap on vertex slots; creation beyond it fails.
    pub max_vertices: usize,
    /// Hard cap on edge slots; creation beyond it fails.
    pub max_edges: usize,
    /// Optional metrics collection implementation
    pub metrics: Option<Arc<dyn StorageMetrics>>,
}

impl GraphOptions {
    /// Creates a new GraphOptions with default settings.
    pub fn new() -> Self {
        Self {
            initial_vertex_capacity: DEFAULT_VERTEX_CAPACITY,
            initial_edge_capacity: DEFAULT_EDGE_CAPACITY,
            max_vertices: MAX_SLOTS,
            max_edges: MAX_SLOTS,
            metrics: None,
        }
    }

    /// Sets the number of vertex slots reserved up front.
    pub fn initial_vertex_capacity(mut self, slots: usize) -> Self {
        self.initial_vertex_capacity = slots;
        self
    }

    /// Sets the number of edge slots reserved up front.
    pub fn initial_edge_capacity(mut self, slots: usize) -> Self {
        self.initial_edge_capacity = slots;
        self
    }

    /// Caps the number of vertex slots. Values above the link range are
    /// clamped to it.
    pub fn max_vertices(mut self, slots: usize) -> Self {
        self.max_vertices = slots.min(MAX_SLOTS);
        self
    }

    /// Caps the number of edge slots. Values above the link range are
    /// clamped to it.
    pub fn max_edges(mut self, slots: usize) -> Self {
        self.max_edges = slots.min(MAX_SLOTS);
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn StorageMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphOptions")
            .field("initial_vertex_capacity", &self.initial_vertex_capacity)
            .field("initial_edge_capacity", &self.initial_edge_capacity)
            .field("max_vertices", &self.max_vertices)
            .field("max_edges", &self.max_edges)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}
