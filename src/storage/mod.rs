//! Graph storage engine.
//!
//! Vertex and edge records live in pools; incidence is threaded through the
//! records themselves as intrusive linked lists, so traversal and cascade
//! deletion touch no side tables. [`ListenableGraph`] adds listener
//! notification with a pause gate for bulk edits.

mod adjacency;
mod edge;
mod graph;
mod metrics;
mod options;
mod vertex;

/// Graph traversal and incidence iteration.
pub use adjacency::{Dir, IncidentEdges, NO_LINK};

/// Edge pool and edge record layout.
pub use edge::{
    AbstractEdgePool, EDGE_BASE_SIZE, NEXT_SOURCE_EDGE_INDEX_OFFSET,
    NEXT_TARGET_EDGE_INDEX_OFFSET, SOURCE_INDEX_OFFSET, TARGET_INDEX_OFFSET,
};

/// Listenable graph and its listener contracts.
pub use graph::{GraphChangeListener, GraphListener, ListenableGraph, Listeners};

/// Storage metrics collection and monitoring.
pub use metrics::{default_metrics, CounterMetrics, NoopMetrics, StorageMetrics};

/// Graph configuration.
pub use options::{GraphOptions, DEFAULT_EDGE_CAPACITY, DEFAULT_VERTEX_CAPACITY};

/// Vertex pool and vertex record layout.
pub use vertex::{
    AbstractVertexPool, FIRST_IN_EDGE_INDEX_OFFSET, FIRST_OUT_EDGE_INDEX_OFFSET, VERTEX_BASE_SIZE,
};
