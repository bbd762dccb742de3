use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking structural changes made through a
/// [`ListenableGraph`](super::ListenableGraph).
///
/// Unlike listeners, metrics observe every change whether or not listener
/// emission is paused.
pub trait StorageMetrics: Send + Sync {
    /// Records the creation of a vertex.
    fn vertex_created(&self);

    /// Records the deletion of a vertex.
    fn vertex_deleted(&self);

    /// Records the creation of an edge.
    fn edge_created(&self);

    /// Records the deletion of an edge, including cascaded deletions.
    fn edge_deleted(&self);

    /// Records a `graph_rebuilt` broadcast.
    ///
    /// # Parameters
    /// * `cause` - `"resume"` when emitted by resuming listeners, `"clear"` when
    ///   emitted by clearing the graph.
    fn graph_rebuilt(&self, cause: &'static str);
}

/// A no-op implementation of [`StorageMetrics`] that discards all recorded metrics.
#[derive(Default)]
pub struct NoopMetrics;

impl StorageMetrics for NoopMetrics {
    fn vertex_created(&self) {}
    fn vertex_deleted(&self) {}
    fn edge_created(&self) {}
    fn edge_deleted(&self) {}
    fn graph_rebuilt(&self, _cause: &'static str) {}
}

/// A thread-safe counter-based implementation of [`StorageMetrics`].
///
/// All counters use relaxed atomics and can be read from any thread while
/// the graph is being edited.
#[derive(Default)]
pub struct CounterMetrics {
    /// Number of vertices created.
    pub vertices_created: AtomicU64,

    /// Number of vertices deleted.
    pub vertices_deleted: AtomicU64,

    /// Number of edges created.
    pub edges_created: AtomicU64,

    /// Number of edges deleted.
    pub edges_deleted: AtomicU64,

    /// Number of rebuild broadcasts caused by resuming listeners.
    pub rebuilds_on_resume: AtomicU64,

    /// Number of rebuild broadcasts caused by clearing the graph.
    pub rebuilds_on_clear: AtomicU64,
}

impl CounterMetrics {
    /// Vertices currently alive according to the counters.
    ///
    /// Read concurrently with edits this is a snapshot that may lag; it never
    /// goes below zero.
    pub fn live_vertices(&self) -> u64 {
        live(&self.vertices_created, &self.vertices_deleted)
    }

    /// Edges currently alive according to the counters.
    pub fn live_edges(&self) -> u64 {
        live(&self.edges_created, &self.edges_deleted)
    }
}

fn live(created: &AtomicU64, deleted: &AtomicU64) -> u64 {
    // Deletions first: both counters only grow.
    let deleted = deleted.load(Ordering::Relaxed);
    created.load(Ordering::Relaxed).saturating_sub(deleted)
}

impl StorageMetrics for CounterMetrics {
    fn vertex_created(&self) {
        self.vertices_created.fetch_add(1, Ordering::Relaxed);
    }

    fn vertex_deleted(&self) {
        self.vertices_deleted.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_created(&self) {
        self.edges_created.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_deleted(&self) {
        self.edges_deleted.fetch_add(1, Ordering::Relaxed);
    }

    fn graph_rebuilt(&self, cause: &'static str) {
        match cause {
            "resume" => {
                self.rebuilds_on_resume.fetch_add(1, Ordering::Relaxed);
            }
            "clear" => {
                self.rebuilds_on_clear.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}

/// Returns the default metrics implementation wrapped in an [`Arc`].
///
/// The default implementation is [`NoopMetrics`], which discards everything.
pub fn default_metrics() -> Arc<dyn StorageMetrics> {
    Arc::new(NoopMetrics)
}
