use tracing::trace;

use super::ListenableGraph;
use crate::error::Result;
use crate::pool::{PoolObject, Record};
use crate::storage::adjacency::Dir;

impl<V: Record, E: Record> ListenableGraph<V, E> {
    /// Adds a vertex bound to a freshly borrowed ref.
    ///
    /// The ref should eventually go back through
    /// [`Self::release_vertex_ref`].
    pub fn add_vertex(&mut self) -> Result<PoolObject<V>> {
        let mut vertex = self.vertex_ref();
        match self.add_vertex_into(&mut vertex) {
            Ok(_) => Ok(vertex),
            Err(err) => {
                self.release_vertex_ref(vertex);
                Err(err)
            }
        }
    }

    /// Adds a vertex and binds `vertex` to it.
    pub fn add_vertex_into<'r>(
        &mut self,
        vertex: &'r mut PoolObject<V>,
    ) -> Result<&'r mut PoolObject<V>> {
        self.vertices.create(vertex)?;
        self.metrics.vertex_created();
        if self.record_edit() {
            let vertex = &*vertex;
            self.notify(|listener| listener.vertex_added(self, vertex));
        }
        Ok(vertex)
    }

    /// Removes `vertex` together with every incident edge.
    ///
    /// While emitting, listeners hear `edge_removed` for each incident edge
    /// and then `vertex_removed`, all before anything is freed. Returns
    /// `false` if `vertex` is not a live vertex of this graph.
    pub fn remove_vertex(&mut self, vertex: &PoolObject<V>) -> bool {
        if !self.contains_vertex(vertex) {
            return false;
        }
        if self.record_edit() {
            for edge in self.vertices.incident_edges(vertex, Dir::Both) {
                self.notify(|listener| listener.edge_removed(self, &edge));
            }
            self.notify(|listener| listener.vertex_removed(self, vertex));
        }
        let released = self.vertices.release_all_linked_edges(vertex);
        for _ in 0..released {
            self.metrics.edge_deleted();
        }
        let removed = self.vertices.release(vertex);
        if removed {
            self.metrics.vertex_deleted();
        }
        trace!(vertex = vertex.index(), edges = released, "vertex removed");
        removed
    }
}
