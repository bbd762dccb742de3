use super::ListenableGraph;
use crate::error::Result;
use crate::pool::{PoolObject, Record};
use crate::storage::adjacency::Dir;

impl<V: Record, E: Record> ListenableGraph<V, E> {
    /// Adds an edge from `source` to `target`, bound to a freshly borrowed
    /// ref.
    pub fn add_edge(&mut self, source: &PoolObject<V>, target: &PoolObject<V>) -> Result<PoolObject<E>> {
        let mut edge = self.edge_ref();
        match self.add_edge_into(source, target, &mut edge) {
            Ok(_) => Ok(edge),
            Err(err) => {
                self.release_edge_ref(edge);
                Err(err)
            }
        }
    }

    /// Adds an edge from `source` to `target` and binds `edge` to it.
    ///
    /// Fails with [`GraphError::DeadVertex`](crate::GraphError::DeadVertex)
    /// if an endpoint is not live; nothing is created in that case.
    pub fn add_edge_into<'r>(
        &mut self,
        source: &PoolObject<V>,
        target: &PoolObject<V>,
        edge: &'r mut PoolObject<E>,
    ) -> Result<&'r mut PoolObject<E>> {
        self.vertices.add_edge(source, target, edge)?;
        self.metrics.edge_created();
        if self.record_edit() {
            let edge = &*edge;
            self.notify(|listener| listener.edge_added(self, edge));
        }
        Ok(edge)
    }

    /// Removes `edge`. Listeners hear `edge_removed` before it is freed.
    ///
    /// Returns `false` if `edge` is not a live edge of this graph.
    pub fn remove_edge(&mut self, edge: &PoolObject<E>) -> bool {
        if !self.contains_edge(edge) {
            return false;
        }
        if self.record_edit() {
            self.notify(|listener| listener.edge_removed(self, edge));
        }
        let removed = self.vertices.release_edge(edge);
        if removed {
            self.metrics.edge_deleted();
        }
        removed
    }

    /// Removes every edge incident to `vertex`, keeping the vertex.
    ///
    /// Returns the number of edges removed.
    pub fn remove_all_linked_edges(&mut self, vertex: &PoolObject<V>) -> usize {
        if !self.contains_vertex(vertex) {
            return 0;
        }
        if self.record_edit() {
            for edge in self.vertices.incident_edges(vertex, Dir::Both) {
                self.notify(|listener| listener.edge_removed(self, &edge));
            }
        }
        let released = self.vertices.release_all_linked_edges(vertex);
        for _ in 0..released {
            self.metrics.edge_deleted();
        }
        released
    }
}
