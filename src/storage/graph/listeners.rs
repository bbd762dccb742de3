use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::pool::{PoolObject, Record};

use super::{Emission, ListenableGraph};

/// Receives per-element edit notifications from a [`ListenableGraph`].
///
/// Callbacks run synchronously on the editing thread, in registration order,
/// before the triggering call returns. Removal callbacks run while the
/// element is still live, so its fields can be read through `graph`.
pub trait GraphListener<V: Record, E: Record>: Send + Sync {
    /// The graph changed wholesale: bulk load finished or the graph was
    /// cleared. Previously seen elements may be gone.
    fn graph_rebuilt(&self, _graph: &ListenableGraph<V, E>) {}

    /// A vertex was added.
    fn vertex_added(&self, _graph: &ListenableGraph<V, E>, _vertex: &PoolObject<V>) {}

    /// A vertex is about to be removed. Its edges were reported first.
    fn vertex_removed(&self, _graph: &ListenableGraph<V, E>, _vertex: &PoolObject<V>) {}

    /// An edge was added.
    fn edge_added(&self, _graph: &ListenableGraph<V, E>, _edge: &PoolObject<E>) {}

    /// An edge is about to be removed.
    fn edge_removed(&self, _graph: &ListenableGraph<V, E>, _edge: &PoolObject<E>) {}
}

/// Coarse "something changed" signal, e.g. to schedule a repaint.
pub trait GraphChangeListener: Send + Sync {
    /// The graph changed.
    fn graph_changed(&self);
}

impl<F: Fn() + Send + Sync> GraphChangeListener for F {
    fn graph_changed(&self) {
        self()
    }
}

/// Copy-on-write listener registry.
///
/// Notification works on a snapshot, so listeners may register or
/// unregister from inside a callback; the change applies from the next
/// notification on. Listener identity is the `Arc` allocation.
pub struct Listeners<L: ?Sized> {
    entries: RwLock<Arc<Vec<Arc<L>>>>,
}

impl<L: ?Sized> Listeners<L> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Registers `listener`; returns `false` if it is already registered.
    pub fn add(&self, listener: Arc<L>) -> bool {
        let mut entries = self.entries.write();
        if entries.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        Arc::make_mut(&mut *entries).push(listener);
        true
    }

    /// Unregisters `listener`; returns whether it was registered.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(at) => {
                Arc::make_mut(&mut *entries).remove(at);
                true
            }
            None => false,
        }
    }

    /// Current listeners in registration order.
    pub fn snapshot(&self) -> Arc<Vec<Arc<L>>> {
        Arc::clone(&*self.entries.read())
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Record, E: Record> ListenableGraph<V, E> {
    /// Registers a graph listener; returns `false` if already registered.
    pub fn add_graph_listener(&self, listener: Arc<dyn GraphListener<V, E>>) -> bool {
        self.listeners.add(listener)
    }

    /// Unregisters a graph listener; returns whether it was registered.
    pub fn remove_graph_listener(&self, listener: &Arc<dyn GraphListener<V, E>>) -> bool {
        self.listeners.remove(listener)
    }

    /// Registers a change listener; returns `false` if already registered.
    pub fn add_graph_change_listener(&self, listener: Arc<dyn GraphChangeListener>) -> bool {
        self.change_listeners.add(listener)
    }

    /// Unregisters a change listener; returns whether it was registered.
    pub fn remove_graph_change_listener(&self, listener: &Arc<dyn GraphChangeListener>) -> bool {
        self.change_listeners.remove(listener)
    }

    /// Stops per-edit notifications until [`Self::resume_listeners`].
    ///
    /// Edits still apply. Pausing while paused keeps the current count of
    /// suppressed edits.
    pub fn pause_listeners(&mut self) {
        if self.emission == Emission::Emitting {
            debug!("graph listeners paused");
            self.emission = Emission::Paused { edits: 0 };
        }
    }

    /// Restarts notifications and sends exactly one `graph_rebuilt` to every
    /// graph listener, however many edits happened while paused.
    pub fn resume_listeners(&mut self) {
        let emission = self.emission;
        match emission {
            Emission::Emitting => {
                warn!("resume_listeners called while already emitting");
            }
            Emission::Paused { edits } => {
                debug!(edits, "graph listeners resumed");
                self.emission = Emission::Emitting;
                self.broadcast_rebuilt("resume");
            }
        }
    }

    /// Whether per-edit notifications are currently sent.
    pub fn is_emitting(&self) -> bool {
        self.emission == Emission::Emitting
    }

    /// Edits applied since the last pause, or `None` while emitting.
    pub fn paused_edits(&self) -> Option<usize> {
        match self.emission {
            Emission::Emitting => None,
            Emission::Paused { edits } => Some(edits),
        }
    }

    /// Sends `graph_changed` to every change listener unless paused.
    pub fn notify_graph_changed(&self) {
        if !self.is_emitting() {
            return;
        }
        for listener in self.change_listeners.snapshot().iter() {
            listener.graph_changed();
        }
    }
}
