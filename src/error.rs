//! Error type shared by pools, vertex/edge pools and the listenable graph.

use std::collections::TryReserveError;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors surfaced by pools and graphs.
///
/// Hot-path precondition violations (unbound refs, field offsets outside a
/// record) are not represented here; they are caller contracts checked only
/// by debug assertions.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The pool reached its configured slot limit.
    #[error("pool capacity exhausted: limit of {limit} slots reached")]
    CapacityExhausted {
        /// Maximum number of slots the pool may hold.
        limit: usize,
    },
    /// The allocator refused to grow the slab.
    #[error("slab allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
    /// An edge endpoint is not a live vertex.
    #[error("vertex {index} is not live")]
    DeadVertex {
        /// Slot index of the offending endpoint.
        index: usize,
    },
    /// A ref belonging to a different pool was supplied.
    #[error("ref belongs to a different pool")]
    ForeignRef,
    /// Edge operation requested on a vertex pool without a linked edge pool.
    #[error("no edge pool linked to this vertex pool")]
    EdgePoolNotLinked,
    /// A record layout is too small to hold its base fields.
    #[error("invalid record layout: {0}")]
    InvalidLayout(String),
}
