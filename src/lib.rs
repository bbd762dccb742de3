//! Poolgraph: pooled, flyweight graph storage.
//!
//! Vertices and edges are fixed-size records in growable slabs, addressed by
//! slot index. Callers view them through reusable [`PoolObject`] refs that
//! are borrowed from and returned to their pool instead of being allocated
//! per access.

#![warn(missing_docs)]

pub mod collection;
pub mod error;
pub mod pool;
pub mod primitives;
pub mod storage;

pub use collection::{RefList, RefSet};
pub use error::{GraphError, Result};
pub use pool::{GraphIdBimap, IdBimap, Pool, PoolId, PoolObject, PoolObjectIdBimap, Record};
pub use primitives::concurrency::SharedGraph;
pub use primitives::mempool::{FieldValue, RecordKind};
pub use storage::{
    AbstractEdgePool, AbstractVertexPool, Dir, GraphChangeListener, GraphListener, GraphOptions,
    ListenableGraph,
};
