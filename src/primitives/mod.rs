//! Low-level primitives for building the storage engine.
//!
//! Includes the record slab and the concurrency controls shared by pools and
//! graphs.

/// Concurrency primitives and synchronization.
///
/// Lock-free ref recycling and the graph-wide reader/writer lock.
pub mod concurrency;

/// Growable slab of fixed-size records.
///
/// Slot allocation, the free-index stack, and typed field access.
pub mod mempool;
