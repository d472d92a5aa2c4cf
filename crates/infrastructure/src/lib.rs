//! Ferrous Cache Infrastructure Layer
//!
//! In-memory implementations of the eviction ports and the `DiskCache`
//! backend that wires them to the eviction policy.
pub mod cache;
