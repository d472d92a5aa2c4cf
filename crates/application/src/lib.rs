//! Ferrous Cache Application Layer
//!
//! Ports for the collaborators the eviction engine borrows from the backing
//! store, and the eviction policy service itself.
pub mod ports;
pub mod services;
