use crate::cache_entry::{CacheAddr, EntryState};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    #[error("Entry already exists: {0}")]
    EntryExists(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("No entry at address {0}")]
    AddressNotFound(CacheAddr),

    #[error("Entry at {addr} is {state}, expected a live entry")]
    InvalidState { addr: CacheAddr, state: EntryState },

    #[error("Cache is disabled")]
    Disabled,
}
