mod shared_cache;

pub use shared_cache::*;
