pub mod clock;
pub mod disk_cache;
pub mod rankings;
pub mod scheduler;
pub mod store;

pub use clock::{ManualClock, SystemClock};
pub use disk_cache::DiskCache;
pub use rankings::MemoryRankings;
pub use scheduler::TaskQueue;
pub use store::MemoryStore;
