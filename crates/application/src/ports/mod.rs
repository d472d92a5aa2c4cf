pub mod clock;
pub mod entry_store;
pub mod rankings;
pub mod scheduler;

pub use clock::Clock;
pub use entry_store::EntryStore;
pub use rankings::RankedLists;
pub use scheduler::{EvictionTask, TaskScheduler};
