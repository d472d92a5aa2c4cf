mod mock_store;

pub use mock_store::*;
