pub mod memory;
pub mod store;

pub use memory::MemoryClientStore;
pub use store::{ClientStore, StoreError, StoreResult};
