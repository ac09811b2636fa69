pub mod memory;
pub mod store;

pub use memory::MemoryGrantStore;
pub use store::GrantStore;
