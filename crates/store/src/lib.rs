pub mod file;
pub mod memory;

pub use file::FileProjectStore;
pub use memory::InMemoryProjectStore;
