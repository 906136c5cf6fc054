pub mod file;
pub mod memory;

pub use file::JsonFileStorage;
pub use memory::InMemoryStorage;
