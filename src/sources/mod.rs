//! Property source implementations.

mod env;
mod file;
mod memory;
mod property_source;

pub use env::EnvSource;
pub use file::FileSource;
pub use memory::MemorySource;
pub use property_source::PropertySource;
