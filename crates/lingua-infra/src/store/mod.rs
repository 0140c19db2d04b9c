//! Post stores that need no database: in-memory and flat markdown files.

mod file;
mod front_matter;
mod memory;

pub use file::FilePostRepository;
pub use memory::InMemoryPostRepository;
