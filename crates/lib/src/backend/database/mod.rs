//! Backend implementations
//!
//! [`InMemory`] keeps everything in a map and is the test fake. [`JsonFile`]
//! layers write-through persistence to a single JSON file on top of it.

mod in_memory;
mod json_file;

pub use in_memory::InMemory;
pub use json_file::JsonFile;
