//! Service layer: the document store and the per-resource adapters built on it.
//! - `storage` defines the collection/store traits and the JSON file collection.
//! - `file` wires collections into a store rooted at a data directory.
//! - `adapters` maps typed records onto collections.

pub mod adapters;
pub mod errors;
pub mod file;
pub mod runtime;
pub mod seed;
pub mod storage;
