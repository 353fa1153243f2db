//! Internal implementation details.

pub(crate) mod append_map;

pub use append_map::AppendMap;
