//! Core traits for dependency resolution.

pub mod resolver;

pub use resolver::*;
