//! Configuration types
//!
//! Board-agnostic configuration structures, stored as postcard binary data
//! or parsed from TOML text.

pub mod geometry;
pub mod joints;
pub mod machine;

pub use geometry::*;
pub use joints::*;
pub use machine::*;
