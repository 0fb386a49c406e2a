//! Core data structures for pbxgen.
//!
//! This module contains the foundational types used throughout pbxgen:
//! - Object identifiers and their allocator
//! - Property-list values
//! - Build settings for the Debug/Release configurations
//! - The in-memory manifest graph

pub mod graph;
pub mod id;
pub mod settings;
pub mod value;

pub use graph::{ManifestGraph, ProjectInfo};
pub use id::{IdAllocator, IdError, IdSource, ObjectId};
pub use settings::{ConfigurationKind, ProductSettings};
pub use value::Value;
