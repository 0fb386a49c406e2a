//! pbxgen - generate and patch Xcode `project.pbxproj` manifests
//!
//! This crate builds the object graph for a single-target iOS application
//! from a list of source files, serializes it in the OpenStep property-list
//! dialect Xcode reads, and splices new sources into existing manifests
//! without disturbing the rest of the text.

pub mod builder;
pub mod codec;
pub mod core;
pub mod ops;
pub mod patch;
pub mod util;

/// Shared manifest fixtures for unit tests.
#[cfg(test)]
pub mod test_support;

pub use builder::{build_graph, BuildError, GraphBuilder};
pub use codec::{parse, to_string, Document, ParseError, Serializer};
pub use core::{IdAllocator, IdError, ManifestGraph, ObjectId, ProjectInfo};
pub use patch::{NewFile, PatchOptions, PatchReport, Patcher};
