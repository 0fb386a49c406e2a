//! Turning a list of source paths into a manifest graph.

mod graph_builder;

pub use graph_builder::{build_graph, normalize_source_path, BuildError, GraphBuilder};
