//! Populating a manifest graph from discovered source paths.

use std::collections::HashSet;

use thiserror::Error;

use crate::core::graph::{file_type_for, ChildKind, FileKind, FileReference, ManifestGraph, ProjectInfo};
use crate::core::id::{IdAllocator, IdError, IdSource, ObjectId, UuidSource};

/// Errors raised while building a graph. All of them abort generation
/// before any manifest text is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("source `{path}` is listed more than once")]
    DuplicateSource { path: String },

    #[error("invalid source path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("source `{path}` conflicts with an existing {existing} of the same name")]
    PathConflict {
        path: String,
        existing: &'static str,
    },

    #[error(transparent)]
    Id(#[from] IdError),
}

/// Normalize a source path relative to the source root.
///
/// Backslashes become slashes, `.` and empty segments are dropped. Absolute
/// paths and `..` segments are rejected.
pub fn normalize_source_path(path: &str) -> Result<String, BuildError> {
    let unified = path.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(BuildError::InvalidPath {
            path: path.to_string(),
            reason: "path must be relative to the source root",
        });
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(BuildError::InvalidPath {
                    path: path.to_string(),
                    reason: "path must not leave the source root",
                })
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(BuildError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty",
        });
    }

    Ok(segments.join("/"))
}

/// Builds a [`ManifestGraph`] one source file at a time.
pub struct GraphBuilder<S = UuidSource> {
    graph: ManifestGraph,
    ids: IdAllocator<S>,
    seen: HashSet<String>,
}

impl GraphBuilder<UuidSource> {
    pub fn new(info: ProjectInfo) -> Result<Self, BuildError> {
        Self::with_allocator(info, IdAllocator::new())
    }
}

impl<S: IdSource> GraphBuilder<S> {
    pub fn with_allocator(info: ProjectInfo, mut ids: IdAllocator<S>) -> Result<Self, BuildError> {
        let graph = ManifestGraph::scaffold(info, &mut ids)?;
        Ok(GraphBuilder {
            graph,
            ids,
            seen: HashSet::new(),
        })
    }

    /// Add one source file: a file reference placed in the group tree by its
    /// directory segments, and a build file appended to the Sources phase.
    pub fn add_source(&mut self, path: &str) -> Result<ObjectId, BuildError> {
        let normalized = normalize_source_path(path)?;
        if self.seen.contains(&normalized) {
            return Err(BuildError::DuplicateSource { path: normalized });
        }

        let mut segments: Vec<&str> = normalized.split('/').collect();
        let name = segments.pop().unwrap_or_default().to_string();

        let mut parent = self.graph.source_group;
        for segment in segments {
            parent = self.descend(parent, segment, &normalized)?;
        }

        if let Some(existing) = self.graph.group(parent).and_then(|g| g.child(&name)) {
            if existing.kind == ChildKind::Group {
                return Err(BuildError::PathConflict {
                    path: normalized,
                    existing: "group",
                });
            }
        }

        let file_id = self.ids.allocate()?;
        let build_id = self.ids.allocate()?;
        let file = FileReference {
            id: file_id,
            kind: FileKind::Source(file_type_for(&name)),
            name,
            path: normalized.clone(),
        };

        self.graph.add_file_reference(parent, file);
        self.graph.add_source_build_file(build_id, file_id);
        tracing::debug!("added source `{}` ({})", normalized, file_id);

        self.seen.insert(normalized);
        Ok(file_id)
    }

    /// Add every path in order, stopping at the first error.
    pub fn add_sources<I, P>(&mut self, paths: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        for path in paths {
            self.add_source(path.as_ref())?;
        }
        Ok(())
    }

    /// Find or create the subgroup `segment` under `parent`.
    fn descend(
        &mut self,
        parent: ObjectId,
        segment: &str,
        path: &str,
    ) -> Result<ObjectId, BuildError> {
        if let Some(child) = self.graph.group(parent).and_then(|g| g.child(segment)) {
            return match child.kind {
                ChildKind::Group => Ok(child.id),
                ChildKind::File => Err(BuildError::PathConflict {
                    path: path.to_string(),
                    existing: "file",
                }),
            };
        }

        let id = self.ids.allocate()?;
        self.graph.add_group(parent, id, segment);
        Ok(id)
    }

    pub fn finish(self) -> ManifestGraph {
        self.graph
    }
}

/// Build a complete graph for `paths`.
pub fn build_graph<I, P>(info: ProjectInfo, paths: I) -> Result<ManifestGraph, BuildError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    let mut builder = GraphBuilder::new(info)?;
    builder.add_sources(paths)?;
    Ok(builder.finish())
}
