//! Incremental patching of existing manifest text.
//!
//! New source files are spliced into a previously written manifest at four
//! anchors without re-parsing it, so comments, ordering and hand-edited
//! settings elsewhere stay byte-for-byte intact. New files are added flat:
//! straight into the source root group, with no subgroups created.
//!
//! Each anchor is patched independently, in [`Anchor::ORDER`]. A missed
//! anchor does not stop the remaining ones; it is recorded in the
//! [`PatchReport`] so callers can surface it.

pub mod anchor;
pub mod report;

use std::collections::HashSet;

use crate::codec::writer::{build_file_record, file_reference_record, render_record};
use crate::core::graph::{file_type_for, BuildFile, FileKind, FileReference, PhaseKind};
use crate::core::id::{IdAllocator, IdError, IdSource};
use crate::core::value::comment;

pub use anchor::{locate, Anchor};
pub use report::{AddedFile, AnchorOutcome, AnchorStatus, PatchReport};

/// A file to add to an existing manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    /// Display name
    pub name: String,
    /// Path relative to the source root group
    pub path: String,
}

impl NewFile {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        NewFile {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Descriptor whose name is the last segment of `path`.
    pub fn from_path(path: &str) -> Self {
        let path = path.replace('\\', "/");
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        NewFile { name, path }
    }
}

/// Patch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// `path` of the group new files are added to
    pub source_root: String,

    /// Leave out files whose path is already referenced in the manifest.
    ///
    /// Only the literal `path` of each `PBXFileReference` is compared. A file
    /// stored as `path = A.swift` inside a group with its own `path = Views`
    /// does not match `Views/A.swift`.
    pub skip_existing: bool,
}

impl PatchOptions {
    pub fn new(source_root: impl Into<String>) -> Self {
        PatchOptions {
            source_root: source_root.into(),
            skip_existing: true,
        }
    }
}

/// Patched text together with what was done to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub text: String,
    pub report: PatchReport,
}

/// Splices new source files into manifest text.
#[derive(Debug, Clone)]
pub struct Patcher {
    options: PatchOptions,
}

struct Entry {
    file: FileReference,
    build: BuildFile,
}

impl Patcher {
    pub fn new(options: PatchOptions) -> Self {
        Patcher { options }
    }

    /// Add `files` to `text` using fresh random identifiers.
    pub fn apply(&self, text: &str, files: &[NewFile]) -> Result<Patched, IdError> {
        let mut ids = IdAllocator::for_existing(text);
        self.apply_with(text, files, &mut ids)
    }

    /// Add `files` to `text`, drawing identifiers from `ids`.
    ///
    /// `ids` should already reject identifiers present in `text`.
    pub fn apply_with<S: IdSource>(
        &self,
        text: &str,
        files: &[NewFile],
        ids: &mut IdAllocator<S>,
    ) -> Result<Patched, IdError> {
        let mut report = PatchReport::default();
        let entries = self.prepare(text, files, ids, &mut report)?;

        let fragments = [
            render_lines(&entries, |e, out| render_record(out, &build_file_record(&e.build))),
            render_lines(&entries, |e, out| {
                render_record(out, &file_reference_record(&e.file))
            }),
            render_lines(&entries, |e, out| {
                out.push_str(&format!("\t\t\t\t{} /* {} */,\n", e.file.id, comment(&e.file.name)));
            }),
            render_lines(&entries, |e, out| {
                out.push_str(&format!(
                    "\t\t\t\t{} /* {} in {} */,\n",
                    e.build.id,
                    comment(&e.build.file_name),
                    e.build.phase.name()
                ));
            }),
        ];

        let mut text = text.to_string();
        for (anchor, fragment) in Anchor::ORDER.into_iter().zip(fragments) {
            let status = if entries.is_empty() {
                AnchorStatus::Skipped
            } else {
                match locate(anchor, &text, &self.options.source_root) {
                    Some(offset) => {
                        // Follow the line ending of the anchor line.
                        if text[..offset].ends_with("\r\n") {
                            text.insert_str(offset, &fragment.replace('\n', "\r\n"));
                        } else {
                            text.insert_str(offset, &fragment);
                        }
                        tracing::debug!("inserted {} entries at {}", entries.len(), anchor);
                        AnchorStatus::Applied {
                            offset,
                            entries: entries.len(),
                        }
                    }
                    None => {
                        tracing::warn!("anchor not found: {}", anchor);
                        AnchorStatus::NotFound
                    }
                }
            };
            report.anchors.push(AnchorOutcome { anchor, status });
        }

        report.added = entries
            .iter()
            .map(|e| AddedFile {
                name: e.file.name.clone(),
                path: e.file.path.clone(),
                file_ref: e.file.id.to_string(),
                build_file: e.build.id.to_string(),
            })
            .collect();

        Ok(Patched { text, report })
    }

    /// Filter `files` and allocate identifiers for the ones to add.
    fn prepare<S: IdSource>(
        &self,
        text: &str,
        files: &[NewFile],
        ids: &mut IdAllocator<S>,
        report: &mut PatchReport,
    ) -> Result<Vec<Entry>, IdError> {
        let mut present: HashSet<String> = if self.options.skip_existing {
            anchor::file_reference_paths(text).into_iter().collect()
        } else {
            HashSet::new()
        };

        let mut entries = Vec::with_capacity(files.len());
        for new in files {
            if self.options.skip_existing && !present.insert(new.path.clone()) {
                tracing::info!("`{}` is already in the project, skipping", new.path);
                report.skipped.push(new.path.clone());
                continue;
            }

            let file = FileReference {
                id: ids.allocate()?,
                name: new.name.clone(),
                path: new.path.clone(),
                kind: FileKind::Source(file_type_for(&new.name)),
            };
            let build = BuildFile {
                id: ids.allocate()?,
                file_ref: file.id,
                file_name: new.name.clone(),
                phase: PhaseKind::Sources,
            };
            entries.push(Entry { file, build });
        }
        Ok(entries)
    }
}

fn render_lines(entries: &[Entry], mut line: impl FnMut(&Entry, &mut String)) -> String {
    let mut out = String::new();
    for entry in entries {
        line(entry, &mut out);
    }
    out
}

/// Patch `text` with default options for `source_root`.
pub fn add_files(text: &str, files: &[NewFile], source_root: &str) -> Result<Patched, IdError> {
    Patcher::new(PatchOptions::new(source_root)).apply(text, files)
}
