//! Outcome of an incremental patch.

use serde::Serialize;

use crate::patch::anchor::Anchor;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// What happened at one anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnchorStatus {
    /// Entries were inserted at byte `offset` of the text as it stood then.
    Applied { offset: usize, entries: usize },
    /// The anchor was not found; nothing was inserted for it.
    NotFound,
    /// There was nothing to insert.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnchorOutcome {
    pub anchor: Anchor,
    #[serde(flatten)]
    pub status: AnchorStatus,
}

/// A file the patch added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedFile {
    pub name: String,
    pub path: String,
    pub file_ref: String,
    pub build_file: String,
}

/// Per-anchor results plus the files added or skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub anchors: Vec<AnchorOutcome>,
    pub added: Vec<AddedFile>,
    /// Paths left out because they were already present
    pub skipped: Vec<String>,
}

impl PatchReport {
    pub fn status(&self, anchor: Anchor) -> Option<AnchorStatus> {
        self.anchors
            .iter()
            .find(|o| o.anchor == anchor)
            .map(|o| o.status)
    }

    /// Anchors that could not be located.
    pub fn missing(&self) -> Vec<Anchor> {
        self.anchors
            .iter()
            .filter(|o| o.status == AnchorStatus::NotFound)
            .map(|o| o.anchor)
            .collect()
    }

    /// True when no anchor was missed.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// True when at least one anchor received entries.
    pub fn changed(&self) -> bool {
        self.anchors
            .iter()
            .any(|o| matches!(o.status, AnchorStatus::Applied { .. }))
    }

    /// Warnings for missed anchors and notes for skipped files.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for anchor in self.missing() {
            let mut diag = Diagnostic::warning(format!("anchor not found: {}", anchor))
                .with_context(format!(
                    "{} file(s) were not written at this location",
                    self.added.len()
                ))
                .with_suggestion(suggestions::INSPECT_MANIFEST);
            if anchor == Anchor::GroupChildren {
                diag = diag.with_suggestion(suggestions::SOURCE_ROOT);
            }
            out.push(diag);
        }
        if !self.skipped.is_empty() {
            out.push(
                Diagnostic::note(format!(
                    "{} file(s) already in the project were skipped",
                    self.skipped.len()
                ))
                .with_context(self.skipped.join(", ")),
            );
        }
        out
    }
}
