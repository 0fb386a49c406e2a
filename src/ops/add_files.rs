//! Implementation of `pbxgen add`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::normalize_source_path;
use crate::patch::{NewFile, PatchOptions, PatchReport, Patcher};
use crate::util::config::Config;
use crate::util::fs::{read_to_string, write_string};

/// Options for adding files to an existing project.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Path of the `project.pbxproj`
    pub manifest: PathBuf,

    /// Source paths relative to the source root
    pub files: Vec<String>,

    /// `path` of the group to add to (defaults to the configured source root)
    pub source_root: Option<String>,

    /// Add files even if their path is already referenced
    pub allow_duplicates: bool,
}

/// Result of adding files.
#[derive(Debug, Clone)]
pub struct AddResult {
    /// Manifest that was patched
    pub manifest_path: PathBuf,

    /// Source root the files were added under
    pub source_root: String,

    /// What happened at each anchor
    pub report: PatchReport,

    /// Whether the manifest was rewritten
    pub written: bool,
}

/// Project root and name implied by `<root>/<Name>.xcodeproj/project.pbxproj`.
fn project_location(manifest: &Path) -> Option<(PathBuf, String)> {
    let bundle = manifest.parent()?;
    let name = bundle.file_stem()?.to_str()?.to_string();
    let root = bundle.parent().unwrap_or(Path::new("."));
    Some((root.to_path_buf(), name))
}

/// Splice `opts.files` into the manifest.
///
/// The manifest is read once, patched in memory and written back only if
/// something was inserted. Missed anchors are reported, not raised.
pub fn add_files(opts: &AddOptions) -> Result<AddResult> {
    let source_root = match &opts.source_root {
        Some(root) => root.clone(),
        None => {
            let (root, name) = project_location(&opts.manifest).with_context(|| {
                format!(
                    "cannot infer the source root from {}",
                    opts.manifest.display()
                )
            })?;
            Config::load_or_default(&root)?.source_root(None, &name)
        }
    };

    let mut files = Vec::with_capacity(opts.files.len());
    for path in &opts.files {
        let path = normalize_source_path(path)?;
        files.push(NewFile::from_path(&path));
    }

    let text = read_to_string(&opts.manifest)?;

    let mut options = PatchOptions::new(&source_root);
    options.skip_existing = !opts.allow_duplicates;
    let patched = Patcher::new(options)
        .apply(&text, &files)
        .with_context(|| format!("failed to patch {}", opts.manifest.display()))?;

    let written = patched.text != text;
    if written {
        write_string(&opts.manifest, &patched.text)?;
        tracing::info!(
            "added {} file(s) to {}",
            patched.report.added.len(),
            opts.manifest.display()
        );
    } else {
        tracing::info!("{} is unchanged", opts.manifest.display());
    }

    Ok(AddResult {
        manifest_path: opts.manifest.clone(),
        source_root,
        report: patched.report,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{Anchor, AnchorStatus};
    use crate::test_support::{group_children, sources_phase_files, write_sample_project};
    use tempfile::TempDir;

    fn add(manifest: &Path, files: &[&str]) -> AddOptions {
        AddOptions {
            manifest: manifest.to_path_buf(),
            files: files.iter().map(|f| f.to_string()).collect(),
            ..AddOptions::default()
        }
    }

    #[test]
    fn test_add_infers_source_root() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_sample_project(tmp.path());

        let result = add_files(&add(&manifest, &["Services/Api.swift", "Store.swift"])).unwrap();
        assert_eq!(result.source_root, "TripBro");
        assert!(result.written);
        assert!(result.report.is_complete());

        let text = std::fs::read_to_string(&manifest).unwrap();
        assert_eq!(sources_phase_files(&text).len(), 5);
        assert_eq!(group_children(&text, "TripBro").len(), 5);
        assert!(text.contains("path = \"Services/Api.swift\";"));
        assert!(text.contains("/* Api.swift */"));
    }

    #[test]
    fn test_add_existing_file_leaves_manifest_untouched() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_sample_project(tmp.path());
        let before = std::fs::metadata(&manifest).unwrap().modified().unwrap();

        let result = add_files(&add(&manifest, &["Trip.swift"])).unwrap();
        assert!(!result.written);
        assert_eq!(result.report.skipped, vec!["Trip.swift"]);
        assert_eq!(
            std::fs::metadata(&manifest).unwrap().modified().unwrap(),
            before
        );
    }

    #[test]
    fn test_add_allow_duplicates() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_sample_project(tmp.path());

        let mut opts = add(&manifest, &["Trip.swift"]);
        opts.allow_duplicates = true;
        let result = add_files(&opts).unwrap();
        assert!(result.written);
        assert_eq!(result.report.added.len(), 1);
    }

    #[test]
    fn test_add_wrong_source_root_reports_missing_group() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_sample_project(tmp.path());

        let mut opts = add(&manifest, &["Extra.swift"]);
        opts.source_root = Some("Elsewhere".to_string());
        let result = add_files(&opts).unwrap();

        assert!(result.written);
        assert_eq!(
            result.report.status(Anchor::GroupChildren),
            Some(AnchorStatus::NotFound)
        );
        assert_eq!(result.report.missing().len(), 1);
    }

    #[test]
    fn test_add_rejects_escaping_paths() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_sample_project(tmp.path());
        let err = add_files(&add(&manifest, &["../Outside.swift"])).unwrap_err();
        assert!(err.to_string().contains("Outside.swift"));
    }

    #[test]
    fn test_add_missing_manifest() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join("Nope.xcodeproj/project.pbxproj");
        let err = add_files(&add(&manifest, &["A.swift"])).unwrap_err();
        assert!(err.to_string().contains("failed to read file"));
    }
}
