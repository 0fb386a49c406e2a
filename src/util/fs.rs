//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Recursively copy a directory.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    for entry in fs::read_dir(src)
        .with_context(|| format!("failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Find every file under `root` whose extension is in `extensions`.
///
/// Returns `/`-separated paths relative to `root`, sorted. Hidden entries
/// and bundle directories (`*.xcodeproj`, `*.xcassets`, ...) are skipped;
/// other directories with dots in their names are searched.
pub fn discover_sources(root: &Path, extensions: &[String]) -> Result<Vec<String>> {
    let mut results = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e.path(), e.file_type().is_dir()));

    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want == ext));
        if matches {
            results.push(to_slash(&relative_path(root, entry.path())));
        }
    }

    results.sort();
    tracing::debug!("discovered {} source(s) under {}", results.len(), root.display());
    Ok(results)
}

/// Directory extensions Xcode treats as opaque bundles.
const BUNDLE_EXTENSIONS: &[&str] = &[
    "xcodeproj",
    "xcworkspace",
    "xcassets",
    "xcdatamodeld",
    "xcframework",
    "framework",
    "bundle",
    "app",
    "appex",
    "lproj",
    "playground",
    "docc",
];

fn is_skipped(path: &Path, is_dir: bool) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    if name.starts_with('.') {
        return true;
    }
    is_dir
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| BUNDLE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::touch_sources;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_all() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");

        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("file.txt"), "content").unwrap();
        fs::write(src.join("nested/inner.txt"), "inner").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("file.txt")).unwrap(), "content");
        assert_eq!(
            fs::read_to_string(dst.join("nested/inner.txt")).unwrap(),
            "inner"
        );
    }

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("App.xcodeproj/project.pbxproj");
        write_string(&path, "// !$*UTF8*$!\n").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "// !$*UTF8*$!\n");
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let tmp = TempDir::new().unwrap();
        let err = read_to_string(&tmp.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("failed to read file"));
    }

    #[test]
    fn test_discover_sources() {
        let tmp = TempDir::new().unwrap();
        touch_sources(
            tmp.path(),
            &[
                "Views/TripListView.swift",
                "Trip.swift",
                "ContentView.swift",
                "README.md",
                ".build/Cache.swift",
                "Assets.xcassets/Stub.swift",
            ],
        );

        let found = discover_sources(tmp.path(), &["swift".to_string()]).unwrap();
        assert_eq!(
            found,
            vec!["ContentView.swift", "Trip.swift", "Views/TripListView.swift"]
        );
    }

    #[test]
    fn test_discover_sources_in_dotted_folders() {
        let tmp = TempDir::new().unwrap();
        touch_sources(
            tmp.path(),
            &[
                "Feature.Login/LoginView.swift",
                "v2.0/Api.swift",
                "App.swift",
                "Base.lproj/Strings.swift",
                "Widgets.bundle/Hidden.swift",
            ],
        );

        let found = discover_sources(tmp.path(), &["swift".to_string()]).unwrap();
        assert_eq!(
            found,
            vec!["App.swift", "Feature.Login/LoginView.swift", "v2.0/Api.swift"]
        );
    }

    #[test]
    fn test_discover_sources_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let found = discover_sources(tmp.path(), &["swift".to_string()]).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_relative_path() {
        let rel = relative_path(Path::new("/a/b"), Path::new("/a/b/c/d.swift"));
        assert_eq!(to_slash(&rel), "c/d.swift");
    }
}
