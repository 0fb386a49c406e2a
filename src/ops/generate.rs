//! Implementation of `pbxgen generate`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::GraphBuilder;
use crate::codec::Serializer;
use crate::core::graph::GraphStats;
use crate::util::config::Config;
use crate::util::diagnostic::suggestions;
use crate::util::fs::{copy_dir_all, discover_sources, ensure_dir, write_string};

/// Name of the manifest inside a `.xcodeproj` bundle.
pub const MANIFEST_FILE: &str = "project.pbxproj";

/// Options for generating a project.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Directory the `.xcodeproj` bundle is written to
    pub root: PathBuf,

    /// Project name (overrides `Pbxgen.toml` and the directory name)
    pub name: Option<String>,

    /// Source root relative to `root` (overrides `Pbxgen.toml`)
    pub source_root: Option<String>,

    /// Explicit source paths relative to the source root; discovered when `None`
    pub sources: Option<Vec<String>>,

    /// Directory copied into the source root before discovery
    pub copy_from: Option<PathBuf>,

    /// Configuration; loaded from `root` when `None`
    pub config: Option<Config>,
}

/// Result of a successful generation.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Project name
    pub name: String,

    /// Path of the written `project.pbxproj`
    pub manifest_path: PathBuf,

    /// Number of source files in the Sources phase
    pub files: usize,

    /// Object counts
    pub stats: GraphStats,
}

/// Path of the manifest for project `name` under `root`.
pub fn manifest_path(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{}.xcodeproj", name)).join(MANIFEST_FILE)
}

/// Resolve `path` to a `project.pbxproj`.
///
/// Accepts the manifest itself, a `.xcodeproj` bundle, or a directory
/// holding exactly one bundle.
pub fn find_manifest(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        bail!("`{}` does not exist", path.display());
    }
    if path.extension().is_some_and(|e| e == "xcodeproj") {
        let manifest = path.join(MANIFEST_FILE);
        if manifest.is_file() {
            return Ok(manifest);
        }
        bail!("no {} in `{}`", MANIFEST_FILE, path.display());
    }

    let mut bundles: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir() && p.extension().is_some_and(|e| e == "xcodeproj"))
        .collect();
    bundles.sort();

    match bundles.as_slice() {
        [] => bail!(
            "no .xcodeproj found in `{}`\n\nhelp: {}",
            path.display(),
            suggestions::NO_MANIFEST
        ),
        [bundle] => find_manifest(bundle),
        _ => bail!(
            "multiple .xcodeproj bundles in `{}`; pass one explicitly",
            path.display()
        ),
    }
}

/// Build a manifest from the sources under the project root and write it.
///
/// Nothing is written if any source path is rejected.
pub fn generate(opts: &GenerateOptions) -> Result<GenerateResult> {
    let config = match &opts.config {
        Some(config) => config.clone(),
        None => Config::load_or_default(&opts.root)?,
    };

    let name = config.project_name(opts.name.as_deref(), &opts.root);
    if name.trim().is_empty() {
        bail!("project name must not be empty");
    }
    let source_root = config.source_root(opts.source_root.as_deref(), &name);
    let source_dir = opts.root.join(&source_root);

    if let Some(from) = &opts.copy_from {
        tracing::info!("copying {} into {}", from.display(), source_dir.display());
        copy_dir_all(from, &source_dir).with_context(|| {
            format!("failed to copy sources from {}", from.display())
        })?;
    }

    let sources = match &opts.sources {
        Some(sources) => sources.clone(),
        None => {
            if !source_dir.is_dir() {
                bail!(
                    "source directory `{}` does not exist\n\
                     \n\
                     Pass `--source-root` or list the sources explicitly.",
                    source_dir.display()
                );
            }
            discover_sources(&source_dir, &config.project.extensions)?
        }
    };

    tracing::info!("generating {} with {} source(s)", name, sources.len());

    let info = config.project_info(&name, &source_root);
    let mut builder = GraphBuilder::new(info)?;
    builder
        .add_sources(sources.iter().map(String::as_str))
        .with_context(|| format!("failed to build project graph for {}", name))?;
    let graph = builder.finish();

    let text = Serializer::new(&graph).render();
    let path = manifest_path(&opts.root, &name);
    if let Some(bundle) = path.parent() {
        ensure_dir(bundle)?;
    }
    write_string(&path, &text)?;

    tracing::debug!("wrote {}", path.display());

    Ok(GenerateResult {
        name,
        manifest_path: path,
        files: graph.sources.files.len(),
        stats: graph.stats(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse;
    use crate::test_support::{group_children, sources_phase_files, touch_sources};
    use tempfile::TempDir;

    fn opts(root: &Path) -> GenerateOptions {
        GenerateOptions {
            root: root.to_path_buf(),
            name: Some("TripBro".to_string()),
            ..GenerateOptions::default()
        }
    }

    #[test]
    fn test_generate_discovers_sources() {
        let tmp = TempDir::new().unwrap();
        touch_sources(
            &tmp.path().join("TripBro"),
            &["TripBroApp.swift", "Models/Trip.swift", "Notes.txt"],
        );

        let result = generate(&opts(tmp.path())).unwrap();
        assert_eq!(result.name, "TripBro");
        assert_eq!(result.files, 2);
        assert_eq!(
            result.manifest_path,
            tmp.path().join("TripBro.xcodeproj/project.pbxproj")
        );

        let text = std::fs::read_to_string(&result.manifest_path).unwrap();
        assert!(parse(&text).is_ok());
        assert_eq!(sources_phase_files(&text).len(), 2);
        // TripBroApp.swift and the Models subgroup
        assert_eq!(group_children(&text, "TripBro").len(), 2);
    }

    #[test]
    fn test_generate_explicit_sources() {
        let tmp = TempDir::new().unwrap();
        let mut o = opts(tmp.path());
        o.sources = Some(vec!["A.swift".to_string(), "sub/B.swift".to_string()]);

        let result = generate(&o).unwrap();
        assert_eq!(result.files, 2);
        assert_eq!(result.stats.groups, 4);
    }

    #[test]
    fn test_generate_is_idempotent_on_bundle_dir() {
        let tmp = TempDir::new().unwrap();
        let mut o = opts(tmp.path());
        o.sources = Some(vec!["A.swift".to_string()]);

        generate(&o).unwrap();
        let again = generate(&o).unwrap();
        assert!(again.manifest_path.exists());
    }

    #[test]
    fn test_generate_aborts_before_writing() {
        let tmp = TempDir::new().unwrap();
        let mut o = opts(tmp.path());
        o.sources = Some(vec!["A.swift".to_string(), "A.swift".to_string()]);

        let err = generate(&o).unwrap_err();
        assert!(format!("{:#}", err).contains("A.swift"));
        assert!(!manifest_path(tmp.path(), "TripBro").exists());
    }

    #[test]
    fn test_generate_missing_source_dir() {
        let tmp = TempDir::new().unwrap();
        let err = generate(&opts(tmp.path())).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_generate_copy_from() {
        let tmp = TempDir::new().unwrap();
        let upstream = tmp.path().join("upstream");
        touch_sources(&upstream, &["ContentView.swift"]);
        let root = tmp.path().join("app");

        let mut o = opts(&root);
        o.copy_from = Some(upstream);
        let result = generate(&o).unwrap();

        assert!(root.join("TripBro/ContentView.swift").exists());
        assert_eq!(result.files, 1);
    }

    #[test]
    fn test_find_manifest() {
        let tmp = TempDir::new().unwrap();
        let mut o = opts(tmp.path());
        o.sources = Some(vec!["A.swift".to_string()]);
        let written = generate(&o).unwrap().manifest_path;

        assert_eq!(find_manifest(tmp.path()).unwrap(), written);
        assert_eq!(
            find_manifest(&tmp.path().join("TripBro.xcodeproj")).unwrap(),
            written
        );
        assert_eq!(find_manifest(&written).unwrap(), written);
    }

    #[test]
    fn test_find_manifest_none() {
        let tmp = TempDir::new().unwrap();
        let err = find_manifest(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("no .xcodeproj found"));
        assert!(err.to_string().contains("pbxgen generate"));
    }

    #[test]
    fn test_generate_uses_config_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("Pbxgen.toml"),
            "[project]\nname = \"Configured\"\nsource_root = \"Sources\"\nbundle_identifier = \"com.acme.configured\"\n",
        )
        .unwrap();
        touch_sources(&tmp.path().join("Sources"), &["Main.swift"]);

        let o = GenerateOptions {
            root: tmp.path().to_path_buf(),
            ..GenerateOptions::default()
        };
        let result = generate(&o).unwrap();
        assert_eq!(result.name, "Configured");

        let text = std::fs::read_to_string(&result.manifest_path).unwrap();
        assert!(text.contains("PRODUCT_BUNDLE_IDENTIFIER = com.acme.configured;"));
        assert!(text.contains("path = Sources;"));
    }
}
