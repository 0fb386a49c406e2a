//! Project configuration (`Pbxgen.toml`).
//!
//! The file is optional and lives at the project root. Every field has a
//! default; command-line flags take precedence over file values.
//!
//! ```toml
//! [project]
//! name = "TripBro"
//! source_root = "TripBro"
//! bundle_identifier = "com.tripbro.app"
//! deployment_target = "17.0"
//! extensions = ["swift"]
//!
//! [settings.release]
//! SWIFT_STRICT_CONCURRENCY = "complete"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::graph::{ProjectInfo, DEFAULT_OBJECT_VERSION};
use crate::core::settings::{ProductSettings, SettingsOverrides};

/// File name looked up at the project root.
pub const CONFIG_FILE: &str = "Pbxgen.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project settings
    pub project: ProjectConfig,

    /// Extra target build settings
    pub settings: SettingsOverrides,
}

/// The `[project]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project and target name (defaults to the project directory name)
    pub name: Option<String>,

    /// Directory holding the sources (defaults to the project name)
    pub source_root: Option<String>,

    /// `PRODUCT_BUNDLE_IDENTIFIER` (defaults to `com.example.<name>`)
    pub bundle_identifier: Option<String>,

    /// `IPHONEOS_DEPLOYMENT_TARGET`
    pub deployment_target: String,

    /// `SWIFT_VERSION`
    pub swift_version: String,

    /// `MARKETING_VERSION`
    pub marketing_version: String,

    /// `CURRENT_PROJECT_VERSION`
    pub current_project_version: String,

    /// `objectVersion` of the manifest
    pub object_version: u32,

    /// File extensions picked up by source discovery
    pub extensions: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let product = ProductSettings::default();
        ProjectConfig {
            name: None,
            source_root: None,
            bundle_identifier: None,
            deployment_target: product.deployment_target,
            swift_version: product.swift_version,
            marketing_version: product.marketing_version,
            current_project_version: product.current_project_version,
            object_version: DEFAULT_OBJECT_VERSION,
            extensions: vec!["swift".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load `<root>/Pbxgen.toml`, or defaults if it does not exist.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.exists() {
            tracing::debug!("loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Project name: the explicit value, else the configured one, else the
    /// directory name of `root`.
    pub fn project_name(&self, explicit: Option<&str>, root: &Path) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| self.project.name.clone())
            .unwrap_or_else(|| {
                root.canonicalize()
                    .ok()
                    .as_deref()
                    .unwrap_or(root)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("App")
                    .to_string()
            })
    }

    /// Source root: the explicit value, else the configured one, else `name`.
    pub fn source_root(&self, explicit: Option<&str>, name: &str) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| self.project.source_root.clone())
            .unwrap_or_else(|| name.to_string())
    }

    /// Everything the graph needs to describe project `name`.
    pub fn project_info(&self, name: &str, source_root: &str) -> ProjectInfo {
        let bundle_identifier = self.project.bundle_identifier.clone().unwrap_or_else(|| {
            let slug: String = name
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            format!("com.example.{}", slug.to_lowercase())
        });

        ProjectInfo {
            name: name.to_string(),
            source_root: source_root.to_string(),
            object_version: self.project.object_version,
            product: ProductSettings {
                bundle_identifier,
                deployment_target: self.project.deployment_target.clone(),
                swift_version: self.project.swift_version.clone(),
                marketing_version: self.project.marketing_version.clone(),
                current_project_version: self.project.current_project_version.clone(),
                overrides: self.settings.clone(),
            },
        }
    }
}
