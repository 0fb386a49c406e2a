//! Build settings bundles for the Debug and Release configurations.
//!
//! Project-level configurations carry compiler and warning settings shared by
//! every target; target-level configurations carry the product settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::value::Value;

/// Which of the two fixed configurations a bundle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationKind {
    Debug,
    Release,
}

impl ConfigurationKind {
    pub const ALL: [ConfigurationKind; 2] = [ConfigurationKind::Debug, ConfigurationKind::Release];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigurationKind::Debug => "Debug",
            ConfigurationKind::Release => "Release",
        }
    }
}

/// An ordered set of build settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSettings {
    entries: Vec<(String, Value)>,
}

impl BuildSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing entry in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Set a list-valued setting.
    pub fn set_list(&mut self, key: impl Into<String>, items: &[&str]) -> &mut Self {
        let list = Value::Array(items.iter().map(|s| Value::from(*s)).collect());
        self.set(key, list)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_value(&self) -> Value {
        Value::Dict(self.entries.clone())
    }
}

/// User-supplied settings layered over the generated target settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    /// Applied to both configurations
    pub common: BTreeMap<String, String>,

    /// Applied to Debug only
    pub debug: BTreeMap<String, String>,

    /// Applied to Release only
    pub release: BTreeMap<String, String>,
}

impl SettingsOverrides {
    pub fn is_empty(&self) -> bool {
        self.common.is_empty() && self.debug.is_empty() && self.release.is_empty()
    }

    fn apply(&self, kind: ConfigurationKind, settings: &mut BuildSettings) {
        let specific = match kind {
            ConfigurationKind::Debug => &self.debug,
            ConfigurationKind::Release => &self.release,
        };
        for (key, value) in self.common.iter().chain(specific.iter()) {
            settings.set(key.clone(), value.as_str());
        }
    }
}

/// Product values that end up in the target configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSettings {
    pub bundle_identifier: String,
    pub deployment_target: String,
    pub swift_version: String,
    pub marketing_version: String,
    pub current_project_version: String,
    pub overrides: SettingsOverrides,
}

impl Default for ProductSettings {
    fn default() -> Self {
        ProductSettings {
            bundle_identifier: "com.example.app".to_string(),
            deployment_target: "17.0".to_string(),
            swift_version: "5.0".to_string(),
            marketing_version: "1.0".to_string(),
            current_project_version: "1".to_string(),
            overrides: SettingsOverrides::default(),
        }
    }
}

/// Project-wide compiler settings for `kind`.
pub fn project_settings(kind: ConfigurationKind, deployment_target: &str) -> BuildSettings {
    let mut s = BuildSettings::new();
    s.set("ALWAYS_SEARCH_USER_PATHS", "NO")
        .set("ASSETCATALOG_COMPILER_GENERATE_SWIFT_ASSET_SYMBOL_EXTENSIONS", "YES")
        .set("CLANG_ANALYZER_NONNULL", "YES")
        .set("CLANG_ANALYZER_NUMBER_OBJECT_CONVERSION", "YES_AGGRESSIVE")
        .set("CLANG_CXX_LANGUAGE_STANDARD", "gnu++20")
        .set("CLANG_ENABLE_MODULES", "YES")
        .set("CLANG_ENABLE_OBJC_ARC", "YES")
        .set("CLANG_ENABLE_OBJC_WEAK", "YES");

    for warning in [
        "CLANG_WARN_BLOCK_CAPTURE_AUTORELEASING",
        "CLANG_WARN_BOOL_CONVERSION",
        "CLANG_WARN_COMMA",
        "CLANG_WARN_CONSTANT_CONVERSION",
        "CLANG_WARN_DEPRECATED_OBJC_IMPLEMENTATIONS",
    ] {
        s.set(warning, "YES");
    }
    s.set("CLANG_WARN_DIRECT_OBJC_ISA_USAGE", "YES_ERROR");
    for warning in [
        "CLANG_WARN_DOCUMENTATION_COMMENTS",
        "CLANG_WARN_EMPTY_BODY",
        "CLANG_WARN_ENUM_CONVERSION",
        "CLANG_WARN_INFINITE_RECURSION",
        "CLANG_WARN_INT_CONVERSION",
        "CLANG_WARN_NON_LITERAL_NULL_CONVERSION",
        "CLANG_WARN_OBJC_IMPLICIT_RETAIN_SELF",
        "CLANG_WARN_OBJC_LITERAL_CONVERSION",
    ] {
        s.set(warning, "YES");
    }
    s.set("CLANG_WARN_OBJC_ROOT_CLASS", "YES_ERROR");
    for warning in [
        "CLANG_WARN_QUOTED_INCLUDE_IN_FRAMEWORK_HEADER",
        "CLANG_WARN_RANGE_LOOP_ANALYSIS",
        "CLANG_WARN_STRICT_PROTOTYPES",
        "CLANG_WARN_SUSPICIOUS_MOVE",
    ] {
        s.set(warning, "YES");
    }
    s.set("CLANG_WARN_UNGUARDED_AVAILABILITY", "YES_AGGRESSIVE")
        .set("CLANG_WARN_UNREACHABLE_CODE", "YES")
        .set("CLANG_WARN__DUPLICATE_METHOD_MATCH", "YES")
        .set("COPY_PHASE_STRIP", "NO");

    match kind {
        ConfigurationKind::Debug => {
            s.set("DEBUG_INFORMATION_FORMAT", "dwarf")
                .set("ENABLE_STRICT_OBJC_MSGSEND", "YES")
                .set("ENABLE_TESTABILITY", "YES")
                .set("GCC_C_LANGUAGE_STANDARD", "gnu17")
                .set("GCC_DYNAMIC_NO_PIC", "NO")
                .set("GCC_NO_COMMON_BLOCKS", "YES")
                .set("GCC_OPTIMIZATION_LEVEL", "0")
                .set_list("GCC_PREPROCESSOR_DEFINITIONS", &["DEBUG=1", "$(inherited)"]);
        }
        ConfigurationKind::Release => {
            s.set("DEBUG_INFORMATION_FORMAT", "dwarf-with-dsym")
                .set("ENABLE_NS_ASSERTIONS", "NO")
                .set("ENABLE_STRICT_OBJC_MSGSEND", "YES")
                .set("GCC_C_LANGUAGE_STANDARD", "gnu17")
                .set("GCC_NO_COMMON_BLOCKS", "YES");
        }
    }

    s.set("GCC_WARN_64_TO_32_BIT_CONVERSION", "YES")
        .set("GCC_WARN_ABOUT_RETURN_TYPE", "YES_ERROR")
        .set("GCC_WARN_UNDECLARED_SELECTOR", "YES")
        .set("GCC_WARN_UNINITIALIZED_AUTOS", "YES_AGGRESSIVE")
        .set("GCC_WARN_UNUSED_FUNCTION", "YES")
        .set("GCC_WARN_UNUSED_VARIABLE", "YES")
        .set("IPHONEOS_DEPLOYMENT_TARGET", deployment_target)
        .set("LOCALIZATION_PREFERS_STRING_CATALOGS", "YES");

    match kind {
        ConfigurationKind::Debug => {
            s.set("MTL_ENABLE_DEBUG_INFO", "INCLUDE_SOURCE")
                .set("MTL_FAST_MATH", "YES")
                .set("ONLY_ACTIVE_ARCH", "YES")
                .set("SDKROOT", "iphoneos")
                .set("SWIFT_ACTIVE_COMPILATION_CONDITIONS", "DEBUG $(inherited)")
                .set("SWIFT_OPTIMIZATION_LEVEL", "-Onone");
        }
        ConfigurationKind::Release => {
            s.set("MTL_ENABLE_DEBUG_INFO", "NO")
                .set("MTL_FAST_MATH", "YES")
                .set("SDKROOT", "iphoneos")
                .set("SWIFT_COMPILATION_MODE", "wholemodule")
                .set("VALIDATE_PRODUCT", "YES");
        }
    }

    s
}

/// Application target settings for `kind`.
pub fn target_settings(kind: ConfigurationKind, product: &ProductSettings) -> BuildSettings {
    let mut s = BuildSettings::new();
    s.set("ASSETCATALOG_COMPILER_APPICON_NAME", "AppIcon")
        .set("ASSETCATALOG_COMPILER_GLOBAL_ACCENT_COLOR_NAME", "AccentColor")
        .set("CODE_SIGN_STYLE", "Automatic")
        .set("CURRENT_PROJECT_VERSION", product.current_project_version.as_str())
        .set("DEVELOPMENT_ASSET_PATHS", "")
        .set("ENABLE_PREVIEWS", "YES")
        .set("GENERATE_INFOPLIST_FILE", "YES")
        .set("INFOPLIST_KEY_UIApplicationSceneManifest_Generation", "YES")
        .set("INFOPLIST_KEY_UIApplicationSupportsIndirectInputEvents", "YES")
        .set("INFOPLIST_KEY_UILaunchScreen_Generation", "YES")
        .set(
            "INFOPLIST_KEY_UISupportedInterfaceOrientations_iPad",
            "UIInterfaceOrientationPortrait UIInterfaceOrientationPortraitUpsideDown \
             UIInterfaceOrientationLandscapeLeft UIInterfaceOrientationLandscapeRight",
        )
        .set(
            "INFOPLIST_KEY_UISupportedInterfaceOrientations_iPhone",
            "UIInterfaceOrientationPortrait UIInterfaceOrientationLandscapeLeft \
             UIInterfaceOrientationLandscapeRight",
        )
        .set("IPHONEOS_DEPLOYMENT_TARGET", product.deployment_target.as_str())
        .set_list(
            "LD_RUNPATH_SEARCH_PATHS",
            &["$(inherited)", "@executable_path/Frameworks"],
        )
        .set("MARKETING_VERSION", product.marketing_version.as_str())
        .set("PRODUCT_BUNDLE_IDENTIFIER", product.bundle_identifier.as_str())
        .set("PRODUCT_NAME", "$(TARGET_NAME)")
        .set("SWIFT_EMIT_LOC_STRINGS", "YES")
        .set("SWIFT_VERSION", product.swift_version.as_str())
        .set("TARGETED_DEVICE_FAMILY", "1,2");

    product.overrides.apply(kind, &mut s);
    s
}
