//! Shared fixtures for unit tests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::reader::{id_list, parse};
use crate::core::value::Value;

/// A small hand-written manifest with three sources and fixed identifiers.
///
/// Source group `A10000000000000000000002` (path `TripBro`), Sources phase
/// `F10000000000000000000003`, target `D10000000000000000000001`.
pub const SAMPLE_MANIFEST: &str = include_str!("sample.pbxproj");

/// Write `SAMPLE_MANIFEST` as `<dir>/TripBro.xcodeproj/project.pbxproj`.
pub fn write_sample_project(dir: &Path) -> PathBuf {
    let manifest = dir.join("TripBro.xcodeproj").join("project.pbxproj");
    fs::create_dir_all(manifest.parent().unwrap()).unwrap();
    fs::write(&manifest, SAMPLE_MANIFEST).unwrap();
    manifest
}

/// Identifiers listed in the first Sources phase of `text`.
pub fn sources_phase_files(text: &str) -> Vec<String> {
    let doc = parse(text).unwrap();
    let (_, phase) = doc.objects_of("PBXSourcesBuildPhase").next().unwrap();
    id_list(phase, "files").into_iter().map(str::to_string).collect()
}

/// Children of the group whose `path` is `path`.
pub fn group_children(text: &str, path: &str) -> Vec<String> {
    let doc = parse(text).unwrap();
    let (_, group) = doc
        .objects_of("PBXGroup")
        .find(|(_, g)| g.get("path").and_then(Value::as_str) == Some(path))
        .unwrap();
    id_list(group, "children")
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Create `<root>/<rel>` with placeholder contents for every `rel`.
pub fn touch_sources(root: &Path, files: &[&str]) {
    for rel in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "// source\n").unwrap();
    }
}

/// `text` with an extra native target named `name` (identifier
/// `0A0000000000000000000001`) and its empty Sources phase
/// (`0A0000000000000000000002`), each placed first in its section.
pub fn with_second_target(text: &str, name: &str, product_type: &str) -> String {
    let target = format!(
        "\t\t0A0000000000000000000001 /* {name} */ = {{\n\
         \t\t\tisa = PBXNativeTarget;\n\
         \t\t\tbuildPhases = (\n\
         \t\t\t\t0A0000000000000000000002 /* Sources */,\n\
         \t\t\t);\n\
         \t\t\tname = {name};\n\
         \t\t\tproductName = {name};\n\
         \t\t\tproductType = \"{product_type}\";\n\
         \t\t}};\n"
    );
    let phase = "\t\t0A0000000000000000000002 /* Sources */ = {\n\
                 \t\t\tisa = PBXSourcesBuildPhase;\n\
                 \t\t\tbuildActionMask = 2147483647;\n\
                 \t\t\tfiles = (\n\
                 \t\t\t);\n\
                 \t\t\trunOnlyForDeploymentPostprocessing = 0;\n\
                 \t\t};\n";

    let text = text.replacen(
        "/* Begin PBXNativeTarget section */\n",
        &format!("/* Begin PBXNativeTarget section */\n{target}"),
        1,
    );
    text.replacen(
        "/* Begin PBXSourcesBuildPhase section */\n",
        &format!("/* Begin PBXSourcesBuildPhase section */\n{phase}"),
        1,
    )
}
