//! Implementation of `pbxgen check`.
//!
//! Parses a manifest and verifies that its objects reference each other
//! consistently. Findings are reported as diagnostics; only unreadable or
//! unparsable manifests are errors.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::codec::reader::{id_list, parse_named, Document, ParseError};
use crate::core::id::ObjectId;
use crate::core::value::Value;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::read_to_string;

/// Properties holding a single object reference.
const SINGLE_REFS: &[&str] = &[
    "fileRef",
    "buildConfigurationList",
    "mainGroup",
    "productRefGroup",
    "productReference",
];

/// Properties holding a list of object references.
const LIST_REFS: &[&str] = &["children", "files", "buildPhases", "targets", "buildConfigurations"];

/// Findings for one manifest.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Manifest that was checked
    pub manifest_path: PathBuf,

    /// Number of objects per `isa`
    pub counts: BTreeMap<String, usize>,

    /// Problems found
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    /// Total number of objects.
    pub fn objects(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn errors(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// True when no error was found. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        self.errors() == 0
    }
}

/// Read and check the manifest at `path`.
///
/// A parse failure is returned as a [`ParseError`] wrapped in the error
/// chain so callers can render it with its source span.
pub fn check(path: &Path) -> Result<CheckReport> {
    let text = read_to_string(path)?;
    let name = path.display().to_string();
    let report = check_text(&text, &name)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(CheckReport {
        manifest_path: path.to_path_buf(),
        ..report
    })
}

/// Check manifest text; `name` labels parse errors.
pub fn check_text(text: &str, name: &str) -> Result<CheckReport, ParseError> {
    let doc = parse_named(text, name)?;
    let mut checker = Checker {
        doc: &doc,
        isa: doc
            .objects()
            .iter()
            .map(|(id, object)| {
                let isa = object.get("isa").and_then(Value::as_str).unwrap_or("");
                (id.as_str(), isa)
            })
            .collect(),
        diagnostics: Vec::new(),
    };

    checker.identifiers();
    checker.root_object();
    checker.references();
    checker.group_membership();
    checker.build_files();
    checker.sources_phase();

    tracing::debug!(
        "checked {} object(s), {} finding(s)",
        checker.isa.len(),
        checker.diagnostics.len()
    );

    let diagnostics = checker
        .diagnostics
        .into_iter()
        .map(|d| d.with_location(name))
        .collect();

    Ok(CheckReport {
        manifest_path: PathBuf::from(name),
        counts: doc.section_counts(),
        diagnostics,
    })
}

struct Checker<'a> {
    doc: &'a Document,
    isa: HashMap<&'a str, &'a str>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    fn error(&mut self, message: String) {
        self.diagnostics
            .push(Diagnostic::error(message).with_suggestion(suggestions::REGENERATE));
    }

    fn identifiers(&mut self) {
        let doc = self.doc;
        for (id, _) in doc.objects() {
            if id.parse::<ObjectId>().is_err() {
                self.error(format!("`{}` is not a 24-digit hexadecimal identifier", id));
            }
        }
    }

    fn root_object(&mut self) {
        let doc = self.doc;
        match doc.root_object() {
            None => self.error("manifest has no rootObject".to_string()),
            Some(root) => match self.isa.get(root).copied() {
                Some("PBXProject") => {}
                Some(other) => self.error(format!(
                    "rootObject `{}` is a {}, not a PBXProject",
                    root, other
                )),
                None => self.error(format!("rootObject `{}` does not exist", root)),
            },
        }
    }

    fn references(&mut self) {
        let mut dangling = Vec::new();
        for (id, object) in self.doc.objects() {
            let singles = SINGLE_REFS
                .iter()
                .filter_map(|key| object.get(key).and_then(Value::as_str).map(|r| (*key, r)));
            let lists = LIST_REFS
                .iter()
                .flat_map(|key| id_list(object, key).into_iter().map(move |r| (*key, r)));

            for (key, target) in singles.chain(lists) {
                if !self.isa.contains_key(target) {
                    dangling.push(format!(
                        "`{}` references missing object `{}` in `{}`",
                        id, target, key
                    ));
                }
            }
        }
        for message in dangling {
            self.error(message);
        }
    }

    fn group_membership(&mut self) {
        let mut parents: HashMap<&str, usize> = HashMap::new();
        for (_, group) in self.doc.objects_of("PBXGroup") {
            for child in id_list(group, "children") {
                *parents.entry(child).or_insert(0) += 1;
            }
        }

        let mut findings = Vec::new();
        for (id, _) in self.doc.objects_of("PBXFileReference") {
            match parents.get(id).copied().unwrap_or(0) {
                1 => {}
                0 => findings.push(format!("file reference `{}` is in no group", id)),
                n => findings.push(format!("file reference `{}` is in {} groups", id, n)),
            }
        }
        for message in findings {
            self.error(message);
        }
    }

    fn build_files(&mut self) {
        let mut in_phase: HashMap<&str, usize> = HashMap::new();
        for (_, object) in self.doc.objects() {
            let is_phase = object
                .get("isa")
                .and_then(Value::as_str)
                .is_some_and(|isa| isa.ends_with("BuildPhase"));
            if is_phase {
                for file in id_list(object, "files") {
                    *in_phase.entry(file).or_insert(0) += 1;
                }
            }
        }

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for (id, build) in self.doc.objects_of("PBXBuildFile") {
            match build.get("fileRef").and_then(Value::as_str) {
                None => errors.push(format!("build file `{}` has no fileRef", id)),
                Some(target) => match self.isa.get(target) {
                    Some(&"PBXFileReference") | None => {}
                    Some(other) => errors.push(format!(
                        "build file `{}` points at a {}, not a PBXFileReference",
                        id, other
                    )),
                },
            }
            if !in_phase.contains_key(id) {
                warnings.push(format!("build file `{}` is not in any build phase", id));
            }
        }
        for message in errors {
            self.error(message);
        }
        for message in warnings {
            self.diagnostics.push(Diagnostic::warning(message));
        }
    }

    fn sources_phase(&mut self) {
        let mut findings = Vec::new();
        for (phase_id, phase) in self.doc.objects_of("PBXSourcesBuildPhase") {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            for file in id_list(phase, "files") {
                *seen.entry(file).or_insert(0) += 1;
                match self.isa.get(file) {
                    Some(&"PBXBuildFile") | None => {}
                    Some(other) => findings.push(format!(
                        "Sources phase `{}` lists `{}`, a {}",
                        phase_id, file, other
                    )),
                }
            }
            let mut repeated: Vec<_> = seen.into_iter().filter(|(_, n)| *n > 1).collect();
            repeated.sort();
            for (file, n) in repeated {
                findings.push(format!(
                    "Sources phase `{}` lists `{}` {} times",
                    phase_id, file, n
                ));
            }
        }
        for message in findings {
            self.error(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::codec::to_string;
    use crate::core::graph::ProjectInfo;
    use crate::patch::{add_files, NewFile};
    use crate::test_support::{write_sample_project, SAMPLE_MANIFEST};
    use tempfile::TempDir;

    fn messages(report: &CheckReport) -> Vec<String> {
        report.diagnostics.iter().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn test_sample_is_clean() {
        let report = check_text(SAMPLE_MANIFEST, "sample").unwrap();
        assert!(report.diagnostics.is_empty(), "{:?}", messages(&report));
        assert_eq!(report.counts["PBXFileReference"], 4);
        assert!(report.objects() > 15);
    }

    #[test]
    fn test_generated_manifest_is_clean() {
        let graph = build_graph(
            ProjectInfo::new("TripBro"),
            ["App.swift", "Views/A.swift", "Views/Detail/B.swift"],
        )
        .unwrap();
        let report = check_text(&to_string(&graph), "generated").unwrap();
        assert!(report.is_ok(), "{:?}", messages(&report));
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_patched_manifest_is_clean() {
        let patched = add_files(
            SAMPLE_MANIFEST,
            &[NewFile::from_path("Store.swift")],
            "TripBro",
        )
        .unwrap();
        let report = check_text(&patched.text, "patched").unwrap();
        assert!(report.is_ok(), "{:?}", messages(&report));
    }

    #[test]
    fn test_dangling_file_ref() {
        let text = SAMPLE_MANIFEST.replace(
            "fileRef = B20000000000000000000001",
            "fileRef = B2000000000000000000FFFF",
        );
        let report = check_text(&text, "broken").unwrap();
        assert!(!report.is_ok());
        assert!(messages(&report)
            .iter()
            .any(|m| m.contains("missing object `B2000000000000000000FFFF` in `fileRef`")));
    }

    #[test]
    fn test_file_in_two_groups() {
        let text = SAMPLE_MANIFEST.replace(
            "\t\t\t\tE10000000000000000000001 /* TripBro.app */,\n",
            "\t\t\t\tE10000000000000000000001 /* TripBro.app */,\n\t\t\t\tB20000000000000000000001 /* Trip.swift */,\n",
        );
        let report = check_text(&text, "broken").unwrap();
        assert_eq!(report.errors(), 1);
        assert!(messages(&report)[0].contains("is in 2 groups"));
    }

    #[test]
    fn test_repeated_sources_entry() {
        let text = SAMPLE_MANIFEST.replace(
            "\t\t\t\tB10000000000000000000003 /* ContentView.swift in Sources */,\n",
            "\t\t\t\tB10000000000000000000003 /* ContentView.swift in Sources */,\n\t\t\t\tB10000000000000000000003 /* ContentView.swift in Sources */,\n",
        );
        let report = check_text(&text, "broken").unwrap();
        assert!(messages(&report)
            .iter()
            .any(|m| m.contains("lists `B10000000000000000000003` 2 times")));
    }

    #[test]
    fn test_malformed_identifier() {
        let text = SAMPLE_MANIFEST.replace(
            "F10000000000000000000001 /* Frameworks */ = {",
            "NOTANID /* Frameworks */ = {",
        );
        let report = check_text(&text, "broken").unwrap();
        assert!(messages(&report)
            .iter()
            .any(|m| m.contains("`NOTANID` is not a 24-digit")));
    }

    #[test]
    fn test_parse_error_is_kept_in_chain() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_sample_project(tmp.path());
        std::fs::write(&manifest, "// !$*UTF8*$!\n{\n\tobjects = {\n").unwrap();

        let err = check(&manifest).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse"));
        assert!(err.downcast_ref::<ParseError>().is_some());
    }

    #[test]
    fn test_check_file_sets_location() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_sample_project(tmp.path());
        let report = check(&manifest).unwrap();
        assert_eq!(report.manifest_path, manifest);
        assert!(report.is_ok());
    }
}
