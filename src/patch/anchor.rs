//! Locating insertion points in existing manifest text.
//!
//! Anchors are found by pattern search over the raw text. The group and
//! build phase anchors are resolved by structural role (the group whose
//! `path` is the source root, the Sources phase of the native target), never
//! by a hard-coded identifier.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::codec::Section;

/// The four insertion points, in the order they are patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Just after the `PBXBuildFile` section header
    BuildFileSection,
    /// Just after the `PBXFileReference` section header
    FileReferenceSection,
    /// Start of the source root group's `children` list
    GroupChildren,
    /// Start of the target's Sources phase `files` list
    SourcesFiles,
}

impl Anchor {
    pub const ORDER: [Anchor; 4] = [
        Anchor::BuildFileSection,
        Anchor::FileReferenceSection,
        Anchor::GroupChildren,
        Anchor::SourcesFiles,
    ];

    pub fn describe(&self) -> &'static str {
        match self {
            Anchor::BuildFileSection => "PBXBuildFile section header",
            Anchor::FileReferenceSection => "PBXFileReference section header",
            Anchor::GroupChildren => "source group children list",
            Anchor::SourcesFiles => "Sources build phase files list",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

static RECORD_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*([0-9A-Fa-f]{24})(?:[ \t]*/\*.*?\*/)?[ \t]*=[ \t]*\{")
        .expect("valid regex")
});

static PATH_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s;{])path = ("(?:[^"\\]|\\.)*"|[^;\s]+);"#).expect("valid regex")
});

static CHILDREN_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"children = \([ \t]*\r?\n").expect("valid regex"));

static FILES_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"files = \([ \t]*\r?\n").expect("valid regex"));

static BUILD_PHASES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"buildPhases = \(([^)]*)\)").expect("valid regex"));

static PRODUCT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s;{])productType = ("(?:[^"\\]|\\.)*"|[^;\s]+);"#).expect("valid regex")
});

static NAME_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s;{])name = ("(?:[^"\\]|\\.)*"|[^;\s]+);"#).expect("valid regex")
});

/// `productType` of an application target.
const APPLICATION_PRODUCT: &str = "com.apple.product-type.application";

static OBJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9A-Fa-f]{24}\b").expect("valid regex"));

/// An object record located in raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpan<'a> {
    pub id: &'a str,
    /// Byte range of the `{ ... }` body, braces included
    pub body: Range<usize>,
}

impl<'a> RecordSpan<'a> {
    pub fn body_text(&self, text: &'a str) -> &'a str {
        &text[self.body.clone()]
    }
}

/// Offset just past the header line of `section`.
pub fn section_header_end(text: &str, section: Section) -> Option<usize> {
    let pattern = format!(r"{}[ \t]*\r?\n", regex::escape(&section.begin_marker()));
    let re = Regex::new(&pattern).ok()?;
    re.find(text).map(|m| m.end())
}

/// Byte range between the begin and end markers of `section`.
pub fn section_range(text: &str, section: Section) -> Option<Range<usize>> {
    let begin = section.begin_marker();
    let start = text.find(&begin)? + begin.len();
    let end = start + text[start..].find(&section.end_marker())?;
    Some(start..end)
}

/// Object records written inside `section`, in text order.
pub fn records_in_section(text: &str, section: Section) -> Vec<RecordSpan<'_>> {
    let Some(range) = section_range(text, section) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    let mut pos = range.start;
    while pos < range.end {
        let Some(caps) = RECORD_START.captures_at(&text[..range.end], pos) else {
            break;
        };
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let open = whole.end() - 1;
        let Some(close) = matching_brace(text, open) else {
            break;
        };
        records.push(RecordSpan {
            id: id.as_str(),
            body: open..close + 1,
        });
        pos = close + 1;
    }
    records
}

/// Position of the `}` closing the `{` at `open`, skipping quoted strings and
/// comments.
pub fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..].find("*/")?;
                i += 2 + end + 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Strip quotes and escapes from a scalar as written in the text.
pub fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// The `path` value of a record body, if any.
pub fn record_path(body: &str) -> Option<String> {
    PATH_FIELD
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| unquote(m.as_str()))
}

/// Paths of every file reference already in the text.
pub fn file_reference_paths(text: &str) -> Vec<String> {
    records_in_section(text, Section::FileReference)
        .iter()
        .filter_map(|r| record_path(r.body_text(text)))
        .collect()
}

/// Insertion point inside the children list of the group whose `path` is
/// `source_root`.
pub fn group_children(text: &str, source_root: &str) -> Option<usize> {
    let group = records_in_section(text, Section::Group)
        .into_iter()
        .find(|r| record_path(r.body_text(text)).as_deref() == Some(source_root))?;
    let m = CHILDREN_OPEN.find(group.body_text(text))?;
    Some(group.body.start + m.end())
}

fn record_field(re: &Regex, body: &str) -> Option<String> {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| unquote(m.as_str()))
}

/// The application target's record.
///
/// With several application targets, the one named `source_root` wins; if
/// none or more than one match, the target is ambiguous and `None` is
/// returned. A manifest with a single target of any type uses that target.
fn application_target<'a>(text: &'a str, source_root: &str) -> Option<RecordSpan<'a>> {
    let targets = records_in_section(text, Section::NativeTarget);
    if targets.len() == 1 {
        return targets.into_iter().next();
    }

    let apps: Vec<_> = targets
        .into_iter()
        .filter(|t| {
            record_field(&PRODUCT_TYPE, t.body_text(text)).as_deref() == Some(APPLICATION_PRODUCT)
        })
        .collect();
    if apps.len() == 1 {
        return apps.into_iter().next();
    }

    let mut named = apps
        .into_iter()
        .filter(|t| record_field(&NAME_FIELD, t.body_text(text)).as_deref() == Some(source_root));
    match (named.next(), named.next()) {
        (Some(target), None) => Some(target),
        _ => None,
    }
}

/// Insertion point inside the files list of the application target's
/// Sources phase.
///
/// Without any target record the only Sources phase is used. An ambiguous
/// target yields `None` rather than a guess.
pub fn sources_files(text: &str, source_root: &str) -> Option<usize> {
    let phases = records_in_section(text, Section::SourcesBuildPhase);
    let has_targets = !records_in_section(text, Section::NativeTarget).is_empty();

    let phase = if has_targets {
        let target = application_target(text, source_root)?;
        let caps = BUILD_PHASES.captures(target.body_text(text))?;
        let ids: Vec<&str> = OBJECT_ID
            .find_iter(caps.get(1)?.as_str())
            .map(|m| m.as_str())
            .collect();
        phases
            .into_iter()
            .find(|p| ids.iter().any(|id| id.eq_ignore_ascii_case(p.id)))?
    } else if phases.len() == 1 {
        phases.into_iter().next()?
    } else {
        return None;
    };

    let m = FILES_OPEN.find(phase.body_text(text))?;
    Some(phase.body.start + m.end())
}

/// Resolve `anchor` in `text`, returning the insertion offset.
pub fn locate(anchor: Anchor, text: &str, source_root: &str) -> Option<usize> {
    match anchor {
        Anchor::BuildFileSection => section_header_end(text, Section::BuildFile),
        Anchor::FileReferenceSection => section_header_end(text, Section::FileReference),
        Anchor::GroupChildren => group_children(text, source_root),
        Anchor::SourcesFiles => sources_files(text, source_root),
    }
}
