//! Property values of manifest objects.
//!
//! The manifest format knows three shapes: strings, ordered arrays and
//! ordered dictionaries. References to other objects are strings holding an
//! identifier, optionally annotated with the target's display name.

use std::borrow::Cow;

use crate::core::id::ObjectId;

/// A property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A scalar string (numbers are strings too in this format).
    String(String),
    /// A reference to another object, with an optional display comment.
    Ref(ObjectId, Option<String>),
    /// An ordered list of values.
    Array(Vec<Value>),
    /// An ordered key/value mapping.
    Dict(Vec<(String, Value)>),
}

impl Value {
    /// Reference to `id` rendered with a `/* comment */`.
    pub fn reference(id: ObjectId, comment: impl Into<String>) -> Self {
        Value::Ref(id, Some(comment.into()))
    }

    /// Reference to `id` rendered bare.
    pub fn bare_ref(id: ObjectId) -> Self {
        Value::Ref(id, None)
    }

    pub fn empty_array() -> Self {
        Value::Array(Vec::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up `key` in a dictionary value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// String form of a scalar or reference value.
    pub fn scalar(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Ref(id, _) => Some(Cow::Owned(id.to_string())),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Whether `s` may be written without quotes.
///
/// Letters, digits, `_` and interior dots are allowed; everything else
/// (spaces, slashes, hyphens, `$`, `<`, the empty string) forces quoting.
pub fn is_bare(s: &str) -> bool {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
}

/// Render a string scalar, quoting and escaping when needed.
pub fn quote(s: &str) -> Cow<'_, str> {
    if is_bare(s) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    Cow::Owned(out)
}

/// Render the body of a `/* ... */` comment, keeping it from closing early.
pub fn comment(s: &str) -> Cow<'_, str> {
    if s.contains("*/") {
        Cow::Owned(s.replace("*/", "* /"))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifiers_are_bare() {
        assert!(is_bare("PBXGroup"));
        assert!(is_bare("sourcecode.swift"));
        assert!(is_bare("TripBro.app"));
        assert!(is_bare("17.0"));
        assert!(is_bare("YES_AGGRESSIVE"));
    }

    #[test]
    fn test_special_strings_are_quoted() {
        assert_eq!(quote("<group>"), "\"<group>\"");
        assert_eq!(quote("Views/ContentView.swift"), "\"Views/ContentView.swift\"");
        assert_eq!(quote("Xcode 14.0"), "\"Xcode 14.0\"");
        assert_eq!(quote("gnu++20"), "\"gnu++20\"");
        assert_eq!(quote("$(TARGET_NAME)"), "\"$(TARGET_NAME)\"");
        assert_eq!(quote("dwarf-with-dsym"), "\"dwarf-with-dsym\"");
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn test_odd_dots_are_quoted() {
        assert!(!is_bare(".hidden"));
        assert!(!is_bare("trailing."));
        assert!(!is_bare("a..b"));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn test_dict_lookup() {
        let v = Value::Dict(vec![
            ("isa".to_string(), Value::from("PBXGroup")),
            ("name".to_string(), Value::from("Products")),
        ]);
        assert_eq!(v.get("name").and_then(Value::as_str), Some("Products"));
        assert!(v.get("path").is_none());
    }

    #[test]
    fn test_comment_cannot_terminate_early() {
        assert_eq!(comment("a */ b"), "a * / b");
        assert_eq!(comment("plain"), "plain");
    }
}
