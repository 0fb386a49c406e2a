//! Structural reader for manifest text.
//!
//! Used to verify generated output and to check manifests on disk. The
//! incremental patcher deliberately does not go through this reader: it
//! edits text in place so unrelated content survives byte-for-byte.

use std::collections::BTreeMap;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::core::value::Value;

/// Deepest nesting accepted before the input is rejected.
const MAX_DEPTH: usize = 128;

/// Malformed manifest text.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("{message}")]
#[diagnostic(code(pbxgen::codec::parse))]
pub struct ParseError {
    pub message: String,
    /// Byte offset of the problem
    pub offset: usize,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

/// A parsed manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Value,
}

impl Document {
    /// All entries of the `objects` map, in text order.
    pub fn objects(&self) -> &[(String, Value)] {
        self.root
            .get("objects")
            .and_then(Value::as_dict)
            .unwrap_or_default()
    }

    pub fn object(&self, id: &str) -> Option<&Value> {
        self.objects()
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v)
    }

    /// Objects whose `isa` equals `isa`.
    pub fn objects_of<'a>(&'a self, isa: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.objects()
            .iter()
            .filter(move |(_, v)| v.get("isa").and_then(Value::as_str) == Some(isa))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn root_object(&self) -> Option<&str> {
        self.root.get("rootObject").and_then(Value::as_str)
    }

    /// Number of objects per `isa`.
    pub fn section_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (_, object) in self.objects() {
            if let Some(isa) = object.get("isa").and_then(Value::as_str) {
                *counts.entry(isa.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Identifiers listed in the array property `key` of `object`.
pub fn id_list<'a>(object: &'a Value, key: &str) -> Vec<&'a str> {
    object
        .get(key)
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .collect()
}

/// Parse manifest text.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    parse_named(text, "project.pbxproj")
}

/// Parse manifest text, naming the source `name` in errors.
pub fn parse_named(text: &str, name: &str) -> Result<Document, ParseError> {
    let mut parser = Parser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        name,
    };
    parser.skip_trivia()?;
    let root = parser.value(0)?;
    parser.skip_trivia()?;
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected content after the top-level object"));
    }
    if root.as_dict().is_none() {
        return Err(parser.error_at(0, "top-level value must be a dictionary"));
    }
    Ok(Document { root })
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    name: &'a str,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> ParseError {
        let offset = offset.min(self.bytes.len());
        let len = usize::from(offset < self.bytes.len());
        ParseError {
            message: message.into(),
            offset,
            src: NamedSource::new(self.name, self.text.to_string()),
            span: (offset, len).into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while let Some(b) = self.peek() {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let start = self.pos;
                    match self.text[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => return Err(self.error_at(start, "unterminated comment")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseError> {
        self.skip_trivia()?;
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", byte as char)))
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, ParseError> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.skip_trivia()?;
        match self.peek() {
            Some(b'{') => self.dict(depth),
            Some(b'(') => self.array(depth),
            Some(_) => self.string().map(Value::String),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn dict(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.pos += 1;
        let mut entries = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Dict(entries));
            }
            let key = self.string()?;
            self.expect(b'=')?;
            let value = self.value(depth + 1)?;
            self.expect(b';')?;
            entries.push((key, value));
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b')') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value(depth + 1)?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {}
                _ => return Err(self.error("expected `,` or `)`")),
            }
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(b'"') => self.quoted(),
            Some(b) if is_bare_byte(b) => {
                let start = self.pos;
                while self.peek().is_some_and(is_bare_byte) {
                    self.pos += 1;
                }
                Ok(self.text[start..self.pos].to_string())
            }
            Some(_) => Err(self.error("expected a string")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn quoted(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.text[self.pos..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, other)) => out.push(other),
                    None => break,
                },
                c => out.push(c),
            }
        }
        Err(self.error_at(start, "unterminated string"))
    }
}

fn is_bare_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'/' | b':' | b'.' | b'-' | b'+')
}
