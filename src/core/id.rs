//! Object identifiers and their allocation.
//!
//! Every object in a manifest is keyed by a 24-digit uppercase hex token.
//! Tokens are drawn from a random 96-bit space; the allocator additionally
//! rejects anything it has already handed out and, when extending an existing
//! manifest, anything that already appears in that manifest's text.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Number of hex digits in a rendered identifier.
pub const ID_LEN: usize = 24;

/// How many candidates an allocation may reject before giving up.
pub const MAX_ATTEMPTS: usize = 64;

const ID_MASK: u128 = (1u128 << 96) - 1;

/// A manifest object identifier (96 bits, rendered as 24 hex digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u128);

impl ObjectId {
    /// Build an identifier from the low 96 bits of `value`.
    pub fn from_u128(value: u128) -> Self {
        ObjectId(value & ID_MASK)
    }

    /// Raw 96-bit value.
    pub fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:024X}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdError::Malformed(s.to_string()));
        }
        u128::from_str_radix(s, 16)
            .map(ObjectId)
            .map_err(|_| IdError::Malformed(s.to_string()))
    }
}

/// Identifier allocation and parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("could not allocate a unique identifier after {attempts} attempts")]
    Exhausted { attempts: usize },

    #[error("`{0}` is not a 24-digit hex identifier")]
    Malformed(String),
}

/// A source of candidate identifiers.
pub trait IdSource {
    fn next_id(&mut self) -> ObjectId;
}

/// Random identifiers taken from the top 96 bits of a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&mut self) -> ObjectId {
        ObjectId::from_u128(Uuid::new_v4().as_u128() >> 32)
    }
}

impl<F> IdSource for F
where
    F: FnMut() -> ObjectId,
{
    fn next_id(&mut self) -> ObjectId {
        self()
    }
}

/// Hands out identifiers that are unique within one manifest.
///
/// The allocator lives for the duration of a single generation or patch
/// operation; there is no persistent ledger.
pub struct IdAllocator<S = UuidSource> {
    source: S,
    issued: HashSet<ObjectId>,
    corpus: Option<String>,
}

impl IdAllocator<UuidSource> {
    /// Allocator for a manifest built from scratch.
    pub fn new() -> Self {
        Self::with_source(UuidSource)
    }

    /// Allocator for extending the manifest whose full text is `text`.
    pub fn for_existing(text: &str) -> Self {
        Self::with_source(UuidSource).with_corpus(text)
    }
}

impl Default for IdAllocator<UuidSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: IdSource> IdAllocator<S> {
    /// Allocator drawing candidates from a custom source.
    pub fn with_source(source: S) -> Self {
        IdAllocator {
            source,
            issued: HashSet::new(),
            corpus: None,
        }
    }

    /// Reject any candidate that occurs verbatim in `text`.
    pub fn with_corpus(mut self, text: &str) -> Self {
        self.corpus = Some(text.to_string());
        self
    }

    /// Mark an identifier as taken.
    pub fn reserve(&mut self, id: ObjectId) {
        self.issued.insert(id);
    }

    /// Number of identifiers issued or reserved so far.
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Allocate a fresh identifier.
    pub fn allocate(&mut self) -> Result<ObjectId, IdError> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = self.source.next_id();
            if self.is_taken(candidate) {
                tracing::debug!("identifier {} already taken, retrying", candidate);
                continue;
            }
            self.issued.insert(candidate);
            return Ok(candidate);
        }

        Err(IdError::Exhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    fn is_taken(&self, candidate: ObjectId) -> bool {
        if self.issued.contains(&candidate) {
            return true;
        }
        match &self.corpus {
            Some(text) => text.contains(&candidate.to_string()),
            None => false,
        }
    }
}
