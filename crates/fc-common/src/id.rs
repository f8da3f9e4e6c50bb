//! Concept identity types.
//!
//! A concept is identified by an opaque [`ConceptId`] assigned at creation.
//! The human-facing [`ConceptCode`] is a short label that operators may
//! choose; when they don't, one is generated.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix used for generated concept codes.
pub const GENERATED_CODE_PREFIX: &str = "GEN-";

/// Suffix appended to the code of a cloned concept.
pub const CLONE_CODE_SUFFIX: &str = "-CLONE";

const GENERATED_CODE_LEN: usize = 5;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Opaque, immutable concept identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub String);

impl ConceptId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        ConceptId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConceptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConceptId {
    fn from(s: &str) -> Self {
        ConceptId(s.to_string())
    }
}

/// Short human label for a concept, e.g. `FEE-MANT`.
///
/// Format of generated codes: `GEN-<5 uppercase alphanumerics>`
/// Example: `GEN-K3P9Q`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptCode(pub String);

impl ConceptCode {
    /// Generate a new random code.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let label: String = (0..GENERATED_CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        ConceptCode(format!("{}{}", GENERATED_CODE_PREFIX, label))
    }

    /// Use the operator-supplied code, or generate one when it is absent or blank.
    pub fn or_generate(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(c) if !c.is_empty() => ConceptCode(c.to_string()),
            _ => Self::generate(),
        }
    }

    /// Code for a clone of the concept carrying this code.
    pub fn cloned(&self) -> Self {
        ConceptCode(format!("{}{}", self.0, CLONE_CODE_SUFFIX))
    }

    /// Whether this code was produced by [`ConceptCode::generate`].
    pub fn is_generated(&self) -> bool {
        self.0
            .strip_prefix(GENERATED_CODE_PREFIX)
            .map(|label| {
                label.len() == GENERATED_CODE_LEN
                    && label.bytes().all(|b| CODE_ALPHABET.contains(&b))
            })
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
