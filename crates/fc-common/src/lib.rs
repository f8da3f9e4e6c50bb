//! Financial concepts common types, IDs, and errors.
//!
//! This crate provides foundational types shared across fc-core modules:
//! - Concept identity and code types
//! - The unified error type surfaced to operators
//! - Schema versioning for JSON output

pub mod error;
pub mod id;
pub mod schema;

pub use error::{Error, Result};
pub use id::{ConceptCode, ConceptId};
pub use schema::SCHEMA_VERSION;
