//! Version stamp for JSON documents the CLI emits.

/// Schema version carried by listing envelopes and script outcomes.
///
/// Bumped on the major component when a field is removed or changes type;
/// new optional fields bump the minor component.
pub const SCHEMA_VERSION: &str = "1.0.0";
