//! Financial concepts configuration loading and validation.
//!
//! This crate provides:
//! - Typed settings for the concept service
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{resolve_config, ConfigPaths, ResolvedConfig};
pub use settings::Settings;
pub use validate::{ValidationError, ValidationResult};
