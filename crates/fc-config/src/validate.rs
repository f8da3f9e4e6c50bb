//! Semantic validation of settings.

use serde::Serialize;

use crate::settings::Settings;

/// Upper bound on the page size an operator may configure.
pub const MAX_PAGE_SIZE: usize = 100;

/// Upper bound on the simulated latency.
pub const MAX_LATENCY_MS: u64 = 10_000;

/// A single validation problem, tied to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All issues found; empty means valid.
pub type ValidationResult = Vec<ValidationError>;

/// Check settings for values the service cannot work with.
pub fn validate(settings: &Settings) -> ValidationResult {
    let mut errors = Vec::new();

    if settings.default_currency.trim().is_empty() {
        errors.push(ValidationError {
            field: "defaultCurrency",
            message: "must not be empty".to_string(),
        });
    }

    if settings.actor_name.trim().is_empty() {
        errors.push(ValidationError {
            field: "actorName",
            message: "must not be empty".to_string(),
        });
    }

    if settings.page_size == 0 || settings.page_size > MAX_PAGE_SIZE {
        errors.push(ValidationError {
            field: "pageSize",
            message: format!("must be in 1..={}, got {}", MAX_PAGE_SIZE, settings.page_size),
        });
    }

    if settings.latency_ms > MAX_LATENCY_MS {
        errors.push(ValidationError {
            field: "latencyMs",
            message: format!("must be at most {}, got {}", MAX_LATENCY_MS, settings.latency_ms),
        });
    }

    errors
}
