//! Typed settings for the concept service.

use serde::{Deserialize, Serialize};

/// Default currency code applied when a calculation omits one.
pub const DEFAULT_CURRENCY: &str = "BOB";

/// Actor label recorded in audit fields.
pub const DEFAULT_ACTOR: &str = "Admin";

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Simulated round-trip latency of the mock service.
pub const DEFAULT_LATENCY_MS: u64 = 300;

/// Service settings. Every field is optional in the file; missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Currency used when a calculation omits one.
    pub default_currency: String,

    /// Label written to `createdByName` / `updatedByName`.
    pub actor_name: String,

    /// Page size used by the list view until changed.
    pub page_size: usize,

    /// Artificial delay applied before every service operation.
    pub latency_ms: u64,

    /// Start the repository with the demonstration concepts.
    pub seed_demo_data: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            actor_name: DEFAULT_ACTOR.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            latency_ms: DEFAULT_LATENCY_MS,
            seed_demo_data: true,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Settings suitable for tests: no latency, no seed data.
    pub fn for_tests() -> Self {
        Self {
            latency_ms: 0,
            seed_demo_data: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.default_currency, "BOB");
        assert_eq!(s.actor_name, "Admin");
        assert_eq!(s.page_size, 10);
        assert_eq!(s.latency_ms, 300);
        assert!(s.seed_demo_data);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let s = Settings::from_json(r#"{"latencyMs": 0, "defaultCurrency": "USD"}"#).unwrap();
        assert_eq!(s.latency_ms, 0);
        assert_eq!(s.default_currency, "USD");
        assert_eq!(s.page_size, 10);
        assert!(s.seed_demo_data);
    }

    #[test]
    fn test_roundtrip_uses_camel_case() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"seedDemoData\":true"));
        assert!(json.contains("\"pageSize\":10"));
    }
}
