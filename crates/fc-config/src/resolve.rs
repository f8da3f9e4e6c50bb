//! Config resolution: explicit path → `FC_CONFIG` → XDG → defaults.
//!
//! After the file (if any) is loaded, the `FC_LATENCY_MS` and `FC_PAGE_SIZE`
//! environment variables override the matching fields.

use std::fs;
use std::path::{Path, PathBuf};

use fc_common::{Error, Result};
use serde::Serialize;
use tracing::debug;

use crate::settings::Settings;

pub const ENV_CONFIG_PATH: &str = "FC_CONFIG";
pub const ENV_LATENCY_MS: &str = "FC_LATENCY_MS";
pub const ENV_PAGE_SIZE: &str = "FC_PAGE_SIZE";

const DIR_NAME: &str = "fincon";
const CONFIG_FILE: &str = "config.json";

/// Paths supplied by the caller (usually the CLI).
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// `--config <path>`; a missing file here is an error.
    pub explicit: Option<PathBuf>,
}

/// Where the settings came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Explicit(PathBuf),
    Env(PathBuf),
    Xdg(PathBuf),
    Defaults,
}

/// Settings plus their provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub settings: Settings,
    pub source: ConfigSource,
}

/// Resolve settings using the process environment.
pub fn resolve_config(paths: &ConfigPaths) -> Result<ResolvedConfig> {
    resolve_config_with(paths, |key| std::env::var(key).ok())
}

/// Resolve settings with an injectable environment lookup.
pub fn resolve_config_with<F>(paths: &ConfigPaths, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut settings, source) = if let Some(path) = &paths.explicit {
        (load_file(path)?, ConfigSource::Explicit(path.clone()))
    } else if let Some(path) = env(ENV_CONFIG_PATH).map(PathBuf::from) {
        (load_file(&path)?, ConfigSource::Env(path))
    } else {
        match xdg_config_path(&env).filter(|p| p.exists()) {
            Some(path) => (load_file(&path)?, ConfigSource::Xdg(path)),
            None => (Settings::default(), ConfigSource::Defaults),
        }
    };

    if let Some(raw) = env(ENV_LATENCY_MS) {
        settings.latency_ms = parse_override(ENV_LATENCY_MS, &raw)?;
    }
    if let Some(raw) = env(ENV_PAGE_SIZE) {
        settings.page_size = parse_override(ENV_PAGE_SIZE, &raw)?;
    }

    debug!(source = ?source, "resolved configuration");
    Ok(ResolvedConfig { settings, source })
}

fn load_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    Settings::from_json(&content)
        .map_err(|e| Error::Config(format!("invalid config {}: {}", path.display(), e)))
}

fn xdg_config_path<F>(env: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(xdg) = env("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join(DIR_NAME).join(CONFIG_FILE));
    }
    dirs::config_dir().map(|base| base.join(DIR_NAME).join(CONFIG_FILE))
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a non-negative integer, got {:?}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let tmp = TempDir::new().unwrap();
        let env = env_from(&[("XDG_CONFIG_HOME", tmp.path().display().to_string())]);
        let resolved = resolve_config_with(&ConfigPaths::default(), env).unwrap();
        assert_eq!(resolved.source, ConfigSource::Defaults);
        assert_eq!(resolved.settings, Settings::default());
    }

    #[test]
    fn test_explicit_path_wins() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("explicit.json");
        let from_env = tmp.path().join("env.json");
        fs::write(&explicit, r#"{"pageSize": 25}"#).unwrap();
        fs::write(&from_env, r#"{"pageSize": 50}"#).unwrap();

        let paths = ConfigPaths {
            explicit: Some(explicit.clone()),
        };
        let env = env_from(&[(ENV_CONFIG_PATH, from_env.display().to_string())]);
        let resolved = resolve_config_with(&paths, env).unwrap();
        assert_eq!(resolved.settings.page_size, 25);
        assert_eq!(resolved.source, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn test_xdg_file_is_used() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(DIR_NAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), r#"{"actorName": "Tesorero"}"#).unwrap();

        let env = env_from(&[("XDG_CONFIG_HOME", tmp.path().display().to_string())]);
        let resolved = resolve_config_with(&ConfigPaths::default(), env).unwrap();
        assert_eq!(resolved.settings.actor_name, "Tesorero");
        assert!(matches!(resolved.source, ConfigSource::Xdg(_)));
    }

    #[test]
    fn test_env_overrides_apply_last() {
        let tmp = TempDir::new().unwrap();
        let env = env_from(&[
            ("XDG_CONFIG_HOME", tmp.path().display().to_string()),
            (ENV_LATENCY_MS, "0".to_string()),
            (ENV_PAGE_SIZE, " 20 ".to_string()),
        ]);
        let resolved = resolve_config_with(&ConfigPaths::default(), env).unwrap();
        assert_eq!(resolved.settings.latency_ms, 0);
        assert_eq!(resolved.settings.page_size, 20);
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let env = env_from(&[
            ("XDG_CONFIG_HOME", tmp.path().display().to_string()),
            (ENV_LATENCY_MS, "soon".to_string()),
        ]);
        let err = resolve_config_with(&ConfigPaths::default(), env).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let paths = ConfigPaths {
            explicit: Some(PathBuf::from("/nonexistent/fincon.json")),
        };
        let err = resolve_config_with(&paths, |_| None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let paths = ConfigPaths {
            explicit: Some(path),
        };
        let err = resolve_config_with(&paths, |_| None).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
