//! Layered settings resolution (component A, §6).
//!
//! Precedence, highest wins: explicit override > environment (`GDELT_`
//! prefix, case-insensitive) > config file (TOML) > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GdeltError;

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("gdelt-client")
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_master_file_list_ttl_secs() -> u64 {
    300
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_requests() -> usize {
    10
}

fn default_max_concurrent_downloads() -> usize {
    10
}

fn default_fallback_to_bigquery() -> bool {
    true
}

fn default_validate_codes() -> bool {
    true
}

fn default_include_translated() -> bool {
    true
}

fn default_decompressed_size_cap_bytes() -> u64 {
    500 * 1024 * 1024
}

/// The exhaustive settings table from §6, resolved from defaults, an
/// optional TOML file, environment variables, and explicit overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bigquery_project: Option<String>,
    pub bigquery_credentials_path: Option<PathBuf>,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_master_file_list_ttl_secs")]
    pub master_file_list_ttl_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,

    #[serde(default = "default_fallback_to_bigquery")]
    pub fallback_to_bigquery: bool,

    #[serde(default = "default_validate_codes")]
    pub validate_codes: bool,

    #[serde(default = "default_include_translated")]
    pub include_translated: bool,

    #[serde(default = "default_decompressed_size_cap_bytes")]
    pub decompressed_size_cap_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bigquery_project: None,
            bigquery_credentials_path: None,
            cache_dir: default_cache_dir(),
            cache_ttl_secs: default_cache_ttl_secs(),
            master_file_list_ttl_secs: default_master_file_list_ttl_secs(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_concurrent_downloads: default_max_concurrent_downloads(),
            fallback_to_bigquery: default_fallback_to_bigquery(),
            validate_codes: default_validate_codes(),
            include_translated: default_include_translated(),
            decompressed_size_cap_bytes: default_decompressed_size_cap_bytes(),
        }
    }
}

impl Settings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn master_file_list_ttl(&self) -> Duration {
        Duration::from_secs(self.master_file_list_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn bigquery_configured(&self) -> bool {
        self.bigquery_project.is_some()
    }

    /// Loads a TOML config file, layers environment overrides, and returns
    /// the resolved snapshot. Missing file is not an error — defaults (then
    /// env) still apply.
    pub fn load(file_path: Option<&Path>) -> Result<Self, GdeltError> {
        let mut settings = match file_path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path)?;
                toml::from_str(&text)?
            }
            _ => Settings::default(),
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Overlays `GDELT_*` environment variables onto an already-loaded
    /// snapshot. Unset or unparseable variables are left untouched.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_str("GDELT_BIGQUERY_PROJECT") {
            self.bigquery_project = Some(v);
        }
        if let Some(v) = env_str("GDELT_BIGQUERY_CREDENTIALS_PATH") {
            self.bigquery_credentials_path = Some(PathBuf::from(v));
        }
        if let Some(v) = env_str("GDELT_CACHE_DIR") {
            self.cache_dir = PathBuf::from(v);
        }
        if let Some(v) = env_u64("GDELT_CACHE_TTL") {
            self.cache_ttl_secs = v;
        }
        if let Some(v) = env_u64("GDELT_MASTER_FILE_LIST_TTL") {
            self.master_file_list_ttl_secs = v;
        }
        if let Some(v) = env_u64("GDELT_MAX_RETRIES") {
            self.max_retries = v as u32;
        }
        if let Some(v) = env_u64("GDELT_TIMEOUT") {
            self.timeout_secs = v;
        }
        if let Some(v) = env_u64("GDELT_MAX_CONCURRENT_REQUESTS") {
            self.max_concurrent_requests = v as usize;
        }
        if let Some(v) = env_u64("GDELT_MAX_CONCURRENT_DOWNLOADS") {
            self.max_concurrent_downloads = v as usize;
        }
        if let Some(v) = env_bool("GDELT_FALLBACK_TO_BIGQUERY") {
            self.fallback_to_bigquery = v;
        }
        if let Some(v) = env_bool("GDELT_VALIDATE_CODES") {
            self.validate_codes = v;
        }
        if let Some(v) = env_bool("GDELT_INCLUDE_TRANSLATED") {
            self.include_translated = v;
        }
        if let Some(v) = env_u64("GDELT_DECOMPRESSED_SIZE_CAP") {
            self.decompressed_size_cap_bytes = v;
        }
    }
}

/// Case-insensitive lookup over `std::env::vars`, matching §6's
/// "environment (`GDELT_` prefix, case-insensitive)" wording.
fn env_str(key: &str) -> Option<String> {
    std::env::vars()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).and_then(|v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let s = Settings::default();
        assert_eq!(s.cache_ttl_secs, 3600);
        assert_eq!(s.master_file_list_ttl_secs, 300);
        assert_eq!(s.max_retries, 3);
        assert_eq!(s.timeout_secs, 30);
        assert_eq!(s.max_concurrent_requests, 10);
        assert_eq!(s.max_concurrent_downloads, 10);
        assert!(s.fallback_to_bigquery);
        assert!(s.validate_codes);
        assert!(s.include_translated);
        assert_eq!(s.decompressed_size_cap_bytes, 500 * 1024 * 1024);
        assert!(!s.bigquery_configured());
    }

    #[test]
    fn load_with_missing_file_falls_back_to_default() {
        let settings = Settings::load(Some(Path::new("/nonexistent/gdelt.toml"))).unwrap();
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn partial_toml_file_fills_remaining_fields_from_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdelt.toml");
        std::fs::write(&path, "max_retries = 7\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.max_retries, 7);
        assert_eq!(settings.cache_ttl_secs, 3600);
    }

    #[test]
    fn env_override_wins_over_file_and_default() {
        // SAFETY: test-only, single-threaded within this process's test harness slot.
        unsafe {
            std::env::set_var("GDELT_MAX_RETRIES", "9");
        }
        let mut settings = Settings::default();
        settings.apply_env_overrides();
        assert_eq!(settings.max_retries, 9);
        unsafe {
            std::env::remove_var("GDELT_MAX_RETRIES");
        }
    }

    #[test]
    fn env_bool_accepts_common_spellings() {
        assert_eq!(env_bool_for_test("true"), Some(true));
        assert_eq!(env_bool_for_test("0"), Some(false));
        assert_eq!(env_bool_for_test("maybe"), None);
    }

    fn env_bool_for_test(v: &str) -> Option<bool> {
        match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}
