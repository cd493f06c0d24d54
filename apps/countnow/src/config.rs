//! # Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. `countnow.toml` (or the file given with `--config`)
//! 3. `COUNTNOW_*` environment variables
//! 4. CLI flags (applied by the command layer)

use countnow_core::CountNowError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file read when no `--config` is given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "countnow.toml";

/// Default requests per second for the global rate limiter.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    /// Base URL used to build share links.
    pub public_url: String,
    pub api_key: Option<String>,
    /// Comma-separated origins, or `*`.
    pub cors_origins: Option<String>,
    /// Requests per second, 0 disables limiting.
    pub rate_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            database: PathBuf::from("countnow.db"),
            public_url: "http://localhost:8080".into(),
            api_key: None,
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

impl Settings {
    /// Load defaults, then the config file, then the process environment.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CountNowError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, CountNowError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CountNowError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, CountNowError> {
        toml::from_str(raw).map_err(|e| CountNowError::SerializationError(format!("Invalid config: {}", e)))
    }

    /// Override fields from `COUNTNOW_*` variables found through `lookup`.
    ///
    /// Unparseable numbers are logged and ignored; empty key/origin values
    /// clear the setting.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("COUNTNOW_HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("COUNTNOW_PORT") {
            match v.parse() {
                Ok(port) => self.port = port,
                Err(e) => tracing::warn!("Ignoring COUNTNOW_PORT '{}': {}", v, e),
            }
        }
        if let Some(v) = lookup("COUNTNOW_DATABASE") {
            self.database = PathBuf::from(v);
        }
        if let Some(v) = lookup("COUNTNOW_PUBLIC_URL") {
            self.public_url = v;
        }
        if let Some(v) = lookup("COUNTNOW_API_KEY") {
            self.api_key = Some(v).filter(|k| !k.is_empty());
        }
        if let Some(v) = lookup("COUNTNOW_CORS_ORIGINS") {
            self.cors_origins = Some(v).filter(|o| !o.trim().is_empty());
        }
        if let Some(v) = lookup("COUNTNOW_RATE_LIMIT") {
            match v.parse() {
                Ok(rps) => self.rate_limit = rps,
                Err(e) => tracing::warn!("Ignoring COUNTNOW_RATE_LIMIT '{}': {}", v, e),
            }
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================
