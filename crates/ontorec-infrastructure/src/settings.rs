//! Settings loaded from `ontorec.toml`.
//!
//! Every section and key is optional; a missing file yields the defaults.
//! `ONTOREC_FINTO_URL` and `ONTOREC_SETTINGS` override the file.

use std::env;
use std::path::{Path, PathBuf};

use ontorec_core::budget::Budget;
use ontorec_core::error::{OntorecError, Result};
use ontorec_core::thesaurus::DEFAULT_VOCABULARY;
use serde::{Deserialize, Serialize};

use crate::paths::OntorecPaths;

pub const DEFAULT_FINTO_URL: &str = "https://api.finto.fi/rest/v1";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SEARCH_PATH: &str = "/Search/Results";

/// Thesaurus API connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FintoSettings {
    pub base_url: String,
    pub vocabulary: String,
    /// Per-call timeout in seconds
    pub http_timeout: u64,
}

impl Default for FintoSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FINTO_URL.to_string(),
            vocabulary: DEFAULT_VOCABULARY.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Recommendation module settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OntologySettings {
    /// Positional budget string, see [`Budget::parse`]
    pub settings: String,
    /// Classification rules: "strict" or "lenient"
    pub rules: String,
    /// Path of the search results page follow-up links point to
    pub search_path: String,
}

impl Default for OntologySettings {
    fn default() -> Self {
        Self {
            settings: String::new(),
            rules: "strict".to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
        }
    }
}

impl OntologySettings {
    pub fn budget(&self) -> Result<Budget> {
        Budget::parse(&self.settings)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SessionSettings {
    /// Session store file; defaults to the config directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl SessionSettings {
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => OntorecPaths::session_file(),
        }
    }
}

/// Root of `ontorec.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppSettings {
    pub finto: FintoSettings,
    pub ontology: OntologySettings,
    pub session: SessionSettings,
}

impl AppSettings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `path`, or the defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Settings file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::from_toml_str(&content)
    }

    /// Loads the given file (or the default location) and applies env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => OntorecPaths::settings_file()?,
        };
        let mut settings = Self::load_from(&path)?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("ONTOREC_FINTO_URL") {
            self.finto.base_url = url;
        }
        if let Ok(raw) = env::var("ONTOREC_SETTINGS") {
            self.ontology.settings = raw;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.finto.http_timeout == 0 {
            return Err(OntorecError::config("finto.http_timeout must be positive"));
        }
        if self.finto.vocabulary.trim().is_empty() {
            return Err(OntorecError::config("finto.vocabulary must not be empty"));
        }
        self.ontology.budget()?;
        Ok(())
    }
}
