//! Default locations of ontorec files.
//!
//! ```text
//! ~/.config/ontorec/
//! ├── ontorec.toml       # Settings
//! └── session.toml       # Session store of the CLI
//! ```

use std::path::PathBuf;

use ontorec_core::error::{OntorecError, Result};

const APP_DIR: &str = "ontorec";

pub struct OntorecPaths;

impl OntorecPaths {
    /// Returns the ontorec configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| OntorecError::config("Cannot find config directory"))
    }

    /// Default settings file path.
    pub fn settings_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("ontorec.toml"))
    }

    /// Default session store file path.
    pub fn session_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("session.toml"))
    }
}
