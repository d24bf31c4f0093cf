//! Infrastructure adapters: the Finto HTTP client, session storage and settings.

pub mod finto_client;
pub mod paths;
pub mod settings;
pub mod toml_session_store;

pub use crate::finto_client::FintoClient;
pub use crate::paths::OntorecPaths;
pub use crate::settings::{AppSettings, FintoSettings, OntologySettings, SessionSettings};
pub use crate::toml_session_store::TomlSessionStore;
