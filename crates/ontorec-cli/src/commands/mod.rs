pub mod deferred;
pub mod memory;
pub mod recommend;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ontorec_core::session::{InMemorySessionStore, SessionStore};
use ontorec_core::thesaurus::ThesaurusService;
use ontorec_infrastructure::{AppSettings, FintoClient, TomlSessionStore};

/// Loads settings from `config` or the default location.
pub(crate) fn load_settings(config: Option<&Path>) -> Result<AppSettings> {
    AppSettings::load(config).context("Failed to load settings")
}

/// Thesaurus and session collaborators built from settings.
///
/// With `ephemeral` the show counter lives only for this process.
pub(crate) fn build_services(
    settings: &AppSettings,
    ephemeral: bool,
) -> Result<(Arc<dyn ThesaurusService>, Arc<dyn SessionStore>)> {
    let thesaurus = FintoClient::new(&settings.finto).context("Failed to create Finto client")?;
    Ok((Arc::new(thesaurus), session_store(settings, ephemeral)?))
}

/// The configured session store, or a process-local one.
pub(crate) fn session_store(settings: &AppSettings, ephemeral: bool) -> Result<Arc<dyn SessionStore>> {
    if ephemeral {
        return Ok(Arc::new(InMemorySessionStore::new()));
    }

    let path = settings
        .session
        .resolved_store_path()
        .context("Failed to resolve session store path")?;
    tracing::debug!("Using session store {:?}", path);
    Ok(Arc::new(TomlSessionStore::with_path(path)))
}
