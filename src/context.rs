use std::sync::Arc;

use crate::io::config_io::{ConfigError, validate_config};
use crate::model::config::ParserConfig;
use crate::model::settings::{Settings, SettingsProvider};
use crate::ops::hydrate::Hydrator;
use crate::parse::sigils::Sigils;
use crate::util::ids::{IdGenerator, UuidIds};

/// Everything a parse or an incremental edit needs besides the text itself.
///
/// The sigil patterns are compiled once here. Ids come from the injected
/// generator; the hydrator is optional and the settings provider is
/// consulted only by hydration.
#[derive(Clone)]
pub struct BoardContext {
    config: ParserConfig,
    sigils: Arc<Sigils>,
    ids: Arc<dyn IdGenerator>,
    hydrator: Option<Arc<dyn Hydrator>>,
    settings: Arc<dyn SettingsProvider>,
}

impl BoardContext {
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        validate_config(&config)?;
        let sigils = Sigils::new(&config)?;
        Ok(BoardContext {
            config,
            sigils: Arc::new(sigils),
            ids: Arc::new(UuidIds),
            hydrator: None,
            settings: Arc::new(Settings::new()),
        })
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_hydrator(mut self, hydrator: Arc<dyn Hydrator>) -> Self {
        self.hydrator = Some(hydrator);
        self
    }

    pub fn with_settings(mut self, settings: Arc<dyn SettingsProvider>) -> Self {
        self.settings = settings;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn sigils(&self) -> &Sigils {
        &self.sigils
    }

    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }

    pub fn hydrator(&self) -> Option<&dyn Hydrator> {
        self.hydrator.as_deref()
    }

    pub fn settings(&self) -> &dyn SettingsProvider {
        self.settings.as_ref()
    }
}

impl std::fmt::Debug for BoardContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardContext")
            .field("config", &self.config)
            .field("has_hydrator", &self.hydrator.is_some())
            .finish_non_exhaustive()
    }
}
