use std::{cell::RefCell, rc::Rc};

use tracing::{debug, warn};

use crate::{
    Result,
    logging::{LogLevel, LoggingContext},
};

use super::{ConfigSource, DiagnosticSink, MapSource, Setting, SettingChange, SettingsRegistry};

/// Name of the setting controlling plugin verbosity.
pub const LOG_LEVEL: &str = "log_level";

/// Settings of one plugin, kept in sync with its settings source.
///
/// Wires a registry holding the `log_level` setting to a source
/// subscription and to the logging context, and undoes both on `deinit`.
#[derive(Debug)]
pub struct PluginSettings {
    tag: String,
    registry: Rc<RefCell<SettingsRegistry>>,
}

impl PluginSettings {
    /// Registers the plugin settings, subscribes to `source` under `tag`,
    /// performs the initial reload and sets the logging context to the
    /// resolved level.
    ///
    /// # Errors
    /// * `SettingsError::DuplicateListener` - If `tag` is already subscribed to `source`
    /// * `SettingsError::Logging` - If the logging subscriber has been dropped
    pub fn init(
        source: &mut MapSource,
        tag: impl Into<String>,
        default_log_level: LogLevel,
        logging: &LoggingContext,
        diagnostics: impl DiagnosticSink + 'static,
    ) -> Result<Self> {
        let tag = tag.into();
        let mut registry = SettingsRegistry::new(diagnostics);

        let mut log_level = Setting::log_level(LOG_LEVEL, &default_log_level.to_string())?;
        let context = logging.clone();
        log_level.add_listener(tag.as_str(), move |change: &SettingChange| {
            if let Err(e) = context.on_log_level_change(change) {
                warn!("Failed to apply log level: {}", e);
            }
        })?;
        registry.register(log_level)?;

        let registry = Rc::new(RefCell::new(registry));
        let watched = Rc::downgrade(&registry);
        source.add_on_change(tag.as_str(), move |source: &dyn ConfigSource| {
            if let Some(registry) = watched.upgrade() {
                registry.borrow_mut().reload(source);
            }
        })?;

        registry.borrow_mut().reload(&*source);

        let settings = Self { tag, registry };
        logging.set_level(settings.log_level()?)?;
        debug!("Initialized settings for '{}'", settings.tag);

        Ok(settings)
    }

    /// Unsubscribes from `source` and detaches this plugin's listeners.
    ///
    /// # Errors
    /// * `SettingsError::UnknownListener` - If the subscription is already gone
    pub fn deinit(self, source: &mut MapSource) -> Result<()> {
        debug!("Deleting settings for '{}'", self.tag);
        source.clear_on_change(&self.tag)?;
        self.registry.borrow_mut().detach(&self.tag);
        Ok(())
    }

    /// The tag this plugin subscribes under.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The shared registry.
    pub fn registry(&self) -> Rc<RefCell<SettingsRegistry>> {
        Rc::clone(&self.registry)
    }

    /// The active log level.
    ///
    /// # Errors
    /// * `SettingsError::UnknownSetting` - If the registry lost the setting
    pub fn log_level(&self) -> Result<LogLevel> {
        let registry = self.registry.borrow();
        let value = registry.value(LOG_LEVEL)?;
        Ok(value
            .as_str()
            .and_then(|level| level.parse().ok())
            .unwrap_or_default())
    }
}
