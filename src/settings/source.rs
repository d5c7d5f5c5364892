use std::{collections::HashMap, fmt, fs, path::Path};

use toml::{Table, Value};
use tracing::{debug, instrument};

use crate::{Result, SettingsError};

/// Read access to the key/value mapping settings are loaded from.
pub trait ConfigSource {
    /// Returns the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Returns every key present in the source.
    fn keys(&self) -> Vec<String>;
}

impl ConfigSource for Table {
    fn get(&self, key: &str) -> Option<Value> {
        Table::get(self, key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        Table::keys(self).cloned().collect()
    }
}

/// Callback fired when a source changes. It carries no diff; watchers
/// re-read whatever they need from the source they are handed.
pub type Watcher = Box<dyn FnMut(&dyn ConfigSource)>;

const SOURCE_OWNER: &str = "settings source";

/// An in-memory TOML table that notifies watchers on every mutation.
#[derive(Default)]
pub struct MapSource {
    values: Table,
    watchers: HashMap<String, Watcher>,
}

impl MapSource {
    /// Creates a source over an existing table.
    pub fn new(values: Table) -> Self {
        Self {
            values,
            watchers: HashMap::new(),
        }
    }

    /// Parses a source from TOML text.
    ///
    /// # Errors
    /// * `SettingsError::TomlParse` - If the text is not a valid TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let values: Table =
            toml::from_str(content).map_err(|e| SettingsError::toml_parse(e, None))?;
        Ok(Self::new(values))
    }

    /// Reads and parses a TOML settings file.
    ///
    /// # Errors
    /// * `SettingsError::Io` - If the file cannot be read
    /// * `SettingsError::TomlParse` - If the file is not valid TOML
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SettingsError::io(&e, path))?;
        let values: Table =
            toml::from_str(&content).map_err(|e| SettingsError::toml_parse(e, Some(path)))?;

        debug!("Loaded {} settings from {}", values.len(), path.display());
        Ok(Self::new(values))
    }

    /// The underlying table.
    pub fn values(&self) -> &Table {
        &self.values
    }

    /// Stores `value` under `key` and notifies watchers.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
        self.notify();
    }

    /// Removes `key` and notifies watchers. Returns the removed value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.values.remove(key);
        self.notify();
        removed
    }

    /// Swaps in a whole new table and notifies watchers.
    pub fn replace(&mut self, values: Table) {
        self.values = values;
        self.notify();
    }

    /// Subscribes `watcher` to changes under `tag`.
    ///
    /// # Errors
    /// * `SettingsError::DuplicateListener` - If `tag` is already subscribed
    pub fn add_on_change(
        &mut self,
        tag: impl Into<String>,
        watcher: impl FnMut(&dyn ConfigSource) + 'static,
    ) -> Result<()> {
        let tag = tag.into();
        if self.watchers.contains_key(&tag) {
            return Err(SettingsError::DuplicateListener {
                tag,
                owner: SOURCE_OWNER.to_string(),
            });
        }

        self.watchers.insert(tag, Box::new(watcher));
        Ok(())
    }

    /// Drops the subscription under `tag`.
    ///
    /// # Errors
    /// * `SettingsError::UnknownListener` - If `tag` is not subscribed
    pub fn clear_on_change(&mut self, tag: &str) -> Result<()> {
        self.watchers
            .remove(tag)
            .map(|_| ())
            .ok_or_else(|| SettingsError::UnknownListener {
                tag: tag.to_string(),
                owner: SOURCE_OWNER.to_string(),
            })
    }

    fn notify(&mut self) {
        let mut watchers = std::mem::take(&mut self.watchers);
        for watcher in watchers.values_mut() {
            watcher(&self.values);
        }

        // Keep anything subscribed while the watchers were out.
        watchers.extend(self.watchers.drain());
        self.watchers = watchers;
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

impl fmt::Debug for MapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapSource")
            .field("values", &self.values)
            .field("watchers", &self.watchers.keys().collect::<Vec<_>>())
            .finish()
    }
}
