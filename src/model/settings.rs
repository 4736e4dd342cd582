use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Settings keys whose change invalidates previously derived card data.
/// Date and time triggers are read from `ParserConfig`, not from settings.
const REPARSE_KEYS: &[&str] = &["metadata-keys", "date-format", "time-format"];

/// Read-only key lookup over board settings
pub trait SettingsProvider: Send + Sync {
    fn setting(&self, key: &str) -> Option<&Value>;

    fn setting_str(&self, key: &str) -> Option<&str> {
        self.setting(key).and_then(Value::as_str)
    }

    fn setting_bool(&self, key: &str) -> Option<bool> {
        self.setting(key).and_then(Value::as_bool)
    }
}

/// Opaque key/value settings stored in a board's settings block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub IndexMap<String, Value>);

impl Settings {
    pub fn new() -> Self {
        Settings(IndexMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys to surface from linked files. Accepts plain strings or
    /// `{ "metadataKey": "..." }` objects; duplicates are dropped.
    pub fn metadata_keys(&self) -> Vec<String> {
        metadata_keys(self)
    }
}

impl SettingsProvider for Settings {
    fn setting(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// Board settings in front of a fallback provider
pub struct LayeredSettings<'a> {
    pub board: &'a Settings,
    pub fallback: &'a dyn SettingsProvider,
}

impl SettingsProvider for LayeredSettings<'_> {
    fn setting(&self, key: &str) -> Option<&Value> {
        self.board.get(key).or_else(|| self.fallback.setting(key))
    }
}

pub(crate) fn metadata_keys(settings: &dyn SettingsProvider) -> Vec<String> {
    let Some(Value::Array(entries)) = settings.setting("metadata-keys") else {
        return Vec::new();
    };

    let mut keys: Vec<String> = Vec::new();
    for entry in entries {
        let key = match entry {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("metadataKey").and_then(Value::as_str),
            _ => None,
        };
        if let Some(key) = key {
            if !key.is_empty() && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

/// Whether moving from `old` to `new` settings requires cards to be re-derived.
pub fn settings_require_reparse(old: Option<&Settings>, new: &Settings) -> bool {
    match old {
        None => true,
        Some(old) => REPARSE_KEYS.iter().any(|k| old.get(k) != new.get(k)),
    }
}
