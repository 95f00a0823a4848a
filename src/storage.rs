use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

// Fixed store keys, mirroring the persisted client state.
pub const KEY_CUSTOM_DICTIONARY: &str = "spellcheck.customDictionary";
pub const KEY_EDITOR_FONT_SIZE: &str = "editor.fontSize";
pub const KEY_AUTO_PREVIEW: &str = "editor.autoPreview";
pub const KEY_PDF_ZOOM: &str = "pdf.zoom";
pub const KEY_PDF_SCROLL: &str = "pdf.scroll";
pub const KEY_PDF_COLOR_MODE: &str = "pdf.colorMode";

/// JSON-file-backed key/value store for client state. Everything here is
/// best-effort: a missing or unreadable store yields defaults, and write
/// failures are logged, never surfaced as errors.
pub struct ClientStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Value>,
}

impl ClientStore {
    /// Open the store at the default data-dir location.
    pub fn open_default() -> Self {
        match crate::config::Config::data_dir() {
            Some(dir) => Self::open(dir.join("client_state.json")),
            None => {
                eprintln!("Warning: no data directory available, client state will not persist");
                Self::in_memory()
            }
        }
    }

    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(err) => {
                    eprintln!(
                        "Warning: ignoring malformed client state {}: {}",
                        path.display(),
                        err
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self {
            path: Some(path),
            entries,
        }
    }

    /// A store that never touches disk. Used in tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.entries.insert(key.to_string(), json);
                self.flush();
            }
            Err(err) => eprintln!("Warning: failed to serialize store entry {}: {}", key, err),
        }
    }

    pub fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }

    pub fn custom_dictionary(&self) -> Vec<String> {
        self.get(KEY_CUSTOM_DICTIONARY).unwrap_or_default()
    }

    pub fn set_custom_dictionary(&mut self, words: &[String]) {
        self.set(KEY_CUSTOM_DICTIONARY, &words);
    }

    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!("Warning: failed to create state directory: {}", err);
                return;
            }
        }

        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(err) = fs::write(path, json) {
                    eprintln!("Warning: failed to persist client state: {}", err);
                }
            }
            Err(err) => eprintln!("Warning: failed to serialize client state: {}", err),
        }
    }
}
