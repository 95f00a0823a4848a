use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-session spell-check capability toggles. A toggle set, not a state
/// machine; orchestration state lives in the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCheckConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_true")]
    pub skip_latex_commands: bool,

    #[serde(default = "default_true")]
    pub skip_math_mode: bool,

    #[serde(default = "default_true")]
    pub skip_code_blocks: bool,

    /// Seed words for the custom dictionary, merged with the persisted set.
    #[serde(default)]
    pub custom_dictionary: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en_US".to_string()
}

impl Default for SpellCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
            skip_latex_commands: true,
            skip_math_mode: true,
            skip_code_blocks: true,
            custom_dictionary: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub language: String,

    /// Base URL of the manuscript backend, e.g. "https://writer.example.org".
    pub backend_url: Option<String>,

    pub project_id: Option<u64>,

    #[serde(default)]
    pub spellcheck: SpellCheckConfig,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            backend_url: None,
            project_id: None,
            spellcheck: SpellCheckConfig::default(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: Option<String>,
        backend_url: Option<String>,
        project_id: Option<u64>,
    ) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        // Load local config (overrides global)
        let local_path = PathBuf::from(".texscribe.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        Ok(config.apply_cli(language, backend_url, project_id))
    }

    /// Apply CLI overrides. Absent flags leave the file-derived values
    /// alone; the spell-check language always tracks the effective one.
    fn apply_cli(
        mut self,
        language: Option<String>,
        backend_url: Option<String>,
        project_id: Option<u64>,
    ) -> Self {
        if let Some(language) = language {
            self.language = language;
        }
        self.spellcheck.language = self.language.clone();
        if backend_url.is_some() {
            self.backend_url = backend_url;
        }
        if project_id.is_some() {
            self.project_id = project_id;
        }
        self
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        if other.language != default_language() {
            self.language = other.language;
        }
        if other.backend_url.is_some() {
            self.backend_url = other.backend_url;
        }
        if other.project_id.is_some() {
            self.project_id = other.project_id;
        }
        if other.max_suggestions != default_max_suggestions() {
            self.max_suggestions = other.max_suggestions;
        }
        self.spellcheck = other.spellcheck;
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "texscribe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn cache_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "texscribe").map(|dirs| dirs.cache_dir().to_path_buf())
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "texscribe").map(|dirs| dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, "en_US");
        assert_eq!(config.max_suggestions, 5);
        assert!(config.spellcheck.enabled);
        assert!(config.spellcheck.skip_math_mode);
    }

    #[test]
    fn test_merge_configs() {
        let base = Config::default();
        let override_config = Config {
            language: "en_GB".to_string(),
            backend_url: Some("http://localhost:8000".to_string()),
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.language, "en_GB");
        assert_eq!(merged.backend_url.as_deref(), Some("http://localhost:8000"));
    }

    #[test]
    fn test_cli_language_only_overrides_when_passed() {
        let file_config = Config {
            language: "en_GB".to_string(),
            ..Default::default()
        };

        let kept = file_config.clone().apply_cli(None, None, None);
        assert_eq!(kept.language, "en_GB");
        assert_eq!(kept.spellcheck.language, "en_GB");

        let overridden = file_config.apply_cli(Some("en_US".to_string()), None, None);
        assert_eq!(overridden.language, "en_US");
        assert_eq!(overridden.spellcheck.language, "en_US");
    }

    #[test]
    fn test_spellcheck_toml_defaults() {
        let parsed: SpellCheckConfig = toml::from_str("language = \"en_GB\"").unwrap();
        assert!(parsed.enabled);
        assert!(parsed.skip_latex_commands);
        assert_eq!(parsed.language, "en_GB");
    }
}
