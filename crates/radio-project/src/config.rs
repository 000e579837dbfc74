use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::document::{DocumentDefaults, DEFAULT_FMOD_PATH, DEFAULT_RADIO_ID, DEFAULT_RADIO_NAME};
use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Where TuneInCrew lives. Remembered across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuneincrew_path: Option<PathBuf>,
}

/// Values used for "new project".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_fmod_path")]
    pub fmod_path: String,
    #[serde(default = "default_radio_id")]
    pub radio_id: String,
    #[serde(default = "default_radio_name")]
    pub radio_name: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            fmod_path: default_fmod_path(),
            radio_id: default_radio_id(),
            radio_name: default_radio_name(),
        }
    }
}

impl DefaultsConfig {
    pub fn document_defaults(&self) -> DocumentDefaults {
        DocumentDefaults {
            fmod_path: self.fmod_path.clone(),
            radio_id: self.radio_id.clone(),
            radio_name: self.radio_name.clone(),
        }
    }
}

fn default_fmod_path() -> String {
    DEFAULT_FMOD_PATH.to_string()
}

fn default_radio_id() -> String {
    DEFAULT_RADIO_ID.to_string()
}

fn default_radio_name() -> String {
    DEFAULT_RADIO_NAME.to_string()
}

impl Config {
    /// Reads `path`, writing a default config there first if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Remember `path` as the TuneInCrew executable if it exists.
    /// Returns whether the stored value changed.
    pub fn remember_tool_path(&mut self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        if self.tool.tuneincrew_path.as_deref() == Some(path) {
            return false;
        }
        self.tool.tuneincrew_path = Some(path.to_path_buf());
        true
    }

    /// The configured tool path, if it still points at a file.
    pub fn tool_path(&self) -> Option<&Path> {
        self.tool
            .tuneincrew_path
            .as_deref()
            .filter(|p| p.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.tool.tuneincrew_path.is_none());
        assert_eq!(config.defaults.radio_id, "EXMP");
        assert_eq!(config.defaults.radio_name, "default");
        assert!(config.defaults.fmod_path.ends_with("fmod_designercl.exe"));
        assert!(Config::config_path().ends_with("tuneincrew-radio/config.toml"));
    }

    #[test]
    fn test_load_creates_file_then_reads_it_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::load_from(&path).unwrap();
        assert!(path.exists());

        config.defaults.radio_name = "Night Drive".into();
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.defaults.radio_name, "Night Drive");
        assert_eq!(reloaded.defaults.radio_id, "EXMP");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[defaults]\nradio_id = \"WXYZ\"\n").unwrap();
        assert_eq!(config.defaults.radio_id, "WXYZ");
        assert_eq!(config.defaults.radio_name, "default");
        assert!(config.tool.tuneincrew_path.is_none());
    }

    #[test]
    fn test_remember_tool_path_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("TuneInCrew.exe");
        let mut config = Config::default();

        assert!(!config.remember_tool_path(&tool));
        std::fs::write(&tool, b"").unwrap();
        assert!(config.remember_tool_path(&tool));
        assert!(!config.remember_tool_path(&tool));
        assert_eq!(config.tool_path(), Some(tool.as_path()));
    }
}
