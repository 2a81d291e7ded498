//! Configuration
//!
//! TOML file under `~/.formwork/`, one file per profile. A missing file means
//! defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::aggregates::DEFAULT_TITLE;
use crate::error::{FormsError, Result};

const CONFIG_DIR: &str = ".formwork";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Title given to new forms
    pub default_title: String,
    /// Where the working form is saved
    pub storage_path: PathBuf,
    /// Directory for exported files
    pub export_dir: PathBuf,
    /// Base URL for share links
    pub share_base_url: String,
    /// Seconds between autosaves, 0 disables
    pub autosave_interval_secs: u64,
    /// Default tracing filter
    pub log_level: String,
}

impl Default for FormsConfig {
    fn default() -> Self {
        let base = config_dir().unwrap_or_else(|| PathBuf::from(CONFIG_DIR));
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            storage_path: base.join("form.json"),
            export_dir: PathBuf::from("."),
            share_base_url: "http://localhost:3000/".to_string(),
            autosave_interval_secs: 30,
            log_level: "warn".to_string(),
        }
    }
}

impl FormsConfig {
    /// Load the profile's file from the config directory
    pub fn load(profile: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    /// Load from an explicit path; missing file gives defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FormsError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write to the profile's file
    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| FormsError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let dir = config_dir().ok_or_else(|| FormsError::Config("cannot find home directory".into()))?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(dir.join(filename))
    }

    /// Autosave period; `None` when disabled
    pub fn autosave_interval(&self) -> Option<Duration> {
        (self.autosave_interval_secs > 0).then(|| Duration::from_secs(self.autosave_interval_secs))
    }

    /// Set a key by name, for `config set` style front ends
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_title" => self.default_title = value.to_string(),
            "storage_path" => self.storage_path = PathBuf::from(value),
            "export_dir" => self.export_dir = PathBuf::from(value),
            "share_base_url" => self.share_base_url = value.to_string(),
            "autosave_interval_secs" => {
                self.autosave_interval_secs = value
                    .parse()
                    .map_err(|_| FormsError::Config(format!("not a number of seconds: {}", value)))?
            }
            "log_level" => self.log_level = value.to_string(),
            _ => return Err(FormsError::Config(format!("unknown config key: {}", key))),
        }
        Ok(())
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FormsConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FormsConfig::default());
        assert_eq!(config.default_title, "Untitled Form");
        assert_eq!(config.autosave_interval(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "share_base_url = \"https://forms.example.com/\"\nautosave_interval_secs = 0\n").unwrap();

        let config = FormsConfig::load_from(&path).unwrap();
        assert_eq!(config.share_base_url, "https://forms.example.com/");
        assert_eq!(config.autosave_interval(), None);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let mut config = FormsConfig::default();
        config.set("default_title", "Intake").unwrap();
        config.set("autosave_interval_secs", "5").unwrap();
        config.save_to(&path).unwrap();

        assert_eq!(FormsConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "autosave_interval_secs = \"soon\"").unwrap();
        assert!(matches!(FormsConfig::load_from(&path), Err(FormsError::Config(_))));

        let mut config = FormsConfig::default();
        assert!(matches!(config.set("colour", "blue"), Err(FormsError::Config(_))));
        assert!(matches!(config.set("autosave_interval_secs", "x"), Err(FormsError::Config(_))));
    }

    #[test]
    fn test_profile_file_name() {
        if let Ok(path) = FormsConfig::config_path(Some("work")) {
            assert!(path.ends_with(".formwork/config.work.toml"));
        }
    }
}
