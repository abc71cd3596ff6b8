//! Client configuration

use recipes_forms::FormsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash
    pub api_url: String,
    /// Image storage endpoint
    pub upload_url: String,
    /// Session token file; defaults to `~/.recipes/token`
    pub token_path: Option<PathBuf>,
    /// Logging level
    pub log_level: String,
    pub forms: FormsConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api/v1".into(),
            upload_url: "http://localhost:8000/api/v1/images".into(),
            token_path: None,
            log_level: "info".into(),
            forms: FormsConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load `~/.recipes/config.toml` (or `config.<profile>.toml`);
    /// a missing file yields the defaults
    pub fn load(profile: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn token_file(&self) -> Result<PathBuf> {
        match &self.token_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::home()?.join("token")),
        }
    }

    fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(Self::home()?.join(filename))
    }

    fn home() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ClientError::NoHomeDir)?;
        Ok(home.join(".recipes"))
    }
}
