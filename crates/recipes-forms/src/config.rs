//! Form engine configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::value_objects::{ImagePolicy, ALLOWED_IMAGE_TYPES, MAX_IMAGE_BYTES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Quiet period after a blur before the availability check runs
    pub debounce_ms: u64,
    pub max_image_bytes: u64,
    pub allowed_image_types: Vec<String>,
    /// Uploads are stored under `<prefix>/<unix millis>`
    pub upload_path_prefix: String,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            max_image_bytes: MAX_IMAGE_BYTES,
            allowed_image_types: ALLOWED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
            upload_path_prefix: "recipes".to_string(),
        }
    }
}

impl FormsConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn image_policy(&self) -> ImagePolicy {
        ImagePolicy {
            max_bytes: self.max_image_bytes,
            allowed_types: self.allowed_image_types.clone(),
        }
    }

    pub fn upload_path(&self, at: DateTime<Utc>) -> String {
        format!("{}/{}", self.upload_path_prefix.trim_end_matches('/'), at.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults_match_image_policy() {
        let config = FormsConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.image_policy(), ImagePolicy::default());
    }

    #[test]
    fn test_upload_path() {
        let config = FormsConfig {
            upload_path_prefix: "recipes/".into(),
            ..Default::default()
        };
        let at = Utc.timestamp_millis_opt(1_514_764_800_123).unwrap();
        assert_eq!(config.upload_path(at), "recipes/1514764800123");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: FormsConfig = serde_json::from_str(r#"{ "debounce_ms": 250 }"#).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.upload_path_prefix, "recipes");
    }
}
