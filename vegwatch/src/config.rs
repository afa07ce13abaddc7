//! Configuration file support.
//!
//! Settings are read from a TOML file (`vegwatch.toml` by default). Every
//! field has a default so an absent file or section is valid.
//!
//! ```toml
//! [service]
//! base_url = "http://localhost:8500"
//! percentage_path = "/api/sentinel/percentage"
//! image_media_type = "image/png"
//!
//! [form]
//! input_mode = "point"      # or "polygon"
//! fixed_field_size = 15000  # hides the size field
//! index = "evi"             # or "ndvi"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collect::global_variables::{
    DEFAULT_BASE_URL, DEFAULT_IMAGE_MEDIA_TYPE, PERCENTAGE_PATH, SERVICE_URL_ENV,
};
use crate::collect::request::IndexChoice;
use crate::error::ConfigError;
use crate::geometric::area_of_interest::InputMode;

/// Name of the configuration file searched in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "vegwatch.toml";

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub form: FormSettings,
}

/// Remote service location and payload settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_percentage_path")]
    pub percentage_path: String,
    #[serde(default = "default_image_media_type")]
    pub image_media_type: String,
}

/// Hosting form settings, injected into the controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSettings {
    #[serde(default)]
    pub input_mode: InputMode,
    #[serde(default)]
    pub fixed_field_size: Option<u32>,
    #[serde(default)]
    pub index: IndexChoice,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_percentage_path() -> String {
    PERCENTAGE_PATH.to_string()
}

fn default_image_media_type() -> String {
    DEFAULT_IMAGE_MEDIA_TYPE.to_string()
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            percentage_path: default_percentage_path(),
            image_media_type: default_image_media_type(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let display = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Load `vegwatch.toml` from the working directory, or defaults when
    /// the file does not exist. The environment override is applied either way.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `VEGWATCH_SERVICE_URL` when set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        let url = env::var(SERVICE_URL_ENV).ok();
        self.with_service_url(url)
    }

    fn with_service_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.service.base_url = url.trim().to_string();
        }
        self
    }
}
