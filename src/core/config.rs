//! Process-wide settings for WMS request handling
//!
//! These are the knobs a map client reads from its application configuration
//! file. They are injected into the layer factory, the loader and the update
//! scheduler instead of being looked up globally.

use crate::core::constants::{DEFAULT_DPI, DEFAULT_MAX_GET_URL_LENGTH, DEFAULT_UPDATE_DELAY_MS};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WmsConfig {
    /// Request URLs longer than this are sent as POST
    pub max_get_url_length: usize,
    /// DPI used for layers that do not configure their own
    pub wms_dpi: Option<u32>,
    /// Request high-density images on high-DPI displays
    pub wms_hidpi: bool,
    /// Debounce window for live parameter updates
    pub update_delay_ms: u64,
}

impl Default for WmsConfig {
    fn default() -> Self {
        Self {
            max_get_url_length: DEFAULT_MAX_GET_URL_LENGTH,
            wms_dpi: None,
            wms_hidpi: true,
            update_delay_ms: DEFAULT_UPDATE_DELAY_MS,
        }
    }
}

impl WmsConfig {
    /// Parses a JSON document; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_get_url_length == 0 {
            return Err(MapError::Config("maxGetUrlLength must be positive".into()));
        }
        if self.wms_dpi == Some(0) {
            return Err(MapError::Config("wmsDpi must be positive".into()));
        }
        Ok(())
    }

    /// Configured DPI, or the WMS default of 96 when unset or 0
    pub fn default_dpi(&self) -> u32 {
        self.wms_dpi.filter(|dpi| *dpi > 0).unwrap_or(DEFAULT_DPI)
    }

    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }

    pub fn with_max_get_url_length(mut self, length: usize) -> Self {
        self.max_get_url_length = length;
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.wms_dpi = Some(dpi);
        self
    }

    pub fn with_hidpi(mut self, hidpi: bool) -> Self {
        self.wms_hidpi = hidpi;
        self
    }

    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay_ms = delay.as_millis() as u64;
        self
    }
}
