//! Layer configuration as delivered by the configuration store

use crate::core::bounds::Bounds;
use crate::prelude::HashMap;
use serde::{Deserialize, Serialize};

/// Flavor of the WMS server, used to express high-DPI requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    Qgis,
    Geoserver,
    Mapserver,
    Carmentaserver,
}

/// Bounding box of a layer in its own projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// `[minx, miny, maxx, maxy]`
    pub bounds: [f64; 4],
    pub crs: String,
}

impl BBox {
    pub fn new(bounds: [f64; 4], crs: impl Into<String>) -> Self {
        Self {
            bounds,
            crs: crs.into(),
        }
    }

    pub fn to_bounds(&self) -> Bounds {
        Bounds::from_array(self.bounds)
    }
}

/// A boolean that configuration files sometimes spell as a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    /// Textual form used in query strings
    pub fn as_text(&self) -> String {
        match self {
            Flag::Bool(value) => value.to_string(),
            Flag::Text(text) => text.clone(),
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag::Bool(value)
    }
}

impl From<&str> for Flag {
    fn from(value: &str) -> Self {
        Flag::Text(value.to_string())
    }
}

fn default_version() -> String {
    "1.3.0".to_string()
}

fn default_visibility() -> bool {
    true
}

/// Immutable description of one WMS layer request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Service URL; may carry vendor parameters in its query string
    pub url: String,
    /// Comma separated WMS layer names
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub transparent: Option<bool>,
    /// Target projection identifier, e.g. `EPSG:3857`
    pub projection: String,
    #[serde(default)]
    pub tiled: Option<Flag>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub dpi: Option<u32>,
    #[serde(default)]
    pub bbox: Option<BBox>,
    #[serde(default)]
    pub tile_size: Option<u32>,
    #[serde(default)]
    pub min_scale: Option<f64>,
    #[serde(default)]
    pub max_scale: Option<f64>,
    #[serde(default)]
    pub server_type: Option<ServerType>,
    /// Extra request parameters; these win over everything else
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
    #[serde(default = "default_visibility")]
    pub visibility: bool,
    /// Bumped by the configuration store to force a refetch
    #[serde(default)]
    pub rev: u64,
    /// Size of the requested image relative to the viewport
    #[serde(default)]
    pub ratio: Option<f64>,
    #[serde(default)]
    pub opacity: Option<f32>,
}

impl LayerConfig {
    pub fn new(url: impl Into<String>, name: impl Into<String>, projection: impl Into<String>) -> Self {
        Self {
            id: None,
            title: None,
            url: url.into(),
            name: name.into(),
            style: None,
            format: None,
            transparent: None,
            projection: projection.into(),
            tiled: None,
            version: default_version(),
            dpi: None,
            bbox: None,
            tile_size: None,
            min_scale: None,
            max_scale: None,
            server_type: None,
            params: HashMap::default(),
            visibility: true,
            rev: 0,
            ratio: None,
            opacity: None,
        }
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Service URL without its query string
    pub fn base_url(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = Some(transparent);
        self
    }

    pub fn with_tiled(mut self, tiled: impl Into<Flag>) -> Self {
        self.tiled = Some(tiled.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    pub fn with_scale_range(mut self, min_scale: Option<f64>, max_scale: Option<f64>) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    pub fn with_server_type(mut self, server_type: ServerType) -> Self {
        self.server_type = Some(server_type);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_visibility(mut self, visibility: bool) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_rev(mut self, rev: u64) -> Self {
        self.rev = rev;
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = Some(ratio);
        self
    }
}
