//! # wmslayer
//!
//! Turns map layer configurations into Web Map Service requests and keeps
//! live layer handles in sync with configuration edits.
//!
//! The crate is organised the same way a map engine is: `core` holds the
//! geometry, projection, viewport and configuration types, `tiles` holds the
//! tile grid, the request sources and the transport, and `layers` ties them
//! together into renderable layer handles.

pub mod core;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod tiles;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    config::WmsConfig,
    geo::{LatLng, Point, TileCoord},
    projection::Projection,
    viewport::Viewport,
};

pub use layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    wms::{
        config::{BBox, LayerConfig, ServerType},
        factory::LayerFactory,
        layer::{LayerHandle, WmsLayer},
        params::{translate, QueryParameters},
        scheduler::UpdateScheduler,
    },
};

pub use tiles::{
    grid::TileGrid,
    loader::{FormPoster, ImageSink, ImageSlot, ImageSrc, PostedImage, ReqwestPoster, WmsLoader},
    source::{ImageWmsSource, SourceKind, TileWmsSource, WmsSource},
};

pub use traits::MapView;

/// Initializes `env_logger` from `RUST_LOG`. Later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    if env_logger::Builder::from_default_env().try_init().is_err() {
        log::debug!("logger already initialized");
    }
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported projection: {0}")]
    Projection(String),

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;
