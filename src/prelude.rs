//! Prelude module for common wmslayer types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use wmslayer::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::WmsConfig,
    geo::{LatLng, Point, TileCoord},
    projection::Projection,
    viewport::Viewport,
};

pub use crate::layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    wms::{
        config::{BBox, LayerConfig, ServerType},
        factory::LayerFactory,
        layer::{LayerHandle, WmsLayer},
        params::{translate, QueryParameters},
        scheduler::UpdateScheduler,
    },
};

pub use crate::runtime::{async_delay, init_runtime, runtime, spawn, AsyncHandle, AsyncSpawner};

pub use crate::tiles::{
    grid::TileGrid,
    loader::{FormPoster, ImageSink, ImageSlot, ImageSrc, PostedImage, ReqwestPoster, WmsLoader},
    source::{ImageWmsSource, SourceKind, TileWmsSource, WmsSource},
};

pub use crate::traits::MapView;

pub use crate::{Error as MapError, Result};

pub use std::{
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

pub use fxhash::FxHashMap as HashMap;

pub use futures::Future;
