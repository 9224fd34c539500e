//! Construction of WMS layer handles from layer configurations

use crate::core::config::WmsConfig;
use crate::core::constants::TILE_SIZE;
use crate::layers::base::{LayerProperties, LayerType};
use crate::layers::wms::config::LayerConfig;
use crate::layers::wms::layer::{LayerHandle, WmsLayer};
use crate::layers::wms::params::{translate, QueryParameters};
use crate::prelude::Arc;
use crate::tiles::grid::TileGrid;
use crate::tiles::loader::WmsLoader;
use crate::tiles::source::{ImageWmsSource, TileWmsSource, WmsSource};
use crate::traits::MapView;
use crate::Result;

/// Builds image or tile layers, sharing one loader between all of them
#[derive(Clone)]
pub struct LayerFactory {
    settings: WmsConfig,
    loader: Arc<WmsLoader>,
}

impl LayerFactory {
    pub fn new(settings: WmsConfig) -> Self {
        let loader = Arc::new(WmsLoader::new(&settings));
        Self { settings, loader }
    }

    /// Uses a caller supplied loader, e.g. one with a custom poster
    pub fn with_loader(settings: WmsConfig, loader: Arc<WmsLoader>) -> Self {
        Self { settings, loader }
    }

    pub fn settings(&self) -> &WmsConfig {
        &self.settings
    }

    pub fn loader(&self) -> &Arc<WmsLoader> {
        &self.loader
    }

    /// Creates a layer handle for `config` on `view`.
    ///
    /// A tiled request without a bounding box is downgraded to a single image
    /// layer with a warning. Failures to reproject the bounding box or to
    /// convert scale limits into resolutions are returned as errors.
    pub fn create(&self, config: &LayerConfig, view: &dyn MapView) -> Result<LayerHandle> {
        let params = translate(config, &self.settings).with_cache_bust();

        let bbox = match (params.is_tiled(), config.bbox.as_ref()) {
            (true, Some(bbox)) => Some(bbox),
            (true, None) => {
                log::warn!("Tiled WMS requested without specifying bounding box, falling back to non-tiled.");
                None
            }
            (false, _) => None,
        };

        let dpi = self.settings.default_dpi() as f64;
        let min_resolution = config
            .min_scale
            .map(|scale| view.resolution_for_scale(scale, &config.projection, dpi))
            .transpose()?;
        let max_resolution = config
            .max_scale
            .map(|scale| view.resolution_for_scale(scale, &config.projection, dpi))
            .transpose()?;

        let (layer_type, source): (LayerType, Box<dyn WmsSource>) = match bbox {
            Some(bbox) => {
                let extent = view.reproject_bounds(&bbox.to_bounds(), &bbox.crs, &config.projection)?;
                let grid = TileGrid::new(
                    extent,
                    config.tile_size.unwrap_or(TILE_SIZE),
                    view.resolutions(),
                )?;
                let source = TileWmsSource::new(
                    vec![config.base_url().to_string()],
                    params,
                    grid,
                    self.loader.clone(),
                )
                .with_hidpi(self.settings.wms_hidpi)
                .with_server_type(config.server_type);
                (LayerType::Tile, Box::new(source) as Box<dyn WmsSource>)
            }
            None => {
                let source = ImageWmsSource::new(config.base_url(), params, self.loader.clone())
                    .with_ratio(config.ratio.unwrap_or(1.0))
                    .with_hidpi(self.settings.wms_hidpi)
                    .with_server_type(config.server_type);
                (LayerType::Image, Box::new(source) as Box<dyn WmsSource>)
            }
        };

        let mut properties = LayerProperties::new(
            config.id.clone().unwrap_or_else(|| config.name.clone()),
            config.title.clone().unwrap_or_else(|| config.name.clone()),
            layer_type,
        );
        properties.visible = config.visibility;
        properties.opacity = config.opacity.unwrap_or(1.0).clamp(0.0, 1.0);
        properties.min_resolution = min_resolution;
        properties.max_resolution = max_resolution;

        let layer = WmsLayer::new(properties, source);
        log::debug!(
            "created {} WMS layer '{}' (empty: {})",
            layer_type,
            config.name,
            layer.is_empty()
        );
        Ok(LayerHandle::new(layer))
    }

    /// Parameters `create` would send, without the cache-busting token
    pub fn params_for(&self, config: &LayerConfig) -> QueryParameters {
        translate(config, &self.settings)
    }
}
