//! Image and tile sources that turn query parameters into GetMap requests

use crate::core::bounds::Bounds;
use crate::core::constants::DEFAULT_DPI;
use crate::core::geo::TileCoord;
use crate::core::projection::{axis_order, AxisOrder};
use crate::layers::wms::config::ServerType;
use crate::layers::wms::params::QueryParameters;
use crate::prelude::Arc;
use crate::runtime::AsyncHandle;
use crate::tiles::grid::TileGrid;
use crate::tiles::loader::{ImageSink, WmsLoader};
use crate::{MapError, Result};
use std::any::Any;

/// Shape of the requests a source issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Tile,
}

/// Backend of a WMS layer.
///
/// Holds the current query parameters and a revision counter that renderers
/// watch to know when previously fetched imagery is stale.
pub trait WmsSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    fn params(&self) -> &QueryParameters;

    /// Merges `params` into the current parameters
    fn update_params(&mut self, params: &QueryParameters);

    /// Marks the source as changed so it is redrawn
    fn changed(&mut self);

    fn revision(&self) -> u64;

    /// Whether parameters can be replaced on a live source
    fn supports_param_updates(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any;
}

/// Resolves the pixel ratio actually requested from the server
fn effective_pixel_ratio(hidpi: bool, server_type: Option<ServerType>, pixel_ratio: f64) -> f64 {
    if !hidpi || server_type.is_none() || !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
        return 1.0;
    }
    pixel_ratio
}

/// Adds the vendor specific DPI parameter for a hidpi request
fn apply_hidpi(params: &mut QueryParameters, server_type: Option<ServerType>, pixel_ratio: f64) {
    if pixel_ratio == 1.0 {
        return;
    }
    let base_dpi = params
        .get("DPI")
        .and_then(|dpi| dpi.parse::<f64>().ok())
        .unwrap_or(DEFAULT_DPI as f64);
    let dpi = (base_dpi * pixel_ratio).round() as u32;

    match server_type {
        Some(ServerType::Qgis) | Some(ServerType::Carmentaserver) => {
            params.insert("DPI", dpi.to_string());
        }
        Some(ServerType::Geoserver) => {
            let options = match params.get("FORMAT_OPTIONS") {
                Some(existing) if !existing.is_empty() => format!("{};dpi:{}", existing, dpi),
                _ => format!("dpi:{}", dpi),
            };
            params.insert("FORMAT_OPTIONS", options);
        }
        Some(ServerType::Mapserver) => {
            params.insert("MAP_RESOLUTION", dpi.to_string());
        }
        None => {}
    }
}

fn bbox_value(extent: &Bounds, params: &QueryParameters) -> String {
    let crs = params.get("CRS").or_else(|| params.get("SRS")).unwrap_or_default();
    let version = params.get("VERSION").unwrap_or("1.3.0");
    let [min_x, min_y, max_x, max_y] = extent.to_array();
    match axis_order(crs, version) {
        AxisOrder::XY => format!("{},{},{},{}", min_x, min_y, max_x, max_y),
        AxisOrder::LatLon => format!("{},{},{},{}", min_y, min_x, max_y, max_x),
    }
}

/// Assembles a complete GetMap URL
fn get_map_url(
    base_url: &str,
    params: &QueryParameters,
    extent: &Bounds,
    width: u32,
    height: u32,
    server_type: Option<ServerType>,
    pixel_ratio: f64,
) -> String {
    let mut request = params.clone();
    request.insert("SERVICE", "WMS");
    request.insert("REQUEST", "GetMap");
    request.insert("BBOX", bbox_value(extent, params));
    request.insert("WIDTH", width.to_string());
    request.insert("HEIGHT", height.to_string());
    apply_hidpi(&mut request, server_type, pixel_ratio);

    format!("{}?{}", base_url, request.to_query_string())
}

/// Single image per view, sized to the viewport
pub struct ImageWmsSource {
    url: String,
    params: QueryParameters,
    ratio: f64,
    hidpi: bool,
    server_type: Option<ServerType>,
    revision: u64,
    loader: Arc<WmsLoader>,
}

impl ImageWmsSource {
    pub fn new(url: impl Into<String>, params: QueryParameters, loader: Arc<WmsLoader>) -> Self {
        Self {
            url: url.into(),
            params,
            ratio: 1.0,
            hidpi: true,
            server_type: None,
            revision: 0,
            loader,
        }
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_hidpi(mut self, hidpi: bool) -> Self {
        self.hidpi = hidpi;
        self
    }

    pub fn with_server_type(mut self, server_type: Option<ServerType>) -> Self {
        self.server_type = server_type;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn hidpi(&self) -> bool {
        self.hidpi
    }

    pub fn server_type(&self) -> Option<ServerType> {
        self.server_type
    }

    /// GetMap URL covering `extent` buffered by the source ratio
    pub fn image_url(&self, extent: &Bounds, resolution: f64, pixel_ratio: f64) -> Result<String> {
        if !extent.is_valid() {
            return Err(MapError::InvalidExtent(format!("{:?}", extent.to_array())));
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(MapError::Layer(format!("invalid resolution {}", resolution)));
        }

        let pixel_ratio = effective_pixel_ratio(self.hidpi, self.server_type, pixel_ratio);
        let requested = extent.scaled(self.ratio);
        let width = (requested.width() / resolution * pixel_ratio).ceil() as u32;
        let height = (requested.height() / resolution * pixel_ratio).ceil() as u32;

        Ok(get_map_url(
            &self.url,
            &self.params,
            &requested,
            width,
            height,
            self.server_type,
            pixel_ratio,
        ))
    }

    /// Builds the URL for the view and hands it to the loader
    pub fn load_image(
        &self,
        extent: &Bounds,
        resolution: f64,
        pixel_ratio: f64,
        sink: Arc<dyn ImageSink>,
    ) -> Result<Option<Box<dyn AsyncHandle>>> {
        let url = self.image_url(extent, resolution, pixel_ratio)?;
        Ok(self.loader.load(url, sink))
    }
}

impl WmsSource for ImageWmsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Image
    }

    fn params(&self) -> &QueryParameters {
        &self.params
    }

    fn update_params(&mut self, params: &QueryParameters) {
        self.params.merge(params);
    }

    fn changed(&mut self) {
        self.revision += 1;
        log::trace!("image source {} revision {}", self.url, self.revision);
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fixed-size tiles laid out on a [`TileGrid`]
pub struct TileWmsSource {
    urls: Vec<String>,
    params: QueryParameters,
    grid: TileGrid,
    hidpi: bool,
    server_type: Option<ServerType>,
    revision: u64,
    loader: Arc<WmsLoader>,
}

impl TileWmsSource {
    pub fn new(
        urls: Vec<String>,
        params: QueryParameters,
        grid: TileGrid,
        loader: Arc<WmsLoader>,
    ) -> Self {
        Self {
            urls,
            params,
            grid,
            hidpi: true,
            server_type: None,
            revision: 0,
            loader,
        }
    }

    pub fn with_hidpi(mut self, hidpi: bool) -> Self {
        self.hidpi = hidpi;
        self
    }

    pub fn with_server_type(mut self, server_type: Option<ServerType>) -> Self {
        self.server_type = server_type;
        self
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn hidpi(&self) -> bool {
        self.hidpi
    }

    pub fn server_type(&self) -> Option<ServerType> {
        self.server_type
    }

    /// GetMap URL of one tile, `None` when the tile lies outside the grid
    pub fn tile_url(&self, coord: TileCoord, pixel_ratio: f64) -> Option<String> {
        let extent = self.grid.tile_extent(coord)?;
        let base = self
            .urls
            .get((coord.x as usize + coord.y as usize) % self.urls.len().max(1))?;

        let pixel_ratio = effective_pixel_ratio(self.hidpi, self.server_type, pixel_ratio);
        let size = (self.grid.tile_size() as f64 * pixel_ratio).round() as u32;

        Some(get_map_url(
            base,
            &self.params,
            &extent,
            size,
            size,
            self.server_type,
            pixel_ratio,
        ))
    }

    pub fn load_tile(
        &self,
        coord: TileCoord,
        pixel_ratio: f64,
        sink: Arc<dyn ImageSink>,
    ) -> Result<Option<Box<dyn AsyncHandle>>> {
        let url = self
            .tile_url(coord, pixel_ratio)
            .ok_or_else(|| MapError::Layer(format!("tile {} is outside the grid", coord)))?;
        Ok(self.loader.load(url, sink))
    }
}

impl WmsSource for TileWmsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Tile
    }

    fn params(&self) -> &QueryParameters {
        &self.params
    }

    fn update_params(&mut self, params: &QueryParameters) {
        self.params.merge(params);
    }

    fn changed(&mut self) {
        self.revision += 1;
        log::trace!("tile source revision {}", self.revision);
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
