//! Shared trait abstractions at the seams between the adapter and its host.

use crate::{core::bounds::Bounds, Result};

/// What a layer needs to know about the map it is added to
///
/// The map view supplies the resolution ladder used for tile grids and the
/// coordinate conversions the layer factory delegates. [`Viewport`] provides
/// an implementation backed by the built-in projections; hosts with their own
/// projection engine implement this trait instead.
///
/// [`Viewport`]: crate::core::viewport::Viewport
pub trait MapView {
    /// Resolutions of the view's zoom levels in map units per pixel, coarsest or finest first
    fn resolutions(&self) -> Vec<f64>;

    /// Reprojects `bounds` from the `from` projection into `to`
    fn reproject_bounds(&self, bounds: &Bounds, from: &str, to: &str) -> Result<Bounds>;

    /// Converts a scale denominator into a resolution in `projection`
    fn resolution_for_scale(&self, scale: f64, projection: &str, dpi: f64) -> Result<f64>;
}

/// Common operations of every layer the adapter hands to a renderer
pub trait LayerOperations: Send + Sync {
    /// Get layer ID
    fn id(&self) -> &str;

    /// Get layer name
    fn name(&self) -> &str;

    /// Get layer type
    fn layer_type(&self) -> crate::layers::base::LayerType;

    /// Check if layer is visible
    fn is_visible(&self) -> bool;

    /// Set layer visibility
    fn set_visible(&mut self, visible: bool);

    /// Get layer opacity (0.0 to 1.0)
    fn opacity(&self) -> f32;

    /// Set layer opacity
    fn set_opacity(&mut self, opacity: f32);

    /// Get layer z-index for ordering
    fn z_index(&self) -> i32;

    /// Set layer z-index
    fn set_z_index(&mut self, z_index: i32);

    /// Lowest resolution (inclusive) at which the layer is drawn
    fn min_resolution(&self) -> Option<f64>;

    /// Highest resolution (exclusive) at which the layer is drawn
    fn max_resolution(&self) -> Option<f64>;

    /// Whether a renderer should draw the layer at `resolution`
    fn visible_at_resolution(&self, resolution: f64) -> bool {
        self.is_visible()
            && self.min_resolution().map_or(true, |min| resolution >= min)
            && self.max_resolution().map_or(true, |max| resolution < max)
    }

    /// Serializable description of the layer
    fn options(&self) -> serde_json::Value;

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
