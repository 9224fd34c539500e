// LayerTrait is the shared layer operations trait
pub use crate::traits::LayerOperations as LayerTrait;

/// How a WMS layer fetches its imagery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    /// One GetMap image per view, sized to the viewport
    Image,
    /// A grid of fixed-size GetMap tiles
    Tile,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Image => write!(f, "image"),
            LayerType::Tile => write!(f, "tile"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
    pub min_resolution: Option<f64>,
    pub max_resolution: Option<f64>,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        Self {
            id,
            name,
            layer_type,
            z_index: 0,
            opacity: 1.0,
            visible: true,
            min_resolution: None,
            max_resolution: None,
        }
    }
}
