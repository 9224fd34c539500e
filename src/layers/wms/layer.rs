use crate::layers::base::{LayerProperties, LayerTrait, LayerType};
use crate::layers::wms::params::QueryParameters;
use crate::prelude::{Arc, Mutex};
use crate::runtime::AsyncHandle;
use crate::tiles::source::{SourceKind, WmsSource};
use std::sync::MutexGuard;

/// Debounced push waiting for its timer
struct PendingUpdate {
    task: Box<dyn AsyncHandle>,
    generation: u64,
}

/// A WMS layer: layer properties plus the source that issues its requests
pub struct WmsLayer {
    properties: LayerProperties,
    source: Box<dyn WmsSource>,
    empty: bool,
    pending: Option<PendingUpdate>,
    generation: u64,
}

impl WmsLayer {
    pub fn new(properties: LayerProperties, source: Box<dyn WmsSource>) -> Self {
        let empty = !source.params().has_layers();
        Self {
            properties,
            source,
            empty,
            pending: None,
            generation: 0,
        }
    }

    pub fn source(&self) -> &dyn WmsSource {
        self.source.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut dyn WmsSource {
        self.source.as_mut()
    }

    /// True when no layer names are requested; renderers skip the network then
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn has_pending_update(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancels the scheduled push, if any. Returns whether one was pending.
    ///
    /// The generation moves on as well, so a timer that has already fired
    /// and is waiting for the layer lock no longer applies its parameters.
    pub fn cancel_pending_update(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.task.cancel();
                self.generation += 1;
                true
            }
            None => false,
        }
    }

    /// Supersedes any scheduled push and returns the generation of the next one
    pub(crate) fn begin_update(&mut self) -> u64 {
        self.cancel_pending_update();
        self.generation += 1;
        self.generation
    }

    pub(crate) fn set_pending(&mut self, generation: u64, task: Box<dyn AsyncHandle>) {
        self.pending = Some(PendingUpdate { task, generation });
    }

    /// Pushes `params` into the source if `generation` is still the latest.
    ///
    /// A timer that already woke up when it was superseded finds a newer
    /// generation here and leaves the layer alone.
    pub(crate) fn apply_update(
        &mut self,
        generation: u64,
        params: &QueryParameters,
        visible: bool,
    ) -> bool {
        if generation != self.generation {
            return false;
        }

        self.properties.visible = visible;
        self.source.update_params(params);
        self.source.changed();
        self.empty = !self.source.params().has_layers();
        if self
            .pending
            .as_ref()
            .map_or(false, |pending| pending.generation == generation)
        {
            self.pending = None;
        }
        true
    }
}

impl LayerTrait for WmsLayer {
    crate::impl_layer_trait!(WmsLayer, properties);

    fn options(&self) -> serde_json::Value {
        let params: serde_json::Map<String, serde_json::Value> = self
            .source
            .params()
            .iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
            .collect();

        serde_json::json!({
            "id": self.properties.id,
            "type": self.properties.layer_type.to_string(),
            "visible": self.properties.visible,
            "opacity": self.properties.opacity,
            "empty": self.empty,
            "revision": self.source.revision(),
            "params": params,
        })
    }
}

impl std::fmt::Debug for WmsLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WmsLayer")
            .field("id", &self.properties.id)
            .field("layer_type", &self.properties.layer_type)
            .field("visible", &self.properties.visible)
            .field("empty", &self.empty)
            .field("revision", &self.source.revision())
            .field("pending_update", &self.pending.is_some())
            .finish()
    }
}

/// Shared handle to a [`WmsLayer`], handed to the renderer and the update scheduler
#[derive(Clone, Debug)]
pub struct LayerHandle {
    inner: Arc<Mutex<WmsLayer>>,
}

impl LayerHandle {
    pub fn new(layer: WmsLayer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(layer)),
        }
    }

    pub(crate) fn shared(&self) -> Arc<Mutex<WmsLayer>> {
        self.inner.clone()
    }

    /// Locks the layer. A panic in another holder does not make the layer unusable.
    pub fn lock(&self) -> MutexGuard<'_, WmsLayer> {
        lock_layer(&self.inner)
    }

    pub fn with_layer<R>(&self, f: impl FnOnce(&WmsLayer) -> R) -> R {
        let guard = self.lock();
        f(&*guard)
    }

    pub fn with_layer_mut<R>(&self, f: impl FnOnce(&mut WmsLayer) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    pub fn id(&self) -> String {
        self.with_layer(|layer| layer.id().to_string())
    }

    pub fn layer_type(&self) -> LayerType {
        self.with_layer(|layer| layer.layer_type())
    }

    pub fn source_kind(&self) -> SourceKind {
        self.with_layer(|layer| layer.source().kind())
    }

    pub fn is_visible(&self) -> bool {
        self.with_layer(|layer| layer.is_visible())
    }

    pub fn set_visible(&self, visible: bool) {
        self.with_layer_mut(|layer| layer.set_visible(visible));
    }

    pub fn is_empty(&self) -> bool {
        self.with_layer(WmsLayer::is_empty)
    }

    /// Snapshot of the source's current parameters
    pub fn params(&self) -> QueryParameters {
        self.with_layer(|layer| layer.source().params().clone())
    }

    pub fn revision(&self) -> u64 {
        self.with_layer(|layer| layer.source().revision())
    }

    pub fn min_resolution(&self) -> Option<f64> {
        self.with_layer(|layer| layer.min_resolution())
    }

    pub fn max_resolution(&self) -> Option<f64> {
        self.with_layer(|layer| layer.max_resolution())
    }

    pub fn has_pending_update(&self) -> bool {
        self.with_layer(WmsLayer::has_pending_update)
    }

    /// Must be called before discarding a handle with a scheduled update
    pub fn cancel_pending_update(&self) -> bool {
        self.with_layer_mut(WmsLayer::cancel_pending_update)
    }

    pub fn options(&self) -> serde_json::Value {
        self.with_layer(|layer| layer.options())
    }
}

pub(crate) fn lock_layer(layer: &Mutex<WmsLayer>) -> MutexGuard<'_, WmsLayer> {
    layer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
