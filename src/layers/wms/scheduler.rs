//! Debounced propagation of configuration edits into live layers

use crate::core::config::WmsConfig;
use crate::layers::base::LayerTrait;
use crate::layers::wms::config::LayerConfig;
use crate::layers::wms::layer::{lock_layer, LayerHandle};
use crate::layers::wms::params::translate;
use crate::prelude::Duration;
use crate::runtime::{self, async_delay};

/// Coalesces bursts of configuration edits into one parameter push per layer.
///
/// Every qualifying [`update`](Self::update) restarts the layer's timer, so
/// only the last configuration seen within the delay window reaches the
/// source. Hiding a layer is never delayed.
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    settings: WmsConfig,
}

impl UpdateScheduler {
    pub fn new(settings: WmsConfig) -> Self {
        Self { settings }
    }

    pub fn delay(&self) -> Duration {
        self.settings.update_delay()
    }

    /// Whether going from `old` to `new` changes anything sent over the network
    pub fn has_changed(&self, new: &LayerConfig, old: &LayerConfig) -> bool {
        new.rev != old.rev || translate(new, &self.settings) != translate(old, &self.settings)
    }

    /// Schedules a push of `new` into `handle` if it differs from `old`.
    ///
    /// Returns whether a push was scheduled. Without a previous configuration,
    /// or on a source that cannot take live parameter updates, nothing happens.
    pub fn update(&self, handle: &LayerHandle, new: &LayerConfig, old: Option<&LayerConfig>) -> bool {
        let Some(old) = old else {
            return false;
        };
        if !handle.with_layer(|layer| layer.source().supports_param_updates()) {
            return false;
        }
        if !self.has_changed(new, old) {
            return false;
        }

        let params = translate(new, &self.settings).with_cache_bust();
        let visible = new.visibility && params.has_layers();
        let delay = self.delay();
        let shared = handle.shared();

        let mut layer = handle.lock();
        let generation = layer.begin_update();
        if !visible {
            layer.set_visible(false);
        }

        let task = runtime::spawn(async move {
            async_delay(delay).await;
            let mut layer = lock_layer(&shared);
            if layer.apply_update(generation, &params, visible) {
                log::debug!(
                    "pushed parameters to WMS layer '{}' (revision {})",
                    layer.id(),
                    layer.source().revision()
                );
            }
        });
        layer.set_pending(generation, task);

        log::trace!("scheduled WMS update #{} in {:?}", generation, delay);
        true
    }
}
