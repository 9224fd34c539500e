use std::time::Duration;
use wmslayer::prelude::*;

/// Debounce behaviour of live layer updates, driven by tokio's paused clock
#[cfg(test)]
mod scheduler_tests {
    use super::*;

    fn base() -> LayerConfig {
        LayerConfig::new("https://maps.example.org/ows", "roads", "EPSG:3857")
            .with_param("TIME", "2021-01")
    }

    fn setup() -> (LayerHandle, UpdateScheduler) {
        let settings = WmsConfig::default();
        let view = Viewport::new(LatLng::new(46.8, 8.2), 8.0, Point::new(800.0, 600.0));
        let handle = LayerFactory::new(settings.clone())
            .create(&base(), &view)
            .unwrap();
        (handle, UpdateScheduler::new(settings))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_updates_coalesces_into_one_push() {
        let (handle, scheduler) = setup();

        let mut old = base();
        for month in 2..=6 {
            let new = base().with_param("TIME", format!("2021-0{}", month));
            assert!(scheduler.update(&handle, &new, Some(&old)));
            old = new;
            if month < 6 {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(handle.revision(), 0, "no push before the quiet period ends");
        assert!(handle.has_pending_update());
        assert_eq!(handle.params().get("TIME"), Some("2021-01"));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(handle.revision(), 1);
        assert_eq!(handle.params().get("TIME"), Some("2021-06"));
        assert!(!handle.has_pending_update());
        assert!(handle.is_visible());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(handle.revision(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_configuration_is_a_noop() {
        let (handle, scheduler) = setup();

        assert!(!scheduler.update(&handle, &base(), Some(&base())));
        assert!(!handle.has_pending_update());
        assert!(!scheduler.update(&handle, &base().with_param("TIME", "2030"), None));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.revision(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revision_bump_forces_push() {
        let (handle, scheduler) = setup();
        let before = handle.params().cache_token().map(str::to_string);

        assert!(scheduler.update(&handle, &base().with_rev(1), Some(&base())));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(handle.revision(), 1);
        assert!(handle.params().cache_token().is_some());
        assert!(before.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hiding_is_synchronous() {
        let (handle, scheduler) = setup();
        let hidden = base().with_param("TIME", "2022-01").with_visibility(false);

        scheduler.update(&handle, &hidden, Some(&base()));
        assert!(!handle.is_visible(), "hidden before the timer fires");
        assert_eq!(handle.revision(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!handle.is_visible());
        assert_eq!(handle.revision(), 1);
        assert_eq!(handle.params().get("TIME"), Some("2022-01"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_layer_names_hide_and_mark_empty() {
        let (handle, scheduler) = setup();
        let no_layers = LayerConfig::new("https://maps.example.org/ows", "", "EPSG:3857");

        scheduler.update(&handle, &no_layers, Some(&base()));
        assert!(!handle.is_visible());
        assert!(!handle.is_empty(), "empty follows the pushed parameters");

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(handle.is_empty());
        assert!(!handle.is_visible());

        scheduler.update(&handle, &base(), Some(&no_layers));
        assert!(!handle.is_visible(), "showing waits for the push");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(handle.is_visible());
        assert!(!handle.is_empty());
        assert_eq!(handle.revision(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_update() {
        let (handle, scheduler) = setup();

        scheduler.update(&handle, &base().with_param("TIME", "2023"), Some(&base()));
        assert!(handle.cancel_pending_update());
        assert!(!handle.has_pending_update());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.revision(), 0);
        assert_eq!(handle.params().get("TIME"), Some("2021-01"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_delay() {
        let settings = WmsConfig::default().with_update_delay(Duration::from_millis(100));
        let scheduler = UpdateScheduler::new(settings);
        let (handle, _) = setup();

        scheduler.update(&handle, &base().with_param("TIME", "2024"), Some(&base()));
        tokio::time::sleep(Duration::from_millis(101)).await;
        assert_eq!(handle.revision(), 1);
    }

    /// Source whose parameters are fixed at creation
    struct FrozenSource(QueryParameters);

    impl WmsSource for FrozenSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Image
        }

        fn params(&self) -> &QueryParameters {
            &self.0
        }

        fn update_params(&mut self, _params: &QueryParameters) {}

        fn changed(&mut self) {}

        fn revision(&self) -> u64 {
            0
        }

        fn supports_param_updates(&self) -> bool {
            false
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_without_live_updates_is_ignored() {
        let params: QueryParameters = [("LAYERS", "roads")].into_iter().collect();
        let layer = WmsLayer::new(
            LayerProperties::new("frozen".into(), "Frozen".into(), LayerType::Image),
            Box::new(FrozenSource(params)),
        );
        let handle = LayerHandle::new(layer);
        let scheduler = UpdateScheduler::new(WmsConfig::default());

        let hidden = base().with_visibility(false).with_rev(7);
        assert!(!scheduler.update(&handle, &hidden, Some(&base())));
        assert!(handle.is_visible());
        assert!(!handle.has_pending_update());
    }
}
