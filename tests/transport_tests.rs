use async_trait::async_trait;
use std::time::Duration;
use wmslayer::prelude::*;

/// GET/POST negotiation for requests issued by real layer sources
#[cfg(test)]
mod transport_tests {
    use super::*;

    /// Records POSTs and answers with a fixed image, or fails
    #[derive(Default)]
    struct MockPoster {
        fail: bool,
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl FormPoster for MockPoster {
        async fn post_form(&self, url: &str, body: String) -> Result<PostedImage> {
            self.calls.lock().unwrap().push((url.to_string(), body));
            if self.fail {
                return Err(MapError::Transport("HTTP 414 from mock".into()));
            }
            Ok(PostedImage {
                content_type: Some("image/png".into()),
                bytes: vec![0x89, b'P', b'N', b'G'],
            })
        }
    }

    fn factory(poster: Arc<MockPoster>) -> LayerFactory {
        let settings = WmsConfig::default();
        let loader = Arc::new(WmsLoader::with_poster(&settings, poster));
        LayerFactory::with_loader(settings, loader)
    }

    fn view() -> Viewport {
        Viewport::new(LatLng::new(46.8, 8.2), 8.0, Point::new(800.0, 600.0))
    }

    fn long_filter_config() -> LayerConfig {
        let filter = format!("\"id\" IN ({})", vec!["123456"; 400].join(","));
        LayerConfig::new("https://maps.example.org/ows?MAP=demo", "parcels", "EPSG:3857")
            .with_param("FILTER", filter)
    }

    async fn wait_for(task: Box<dyn AsyncHandle>) {
        while !task.is_finished() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    fn image_request(handle: &LayerHandle, view: &Viewport, sink: Arc<ImageSlot>) -> Option<Box<dyn AsyncHandle>> {
        handle.with_layer(|layer| {
            layer
                .source()
                .as_any()
                .downcast_ref::<ImageWmsSource>()
                .unwrap()
                .load_image(&view.extent(), view.resolution(), 1.0, sink)
                .unwrap()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_request_uses_get() {
        let poster = Arc::new(MockPoster::default());
        let view = view();
        let handle = factory(poster.clone())
            .create(&LayerConfig::new("https://maps.example.org/ows", "roads", "EPSG:3857"), &view)
            .unwrap();
        let sink = Arc::new(ImageSlot::new());

        assert!(image_request(&handle, &view, sink.clone()).is_none());
        match sink.get() {
            Some(ImageSrc::Url(url)) => {
                assert!(url.starts_with("https://maps.example.org/ows?"));
                assert!(url.len() <= 2048);
            }
            other => panic!("expected a GET url, got {:?}", other),
        }
        assert!(poster.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_request_is_posted_as_form() {
        let poster = Arc::new(MockPoster::default());
        let view = view();
        let handle = factory(poster.clone())
            .create(&long_filter_config(), &view)
            .unwrap();
        let sink = Arc::new(ImageSlot::new());

        let task = image_request(&handle, &view, sink.clone()).expect("POST runs in the background");
        wait_for(task).await;

        let calls = poster.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (url, body) = &calls[0];
        assert_eq!(url, "https://maps.example.org/ows");
        let form = QueryParameters::from_url(&format!("?{}", body));
        assert_eq!(form.get("REQUEST"), Some("GetMap"));
        assert_eq!(form.get("MAP"), Some("demo"));
        assert!(form.get("FILTER").unwrap().starts_with("\"id\" IN (123456,"));
        assert_eq!(sink.get(), Some(ImageSrc::DataUri("data:image/png;base64,iVBORw==".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_post_degrades_to_get() {
        let poster = Arc::new(MockPoster {
            fail: true,
            ..Default::default()
        });
        let view = view();
        let handle = factory(poster.clone())
            .create(&long_filter_config(), &view)
            .unwrap();
        let sink = Arc::new(ImageSlot::new());

        wait_for(image_request(&handle, &view, sink.clone()).unwrap()).await;

        assert_eq!(poster.calls.lock().unwrap().len(), 1);
        match sink.get() {
            Some(ImageSrc::Url(url)) => assert!(url.len() > 2048),
            other => panic!("expected the original url, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tiles_share_the_negotiation() {
        let poster = Arc::new(MockPoster::default());
        let view = view();
        let config = long_filter_config()
            .with_tiled(true)
            .with_bbox(BBox::new([5.9, 45.8, 10.5, 47.8], "EPSG:4326"));
        let handle = factory(poster.clone()).create(&config, &view).unwrap();
        let sink = Arc::new(ImageSlot::new());

        let task = handle.with_layer(|layer| {
            let tiles = layer
                .source()
                .as_any()
                .downcast_ref::<TileWmsSource>()
                .unwrap();
            let z = tiles.grid().zoom_for_resolution(view.resolution());
            let coord = tiles.grid().tiles_for_extent(&view.extent(), z)[0];
            tiles.load_tile(coord, 1.0, sink.clone()).unwrap()
        });
        wait_for(task.expect("tile request is long enough to POST")).await;

        assert!(sink.get().unwrap().is_data_uri());
        assert_eq!(poster.calls.lock().unwrap().len(), 1);
    }
}
