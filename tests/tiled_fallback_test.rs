use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;
use wmslayer::prelude::*;

/// Collects warnings so the test can count them
struct WarningCollector {
    warnings: Mutex<Vec<String>>,
}

impl Log for WarningCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.warnings.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static COLLECTOR: WarningCollector = WarningCollector {
    warnings: Mutex::new(Vec::new()),
};

/// The logger is process global, so this binary holds a single test
#[test]
fn test_tiled_without_bbox_falls_back_to_image_with_one_warning() {
    log::set_logger(&COLLECTOR).unwrap();
    log::set_max_level(LevelFilter::Warn);

    let factory = LayerFactory::new(WmsConfig::default());
    let view = Viewport::new(LatLng::new(46.8, 8.2), 8.0, Point::new(800.0, 600.0));
    let config = LayerConfig::new("https://maps.example.org/ows", "roads", "EPSG:3857").with_tiled(true);

    let handle = factory.create(&config, &view).expect("downgrade is not an error");

    assert_eq!(handle.layer_type(), LayerType::Image);
    assert_eq!(handle.source_kind(), SourceKind::Image);
    assert_eq!(handle.params().get("TILED"), Some("true"));

    let warnings = COLLECTOR.warnings.lock().unwrap();
    let fallbacks: Vec<_> = warnings
        .iter()
        .filter(|message| message.contains("without specifying bounding box"))
        .collect();
    assert_eq!(fallbacks.len(), 1, "warnings: {:?}", *warnings);
}
