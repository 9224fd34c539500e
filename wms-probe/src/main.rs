use anyhow::{bail, Context};
use std::path::PathBuf;
use std::sync::Arc;
use wmslayer::{
    ImageSlot, ImageWmsSource, LatLng, LayerConfig, LayerFactory, MapView, Point, Projection,
    TileWmsSource, Viewport, WmsConfig, WmsLayer,
};

const USAGE: &str = "usage: wms-probe <layer.json> [--config <settings.json>] [--zoom <z>] [--fetch]";

struct Args {
    layer: PathBuf,
    config: Option<PathBuf>,
    zoom: f64,
    fetch: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut layer = None;
    let mut config = None;
    let mut zoom = 8.0;
    let mut fetch = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().context(USAGE)?)),
            "--zoom" => {
                zoom = args
                    .next()
                    .context(USAGE)?
                    .parse()
                    .context("--zoom expects a number")?
            }
            "--fetch" => fetch = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown option {}\n{}", other, USAGE),
            other => layer = Some(PathBuf::from(other)),
        }
    }

    Ok(Args {
        layer: layer.context(USAGE)?,
        config,
        zoom,
        fetch,
    })
}

/// URL of the first request the layer would issue for `view`
fn first_request_url(layer: &WmsLayer, view: &Viewport) -> anyhow::Result<String> {
    let source = layer.source().as_any();
    if let Some(image) = source.downcast_ref::<ImageWmsSource>() {
        return Ok(image.image_url(&view.extent(), view.resolution(), 1.0)?);
    }
    if let Some(tiles) = source.downcast_ref::<TileWmsSource>() {
        let z = tiles.grid().zoom_for_resolution(view.resolution());
        let coord = tiles
            .grid()
            .tiles_for_extent(&view.extent(), z)
            .into_iter()
            .next()
            .context("the view does not intersect the layer's bounding box")?;
        return tiles
            .tile_url(coord, 1.0)
            .with_context(|| format!("tile {} is outside the grid", coord));
    }
    bail!("unsupported source")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wmslayer::init_logging();
    let args = parse_args()?;

    let settings = match &args.config {
        Some(path) => WmsConfig::from_file(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        None => WmsConfig::default(),
    };
    let json = std::fs::read_to_string(&args.layer)
        .with_context(|| format!("reading {}", args.layer.display()))?;
    let config = LayerConfig::from_json_str(&json)?;

    let projection = Projection::from_code(&config.projection)?;
    let view = Viewport::new(LatLng::new(46.8, 8.2), args.zoom, Point::new(1024.0, 768.0))
        .with_projection(projection);
    log::debug!("view resolutions: {:?}", MapView::resolutions(&view));

    let factory = LayerFactory::new(settings);
    let handle = factory.create(&config, &view)?;

    println!("layer:   {}", handle.id());
    println!("mode:    {}", handle.layer_type());
    println!("empty:   {}", handle.is_empty());
    println!("visible: {}", handle.is_visible());

    let url = handle.with_layer(|layer| first_request_url(layer, &view))?;
    let loader = factory.loader();
    println!(
        "method:  {} ({} of {} characters)",
        if loader.requires_post(&url) { "POST" } else { "GET" },
        url.len(),
        loader.max_get_url_length()
    );
    println!("url:     {}", url);

    if args.fetch {
        let slot = Arc::new(ImageSlot::new());
        if let Some(task) = loader.load(url, slot.clone()) {
            while !task.is_finished() {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            }
        }
        match slot.get() {
            Some(src) if src.is_data_uri() => {
                println!("result:  data URI, {} characters", src.as_str().len())
            }
            Some(src) => println!("result:  GET {}", src.as_str()),
            None => println!("result:  nothing assigned"),
        }
    }

    Ok(())
}
