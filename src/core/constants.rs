//! Engine-wide defaults for WMS request construction.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Rendering density assumed by WMS servers when no DPI is configured.
pub const DEFAULT_DPI: u32 = 96;

/// Longest request URL still sent as a plain GET.
pub const DEFAULT_MAX_GET_URL_LENGTH: usize = 2048;

/// Quiet period before a configuration edit is pushed to a layer.
pub const DEFAULT_UPDATE_DELAY_MS: u64 = 500;

/// Image format requested when the layer does not specify one.
pub const DEFAULT_FORMAT: &str = "image/png";

/// Query key carrying the cache-busting timestamp.
pub const CACHE_BUST_PARAM: &str = "__t";

/// Conversion factor used for scale denominators.
pub const INCHES_PER_METER: f64 = 39.37;

/// Length of one degree along the equator, in meters.
pub const METERS_PER_DEGREE: f64 = 111_194.874_284_681_18;

/// Equatorial radius of the Web Mercator sphere.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Zoom level range of the default resolution ladder.
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 18;
