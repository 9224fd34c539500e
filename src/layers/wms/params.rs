//! Translation of layer configurations into WMS query parameters

use crate::core::config::WmsConfig;
use crate::core::constants::{CACHE_BUST_PARAM, DEFAULT_FORMAT};
use crate::layers::wms::config::{Flag, LayerConfig};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// WMS query parameters keyed by upper-case protocol key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParameters(BTreeMap<String, String>);

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under the upper-cased `key`, replacing any previous value
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(key.as_ref().to_ascii_uppercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(&key.to_ascii_uppercase())
            .or_else(|| self.0.get(key))
            .map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0
            .remove(&key.to_ascii_uppercase())
            .or_else(|| self.0.remove(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copies every entry of `other` over this mapping
    pub fn merge(&mut self, other: &QueryParameters) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Requested layer names, empty when none are configured
    pub fn layers(&self) -> &str {
        self.get("LAYERS").unwrap_or_default()
    }

    pub fn has_layers(&self) -> bool {
        !self.layers().is_empty()
    }

    pub fn is_tiled(&self) -> bool {
        self.get("TILED")
            .map_or(false, |value| value.eq_ignore_ascii_case("true"))
    }

    /// Appends the current time as the cache-busting token
    pub fn with_cache_bust(self) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        self.with_cache_token(millis.to_string())
    }

    /// Appends an explicit cache-busting token
    pub fn with_cache_token(mut self, token: impl Into<String>) -> Self {
        // The token key is sent verbatim, not upper-cased
        self.0.insert(CACHE_BUST_PARAM.to_string(), token.into());
        self
    }

    pub fn cache_token(&self) -> Option<&str> {
        self.0.get(CACHE_BUST_PARAM).map(String::as_str)
    }

    /// `application/x-www-form-urlencoded` serialization
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Parses the query string of `url`, upper-casing every key.
    ///
    /// Anything that does not look like a query yields an empty mapping.
    pub fn from_url(url: &str) -> Self {
        let mut params = Self::new();
        let Some((_, query)) = url.split_once('?') else {
            return params;
        };
        let query = query.split('#').next().unwrap_or_default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            params.insert(key, value.into_owned());
        }
        params
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn json_param_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Builds the WMS query parameters for `config`.
///
/// Precedence, lowest first: parameters embedded in the service URL, the
/// fixed keys derived from the configuration, TILED and DPI resolution, then
/// the configuration's extra parameters. Never fails and is deterministic;
/// callers append the cache-busting token themselves.
pub fn translate(config: &LayerConfig, settings: &WmsConfig) -> QueryParameters {
    let embedded = QueryParameters::from_url(&config.url);
    let mut params = embedded.clone();

    params.insert("LAYERS", config.name.clone());
    params.insert("STYLES", config.style.clone().unwrap_or_default());
    params.insert(
        "FORMAT",
        config
            .format
            .clone()
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
    );
    params.insert("TRANSPARENT", config.transparent.unwrap_or(true).to_string());
    params.insert("SRS", config.projection.clone());
    params.insert("CRS", config.projection.clone());
    params.insert("VERSION", config.version.clone());

    let tiled = embedded
        .get("TILED")
        .map(str::to_string)
        .or_else(|| config.tiled.as_ref().map(Flag::as_text))
        .unwrap_or_else(|| "false".to_string());
    params.insert("TILED", tiled.eq_ignore_ascii_case("true").to_string());

    let dpi = config.dpi.filter(|dpi| *dpi > 0).unwrap_or_else(|| settings.default_dpi());
    params.insert("DPI", dpi.to_string());

    for (key, value) in &config.params {
        if let Some(value) = json_param_value(value) {
            params.insert(key, value);
        }
    }

    params
}
