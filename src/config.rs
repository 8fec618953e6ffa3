//! Runtime configuration, read from the environment.

use std::path::PathBuf;

use crate::feed::{FeedSource, USGS_ALL_WEEK_URL};

/// Country outlines used as the backdrop of the SVG snapshot.
pub const COUNTRIES_URL: &str =
    "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed_url: String,
    /// When set, the feed is read from this file instead of `feed_url`.
    pub feed_file: Option<PathBuf>,
    pub output: PathBuf,
    pub snapshot_output: PathBuf,
    /// Host page template; the built-in page is used when unset.
    pub template: Option<PathBuf>,
    pub mount_id: String,
    pub countries_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: USGS_ALL_WEEK_URL.to_string(),
            feed_file: None,
            output: PathBuf::from("quakes.html"),
            snapshot_output: PathBuf::from("quakes.svg"),
            template: None,
            mount_id: "map".to_string(),
            countries_url: COUNTRIES_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            feed_url: get("QUAKE_FEED_URL").unwrap_or(defaults.feed_url),
            feed_file: get("QUAKE_FEED_FILE").map(PathBuf::from),
            output: get("QUAKE_OUTPUT").map(PathBuf::from).unwrap_or(defaults.output),
            snapshot_output: get("QUAKE_SNAPSHOT_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_output),
            template: get("QUAKE_TEMPLATE").map(PathBuf::from),
            mount_id: get("QUAKE_MOUNT_ID").unwrap_or(defaults.mount_id),
            countries_url: get("QUAKE_COUNTRIES_URL").unwrap_or(defaults.countries_url),
        }
    }

    pub fn feed_source(&self) -> FeedSource {
        match &self.feed_file {
            Some(path) => FeedSource::File(path.clone()),
            None => FeedSource::Url(self.feed_url.clone()),
        }
    }
}
