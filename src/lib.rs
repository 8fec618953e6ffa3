//! Map of recent earthquakes.
//!
//! The USGS weekly GeoJSON feed is turned into circle markers sized by
//! magnitude and colored by depth, then laid over street and topographic
//! base maps with a layer control and a depth legend. The result is a single
//! HTML page driving Leaflet, or a static SVG snapshot.
//!
//! ```no_run
//! use quake_map::{assemble, build_overlay, fetch_feed, HostPage, USGS_ALL_WEEK_URL};
//!
//! let feed = fetch_feed(USGS_ALL_WEEK_URL)?;
//! let overlay = build_overlay(&feed.features, &chrono::Local);
//! let mut page = HostPage::default();
//! assemble(overlay, &mut page, "map")?;
//! std::fs::write("quakes.html", page.to_html())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assemble;
pub mod color;
pub mod config;
pub mod encode;
pub mod error;
pub mod feed;
pub mod legend;
pub mod lifecycle;
pub mod output;
pub mod overlay;
pub mod page;
pub mod snapshot;

pub use assemble::{assemble, ensure_legend_styles, MapHandle, TileLayer};
pub use color::Color;
pub use config::Config;
pub use encode::{choose_color, depth_band, marker_size, popup_text, MarkerStyle};
pub use error::{FeatureError, QuakeMapError, Result};
pub use feed::{
    fetch_feed, load_feed, EarthquakeFeature, FeatureCollection, FeedSource, USGS_ALL_WEEK_URL,
};
pub use legend::{Legend, LegendBand, LEGEND_BANDS};
pub use lifecycle::{MapState, QuakeMap};
pub use overlay::{build_overlay, CircleMarker, LatLng, OverlayLayer};
pub use page::HostPage;
