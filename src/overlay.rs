//! Builds the earthquake overlay: one circle marker per feature.

use chrono::TimeZone;
use serde::Serialize;

use crate::encode::{marker_style, popup_text, MarkerStyle};
use crate::feed::EarthquakeFeature;

pub const OVERLAY_NAME: &str = "Earthquakes";

/// Geographic position in Leaflet order; serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.lat, value.lng]
    }
}

/// A filled circle with a popup. The radius inside `style` is in metres.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMarker {
    pub lat_lng: LatLng,
    pub style: MarkerStyle,
    pub popup: String,
}

impl CircleMarker {
    pub fn from_feature<Tz>(feature: &EarthquakeFeature, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            lat_lng: LatLng::new(feature.coordinates.latitude, feature.coordinates.longitude),
            style: marker_style(feature),
            popup: popup_text(feature, tz),
        }
    }
}

/// Named group of markers toggled as one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayer {
    name: String,
    markers: Vec<CircleMarker>,
}

impl OverlayLayer {
    pub fn new(name: impl Into<String>, markers: Vec<CircleMarker>) -> Self {
        Self {
            name: name.into(),
            markers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &[CircleMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Encodes every feature as a circle marker. The layer is returned unmounted.
pub fn build_overlay<Tz>(features: &[EarthquakeFeature], tz: &Tz) -> OverlayLayer
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let markers: Vec<CircleMarker> = features
        .iter()
        .map(|feature| CircleMarker::from_feature(feature, tz))
        .collect();
    log::debug!("Built {} earthquake markers", markers.len());

    OverlayLayer::new(OVERLAY_NAME, markers)
}
