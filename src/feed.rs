//! Feed loader: fetches the USGS GeoJSON summary feed and turns it into
//! [`EarthquakeFeature`]s.
//!
//! Features that do not carry a usable position or the `place`/`time`/`mag`
//! properties are skipped with a warning; everything else about the feed must
//! parse or the whole load fails.

use std::{fs::File, io::Read, path::PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{FeatureError, QuakeMapError, Result};

/// All earthquakes recorded during the past week.
pub const USGS_ALL_WEEK_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";

/// Where the feed is read from.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Url(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Position of an event. Depth is in kilometres and may be absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
    pub depth: Option<f64>,
}

/// One earthquake from the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeFeature {
    pub id: Option<String>,
    pub place: String,
    /// Origin time, milliseconds since the Unix epoch.
    pub time: i64,
    pub magnitude: f64,
    pub coordinates: Coordinates,
}

impl EarthquakeFeature {
    pub fn depth(&self) -> Option<f64> {
        self.coordinates.depth
    }
}

/// The `metadata` object USGS attaches to every summary feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub generated: Option<i64>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Parsed feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub metadata: Option<FeedMetadata>,
    pub features: Vec<EarthquakeFeature>,
    /// Number of malformed features that were dropped.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Wire model
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    metadata: Option<FeedMetadata>,
    features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    properties: Option<RawProperties>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    #[serde(default)]
    place: Option<String>,
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    mag: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    coordinates: Vec<Option<f64>>,
}

impl TryFrom<RawFeature> for EarthquakeFeature {
    type Error = FeatureError;

    fn try_from(raw: RawFeature) -> std::result::Result<Self, Self::Error> {
        let geometry = raw.geometry.ok_or(FeatureError::MissingGeometry)?;
        let coords = &geometry.coordinates;
        let (Some(longitude), Some(latitude)) =
            (coords.first().copied().flatten(), coords.get(1).copied().flatten())
        else {
            return Err(FeatureError::ShortCoordinates(coords.len()));
        };
        let depth = coords.get(2).copied().flatten();

        let props = raw.properties.unwrap_or_default();
        let place = props.place.ok_or(FeatureError::MissingProperty("place"))?;
        let time = props.time.ok_or(FeatureError::MissingProperty("time"))?;
        let magnitude = props.mag.ok_or(FeatureError::MissingProperty("mag"))?;

        Ok(Self {
            id: raw.id,
            place,
            time,
            magnitude,
            coordinates: Coordinates {
                longitude,
                latitude,
                depth,
            },
        })
    }
}

fn parse_feature(value: Value) -> std::result::Result<EarthquakeFeature, FeatureError> {
    let raw: RawFeature =
        serde_json::from_value(value).map_err(|e| FeatureError::Shape(e.to_string()))?;
    EarthquakeFeature::try_from(raw)
}

impl FeatureCollection {
    /// Parses a GeoJSON feature collection, skipping malformed features.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let raw: RawCollection = serde_json::from_reader(reader).map_err(QuakeMapError::Decode)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawCollection = serde_json::from_str(body).map_err(QuakeMapError::Decode)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawCollection) -> Self {
        let mut features = Vec::with_capacity(raw.features.len());
        let mut skipped = 0;
        for (index, value) in raw.features.into_iter().enumerate() {
            match parse_feature(value) {
                Ok(feature) => features.push(feature),
                Err(e) => {
                    log::warn!("Skipping feature #{index}: {e}");
                    skipped += 1;
                }
            }
        }

        Self {
            metadata: raw.metadata,
            features,
            skipped,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Feed title, if the feed carries one.
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref()?.title.as_deref()
    }
}

/// Issues a single GET for the feed. No retries, no timeout.
pub fn fetch_feed(url: &str) -> Result<FeatureCollection> {
    log::info!("Fetching earthquake feed from {url}");
    let response = ureq::get(url).call()?;
    FeatureCollection::from_reader(response.into_reader())
}

/// Loads the feed from wherever `source` points.
pub fn load_feed(source: &FeedSource) -> Result<FeatureCollection> {
    let collection = match source {
        FeedSource::Url(url) => fetch_feed(url)?,
        FeedSource::File(path) => {
            log::info!("Reading earthquake feed from {}", path.display());
            FeatureCollection::from_reader(File::open(path)?)?
        }
    };

    log::info!(
        "Got {} earthquakes ({} skipped)",
        collection.len(),
        collection.skipped
    );
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const FEED: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {"generated": 1700000100000, "title": "USGS All Earthquakes, Past Week", "count": 4},
        "features": [
            {"type": "Feature", "id": "us1",
             "properties": {"mag": 4.5, "place": "10km N of Testville", "time": 1700000000000},
             "geometry": {"type": "Point", "coordinates": [117.9, -32.8, 25]}},
            {"type": "Feature", "id": "us2",
             "properties": {"mag": 1.1, "place": "Nowhere", "time": 1700000000001},
             "geometry": {"type": "Point", "coordinates": [10.0, 20.0]}},
            {"type": "Feature", "id": "us3",
             "properties": {"mag": null, "place": "No magnitude", "time": 1700000000002},
             "geometry": {"type": "Point", "coordinates": [10.0, 20.0, 5.0]}},
            {"type": "Feature", "id": "us4",
             "properties": {"mag": 2.0, "place": "No geometry", "time": 1700000000003},
             "geometry": null}
        ]
    }"#;

    #[test]
    fn parses_valid_features_and_skips_malformed() {
        let collection = FeatureCollection::from_json(FEED).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.skipped, 2);
        assert_eq!(collection.title(), Some("USGS All Earthquakes, Past Week"));

        let first = &collection.features[0];
        assert_eq!(first.id.as_deref(), Some("us1"));
        assert_eq!(first.place, "10km N of Testville");
        assert_eq!(first.time, 1_700_000_000_000);
        assert_eq!(first.magnitude, 4.5);
        assert_eq!(
            first.coordinates,
            Coordinates {
                longitude: 117.9,
                latitude: -32.8,
                depth: Some(25.0)
            }
        );
    }

    #[test]
    fn missing_depth_is_kept_as_unknown() {
        let collection = FeatureCollection::from_json(FEED).unwrap();
        assert_eq!(collection.features[1].depth(), None);
    }

    #[test]
    fn feature_errors_name_the_problem() {
        let raw: RawFeature = serde_json::from_str(
            r#"{"properties": {"place": "x", "time": 1}, "geometry": {"coordinates": [1.0, 2.0]}}"#,
        )
        .unwrap();
        assert_eq!(
            EarthquakeFeature::try_from(raw),
            Err(FeatureError::MissingProperty("mag"))
        );

        let raw: RawFeature =
            serde_json::from_str(r#"{"geometry": {"coordinates": [1.0]}}"#).unwrap();
        assert_eq!(
            EarthquakeFeature::try_from(raw),
            Err(FeatureError::ShortCoordinates(1))
        );

        assert_matches!(
            parse_feature(serde_json::json!({"geometry": {"coordinates": "oops"}})),
            Err(FeatureError::Shape(_))
        );
    }

    #[test]
    fn empty_collection_is_valid() {
        let collection =
            FeatureCollection::from_json(r#"{"type": "FeatureCollection", "features": []}"#)
                .unwrap();
        assert!(collection.is_empty());
        assert_eq!(collection.metadata, None);
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        assert_matches!(
            FeatureCollection::from_json("<html>502 Bad Gateway</html>"),
            Err(QuakeMapError::Decode(_))
        );
        assert_matches!(
            FeatureCollection::from_json(r#"{"type": "FeatureCollection"}"#),
            Err(QuakeMapError::Decode(_))
        );
    }
}
