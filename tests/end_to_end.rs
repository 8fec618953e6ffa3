//! End-to-end: feed → overlay → assembled page, using local feeds so no
//! network is needed.

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use assert_matches::assert_matches;
use chrono::Utc;
use quake_map::{
    load_feed, output::write_atomically, FeatureCollection, FeedSource, HostPage, LatLng,
    MapState, QuakeMap, QuakeMapError, LEGEND_BANDS,
};

const SCENARIO: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "properties": {"place": "10km N of Testville", "time": 1700000000000, "mag": 4.5},
        "geometry": {"type": "Point", "coordinates": [117.9, -32.8, 25]}
    }]
}"#;

fn sample_feed() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/all_week_sample.geojson")
}

fn render(collection: FeatureCollection) -> QuakeMap {
    let mut map = QuakeMap::new(HostPage::default(), "map").unwrap();
    map.complete(Ok(collection), &Utc).unwrap();
    map
}

#[test]
fn single_feature_scenario() {
    let map = render(FeatureCollection::from_json(SCENARIO).unwrap());
    let handle = map.handle().expect("map should be rendered");

    let markers = handle.overlay().markers();
    assert_eq!(markers.len(), 1);

    let marker = &markers[0];
    assert_eq!(marker.lat_lng, LatLng::new(-32.8, 117.9));
    assert_relative_eq!(marker.style.radius, 315_000.0);
    assert_eq!(marker.style.fill_color.to_hex(), "#EC988E");
    assert!(marker.popup.contains("Testville"));
    assert!(marker.popup.contains("4.5"));
    assert!(marker.popup.contains("25"));
}

#[test]
fn empty_feed_still_renders_legend_and_control() {
    let empty = FeatureCollection::from_json(r#"{"type": "FeatureCollection", "features": []}"#)
        .unwrap();
    let map = render(empty);
    let handle = map.handle().unwrap();

    assert!(handle.overlay().is_empty());
    assert_eq!(handle.base_layers().len(), 2);
    assert_eq!(handle.control().overlays, ["Earthquakes"]);

    let html = map.page().to_html();
    for band in &LEGEND_BANDS {
        assert!(html.contains(&band.label()), "legend lacks {}", band.label());
    }
    assert!(html.contains("leaflet.js"));
    assert!(html.contains("L.control.layers"));
}

#[test]
fn sample_feed_from_file() {
    let feed = load_feed(&FeedSource::File(sample_feed())).unwrap();
    assert_eq!(feed.len(), 4);
    assert_eq!(feed.skipped, 1);

    let map = render(feed);
    let handle = map.handle().unwrap();
    assert_eq!(handle.overlay().len(), 4);

    let colors: Vec<String> = handle
        .overlay()
        .markers()
        .iter()
        .map(|m| m.style.fill_color.to_hex())
        .collect();
    assert_eq!(
        colors,
        [
            LEGEND_BANDS[1].color.to_hex(),
            LEGEND_BANDS[0].color.to_hex(),
            LEGEND_BANDS[0].color.to_hex(),
            LEGEND_BANDS[5].color.to_hex(),
        ]
    );

    // negative magnitude passes straight through
    assert!(handle.overlay().markers()[2].style.radius < 0.0);

    let html = map.page().to_html();
    assert!(html.contains("<title>USGS All Earthquakes, Past Week</title>"));
    assert!(html.contains("Fiji region"));
}

#[test]
fn missing_feed_file_leaves_a_visible_error() {
    let mut map = QuakeMap::new(HostPage::default(), "map").unwrap();
    let outcome = load_feed(&FeedSource::File("does/not/exist.geojson".into()));
    assert_matches!(outcome, Err(QuakeMapError::Io(_)));

    assert!(map.complete(outcome, &Utc).is_err());
    assert_eq!(map.state(), &MapState::Loading);
    assert!(map.page().to_html().contains("Earthquake data could not be loaded."));
}

#[test]
fn custom_template_and_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("page.html");
    fs::write(
        &template,
        "<!DOCTYPE html><html><head><title>x</title></head>\
         <body><main id=\"quakes\" style=\"height: 600px\"></main></body></html>",
    )
    .unwrap();

    let page = HostPage::from_file(&template).unwrap();
    assert_matches!(
        QuakeMap::new(page.clone(), "map"),
        Err(QuakeMapError::MountTargetMissing(_))
    );

    let mut map = QuakeMap::new(page, "quakes").unwrap();
    map.complete(FeatureCollection::from_json(SCENARIO), &Utc)
        .unwrap();
    assert_eq!(map.handle().unwrap().mount_id(), "quakes");

    let out = dir.path().join("quakes.html");
    write_atomically(&out, &map.page().to_html()).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("\"mount\":\"quakes\""));
    assert_eq!(written.matches("data-style=\"legend\"").count(), 1);
}
