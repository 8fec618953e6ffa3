//! Static SVG snapshot of the earthquake map.
//!
//! Equirectangular (plate carrée) world map with country outlines, one circle
//! per earthquake using the same radius and depth colors as the interactive
//! map, and the depth legend with per-band counts in the lower-left corner.

use std::fmt;

use serde_json::Value;

use crate::encode::{depth_band, escape_html, marker_style};
use crate::feed::EarthquakeFeature;
use crate::legend::LEGEND_BANDS;

/// Metres per degree along a meridian, close enough for sizing circles.
const METRES_PER_DEGREE: f64 = 111_320.0;

const GRATICULE_STEP: i32 = 30;
const LEGEND_ROW: f64 = 20.0;

/// Pixel extent of the whole-world plate carrée image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const WORLD: Viewport = Viewport {
        width: 1200.0,
        height: 600.0,
    };

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            (lon + 180.0) / 360.0 * self.width,
            (90.0 - lat) / 180.0 * self.height,
        )
    }

    /// Converts a marker radius in metres to pixels. Negative radii become 0.
    pub fn metres_to_px(&self, metres: f64) -> f64 {
        (metres / METRES_PER_DEGREE * self.width / 360.0).max(0.0)
    }

    /// Closed SVG subpath through the `[lon, lat, ..]` positions of a ring.
    /// Positions that are not number pairs are skipped.
    fn ring(&self, positions: &[Value]) -> Option<String> {
        let mut points = positions.iter().filter_map(|position| {
            let pair = position.as_array()?;
            Some(self.project(pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
        });

        let (x, y) = points.next()?;
        let mut d = format!("M{x:.2},{y:.2}");
        for (x, y) in points {
            d.push_str(&format!("L{x:.2},{y:.2}"));
        }
        d.push('Z');
        Some(d)
    }

    /// One path `d` for a Polygon or MultiPolygon geometry, holes included.
    fn outline(&self, geometry: &Value) -> Option<String> {
        let polygons: Vec<&Value> = match geometry["type"].as_str()? {
            "Polygon" => vec![&geometry["coordinates"]],
            "MultiPolygon" => geometry["coordinates"].as_array()?.iter().collect(),
            _ => return None,
        };

        let d: String = polygons
            .into_iter()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|ring| self.ring(ring.as_array()?))
            .collect();
        (!d.is_empty()).then_some(d)
    }
}

/// Number of earthquakes in each of the [`LEGEND_BANDS`].
pub fn band_counts(features: &[EarthquakeFeature]) -> [usize; LEGEND_BANDS.len()] {
    let mut counts = [0; LEGEND_BANDS.len()];
    for feature in features {
        counts[depth_band(feature.depth())] += 1;
    }
    counts
}

/// A renderable snapshot. Formatting it yields the SVG document.
pub struct Snapshot<'a> {
    viewport: Viewport,
    features: &'a [EarthquakeFeature],
    countries: &'a Value,
}

impl<'a> Snapshot<'a> {
    /// `countries` is a GeoJSON FeatureCollection of country outlines;
    /// anything else just leaves the land out.
    pub fn new(features: &'a [EarthquakeFeature], countries: &'a Value) -> Self {
        Self {
            viewport: Viewport::WORLD,
            features,
            countries,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    fn write_graticule(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Viewport { width, height } = self.viewport;
        let mut d = String::new();
        for lon in (-180..=180).step_by(GRATICULE_STEP as usize) {
            let (x, _) = self.viewport.project(f64::from(lon), 0.0);
            d.push_str(&format!("M{x:.1},0V{height}"));
        }
        for lat in (-90..=90).step_by(GRATICULE_STEP as usize) {
            let (_, y) = self.viewport.project(0.0, f64::from(lat));
            d.push_str(&format!("M0,{y:.1}H{width}"));
        }
        writeln!(
            f,
            "  <path class='graticule' d='{d}' fill='none' stroke='#bfdbfe' stroke-width='0.5'/>"
        )
    }

    fn write_land(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  <g class='land' fill='#f5f5f4' stroke='#a8a29e' stroke-width='0.5' fill-rule='evenodd'>"
        )?;
        for country in self.countries["features"].as_array().into_iter().flatten() {
            if let Some(d) = self.viewport.outline(&country["geometry"]) {
                writeln!(f, "    <path d='{d}'/>")?;
            }
        }
        writeln!(f, "  </g>")
    }

    fn write_quakes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // largest first so small events stay visible on top
        let mut order: Vec<&EarthquakeFeature> = self.features.iter().collect();
        order.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));

        writeln!(f, "  <g class='quakes'>")?;
        for feature in order {
            let style = marker_style(feature);
            let coordinates = &feature.coordinates;
            let (x, y) = self
                .viewport
                .project(coordinates.longitude, coordinates.latitude);
            let depth = feature
                .depth()
                .map_or_else(|| "unknown depth".to_string(), |d| format!("{d} km"));
            writeln!(
                f,
                "    <circle cx='{x:.1}' cy='{y:.1}' r='{r:.2}' fill='{fill}' fill-opacity='{opacity}' \
                 stroke='{stroke}' stroke-width='{weight}'><title>{place} | M {mag} | {depth}</title></circle>",
                r = self.viewport.metres_to_px(style.radius),
                fill = style.fill_color,
                opacity = style.fill_opacity,
                stroke = style.stroke_color,
                weight = style.stroke_weight,
                place = escape_html(&feature.place),
                mag = feature.magnitude,
            )?;
        }
        writeln!(f, "  </g>")
    }

    fn write_legend(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let height = self.viewport.height;
        let x = 16.0;
        let top = height - 24.0 - LEGEND_ROW * LEGEND_BANDS.len() as f64;

        writeln!(
            f,
            "  <g class='legend' font-family='monospace' font-size='12' fill='#1f2937'>"
        )?;
        writeln!(
            f,
            "    <text x='{x:.1}' y='{:.1}' font-size='13'>Depth (km)</text>",
            top - 8.0
        )?;
        let counts = band_counts(self.features);
        for (row, (band, count)) in LEGEND_BANDS.iter().zip(counts).enumerate() {
            let y = top + LEGEND_ROW * row as f64;
            writeln!(
                f,
                "    <rect x='{x:.1}' y='{y:.1}' width='15' height='15' fill='{}'/>",
                band.color
            )?;
            writeln!(
                f,
                "    <text x='{:.1}' y='{:.1}'>{:<7} {count}</text>",
                x + 20.0,
                y + 12.0,
                band.label()
            )?;
        }
        writeln!(
            f,
            "    <text x='{x:.1}' y='{:.1}' font-size='10' fill='#6b7280'>total: {}</text>",
            height - 8.0,
            self.features.len()
        )?;
        writeln!(f, "  </g>")
    }
}

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Viewport { width, height } = self.viewport;
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;
        writeln!(f, "  <title>Earthquakes</title>")?;
        writeln!(
            f,
            "  <desc>Circle size follows magnitude, color follows depth.</desc>"
        )?;
        writeln!(f, "  <rect width='{width}' height='{height}' fill='#dbeafe'/>")?;

        self.write_graticule(f)?;
        self.write_land(f)?;
        self.write_quakes(f)?;
        self.write_legend(f)?;

        writeln!(f, "</svg>")
    }
}

/// Renders the world snapshot. See [`Snapshot::new`] for `countries`.
pub fn render_svg(features: &[EarthquakeFeature], countries: &Value) -> String {
    Snapshot::new(features, countries).to_string()
}
