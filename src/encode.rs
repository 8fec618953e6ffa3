//! Visual encoding of earthquakes: magnitude drives the marker radius, depth
//! drives the fill color, and the popup summarizes the event.
//!
//! Every function here is pure; the same feature always encodes the same way.

use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::color::Color;
use crate::feed::EarthquakeFeature;
use crate::legend::{LEGEND_BANDS, UNKNOWN_DEPTH_BAND};

/// Metres of marker radius per unit of magnitude.
pub const RADIUS_PER_MAGNITUDE: f64 = 70_000.0;

pub const FILL_OPACITY: f64 = 0.5;
pub const STROKE_COLOR: &str = "white";
pub const STROKE_WEIGHT: f64 = 1.5;

/// Leaflet path options for one circle marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Radius in metres.
    pub radius: f64,
    pub fill_color: Color,
    pub fill_opacity: f64,
    #[serde(rename = "color")]
    pub stroke_color: &'static str,
    #[serde(rename = "weight")]
    pub stroke_weight: f64,
}

/// Marker radius for a magnitude. Not clamped: zero or negative magnitudes
/// give zero or negative radii.
pub fn marker_size(magnitude: f64) -> f64 {
    magnitude * RADIUS_PER_MAGNITUDE
}

/// Index into [`LEGEND_BANDS`] for a depth.
///
/// Bands are half-open, so a depth equal to a threshold belongs to the deeper
/// band. Depths below the first threshold, including negative ones, land in
/// band 0. An unknown depth (absent or NaN) is classified as
/// [`UNKNOWN_DEPTH_BAND`], the deepest band.
pub fn depth_band(depth: Option<f64>) -> usize {
    let Some(depth) = depth.filter(|d| !d.is_nan()) else {
        return UNKNOWN_DEPTH_BAND;
    };

    LEGEND_BANDS
        .iter()
        .position(|band| band.upper.map_or(true, |upper| depth < upper))
        .unwrap_or(UNKNOWN_DEPTH_BAND)
}

/// Fill color for a depth.
pub fn choose_color(depth: Option<f64>) -> Color {
    LEGEND_BANDS[depth_band(depth)].color
}

pub fn marker_style(feature: &EarthquakeFeature) -> MarkerStyle {
    MarkerStyle {
        radius: marker_size(feature.magnitude),
        fill_color: choose_color(feature.depth()),
        fill_opacity: FILL_OPACITY,
        stroke_color: STROKE_COLOR,
        stroke_weight: STROKE_WEIGHT,
    }
}

/// Formats an epoch-millisecond timestamp the way a browser's default
/// `Date` string reads, e.g. `Tue Nov 14 2023 22:13:20 GMT+0000`.
///
/// Timestamps outside the representable range yield `Invalid Date`.
pub fn format_timestamp<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(millis).single() {
        Some(datetime) => datetime.format("%a %b %d %Y %H:%M:%S GMT%z").to_string(),
        None => "Invalid Date".to_string(),
    }
}

/// Popup body for a feature, rendered in the time zone `tz`.
pub fn popup_text<Tz>(feature: &EarthquakeFeature, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let depth = match feature.depth() {
        Some(depth) => depth.to_string(),
        None => "unknown".to_string(),
    };

    format!(
        "<h3>Location: {place}</h3><hr><p>Date: {date}</p><p>Magnitude: {mag}</p><p>Depth: {depth}</p>",
        place = escape_html(&feature.place),
        date = format_timestamp(feature.time, tz),
        mag = feature.magnitude,
    )
}

/// Popup body in UTC. Handy where no viewer time zone applies.
pub fn popup_text_utc(feature: &EarthquakeFeature) -> String {
    popup_text(feature, &Utc)
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Coordinates;
    use approx::assert_relative_eq;
    use chrono::FixedOffset;

    fn feature(depth: Option<f64>) -> EarthquakeFeature {
        EarthquakeFeature {
            id: None,
            place: "10km N of Testville".into(),
            time: 1_700_000_000_000,
            magnitude: 4.5,
            coordinates: Coordinates {
                longitude: 117.9,
                latitude: -32.8,
                depth,
            },
        }
    }

    #[test]
    fn marker_size_is_linear() {
        for m in [0.1, 1.0, 2.5, 4.5, 7.3] {
            assert_eq!(marker_size(2.0 * m), 2.0 * marker_size(m));
        }
        assert_relative_eq!(marker_size(4.5), 315_000.0);
    }

    #[test]
    fn marker_size_is_not_clamped() {
        assert_eq!(marker_size(0.0), 0.0);
        assert!(marker_size(-0.4) < 0.0);
    }

    #[test]
    fn thresholds_belong_to_the_deeper_band() {
        assert_eq!(depth_band(Some(9.999)), 0);
        assert_eq!(depth_band(Some(10.0)), 1);
        assert_eq!(depth_band(Some(30.0)), 2);
        assert_eq!(depth_band(Some(50.0)), 3);
        assert_eq!(depth_band(Some(70.0)), 4);
        assert_eq!(depth_band(Some(89.9)), 4);
        assert_eq!(depth_band(Some(90.0)), 5);
        assert_eq!(depth_band(Some(650.0)), 5);
    }

    #[test]
    fn shallow_and_negative_depths_use_the_first_band() {
        assert_eq!(depth_band(Some(-3.0)), 0);
        assert_eq!(depth_band(Some(-50.0)), 0);
        assert_eq!(depth_band(Some(0.0)), 0);
    }

    #[test]
    fn unknown_depth_uses_the_deepest_band() {
        assert_eq!(depth_band(None), UNKNOWN_DEPTH_BAND);
        assert_eq!(depth_band(Some(f64::NAN)), UNKNOWN_DEPTH_BAND);
        assert_eq!(choose_color(None), Color::from_hex("#634D8E"));
    }

    #[test]
    fn one_color_per_band() {
        let colors: Vec<String> = [5.0, 20.0, 40.0, 60.0, 80.0, 100.0]
            .into_iter()
            .map(|depth| choose_color(Some(depth)).to_hex())
            .collect();
        assert_eq!(
            colors,
            ["#FFCC99", "#EC988E", "#DC828E", "#C76B8F", "#8E5B91", "#634D8E"]
        );
    }

    #[test]
    fn band_index_never_decreases_with_depth() {
        let mut previous = 0;
        let mut depth = -20.0;
        while depth < 120.0 {
            let band = depth_band(Some(depth));
            assert!(band >= previous, "band dropped at depth {depth}");
            previous = band;
            depth += 0.5;
        }
        assert_eq!(previous, 5);
    }

    #[test]
    fn style_for_a_moderate_shallow_event() {
        let style = marker_style(&feature(Some(25.0)));
        assert_eq!(style.radius, 315_000.0);
        assert_eq!(style.fill_color.to_hex(), "#EC988E");
        assert_eq!(style.fill_opacity, 0.5);
        assert_eq!(style.stroke_color, "white");
        assert_eq!(style.stroke_weight, 1.5);
    }

    #[test]
    fn style_serializes_with_leaflet_option_names() {
        let value = serde_json::to_value(marker_style(&feature(Some(25.0)))).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "radius": 315000.0,
                "fillColor": "#EC988E",
                "fillOpacity": 0.5,
                "color": "white",
                "weight": 1.5
            })
        );
    }

    #[test]
    fn timestamp_uses_the_given_zone() {
        assert_eq!(
            format_timestamp(1_700_000_000_000, &Utc),
            "Tue Nov 14 2023 22:13:20 GMT+0000"
        );

        let perth = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            format_timestamp(1_700_000_000_000, &perth),
            "Wed Nov 15 2023 06:13:20 GMT+0800"
        );
    }

    #[test]
    fn out_of_range_timestamp_is_invalid_date() {
        assert_eq!(format_timestamp(i64::MAX, &Utc), "Invalid Date");
    }

    #[test]
    fn popup_lists_place_date_magnitude_and_depth() {
        let popup = popup_text_utc(&feature(Some(25.0)));
        assert_eq!(
            popup,
            "<h3>Location: 10km N of Testville</h3><hr>\
             <p>Date: Tue Nov 14 2023 22:13:20 GMT+0000</p>\
             <p>Magnitude: 4.5</p><p>Depth: 25</p>"
        );
    }

    #[test]
    fn popup_escapes_place_and_reports_unknown_depth() {
        let mut quake = feature(None);
        quake.place = "<b>Fish & Chips</b>".into();
        let popup = popup_text_utc(&quake);
        assert!(popup.contains("&lt;b&gt;Fish &amp; Chips&lt;/b&gt;"));
        assert!(popup.ends_with("<p>Depth: unknown</p>"));
    }

    fn unescape_html(text: &str) -> String {
        text.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn escaped_place_reads_back_unchanged() {
        for place in ["O'Higgins & Co", "<b>Fish & Chips</b>", "say \"hi\" &amp;"] {
            let mut quake = feature(Some(5.0));
            quake.place = place.into();
            let popup = popup_text_utc(&quake);
            let heading = popup
                .strip_prefix("<h3>Location: ")
                .and_then(|rest| rest.split_once("</h3>"))
                .map(|(heading, _)| heading)
                .unwrap();
            assert!(!heading.contains(['<', '>', '"', '\'']));
            assert_eq!(unescape_html(heading), place);
        }
    }
}
