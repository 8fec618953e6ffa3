//! Depth bands and the legend control that explains them.

use serde::Serialize;

use crate::color::Color;

/// Depth interval `[lower, upper)` in kilometres, or `[lower, ∞)` when
/// `upper` is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendBand {
    pub lower: f64,
    pub upper: Option<f64>,
    pub color: Color,
}

impl LegendBand {
    const fn new(lower: f64, upper: Option<f64>, color: &'static str) -> Self {
        Self {
            lower,
            upper,
            color: Color::from_hex(color),
        }
    }

    /// `"{lower}–{upper}"`, or `"{lower}+"` for the open-ended band.
    pub fn label(&self) -> String {
        match self.upper {
            Some(upper) => format!("{}–{}", self.lower, upper),
            None => format!("{}+", self.lower),
        }
    }
}

/// The six fixed bands, shallowest first.
pub const LEGEND_BANDS: [LegendBand; 6] = [
    LegendBand::new(-10.0, Some(10.0), "#FFCC99"),
    LegendBand::new(10.0, Some(30.0), "#EC988E"),
    LegendBand::new(30.0, Some(50.0), "#DC828E"),
    LegendBand::new(50.0, Some(70.0), "#C76B8F"),
    LegendBand::new(70.0, Some(90.0), "#8E5B91"),
    LegendBand::new(90.0, None, "#634D8E"),
];

/// Band used when the depth of an event is not known.
pub const UNKNOWN_DEPTH_BAND: usize = LEGEND_BANDS.len() - 1;

/// Key under which the legend rule set is registered in the host page.
pub const LEGEND_STYLE_KEY: &str = "legend";

/// Swatch sizing for the legend rows.
pub const LEGEND_STYLE: &str = "\
.legend {
  background: white;
  padding: 6px 8px;
  line-height: 18px;
  color: #555;
  border-radius: 5px;
  box-shadow: 0 0 15px rgba(0, 0, 0, 0.2);
}
.legend i {
  width: 15px;
  height: 15px;
  float: left;
  margin-right: 5px;
}";

/// Corner a Leaflet control is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Legend control: a heading plus one swatch/label row per band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    position: ControlPosition,
    html: String,
}

impl Legend {
    pub fn new(bands: &[LegendBand]) -> Self {
        let mut html = String::from("<h4>Depth (km)</h4>");
        for band in bands {
            html.push_str(&format!(
                "<i style=\"background: {}\"></i>{}<br>",
                band.color,
                band.label()
            ));
        }

        Self {
            position: ControlPosition::BottomRight,
            html,
        }
    }

    pub fn position(&self) -> ControlPosition {
        self.position
    }

    /// Inner HTML of the legend container.
    pub fn html(&self) -> &str {
        &self.html
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::new(&LEGEND_BANDS)
    }
}
