//! Map assembly: base tile layers, the earthquake overlay, a layer control
//! and the depth legend, described once and mounted into a host page.
//!
//! The page ends up with Leaflet loaded from unpkg, the map description
//! embedded as JSON, and a short bootstrap script that hands the description
//! to Leaflet when the page loads.

use serde::Serialize;

use crate::error::{QuakeMapError, Result};
use crate::legend::{Legend, LEGEND_STYLE, LEGEND_STYLE_KEY};
use crate::overlay::{LatLng, OverlayLayer};
use crate::page::HostPage;

pub const DEFAULT_CENTER: LatLng = LatLng::new(-32.8, 117.9);
pub const DEFAULT_ZOOM: u8 = 5;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Id of the `<script type="application/json">` element holding the map
/// description.
pub const SPEC_ELEMENT_ID: &str = "quake-map-spec";

// The tile servers require their attribution to be shown unchanged.
const OSM_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const OPEN_TOPO_URL: &str = "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png";
const OPEN_TOPO_ATTRIBUTION: &str = "Map data: &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors, <a href=\"http://viewfinderpanoramas.org\">SRTM</a> | Map style: &copy; <a href=\"https://opentopomap.org\">OpenTopoMap</a> (<a href=\"https://creativecommons.org/licenses/by-sa/3.0/\">CC-BY-SA</a>)";

const BOOTSTRAP_SCRIPT: &str = r#"<script>
(function () {
  var spec = JSON.parse(document.getElementById("quake-map-spec").textContent);
  var baseMaps = {};
  spec.baseLayers.forEach(function (layer) {
    baseMaps[layer.name] = L.tileLayer(layer.urlTemplate, {
      attribution: layer.attribution,
      maxZoom: layer.maxZoom
    });
  });
  var quakes = L.layerGroup(spec.overlay.markers.map(function (marker) {
    return L.circle(marker.latLng, marker.style).bindPopup(marker.popup);
  }));
  var overlays = {};
  overlays[spec.overlay.name] = quakes;
  var map = L.map(spec.mount, {
    center: spec.center,
    zoom: spec.zoom,
    layers: [baseMaps[spec.activeBaseLayer], quakes]
  });
  L.control.layers(baseMaps, overlays, { collapsed: spec.control.collapsed }).addTo(map);
  var legend = L.control({ position: spec.legend.position });
  legend.onAdd = function () {
    var div = L.DomUtil.create("div", "info legend");
    div.innerHTML = spec.legend.html;
    return div;
  };
  legend.addTo(map);
})();
</script>"#;

/// Raster tile source shown as a base map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub name: String,
    pub url_template: String,
    /// Attribution HTML; shown verbatim.
    pub attribution: String,
    pub max_zoom: u8,
}

impl TileLayer {
    pub fn street() -> Self {
        Self {
            name: "Street Map".into(),
            url_template: OSM_URL.into(),
            attribution: OSM_ATTRIBUTION.into(),
            max_zoom: 19,
        }
    }

    pub fn topographic() -> Self {
        Self {
            name: "Topographic Map".into(),
            url_template: OPEN_TOPO_URL.into(),
            attribution: OPEN_TOPO_ATTRIBUTION.into(),
            max_zoom: 17,
        }
    }
}

/// Layer selection control. Lists names only; the layers themselves live in
/// the map description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerControl {
    pub base_layers: Vec<String>,
    pub overlays: Vec<String>,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct MapSpec {
    mount: String,
    center: LatLng,
    zoom: u8,
    base_layers: Vec<TileLayer>,
    active_base_layer: String,
    overlay: OverlayLayer,
    control: LayerControl,
    legend: Legend,
}

/// An assembled map. Owns the map description and its legend for as long as
/// the page lives.
#[derive(Debug, Clone, PartialEq)]
pub struct MapHandle {
    spec: MapSpec,
}

impl MapHandle {
    pub fn mount_id(&self) -> &str {
        &self.spec.mount
    }

    pub fn center(&self) -> LatLng {
        self.spec.center
    }

    pub fn zoom(&self) -> u8 {
        self.spec.zoom
    }

    pub fn base_layers(&self) -> &[TileLayer] {
        &self.spec.base_layers
    }

    /// Name of the base layer shown when the page opens.
    pub fn active_base_layer(&self) -> &str {
        &self.spec.active_base_layer
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.spec.overlay
    }

    pub fn control(&self) -> &LayerControl {
        &self.spec.control
    }

    pub fn legend(&self) -> &Legend {
        &self.spec.legend
    }

    /// The map description as handed to the bootstrap script.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.spec).map_err(QuakeMapError::Encode)
    }
}

/// Registers the legend swatch rules in the page. Safe to call repeatedly.
pub fn ensure_legend_styles(page: &mut HostPage) {
    if page.ensure_style(LEGEND_STYLE_KEY, LEGEND_STYLE) {
        log::debug!("Registered legend styles");
    }
}

/// Composes the map around `overlay` and mounts it into the element
/// `mount_id` of `page`.
pub fn assemble(overlay: OverlayLayer, page: &mut HostPage, mount_id: &str) -> Result<MapHandle> {
    if !page.has_element(mount_id) {
        return Err(QuakeMapError::MountTargetMissing(mount_id.to_owned()));
    }

    let street = TileLayer::street();
    let topo = TileLayer::topographic();
    let control = LayerControl {
        base_layers: vec![street.name.clone(), topo.name.clone()],
        overlays: vec![overlay.name().to_owned()],
        collapsed: false,
    };

    let handle = MapHandle {
        spec: MapSpec {
            mount: mount_id.to_owned(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            active_base_layer: street.name.clone(),
            base_layers: vec![street, topo],
            overlay,
            control,
            legend: Legend::default(),
        },
    };

    // `</` would end the script element early.
    let json = handle.to_json()?.replace("</", "<\\/");

    // A second assembly onto the same page replaces these entries.
    page.set_head("leaflet-css", format!("<link rel=\"stylesheet\" href=\"{LEAFLET_CSS}\">"));
    ensure_legend_styles(page);
    page.set_script("leaflet-js", format!("<script src=\"{LEAFLET_JS}\"></script>"));
    page.set_script(
        SPEC_ELEMENT_ID,
        format!("<script type=\"application/json\" id=\"{SPEC_ELEMENT_ID}\">{json}</script>"),
    );
    page.set_script("bootstrap", BOOTSTRAP_SCRIPT);

    log::info!(
        "Assembled map with {} earthquake markers into #{mount_id}",
        handle.overlay().len()
    );
    Ok(handle)
}
