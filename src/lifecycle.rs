//! Page lifecycle. A map starts out `Loading` and moves to `Rendered` exactly
//! once, when a feed arrives. There is no way back.

use chrono::TimeZone;

use crate::assemble::{assemble, MapHandle};
use crate::encode::escape_html;
use crate::error::{QuakeMapError, Result};
use crate::feed::FeatureCollection;
use crate::overlay::build_overlay;
use crate::page::HostPage;

const ERROR_STYLE_KEY: &str = "load-error";
const ERROR_STYLE: &str = "\
.load-error {
  margin: 2em auto;
  max-width: 40em;
  padding: 1em 1.5em;
  font-family: sans-serif;
  color: #7f1d1d;
  background: #fee2e2;
  border: 1px solid #fca5a5;
  border-radius: 5px;
}";

#[derive(Debug, Clone, PartialEq)]
pub enum MapState {
    Loading,
    Rendered(MapHandle),
}

/// Owns the host page and, once rendered, the assembled map.
#[derive(Debug)]
pub struct QuakeMap {
    page: HostPage,
    mount_id: String,
    state: MapState,
}

impl QuakeMap {
    /// Starts a map in the `Loading` state. Fails if `page` has no element
    /// with id `mount_id`.
    pub fn new(page: HostPage, mount_id: impl Into<String>) -> Result<Self> {
        let mount_id = mount_id.into();
        if !page.has_element(&mount_id) {
            return Err(QuakeMapError::MountTargetMissing(mount_id));
        }

        Ok(Self {
            page,
            mount_id,
            state: MapState::Loading,
        })
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self.state, MapState::Rendered(_))
    }

    pub fn handle(&self) -> Option<&MapHandle> {
        match &self.state {
            MapState::Rendered(handle) => Some(handle),
            MapState::Loading => None,
        }
    }

    pub fn page(&self) -> &HostPage {
        &self.page
    }

    /// Consumes the outcome of the feed load.
    ///
    /// On success the overlay is built, the map assembled and the state moves
    /// to `Rendered`. On failure the page gets a visible error notice, the
    /// state stays `Loading` and the error is returned.
    pub fn complete<Tz>(&mut self, outcome: Result<FeatureCollection>, tz: &Tz) -> Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if self.is_rendered() {
            return Err(QuakeMapError::AlreadyRendered);
        }

        let collection = match outcome {
            Ok(collection) => collection,
            Err(e) => {
                log::error!("Failed to load earthquake feed: {e}");
                self.show_error(&e);
                return Err(e);
            }
        };

        if let Some(title) = collection.title() {
            self.page.set_title(title);
        }

        let overlay = build_overlay(&collection.features, tz);
        let handle = assemble(overlay, &mut self.page, &self.mount_id)?;
        self.state = MapState::Rendered(handle);
        Ok(())
    }

    fn show_error(&mut self, error: &QuakeMapError) {
        self.page.ensure_style(ERROR_STYLE_KEY, ERROR_STYLE);
        let notice = format!(
            "<div class=\"load-error\" role=\"alert\"><strong>Earthquake data could not be loaded.</strong><p>{}</p></div>",
            escape_html(&error.to_string())
        );
        if let Err(e) = self.page.set_content(&self.mount_id, notice) {
            log::error!("Could not show the error in the page: {e}");
        }
    }
}
