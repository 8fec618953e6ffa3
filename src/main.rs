//! quake-map — fetch the USGS weekly earthquake feed and write an interactive
//! Leaflet map of it as a single HTML page.
//!
//! If the feed cannot be loaded the page is still written, showing the error
//! where the map would be, and the process exits non-zero.

use anyhow::Context;
use quake_map::{load_feed, output::write_atomically, Config, HostPage, QuakeMap};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    let page = match &config.template {
        Some(path) => HostPage::from_file(path)
            .with_context(|| format!("failed to read host page {}", path.display()))?,
        None => HostPage::default(),
    };
    let mut map = QuakeMap::new(page, &config.mount_id)?;

    let source = config.feed_source();
    let outcome = load_feed(&source);
    let rendered = map.complete(outcome, &chrono::Local);

    write_atomically(&config.output, &map.page().to_html())
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    rendered.with_context(|| format!("no map rendered from {source}"))?;
    Ok(())
}
