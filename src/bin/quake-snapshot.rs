//! quake-snapshot — fetch the USGS weekly earthquake feed and render a static
//! SVG world map of it.
//!
//! Country outlines are fetched at runtime from `QUAKE_COUNTRIES_URL`.
//! Output: `quakes.svg` (override with `QUAKE_SNAPSHOT_OUTPUT`).

use anyhow::Context;
use quake_map::{load_feed, output::write_atomically, snapshot::render_svg, Config};
use serde_json::Value;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    log::info!("Fetching country outlines from {}", config.countries_url);
    let resp = ureq::get(&config.countries_url)
        .call()
        .context("failed to fetch country outlines")?;
    let countries: Value = serde_json::from_reader(resp.into_reader())
        .context("country outlines are not valid JSON")?;

    let source = config.feed_source();
    let feed = load_feed(&source).with_context(|| format!("failed to load feed from {source}"))?;

    let svg = render_svg(&feed.features, &countries);
    write_atomically(&config.snapshot_output, &svg)
        .with_context(|| format!("failed to write {}", config.snapshot_output.display()))?;
    Ok(())
}
