//! Host page: the HTML document the map is mounted into.
//!
//! The page is a template plus a set of pending additions (head fragments,
//! style rule sets, container content and scripts), each registered under a
//! key so that registering it again never duplicates it. Additions are only
//! spliced into the template when the document is serialized, so the template
//! itself is never modified in place.

use std::path::Path;

use crate::error::{QuakeMapError, Result};

/// Built-in page with a full-window `#map` container.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Earthquakes</title>
  <style>
    html, body, #map { height: 100%; margin: 0; }
  </style>
</head>
<body>
  <div id="map"></div>
</body>
</html>
"#;

#[derive(Debug, Clone)]
pub struct HostPage {
    template: String,
    title: Option<String>,
    head: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    contents: Vec<(String, String)>,
    scripts: Vec<(String, String)>,
}

impl Default for HostPage {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl HostPage {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            title: None,
            head: Vec::new(),
            styles: Vec::new(),
            contents: Vec::new(),
            scripts: Vec::new(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let template = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded host page from {}", path.as_ref().display());
        Ok(Self::new(template))
    }

    /// Whether the template contains an element with the given id.
    pub fn has_element(&self, id: &str) -> bool {
        find_id_attribute(&self.template, id).is_some()
    }

    /// Replaces the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Sets the `<head>` fragment registered under `key`, replacing any
    /// fragment set earlier under the same key.
    pub fn set_head(&mut self, key: &str, fragment: impl Into<String>) {
        upsert(&mut self.head, key, fragment.into());
    }

    /// Sets the script (or any fragment) registered under `key` at the end
    /// of `<body>`. A script set earlier under the same key is replaced in
    /// place, so scripts keep the order they were first registered in.
    pub fn set_script(&mut self, key: &str, fragment: impl Into<String>) {
        upsert(&mut self.scripts, key, fragment.into());
    }

    /// Registers the rule set `css` under `key` unless a rule set with that
    /// key is already registered. Returns `true` if the rules were added.
    pub fn ensure_style(&mut self, key: &str, css: &str) -> bool {
        if self.has_style(key) {
            log::trace!("Style `{key}` already registered");
            return false;
        }

        self.styles.push((key.to_owned(), css.to_owned()));
        true
    }

    pub fn has_style(&self, key: &str) -> bool {
        self.styles.iter().any(|(k, _)| k == key)
    }

    /// Sets the inner HTML inserted into the element with the given id.
    /// Content set earlier for the same element is replaced.
    pub fn set_content(&mut self, id: &str, html: impl Into<String>) -> Result<()> {
        if !self.has_element(id) {
            return Err(QuakeMapError::MountTargetMissing(id.to_owned()));
        }

        upsert(&mut self.contents, id, html.into());
        Ok(())
    }

    /// Serializes the document with all additions applied.
    pub fn to_html(&self) -> String {
        let mut html = self.template.clone();

        if let Some(title) = &self.title {
            replace_title(&mut html, title);
        }

        let mut head = String::new();
        for (_, fragment) in &self.head {
            head.push_str("  ");
            head.push_str(fragment);
            head.push('\n');
        }
        for (key, css) in &self.styles {
            head.push_str(&format!("  <style data-style=\"{key}\">\n{css}\n  </style>\n"));
        }
        insert_before_closing(&mut html, "</head>", &head);

        for (id, content) in &self.contents {
            if let Some(at) = find_id_attribute(&html, id) {
                if let Some(offset) = html[at..].find('>') {
                    html.insert_str(at + offset + 1, content);
                }
            }
        }

        let mut scripts = String::new();
        for (_, script) in &self.scripts {
            scripts.push_str("  ");
            scripts.push_str(script);
            scripts.push('\n');
        }
        insert_before_closing(&mut html, "</body>", &scripts);

        html
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: &str, value: String) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => *existing = value,
        None => entries.push((key.to_owned(), value)),
    }
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(&needle.to_ascii_lowercase())
}

/// Offset of an `id` attribute with exactly the value `id`. The attribute
/// name must stand alone, so `data-id="map"` or `grid="map"` do not match.
fn find_id_attribute(html: &str, id: &str) -> Option<usize> {
    [format!("id=\"{id}\""), format!("id='{id}'")]
        .iter()
        .filter_map(|needle| {
            html.match_indices(needle.as_str())
                .map(|(at, _)| at)
                .find(|&at| html[..at].ends_with(|c: char| c.is_ascii_whitespace()))
        })
        .min()
}

fn insert_before_closing(html: &mut String, closing_tag: &str, fragment: &str) {
    if fragment.is_empty() {
        return;
    }

    match find_ignore_case(html, closing_tag) {
        Some(at) => html.insert_str(at, fragment),
        None => html.push_str(fragment),
    }
}

fn replace_title(html: &mut String, title: &str) {
    let escaped = crate::encode::escape_html(title);
    let Some(open) = find_ignore_case(html, "<title>") else {
        return;
    };
    let start = open + "<title>".len();
    let Some(len) = find_ignore_case(&html[start..], "</title>") else {
        return;
    };
    html.replace_range(start..start + len, &escaped);
}
