//! Renders the launcher page from the configuration.
//!
//! Every image reference that is a URL is routed through `/image` by its
//! source hash, so the page never points the browser at a remote or local
//! source directly.

use askama::Template;
use common::{
    config::{Config, Link},
    utils::{hash_source, is_url},
};

/// Where the page loads an image from: the proxy for URLs, `None` for
/// anything else (emoji or short text shown as is).
pub fn proxied_image_url(image: &str) -> Option<String> {
    is_url(image).then(|| format!("/image?hash={}", hash_source(image)))
}

struct LinkCard<'a> {
    url: &'a str,
    image: &'a str,
    proxied_image: Option<String>,
    label: &'a str,
    description: &'a str,
}

impl<'a> From<&'a Link> for LinkCard<'a> {
    fn from(link: &'a Link) -> Self {
        Self {
            url: &link.url,
            image: &link.image,
            proxied_image: proxied_image_url(&link.image),
            label: &link.label,
            description: &link.description,
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct Dashboard<'a> {
    title: &'a str,
    background_color: &'a str,
    font_color_primary: &'a str,
    font_color_secondary: &'a str,
    links: Vec<LinkCard<'a>>,
    additional_links: Vec<LinkCard<'a>>,
    // proxied background URLs as a JS array, absent when there are none
    backgrounds_json: Option<String>,
    interval_ms: u64,
}

impl<'a> Dashboard<'a> {
    pub fn new(config: &'a Config) -> Self {
        let backgrounds: Vec<String> = config
            .backgrounds
            .iter()
            .map(String::as_str)
            .filter_map(proxied_image_url)
            .collect();

        // proxied URLs are plain ASCII paths, safe to embed as JSON
        let backgrounds_json = (!backgrounds.is_empty())
            .then(|| serde_json::to_string(&backgrounds).unwrap_or_else(|_| "[]".into()));

        Self {
            title: &config.title,
            background_color: &config.background_color,
            font_color_primary: &config.font_color_primary,
            font_color_secondary: &config.font_color_secondary,
            links: config.links.iter().map(LinkCard::from).collect(),
            additional_links: config.additional_links.iter().map(LinkCard::from).collect(),
            backgrounds_json,
            interval_ms: config.background_interval.max(1).saturating_mul(1000),
        }
    }
}

pub fn render_dashboard(config: &Config) -> Result<String, askama::Error> {
    Dashboard::new(config).render()
}

mod filters {
    use std::fmt::Display;

    /// Turns newlines into line breaks. Escape the input first, the result
    /// is emitted as markup.
    pub fn replace_newlines<T: Display>(text: T) -> askama::Result<String> {
        Ok(text.to_string().replace('\n', "<br>"))
    }
}
