use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}", .0.display())]
    Unreadable(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config file {}", .0.display())]
    InvalidJson(PathBuf, #[source] serde_json::Error),
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Link {
    pub url: String,
    pub image: String,
    pub label: String,
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub backgrounds: Vec<String>,
    #[serde(rename = "main_links")]
    pub links: Vec<Link>,
    pub additional_links: Vec<Link>,
    pub background_color: String,
    // seconds between background rotations
    pub background_interval: u64,
    #[serde(rename = "font_color1")]
    pub font_color_primary: String,
    #[serde(rename = "font_color2")]
    pub font_color_secondary: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Launcher".into(),
            backgrounds: Vec::new(),
            links: vec![Link {
                url: "https://google.com".into(),
                image: "https://placehold.co/150x150".into(),
                label: "Google".into(),
                description: "Search engine".into(),
            }],
            additional_links: Vec::new(),
            background_color: "#6495ed".into(),
            background_interval: 10,
            font_color_primary: "#333".into(),
            font_color_secondary: "#555".into(),
        }
    }
}

impl Config {
    /// Loads the config from `path`, falling back to `config.json` in the
    /// working directory and then to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.exists().then_some(fallback)
            }
        };

        let Some(path) = path else {
            info!("No config file found, using defaults");
            return Ok(Self::default());
        };

        info!("Loading config from {}", path.display());

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigError::Unreadable(path.clone(), err))?;

        Self::from_json(&contents).map_err(|err| ConfigError::InvalidJson(path, err))
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(contents)?;

        debug!("{config:?}");

        Ok(config)
    }

    /// Every image source the page may reference: link images from both
    /// link lists plus the rotating backgrounds.
    pub fn image_sources(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .chain(self.additional_links.iter())
            .map(|link| link.image.as_str())
            .chain(self.backgrounds.iter().map(String::as_str))
    }
}
