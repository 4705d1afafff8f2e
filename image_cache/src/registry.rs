use std::collections::HashMap;

use common::{config::Config, utils::hash_source};
use tracing::debug;

/// Hash to source mapping of every image the proxy may serve. Built once
/// from configuration and only read afterwards.
#[derive(Debug, Default, Clone)]
pub struct AllowList {
    sources: HashMap<String, String>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let allow_list: Self = config.image_sources().collect();

        debug!("Allow-list holds {} image sources", allow_list.len());

        allow_list
    }

    /// Registers `source` and returns its hash. Registering the same source
    /// twice is harmless since it hashes to the same key.
    pub fn register(&mut self, source: impl Into<String>) -> String {
        let source = source.into();
        let hash = hash_source(&source);

        self.sources.insert(hash.clone(), source);

        hash
    }

    pub fn lookup(&self, hash: &str) -> Option<&str> {
        self.sources.get(hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut allow_list = Self::new();

        for source in iter {
            allow_list.register(source);
        }

        allow_list
    }
}
