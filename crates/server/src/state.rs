use std::sync::Arc;
use posterd_core::{Config, PosterCache, PosterResolver};

/// Shared application state
pub struct AppState {
    config: Config,
    cache: Arc<dyn PosterCache>,
    resolver: Arc<PosterResolver>,
}

impl AppState {
    pub fn new(config: Config, cache: Arc<dyn PosterCache>, resolver: Arc<PosterResolver>) -> Self {
        Self {
            config,
            cache,
            resolver,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &dyn PosterCache {
        self.cache.as_ref()
    }

    pub fn resolver(&self) -> &PosterResolver {
        self.resolver.as_ref()
    }
}
