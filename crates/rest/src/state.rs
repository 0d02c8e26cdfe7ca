//! Application state for the analytics REST API.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the store, the result cache and the configuration.

use std::sync::Arc;

use hiremetrics_persistence::cache::ResultCache;
use hiremetrics_persistence::core::AnalyticsStore;
use serde_json::Value;

use crate::config::ServerConfig;

/// Cache of serialized dashboard responses.
pub type ResponseCache = ResultCache<Value>;

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `S` - The store type (must implement [`AnalyticsStore`])
///
/// # Example
///
/// ```rust,ignore
/// use hiremetrics_rest::{AppState, ServerConfig};
/// use hiremetrics_persistence::backends::sqlite::SqliteStore;
/// use std::sync::Arc;
///
/// let store = SqliteStore::in_memory()?;
/// let state = AppState::new(Arc::new(store), ServerConfig::default());
/// ```
pub struct AppState<S> {
    /// The analytics store.
    store: Arc<S>,

    /// Dashboard result cache, one per process.
    cache: Arc<ResponseCache>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: AnalyticsStore> AppState<S> {
    /// Creates a new AppState with a cache built from the configuration.
    pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
        let cache = if config.cache_enabled {
            ResultCache::new(config.cache_ttl())
        } else {
            ResultCache::disabled()
        };
        Self::with_cache(store, Arc::new(cache), config)
    }

    /// Creates a new AppState sharing an existing cache.
    pub fn with_cache(store: Arc<S>, cache: Arc<ResponseCache>, config: ServerConfig) -> Self {
        Self {
            store,
            cache,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the result cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
