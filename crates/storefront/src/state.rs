//! Application state shared across handlers.

use std::sync::Arc;

use argon2::Argon2;

use crate::config::{ConfigError, StorefrontConfig};
use crate::db::DocumentStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the document store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn DocumentStore>,
    argon2: Argon2<'static>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Document store opened by [`crate::db::connect`]
    ///
    /// # Errors
    ///
    /// Returns an error if the password hashing costs are invalid.
    pub fn new(config: StorefrontConfig, store: Arc<dyn DocumentStore>) -> Result<Self, ConfigError> {
        let argon2 = config.password_hashing.hasher()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                argon2,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a shared handle to the document store.
    #[must_use]
    pub fn store_handle(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.inner.store)
    }

    /// Get a reference to the configured password hasher.
    #[must_use]
    pub fn argon2(&self) -> &Argon2<'static> {
        &self.inner.argon2
    }
}
