//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::graphql::{ApiError, DirectoryClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Per-browser view state lives
/// in the session, not here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    client: DirectoryClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the GraphQL HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let client = DirectoryClient::new(&config.graphql)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, client }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the GraphQL API client.
    #[must_use]
    pub fn client(&self) -> &DirectoryClient {
        &self.inner.client
    }
}
