//! Provider selection by platform.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, UpsertError};
use crate::platform::Platform;
use crate::provider::{MySqlUpsertProvider, SqliteUpsertProvider, UpsertProvider};

/// An ordered set of upsert providers.
///
/// Registration order is precedence order: [`resolve`](Self::resolve)
/// returns the first provider that supports the platform. The registry is
/// read-only once built and can be shared across threads.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn UpsertProvider>>,
}

impl ProviderRegistry {
    /// Creates a registry from providers in precedence order.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn UpsertProvider>>) -> Self {
        Self { providers }
    }

    /// Appends a provider with the lowest precedence.
    #[must_use]
    pub fn with_provider(mut self, provider: impl UpsertProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Returns the registered providers in precedence order.
    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn UpsertProvider>] {
        &self.providers
    }

    /// Returns the first provider that supports `platform`.
    ///
    /// # Errors
    ///
    /// [`UpsertError::UnsupportedPlatform`] when no provider matches.
    pub fn resolve(&self, platform: &Platform) -> Result<Arc<dyn UpsertProvider>> {
        let provider = self
            .providers
            .iter()
            .find(|provider| provider.supports(platform))
            .ok_or_else(|| UpsertError::UnsupportedPlatform(platform.clone()))?;

        debug!(platform = %platform, provider = provider.name(), "Resolved upsert provider");
        Ok(Arc::clone(provider))
    }
}

impl Default for ProviderRegistry {
    /// MySQL-family first, then SQLite-family.
    fn default() -> Self {
        Self::new(vec![
            Arc::new(MySqlUpsertProvider::new()),
            Arc::new(SqliteUpsertProvider::new()),
        ])
    }
}
