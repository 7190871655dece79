//! Command execution context
//!
//! Builds the HTTP client, cache and orchestrator once so query handlers only
//! deal with their own arguments.

use crate::cache::CacheStorage;
use crate::cli::GlobalOptions;
use crate::client::XClient;
use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::Orchestrator;

/// Context for command execution.
pub struct CommandContext {
    pub orchestrator: Orchestrator<XClient>,
    /// Skip the cache lookup
    pub no_cache: bool,
}

impl CommandContext {
    /// Create a context from resolved configuration.
    ///
    /// The bearer token is not checked here; a request answered from the
    /// cache needs no credential.
    pub fn new(config: &Config, opts: &GlobalOptions) -> Result<Self> {
        let client = XClient::new(config)?;

        let cache = config.cache_dir.clone().map(CacheStorage::at);
        if cache.is_none() {
            log::warn!("No cache directory could be determined; caching disabled");
        }

        Ok(Self {
            orchestrator: Orchestrator::new(client, cache, config.pricing.clone()),
            no_cache: opts.no_cache,
        })
    }
}
