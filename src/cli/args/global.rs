//! Global CLI options shared across all commands

use crate::cli::Cli;

/// Global CLI options passed to all command handlers.
///
/// Built once in `main.rs` after parsing, so handler signatures stay small.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Skip the cache lookup (results are still written)
    pub no_cache: bool,

    /// Enable debug logging
    pub debug: bool,

    /// Custom API host for development/testing
    pub api_host: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            no_cache: cli.no_cache,
            debug: cli.debug,
            api_host: cli.api_host.clone(),
        }
    }

    /// Get API host as `Option<&str>`.
    pub fn api_host_ref(&self) -> Option<&str> {
        self.api_host.as_deref()
    }
}
