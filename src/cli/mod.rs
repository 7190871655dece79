//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod cache;
pub mod context;
pub mod query;

pub use args::{GlobalOptions, MetricFilterArgs};
pub use context::CommandContext;

use crate::models::{Since, SortMode};

/// x-radar - read-only X (Twitter) research from the command line
///
/// Every command prints one JSON document to stdout.
#[derive(Parser, Debug)]
#[command(name = "x-radar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (stderr)
    #[arg(long, global = true, env = "X_RADAR_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Skip the cache lookup; fresh results still refresh the cache
    #[arg(long, global = true, env = "X_RADAR_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Custom API host for development/testing
    #[arg(long, global = true, env = "X_RADAR_API_HOST", hide = true)]
    pub api_host: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search recent tweets (last 7 days)
    Search(SearchArgs),

    /// Recent tweets posted by one account
    UserTweets(UserTweetsArgs),

    /// Look up a single tweet by ID
    Tweet {
        /// Numeric tweet ID
        #[arg(long)]
        id: String,
    },

    /// Manage local response cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

/// Arguments for `search`
#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search query (X API v2 search syntax)
    #[arg(long, short = 'q')]
    pub query: String,

    /// Maximum results to return
    #[arg(
        long,
        short = 'n',
        default_value_t = 15,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub limit: u16,

    /// Sort order
    #[arg(long, value_enum, default_value = "likes")]
    pub sort: SortMode,

    /// Only tweets newer than this (e.g. 1h, 12h, 1d, 7d)
    #[arg(long)]
    pub since: Option<Since>,

    /// Cheaper, noise-filtered search: skips retweets and replies, last 24h
    /// unless --since is given, 10 results from the API
    #[arg(long)]
    pub quick: bool,

    #[command(flatten)]
    pub filters: MetricFilterArgs,
}

/// Arguments for `user-tweets`
#[derive(clap::Args, Debug, Clone)]
pub struct UserTweetsArgs {
    /// Account handle, with or without a leading @
    #[arg(long, short = 'u')]
    pub username: String,

    /// Maximum results to return
    #[arg(
        long,
        short = 'n',
        default_value_t = 10,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub limit: u16,

    /// Sort order
    #[arg(long, value_enum, default_value = "recent")]
    pub sort: SortMode,

    #[command(flatten)]
    pub filters: MetricFilterArgs,
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Remove all cache entries
    Clear,

    /// Remove expired cache entries
    Prune,

    /// Show cache directory path
    Path,
}
