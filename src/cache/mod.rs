//! Local cache for API responses
//!
//! Normalized tweet sets are stored as one JSON file per request fingerprint.
//! Caching is an optimization only: every failure here degrades to fetching
//! from the network.

pub mod key;
pub mod storage;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{Command, RequestDescriptor};

/// Cache TTL configuration per request class
pub struct CacheTtl;

impl CacheTtl {
    // Search results churn quickly but are the most expensive to refetch
    pub const SEARCH: Duration = Duration::from_secs(15 * 60); // 15 min

    // Quick mode trades freshness for cost
    pub const QUICK: Duration = Duration::from_secs(60 * 60); // 1 hr

    // Single tweets and user timelines should stay reasonably fresh
    pub const DEFAULT: Duration = Duration::from_secs(60); // 1 min
}

/// Which TTL applies to a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtlClass {
    Search,
    Quick,
    Default,
}

impl TtlClass {
    /// Classify a request. Quick mode takes precedence over the command.
    pub fn for_request(descriptor: &RequestDescriptor) -> Self {
        if descriptor.quick() {
            TtlClass::Quick
        } else if descriptor.command() == Command::Search {
            TtlClass::Search
        } else {
            TtlClass::Default
        }
    }

    pub fn ttl(&self) -> Duration {
        match self {
            TtlClass::Search => CacheTtl::SEARCH,
            TtlClass::Quick => CacheTtl::QUICK,
            TtlClass::Default => CacheTtl::DEFAULT,
        }
    }
}

// Re-export main types
pub use key::{CacheKey, fingerprint};
pub use storage::CacheStorage;
