//! API cost estimation
//!
//! Prices are an estimate of X API pay-per-use billing, not vendor ground
//! truth. The table is replaceable through configuration and carries the date
//! it was last checked, which is surfaced in every estimate.

use serde::Serialize;

use crate::models::Command;

/// Date the default prices were last compared against the vendor's published pricing.
pub const PRICING_LAST_REVIEWED_UTC: &str = "2026-02-13";

/// Review date reported for a table whose prices came from configuration.
pub const PRICING_OVERRIDDEN: &str = "overridden";

/// Default price of one post returned by a read endpoint.
pub const COST_POST_READ_USD: f64 = 0.005;

/// Default flat price of one user lookup.
pub const COST_USER_LOOKUP_USD: f64 = 0.010;

const ESTIMATE_NOTE: &str = "Estimate only. Actual X billing may differ by tier/resource.";

/// Unit prices used for estimates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingTable {
    /// Billed per post returned by timeline, search and lookup endpoints
    pub post_read_usd: f64,
    /// Flat charge for the metadata-only user lookup made by timeline fetches
    pub user_lookup_usd: f64,
    pub last_reviewed_utc: String,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            post_read_usd: COST_POST_READ_USD,
            user_lookup_usd: COST_USER_LOOKUP_USD,
            last_reviewed_utc: PRICING_LAST_REVIEWED_UTC.to_string(),
        }
    }
}

/// Where the data behind an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    CacheHit,
    NetworkCall,
}

/// How a request was served with respect to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from a valid cache entry
    Hit,
    /// Fetched from the network and stored
    Miss,
    /// Cache skipped or unusable; fetched from the network
    Bypassed,
}

/// Billable operations behind one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub requests: u32,
    pub post_reads: u32,
    pub user_lookups: u32,
}

impl Usage {
    /// Operations a network fetch of `command` performs when the vendor returns
    /// `result_count` posts.
    pub fn for_fetch(command: Command, result_count: usize) -> Self {
        let post_reads = u32::try_from(result_count).unwrap_or(u32::MAX);
        match command {
            Command::UserTweets => Usage {
                requests: 2,
                post_reads,
                user_lookups: 1,
            },
            Command::Search | Command::Tweet => Usage {
                requests: 1,
                post_reads,
                user_lookups: 0,
            },
        }
    }
}

/// Assumptions block attached to every estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assumptions {
    pub post_read_usd: f64,
    pub user_lookup_usd: f64,
    pub pricing_last_reviewed_utc: String,
    pub note: &'static str,
}

/// Estimated cost of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub amount_usd: f64,
    pub basis: CostBasis,
    #[serde(flatten)]
    pub usage: Usage,
    pub assumptions: Assumptions,
}

/// Estimate the cost of serving `command`.
///
/// A cache hit costs exactly zero. Otherwise the cost is the flat user lookup
/// (timelines only) plus one post read per result the vendor returned.
pub fn estimate(
    command: Command,
    result_count: usize,
    status: CacheStatus,
    pricing: &PricingTable,
) -> CostEstimate {
    let assumptions = Assumptions {
        post_read_usd: pricing.post_read_usd,
        user_lookup_usd: pricing.user_lookup_usd,
        pricing_last_reviewed_utc: pricing.last_reviewed_utc.clone(),
        note: ESTIMATE_NOTE,
    };

    if status == CacheStatus::Hit {
        return CostEstimate {
            amount_usd: 0.0,
            basis: CostBasis::CacheHit,
            usage: Usage::default(),
            assumptions,
        };
    }

    let usage = Usage::for_fetch(command, result_count);
    let raw = f64::from(usage.post_reads) * pricing.post_read_usd
        + f64::from(usage.user_lookups) * pricing.user_lookup_usd;

    CostEstimate {
        amount_usd: round3(raw.max(0.0)),
        basis: CostBasis::NetworkCall,
        usage,
        assumptions,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
