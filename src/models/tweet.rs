//! Normalized tweet records shared by the cache, sorter and output layers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement counters for a tweet.
///
/// All four counters are always present; the normalizer fills anything the
/// vendor omitted with zero so comparisons stay total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub likes: u64,
    pub replies: u64,
    pub retweets: u64,
    pub impressions: u64,
}

/// A tweet in the stable output shape, independent of the endpoint it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    /// Tweet ID (decimal snowflake)
    pub id: String,

    /// Full tweet text
    pub text: String,

    /// Author handle without the leading `@`, when the payload identifies it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,

    /// Creation time reported by the vendor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Conversation (thread root) ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    pub metrics: Metrics,

    /// Permalink, present when the author is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Permalink for a tweet by a known author.
pub fn permalink(username: &str, id: &str) -> String {
    format!("https://x.com/{}/status/{}", username, id)
}

/// Profile of the account a timeline was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub verified: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
}

/// A non-fatal problem the vendor reported next to otherwise usable data
/// (for example one of several requested IDs not existing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorProblem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub detail: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}
