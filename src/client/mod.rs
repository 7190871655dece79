//! X API v2 client

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod x;

#[cfg(test)]
pub use mock::MockXClient;
pub use x::XClient;

/// Tweet fields requested for search and lookup
const TWEET_FIELDS: &str = "created_at,public_metrics,author_id,conversation_id";
/// Tweet fields requested for user timelines (author is already known)
const TIMELINE_TWEET_FIELDS: &str = "created_at,public_metrics,conversation_id";
const USER_FIELDS: &str = "username,name,verified";
const PROFILE_FIELDS: &str = "public_metrics,verified,created_at";

/// Page size for full searches and timelines
pub const MAX_RESULTS: u32 = 100;
/// Page size for quick searches
pub const QUICK_MAX_RESULTS: u32 = 10;

/// The read-only endpoints this tool calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /users/by/username/{username}`
    UserByUsername { username: String },
    /// `GET /users/{id}/tweets`
    UserTweets { user_id: String },
    /// `GET /tweets/search/recent`
    SearchRecent {
        query: String,
        max_results: u32,
        start_time: Option<DateTime<Utc>>,
    },
    /// `GET /tweets?ids=...`
    TweetsByIds { ids: Vec<String> },
}

impl Endpoint {
    /// Short name for logs and mock bookkeeping.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::UserByUsername { .. } => "user_by_username",
            Endpoint::UserTweets { .. } => "user_tweets",
            Endpoint::SearchRecent { .. } => "search_recent",
            Endpoint::TweetsByIds { .. } => "tweets_by_ids",
        }
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::UserByUsername { username } => format!("/users/by/username/{}", username),
            Endpoint::UserTweets { user_id } => format!("/users/{}/tweets", user_id),
            Endpoint::SearchRecent { .. } => "/tweets/search/recent".to_string(),
            Endpoint::TweetsByIds { .. } => "/tweets".to_string(),
        }
    }

    /// Query string parameters.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::UserByUsername { .. } => vec![("user.fields", PROFILE_FIELDS.to_string())],
            Endpoint::UserTweets { .. } => vec![
                ("max_results", MAX_RESULTS.to_string()),
                ("tweet.fields", TIMELINE_TWEET_FIELDS.to_string()),
                ("exclude", "replies,retweets".to_string()),
            ],
            Endpoint::SearchRecent {
                query,
                max_results,
                start_time,
            } => {
                let mut params = vec![
                    ("query", query.clone()),
                    ("max_results", max_results.to_string()),
                    ("tweet.fields", TWEET_FIELDS.to_string()),
                    ("expansions", "author_id".to_string()),
                    ("user.fields", USER_FIELDS.to_string()),
                ];
                if let Some(start) = start_time {
                    params.push((
                        "start_time",
                        start.to_rfc3339_opts(SecondsFormat::Secs, true),
                    ));
                }
                params
            }
            Endpoint::TweetsByIds { ids } => vec![
                ("ids", ids.join(",")),
                ("tweet.fields", TWEET_FIELDS.to_string()),
                ("expansions", "author_id".to_string()),
                ("user.fields", USER_FIELDS.to_string()),
            ],
        }
    }
}

/// Quick-mode query shaping: drop retweets and replies unless the query
/// already says something about them.
pub fn quick_query(query: &str) -> String {
    let lower = query.to_lowercase();
    let mut shaped = query.to_string();
    if !lower.contains("is:retweet") {
        shaped.push_str(" -is:retweet");
    }
    if !lower.contains("is:reply") {
        shaped.push_str(" -is:reply");
    }
    shaped
}

/// X API client trait.
///
/// Implementations perform one HTTP request and return the parsed JSON body.
/// No retries happen at this layer.
#[async_trait]
pub trait XApi: Send + Sync {
    async fn perform_request(&self, endpoint: &Endpoint) -> Result<Value>;
}
