//! Conversion of raw X API payloads into [`TweetRecord`]s
//!
//! Each endpoint returns its own shape; [`RawPayload`] tags the body with the
//! endpoint it came from and [`normalize`] dispatches on that tag.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::tweet::{Metrics, TweetRecord, UserProfile, VendorProblem, permalink};
use crate::error::{ApiError, Result};

/// A raw response body tagged with the endpoint that produced it.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// `GET /users/{id}/tweets`; tweets carry no author, it is the looked-up user.
    Timeline { author: UserProfile, body: Value },
    /// `GET /tweets/search/recent`; authors arrive in `includes.users`.
    Search(Value),
    /// `GET /tweets?ids=`; `data` may be a list or a single object, `errors` may
    /// accompany partial results.
    Lookup(Value),
}

/// Normalized result of one payload.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub tweets: Vec<TweetRecord>,
    /// Non-fatal vendor errors reported next to the data
    pub problems: Vec<VendorProblem>,
}

/// Normalize a tagged payload.
///
/// Fails with [`ApiError::MalformedResponse`] when the body does not have the
/// expected structure or any tweet lacks `id` or `text`.
pub fn normalize(raw: &RawPayload) -> Result<Normalized> {
    match raw {
        RawPayload::Timeline { author, body } => normalize_timeline(author, body),
        RawPayload::Search(body) => normalize_search(body),
        RawPayload::Lookup(body) => normalize_lookup(body),
    }
}

fn normalize_timeline(author: &UserProfile, body: &Value) -> Result<Normalized> {
    let page: TimelineBody = parse_body(body, "timeline")?;
    let tweets = page
        .data
        .into_iter()
        .enumerate()
        .map(|(i, tweet)| tweet.into_record(i, Some(author.username.as_str())))
        .collect::<Result<Vec<_>>>()?;

    Ok(Normalized {
        tweets,
        problems: Vec::new(),
    })
}

fn normalize_search(body: &Value) -> Result<Normalized> {
    let page: SearchBody = parse_body(body, "search")?;
    let authors = page.includes.author_map();
    let tweets = page
        .data
        .into_iter()
        .enumerate()
        .map(|(i, tweet)| {
            let author = tweet.author_id.as_deref().and_then(|id| authors.get(id).copied());
            tweet.into_record(i, author)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Normalized {
        tweets,
        problems: page.errors.into_iter().map(RawProblem::into_problem).collect(),
    })
}

fn normalize_lookup(body: &Value) -> Result<Normalized> {
    let page: LookupBody = parse_body(body, "tweet lookup")?;
    let authors = page.includes.author_map();
    let raw_tweets = match page.data {
        None => Vec::new(),
        Some(OneOrMany::One(tweet)) => vec![tweet],
        Some(OneOrMany::Many(tweets)) => tweets,
    };

    let tweets = raw_tweets
        .into_iter()
        .enumerate()
        .map(|(i, tweet)| {
            let author = tweet.author_id.as_deref().and_then(|id| authors.get(id).copied());
            tweet.into_record(i, author)
        })
        .collect::<Result<Vec<_>>>()?;

    let problems: Vec<VendorProblem> =
        page.errors.into_iter().map(RawProblem::into_problem).collect();

    if tweets.is_empty()
        && let Some(first) = problems.first()
    {
        return Err(ApiError::NotFound(first.detail.clone()).into());
    }

    Ok(Normalized { tweets, problems })
}

/// Extract the account from a `GET /users/by/username/{u}` body.
pub fn normalize_user(body: &Value, username: &str) -> Result<UserProfile> {
    let page: UserBody = parse_body(body, "user lookup")?;

    let Some(user) = page.data.filter(|u| u.id.is_some()) else {
        let detail = page
            .errors
            .into_iter()
            .next()
            .map(|p| p.into_problem().detail)
            .unwrap_or_else(|| "user not found".to_string());
        return Err(ApiError::NotFound(format!("@{}: {}", username, detail)).into());
    };

    Ok(UserProfile {
        id: user.id.unwrap_or_default(),
        username: user.username.unwrap_or_else(|| username.to_string()),
        name: user.name,
        verified: user.verified.unwrap_or(false),
        followers: user.public_metrics.and_then(|m| m.followers_count),
    })
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &Value, what: &str) -> Result<T> {
    T::deserialize(body).map_err(|e| {
        ApiError::MalformedResponse(format!("unexpected {} payload: {}", what, e)).into()
    })
}

// ============================================================================
// Raw vendor shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct TimelineBody {
    #[serde(default)]
    data: Vec<RawTweet>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    data: Vec<RawTweet>,
    #[serde(default)]
    includes: Includes,
    #[serde(default)]
    errors: Vec<RawProblem>,
}

#[derive(Debug, Deserialize)]
struct LookupBody {
    #[serde(default)]
    data: Option<OneOrMany<RawTweet>>,
    #[serde(default)]
    includes: Includes,
    #[serde(default)]
    errors: Vec<RawProblem>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    #[serde(default)]
    data: Option<RawUser>,
    #[serde(default)]
    errors: Vec<RawProblem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<RawUser>,
}

impl Includes {
    fn author_map(&self) -> HashMap<&str, &str> {
        self.users
            .iter()
            .filter_map(|u| Some((u.id.as_deref()?, u.username.as_deref()?)))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default, alias = "screen_name")]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    verified: Option<bool>,
    #[serde(default)]
    public_metrics: Option<RawUserMetrics>,
}

#[derive(Debug, Deserialize)]
struct RawUserMetrics {
    #[serde(default, deserialize_with = "lenient_count")]
    followers_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawTweet {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default, alias = "full_text")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    author_id: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    conversation_id: Option<String>,
    #[serde(default)]
    public_metrics: Option<RawMetrics>,
}

/// Engagement counters as the vendor names them.
#[derive(Debug, Default, Deserialize)]
struct RawMetrics {
    #[serde(default, alias = "favorite_count", deserialize_with = "lenient_count")]
    like_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    reply_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    retweet_count: Option<u64>,
    #[serde(default, alias = "view_count", deserialize_with = "lenient_count")]
    impression_count: Option<u64>,
}

impl RawTweet {
    fn into_record(self, index: usize, author: Option<&str>) -> Result<TweetRecord> {
        let Some(id) = self.id else {
            return Err(missing_field(index, "id"));
        };
        let Some(text) = self.text else {
            return Err(missing_field(index, "text"));
        };

        let metrics = self.public_metrics.unwrap_or_default();
        let author_username = author.map(str::to_string);
        let url = author_username.as_deref().map(|u| permalink(u, &id));

        Ok(TweetRecord {
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            conversation_id: self.conversation_id,
            metrics: Metrics {
                likes: metrics.like_count.unwrap_or(0),
                replies: metrics.reply_count.unwrap_or(0),
                retweets: metrics.retweet_count.unwrap_or(0),
                impressions: metrics.impression_count.unwrap_or(0),
            },
            author_username,
            url,
            id,
            text,
        })
    }
}

fn missing_field(index: usize, field: &str) -> crate::error::Error {
    ApiError::MalformedResponse(format!("tweet #{} is missing `{}`", index, field)).into()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            log::debug!("Ignoring unparseable created_at {:?}: {}", raw, e);
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawProblem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    resource_id: Option<String>,
}

impl RawProblem {
    fn into_problem(self) -> VendorProblem {
        let detail = self
            .detail
            .or(self.message)
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| "unspecified vendor error".to_string());
        VendorProblem {
            title: self.title,
            detail,
            resource_id: self.resource_id,
        }
    }
}

/// Accept IDs as strings or bare numbers.
fn lenient_id<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept counters as numbers or numeric strings; anything else (including
/// negatives) counts as absent.
fn lenient_count<'de, D: Deserializer<'de>>(
    de: D,
) -> std::result::Result<Option<u64>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
