//! Request descriptors: the validated, normalized form of a CLI command

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Error, Result};

/// The three read operations the tool performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    UserTweets,
    Search,
    Tweet,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::UserTweets => "user-tweets",
            Command::Search => "search",
            Command::Tweet => "tweet",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering applied to results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Recent,
    Likes,
    Retweets,
    Replies,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Recent => "recent",
            SortMode::Likes => "likes",
            SortMode::Retweets => "retweets",
            SortMode::Replies => "replies",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum engagement thresholds. A record below any threshold is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricFilters {
    pub min_likes: u64,
    pub min_replies: u64,
    pub min_retweets: u64,
}

/// A look-back window such as `12h` or `7d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Since(Duration);

impl Since {
    /// Longest window the recent-search endpoint covers.
    pub const MAX_SECS: u64 = 7 * 86_400;

    pub fn from_hours(hours: u64) -> Self {
        Since(Duration::from_secs(hours.saturating_mul(3600)))
    }

    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl FromStr for Since {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        const USAGE: &str = "must be like 1h, 3h, 12h, 1d, 7d (at most 7d)";

        let raw = value.trim().to_lowercase();
        let (number, unit_secs) = if let Some(n) = raw.strip_suffix('h') {
            (n, 3600.0)
        } else if let Some(n) = raw.strip_suffix('d') {
            (n, 86_400.0)
        } else {
            return Err(USAGE.to_string());
        };

        let amount: f64 = number.trim().parse().map_err(|_| USAGE.to_string())?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(USAGE.to_string());
        }

        let secs = (amount * unit_secs).round();
        if secs < 1.0 || secs > Self::MAX_SECS as f64 {
            return Err(USAGE.to_string());
        }

        Ok(Since(Duration::from_secs(secs as u64)))
    }
}

/// What a request is about: an account, a search query or one tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Username(String),
    Query(String),
    Id(String),
}

/// Default look-back window applied by quick mode.
pub const QUICK_SINCE_HOURS: u64 = 24;

/// Validated, normalized description of one request.
///
/// Built once from CLI input and never modified. Two descriptors built from
/// equivalent input (e.g. `@GarryTan` and `garrytan`) compare equal and share a
/// cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    command: Command,
    #[serde(flatten)]
    target: Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    sort: SortMode,
    filters: MetricFilters,
    #[serde(skip_serializing_if = "Option::is_none")]
    since_secs: Option<u64>,
    quick: bool,
}

/// Options for a search request.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub limit: usize,
    pub sort: SortMode,
    pub filters: MetricFilters,
    pub since: Option<Since>,
    pub quick: bool,
}

impl RequestDescriptor {
    /// Recent tweets posted by one account.
    pub fn user_tweets(
        username: &str,
        limit: usize,
        sort: SortMode,
        filters: MetricFilters,
    ) -> Result<Self> {
        Ok(Self {
            command: Command::UserTweets,
            target: Target::Username(normalize_username(username)?),
            limit: Some(limit),
            sort,
            filters,
            since_secs: None,
            quick: false,
        })
    }

    /// Recent-search over the last seven days (or a shorter window).
    pub fn search(query: &str, options: SearchOptions) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument("--query must not be empty".to_string()));
        }

        let since = match (options.since, options.quick) {
            (Some(since), _) => Some(since),
            (None, true) => Some(Since::from_hours(QUICK_SINCE_HOURS)),
            (None, false) => None,
        };

        Ok(Self {
            command: Command::Search,
            target: Target::Query(query.to_string()),
            limit: Some(options.limit),
            sort: options.sort,
            filters: options.filters,
            since_secs: since.map(|s| s.as_secs()),
            quick: options.quick,
        })
    }

    /// A single tweet by ID.
    pub fn tweet(id: &str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() || id.len() > 19 || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "--id must be a numeric tweet id, got '{}'",
                id
            )));
        }

        Ok(Self {
            command: Command::Tweet,
            target: Target::Id(id.to_string()),
            limit: None,
            sort: SortMode::Recent,
            filters: MetricFilters::default(),
            since_secs: None,
            quick: false,
        })
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn filters(&self) -> MetricFilters {
        self.filters
    }

    pub fn since(&self) -> Option<Duration> {
        self.since_secs.map(Duration::from_secs)
    }

    pub fn quick(&self) -> bool {
        self.quick
    }

    /// Normalized parameters in a fixed (sorted) order, as fed to the fingerprint.
    pub fn params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        match &self.target {
            Target::Username(username) => params.insert("username", username.clone()),
            Target::Query(query) => params.insert("query", query.clone()),
            Target::Id(id) => params.insert("id", id.clone()),
        };
        if let Some(limit) = self.limit {
            params.insert("limit", limit.to_string());
        }
        if let Some(since) = self.since_secs {
            params.insert("since", since.to_string());
        }
        params.insert("sort", self.sort.as_str().to_string());
        params.insert("min_likes", self.filters.min_likes.to_string());
        params.insert("min_replies", self.filters.min_replies.to_string());
        params.insert("min_retweets", self.filters.min_retweets.to_string());
        params.insert("quick", self.quick.to_string());
        params
    }
}

/// Trim, strip a leading `@` and lowercase a handle, rejecting anything X would not accept.
fn normalize_username(raw: &str) -> Result<String> {
    let handle = raw.trim().trim_start_matches('@').to_lowercase();
    let valid = !handle.is_empty()
        && handle.len() <= 15
        && handle.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');

    if !valid {
        return Err(Error::InvalidArgument(format!(
            "--username must be 1-15 letters, digits or underscores, got '{}'",
            raw
        )));
    }
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_parses_hours_and_days() {
        assert_eq!("12h".parse::<Since>().unwrap().as_secs(), 12 * 3600);
        assert_eq!("1d".parse::<Since>().unwrap().as_secs(), 86_400);
        assert_eq!(" 1.5H ".parse::<Since>().unwrap().as_secs(), 5400);
    }

    #[test]
    fn test_since_rejects_bad_input() {
        for bad in ["", "3", "3w", "h", "-1h", "0d", "abcd"] {
            assert!(bad.parse::<Since>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_since_bounds() {
        assert_eq!("7d".parse::<Since>().unwrap().as_secs(), Since::MAX_SECS);
        assert_eq!("168h".parse::<Since>().unwrap().as_secs(), Since::MAX_SECS);
        for bad in ["8d", "169h", "100000000d", "1e300h", "0.0001h", "0.000001d"] {
            assert!(bad.parse::<Since>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_username_is_normalized() {
        let a = RequestDescriptor::user_tweets(
            "  @GarryTan ",
            10,
            SortMode::Recent,
            MetricFilters::default(),
        )
        .unwrap();
        assert_eq!(a.target(), &Target::Username("garrytan".to_string()));
    }

    #[test]
    fn test_username_rejects_invalid() {
        for bad in ["", "@", "has space", "waytoolonghandle123", "dash-name"] {
            let result =
                RequestDescriptor::user_tweets(bad, 10, SortMode::Recent, MetricFilters::default());
            assert!(
                matches!(result, Err(Error::InvalidArgument(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_query_kept_verbatim() {
        let d = RequestDescriptor::search("  Civic Tech ", SearchOptions::default()).unwrap();
        assert_eq!(d.target(), &Target::Query("  Civic Tech ".to_string()));
    }

    #[test]
    fn test_empty_query_rejected() {
        let result = RequestDescriptor::search("   ", SearchOptions::default());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_quick_defaults_since_to_a_day() {
        let d = RequestDescriptor::search(
            "rust",
            SearchOptions {
                limit: 10,
                quick: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(d.since(), Some(Duration::from_secs(86_400)));
        assert!(d.quick());
    }

    #[test]
    fn test_explicit_since_wins_over_quick_default() {
        let d = RequestDescriptor::search(
            "rust",
            SearchOptions {
                limit: 10,
                quick: true,
                since: Some("3h".parse().unwrap()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(d.since(), Some(Duration::from_secs(3 * 3600)));
    }

    #[test]
    fn test_tweet_id_validation() {
        assert_eq!(
            RequestDescriptor::tweet(" 2021125408075415667 ").unwrap().target(),
            &Target::Id("2021125408075415667".to_string())
        );
        for bad in ["", "abc", "12a", "12345678901234567890"] {
            assert!(
                matches!(RequestDescriptor::tweet(bad), Err(Error::InvalidArgument(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_descriptor_json_shape() {
        let d = RequestDescriptor::user_tweets(
            "garrytan",
            10,
            SortMode::Recent,
            MetricFilters::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["command"], "user-tweets");
        assert_eq!(json["username"], "garrytan");
        assert_eq!(json["sort"], "recent");
        assert_eq!(json["filters"]["min_likes"], 0);
    }

    #[test]
    fn test_params_include_sort_and_quick() {
        let d = RequestDescriptor::search(
            "rust",
            SearchOptions {
                limit: 15,
                sort: SortMode::Likes,
                ..Default::default()
            },
        )
        .unwrap();
        let params = d.params();
        assert_eq!(params.get("sort").map(String::as_str), Some("likes"));
        assert_eq!(params.get("quick").map(String::as_str), Some("false"));
        assert_eq!(params.get("limit").map(String::as_str), Some("15"));
        assert!(!params.contains_key("since"));
    }
}
