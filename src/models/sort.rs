//! Ordering and threshold filtering of normalized tweets

use std::cmp::Ordering;

use super::request::{MetricFilters, SortMode};
use super::tweet::TweetRecord;

/// Parameters for [`apply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SortFilter {
    pub sort: SortMode,
    pub filters: MetricFilters,
    /// Keep at most this many records; `None` keeps all
    pub limit: Option<usize>,
}

/// Filter by thresholds, sort, then truncate.
///
/// Total and deterministic: the order is fully defined by metric, then
/// recency, then ID, so applying it to its own output is a no-op.
pub fn apply(mut records: Vec<TweetRecord>, params: &SortFilter) -> Vec<TweetRecord> {
    let f = params.filters;
    records.retain(|t| {
        t.metrics.likes >= f.min_likes
            && t.metrics.replies >= f.min_replies
            && t.metrics.retweets >= f.min_retweets
    });

    records.sort_by(|a, b| compare(a, b, params.sort));

    if let Some(limit) = params.limit {
        records.truncate(limit);
    }
    records
}

/// Descending order for the given mode.
fn compare(a: &TweetRecord, b: &TweetRecord, sort: SortMode) -> Ordering {
    let metric = |t: &TweetRecord| match sort {
        SortMode::Recent => 0,
        SortMode::Likes => t.metrics.likes,
        SortMode::Retweets => t.metrics.retweets,
        SortMode::Replies => t.metrics.replies,
    };

    metric(b)
        .cmp(&metric(a))
        // None (unknown time) sorts as oldest
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| compare_ids(&b.id, &a.id))
}

/// Snowflake IDs are decimal strings; compare numerically without parsing.
fn compare_ids(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tweet::Metrics;
    use chrono::{TimeZone, Utc};

    fn tweet(id: &str, likes: u64, minute: Option<u32>) -> TweetRecord {
        TweetRecord {
            id: id.to_string(),
            text: format!("tweet {id}"),
            author_username: None,
            created_at: minute.map(|m| Utc.with_ymd_and_hms(2026, 2, 10, 12, m, 0).unwrap()),
            conversation_id: None,
            metrics: Metrics {
                likes,
                replies: likes / 2,
                retweets: 0,
                impressions: 0,
            },
            url: None,
        }
    }

    fn ids(records: &[TweetRecord]) -> Vec<&str> {
        records.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_recent_sorts_newest_first() {
        let out = apply(
            vec![
                tweet("1", 0, Some(1)),
                tweet("3", 0, Some(30)),
                tweet("2", 0, None),
                tweet("4", 0, Some(10)),
            ],
            &SortFilter::default(),
        );
        assert_eq!(ids(&out), vec!["3", "4", "1", "2"]);
    }

    #[test]
    fn test_likes_ties_break_by_recency_then_id() {
        let out = apply(
            vec![
                tweet("10", 5, Some(1)),
                tweet("11", 5, Some(2)),
                tweet("9", 5, Some(2)),
                tweet("12", 7, Some(0)),
            ],
            &SortFilter {
                sort: SortMode::Likes,
                ..Default::default()
            },
        );
        // 11 and 9 tie on likes and time; larger snowflake first
        assert_eq!(ids(&out), vec!["12", "11", "9", "10"]);
    }

    #[test]
    fn test_min_likes_filter() {
        let out = apply(
            vec![
                tweet("1", 0, Some(1)),
                tweet("2", 3, Some(2)),
                tweet("3", 5, Some(3)),
                tweet("4", 10, Some(4)),
            ],
            &SortFilter {
                sort: SortMode::Likes,
                filters: MetricFilters {
                    min_likes: 5,
                    ..Default::default()
                },
                limit: None,
            },
        );
        assert_eq!(ids(&out), vec!["4", "3"]);
    }

    #[test]
    fn test_filter_applies_before_limit() {
        let out = apply(
            vec![
                tweet("1", 100, Some(1)),
                tweet("2", 0, Some(50)),
                tweet("3", 50, Some(40)),
            ],
            &SortFilter {
                sort: SortMode::Recent,
                filters: MetricFilters {
                    min_likes: 1,
                    ..Default::default()
                },
                limit: Some(1),
            },
        );
        assert_eq!(ids(&out), vec!["3"]);
    }

    #[test]
    fn test_min_replies_filter() {
        let out = apply(
            vec![tweet("1", 2, None), tweet("2", 8, None)],
            &SortFilter {
                filters: MetricFilters {
                    min_replies: 2,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        assert_eq!(ids(&out), vec!["2"]);
    }

    #[test]
    fn test_empty_input() {
        let out = apply(
            Vec::new(),
            &SortFilter {
                sort: SortMode::Retweets,
                filters: MetricFilters {
                    min_likes: 3,
                    ..Default::default()
                },
                limit: Some(5),
            },
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let input = vec![
            tweet("5", 1, Some(5)),
            tweet("1", 9, Some(1)),
            tweet("3", 9, None),
            tweet("2", 4, Some(2)),
            tweet("4", 0, Some(4)),
        ];
        for sort in [
            SortMode::Recent,
            SortMode::Likes,
            SortMode::Retweets,
            SortMode::Replies,
        ] {
            let params = SortFilter {
                sort,
                filters: MetricFilters {
                    min_likes: 1,
                    ..Default::default()
                },
                limit: Some(3),
            };
            let once = apply(input.clone(), &params);
            let twice = apply(once.clone(), &params);
            assert_eq!(once, twice, "not idempotent for {sort}");
        }
    }

    #[test]
    fn test_compare_ids_numeric() {
        assert_eq!(compare_ids("9", "10"), Ordering::Less);
        assert_eq!(compare_ids("100", "99"), Ordering::Greater);
        assert_eq!(compare_ids("42", "42"), Ordering::Equal);
    }
}
