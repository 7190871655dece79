//! Request orchestration
//!
//! Drives one request through cache lookup, network fetch, normalization,
//! cache store and assembly of the result envelope. Cache trouble never fails
//! a request: it is logged and the request is reported as `bypassed`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStorage, TtlClass, fingerprint};
use crate::client::{Endpoint, MAX_RESULTS, QUICK_MAX_RESULTS, XApi, quick_query};
use crate::cost::{self, CacheStatus, CostEstimate, PricingTable};
use crate::error::{Error, Result};
use crate::models::sort::apply;
use crate::models::{
    RawPayload, RequestDescriptor, SortFilter, Target, TweetRecord, UserProfile, VendorProblem,
    normalize, normalize_user,
};

/// Everything one network fetch produced. This is what gets cached; sorting,
/// filtering and truncation are re-applied on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedSet {
    pub tweets: Vec<TweetRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<VendorProblem>,
}

/// Result of one request.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    pub request: RequestDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    pub returned: usize,
    pub tweets: Vec<TweetRecord>,
    pub cost: CostEstimate,
    pub cache_status: CacheStatus,
    /// Partial vendor errors that accompanied the data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<VendorProblem>>,
}

/// Absolute start of a look-back window ending now.
fn start_time(since: Duration) -> Result<DateTime<Utc>> {
    chrono::Duration::from_std(since)
        .ok()
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "--since window of {}s is out of range",
                since.as_secs()
            ))
        })
}

/// Runs requests against an X API client with an optional cache in front.
pub struct Orchestrator<C: XApi> {
    client: C,
    cache: Option<CacheStorage>,
    pricing: PricingTable,
}

impl<C: XApi> Orchestrator<C> {
    /// `cache` is `None` when no cache directory could be determined.
    pub fn new(client: C, cache: Option<CacheStorage>, pricing: PricingTable) -> Self {
        Self {
            client,
            cache,
            pricing,
        }
    }

    /// Serve one request.
    ///
    /// With `no_cache` the lookup is skipped but a fresh result is still
    /// written, so later runs benefit from it.
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
        no_cache: bool,
    ) -> Result<ResultEnvelope> {
        let key = fingerprint(descriptor);
        let ttl_class = TtlClass::for_request(descriptor);

        let mut status = CacheStatus::Miss;
        match (&self.cache, no_cache) {
            (None, _) => {
                log::debug!("No cache directory available; bypassing cache");
                status = CacheStatus::Bypassed;
            }
            (Some(_), true) => {
                log::debug!("Cache lookup skipped (--no-cache)");
                status = CacheStatus::Bypassed;
            }
            (Some(cache), false) => match cache.get::<FetchedSet>(&key) {
                Ok(Some(entry)) => {
                    log::debug!("Cache hit for {} ({})", descriptor.command(), key);
                    return Ok(self.assemble(descriptor, entry.payload, CacheStatus::Hit, 0));
                }
                Ok(None) => log::debug!("Cache miss for {} ({})", descriptor.command(), key),
                Err(e) => {
                    log::warn!("Cache read failed, fetching from network: {}", e);
                    status = CacheStatus::Bypassed;
                }
            },
        }

        let fetched = self.fetch(descriptor).await?;
        let result_count = fetched.tweets.len();
        log::debug!("Fetched {} tweets for {}", result_count, descriptor.command());

        if let Some(ref cache) = self.cache {
            match cache.put(&key, &fetched, ttl_class) {
                Ok(()) => log::debug!("Stored {} in cache ({:?})", key, ttl_class),
                Err(e) => {
                    log::warn!("Cache write failed: {}", e);
                    status = CacheStatus::Bypassed;
                }
            }
        }

        Ok(self.assemble(descriptor, fetched, status, result_count))
    }

    /// Network fetch and normalization.
    async fn fetch(&self, descriptor: &RequestDescriptor) -> Result<FetchedSet> {
        match descriptor.target() {
            Target::Username(username) => {
                let body = self
                    .client
                    .perform_request(&Endpoint::UserByUsername {
                        username: username.clone(),
                    })
                    .await?;
                let author = normalize_user(&body, username)?;

                let body = self
                    .client
                    .perform_request(&Endpoint::UserTweets {
                        user_id: author.id.clone(),
                    })
                    .await?;
                let normalized = normalize(&RawPayload::Timeline {
                    author: author.clone(),
                    body,
                })?;

                Ok(FetchedSet {
                    tweets: normalized.tweets,
                    user: Some(author),
                    problems: normalized.problems,
                })
            }
            Target::Query(query) => {
                let (query, max_results) = if descriptor.quick() {
                    (quick_query(query), QUICK_MAX_RESULTS)
                } else {
                    (query.clone(), MAX_RESULTS)
                };
                let start_time = match descriptor.since() {
                    Some(since) => Some(start_time(since)?),
                    None => None,
                };

                let body = self
                    .client
                    .perform_request(&Endpoint::SearchRecent {
                        query,
                        max_results,
                        start_time,
                    })
                    .await?;
                let normalized = normalize(&RawPayload::Search(body))?;

                Ok(FetchedSet {
                    tweets: normalized.tweets,
                    user: None,
                    problems: normalized.problems,
                })
            }
            Target::Id(id) => {
                let body = self
                    .client
                    .perform_request(&Endpoint::TweetsByIds {
                        ids: vec![id.clone()],
                    })
                    .await?;
                let normalized = normalize(&RawPayload::Lookup(body))?;

                Ok(FetchedSet {
                    tweets: normalized.tweets,
                    user: None,
                    problems: normalized.problems,
                })
            }
        }
    }

    /// Sort, filter and cost a fetched set. Runs on hits and misses alike.
    fn assemble(
        &self,
        descriptor: &RequestDescriptor,
        fetched: FetchedSet,
        status: CacheStatus,
        result_count: usize,
    ) -> ResultEnvelope {
        let params = SortFilter {
            sort: descriptor.sort(),
            filters: descriptor.filters(),
            limit: descriptor.limit(),
        };
        let tweets = apply(fetched.tweets, &params);
        let cost = cost::estimate(descriptor.command(), result_count, status, &self.pricing);

        ResultEnvelope {
            request: descriptor.clone(),
            user: fetched.user,
            returned: tweets.len(),
            tweets,
            cost,
            cache_status: status,
            errors: (!fetched.problems.is_empty()).then_some(fetched.problems),
        }
    }
}
