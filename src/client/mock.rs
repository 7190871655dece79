//! Mock X API client for testing
//!
//! Returns canned JSON bodies per endpoint and records every request, so
//! tests can assert how many network calls a command made.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{Endpoint, XApi};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure bodies with [`MockXClient::with_response`] using the endpoint
/// name (see [`Endpoint::name`]). Clones share state, so keep a clone to
/// inspect calls after handing one to the code under test.
///
/// # Example
/// ```ignore
/// let mock = MockXClient::new()
///     .with_response("search_recent", json!({"data": []}))
///     .await;
/// ```
#[derive(Clone, Default)]
pub struct MockXClient {
    /// Body returned per endpoint name
    responses: Arc<Mutex<HashMap<&'static str, Value>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Captured requests for test assertions
    calls: Arc<Mutex<Vec<Endpoint>>>,
}

impl MockXClient {
    /// Create a new mock client with no configured responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the body returned for an endpoint.
    pub async fn with_response(self, endpoint: &'static str, body: Value) -> Self {
        self.responses.lock().await.insert(endpoint, body);
        self
    }

    /// Configure an error returned by the next request.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Requests made so far, in order.
    pub async fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().await.clone()
    }

    /// Number of requests made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl XApi for MockXClient {
    async fn perform_request(&self, endpoint: &Endpoint) -> Result<Value> {
        self.calls.lock().await.push(endpoint.clone());

        if let Some(error) = self.error.lock().await.take() {
            return Err(error.into());
        }

        self.responses
            .lock()
            .await
            .get(endpoint.name())
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound(format!("no mock response for {}", endpoint.name())).into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_returns_configured_body() {
        let mock = MockXClient::new()
            .with_response("tweets_by_ids", json!({"data": []}))
            .await;

        let body = mock
            .perform_request(&Endpoint::TweetsByIds {
                ids: vec!["1".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(body, json!({"data": []}));
        assert_eq!(mock.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_mock_error_consumed_once() {
        let mock = MockXClient::new()
            .with_response("tweets_by_ids", json!({}))
            .await
            .with_error(ApiError::Network("down".to_string()))
            .await;
        let endpoint = Endpoint::TweetsByIds {
            ids: vec!["1".to_string()],
        };

        assert!(mock.perform_request(&endpoint).await.is_err());
        assert!(mock.perform_request(&endpoint).await.is_ok());
        assert_eq!(mock.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_mock_unconfigured_endpoint() {
        let mock = MockXClient::new();
        let result = mock
            .perform_request(&Endpoint::UserByUsername {
                username: "nobody".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}
