//! Process configuration resolved once from the environment
//!
//! Nothing below `main` reads environment variables; the resolved [`Config`]
//! is passed down explicitly.

use std::path::PathBuf;

use crate::cost::{PRICING_OVERRIDDEN, PricingTable};
use crate::error::{ConfigError, Result};

/// Primary cache directory override
pub const CACHE_DIR_VAR: &str = "X_RADAR_CACHE_DIR";
/// Fallback cache directory override (older tool name)
pub const CACHE_DIR_FALLBACK_VAR: &str = "X_SCOUT_CACHE_DIR";
/// Bearer token, with a fallback name
pub const BEARER_TOKEN_VARS: [&str; 2] = ["X_BEARER_TOKEN", "TWITTER_BEARER_TOKEN"];
pub const POST_READ_PRICE_VAR: &str = "X_RADAR_POST_READ_USD";
pub const USER_LOOKUP_PRICE_VAR: &str = "X_RADAR_USER_LOOKUP_USD";

/// X API v2 base URL
pub const DEFAULT_API_BASE: &str = "https://api.x.com/2";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache location; `None` when no directory could be determined
    pub cache_dir: Option<PathBuf>,

    /// Bearer credential, if one was provided
    pub bearer_token: Option<String>,

    /// API base URL (overridable for testing)
    pub api_base: String,

    /// Unit prices for cost estimates
    pub pricing: PricingTable,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let cache_dir = var(CACHE_DIR_VAR)
            .or_else(|| var(CACHE_DIR_FALLBACK_VAR))
            .map(PathBuf::from)
            .or_else(default_cache_dir);

        let bearer_token = BEARER_TOKEN_VARS.iter().find_map(|&name| var(name));

        let mut pricing = PricingTable::default();
        if let Some(price) =
            var(POST_READ_PRICE_VAR).and_then(|v| parse_price(POST_READ_PRICE_VAR, &v))
        {
            pricing.post_read_usd = price;
        }
        if let Some(price) =
            var(USER_LOOKUP_PRICE_VAR).and_then(|v| parse_price(USER_LOOKUP_PRICE_VAR, &v))
        {
            pricing.user_lookup_usd = price;
        }
        // The default review date does not vouch for configured prices
        if pricing != PricingTable::default() {
            pricing.last_reviewed_utc = PRICING_OVERRIDDEN.to_string();
        }

        Self {
            cache_dir,
            bearer_token,
            api_base: DEFAULT_API_BASE.to_string(),
            pricing,
        }
    }

    /// Point the client at a different API host (e.g. a local mock server).
    pub fn with_api_host(mut self, host: Option<&str>) -> Self {
        if let Some(host) = host.map(str::trim).filter(|h| !h.is_empty()) {
            let host = host.trim_end_matches('/');
            self.api_base = if host.ends_with("/2") {
                host.to_string()
            } else {
                format!("{}/2", host)
            };
        }
        self
    }

    /// The bearer token, validated for use in an `Authorization` header.
    ///
    /// Only called when a network request is actually needed.
    pub fn require_bearer_token(&self) -> Result<&str> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or(ConfigError::MissingBearerToken)?;

        if let Some(bad) = token
            .chars()
            .find(|c| !c.is_ascii() || c.is_ascii_whitespace() || c.is_ascii_control())
        {
            return Err(ConfigError::MalformedBearerToken(format!(
                "unexpected character {:?}",
                bad
            ))
            .into());
        }
        Ok(token)
    }
}

/// Platform cache directory: `~/.cache/x-radar/cache` on Linux,
/// `%LOCALAPPDATA%\x-radar\cache` on Windows.
fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|base| base.join("x-radar").join("cache"))
}

fn parse_price(name: &str, raw: &str) -> Option<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            log::warn!("Ignoring {}={:?}: expected a non-negative number", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::PRICING_LAST_REVIEWED_UTC;
    use crate::error::Error;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_primary_cache_dir_wins() {
        let cfg = config(&[
            (CACHE_DIR_VAR, "/tmp/primary"),
            (CACHE_DIR_FALLBACK_VAR, "/tmp/fallback"),
        ]);
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("/tmp/primary")));
    }

    #[test]
    fn test_fallback_cache_dir() {
        let cfg = config(&[(CACHE_DIR_VAR, "  "), (CACHE_DIR_FALLBACK_VAR, "/tmp/fallback")]);
        assert_eq!(cfg.cache_dir, Some(PathBuf::from("/tmp/fallback")));
    }

    #[test]
    fn test_platform_cache_dir_default() {
        let cfg = config(&[]);
        assert_eq!(cfg.cache_dir, default_cache_dir());
        if let Some(dir) = cfg.cache_dir {
            assert!(dir.ends_with("x-radar/cache"));
        }
    }

    #[test]
    fn test_bearer_token_fallback() {
        let cfg = config(&[("TWITTER_BEARER_TOKEN", "abc")]);
        assert_eq!(cfg.bearer_token.as_deref(), Some("abc"));

        let cfg = config(&[("X_BEARER_TOKEN", "primary"), ("TWITTER_BEARER_TOKEN", "abc")]);
        assert_eq!(cfg.bearer_token.as_deref(), Some("primary"));
    }

    #[test]
    fn test_missing_token_only_fails_when_required() {
        let cfg = config(&[]);
        assert!(cfg.bearer_token.is_none());
        assert!(matches!(
            cfg.require_bearer_token(),
            Err(Error::Config(ConfigError::MissingBearerToken))
        ));
    }

    #[test]
    fn test_malformed_token() {
        let cfg = config(&[("X_BEARER_TOKEN", "abc def")]);
        assert!(matches!(
            cfg.require_bearer_token(),
            Err(Error::Config(ConfigError::MalformedBearerToken(_)))
        ));

        let cfg = config(&[("X_BEARER_TOKEN", "AAAA%2Fbc=")]);
        assert_eq!(cfg.require_bearer_token().unwrap(), "AAAA%2Fbc=");
    }

    #[test]
    fn test_pricing_overrides() {
        let cfg = config(&[
            (POST_READ_PRICE_VAR, "0.01"),
            (USER_LOOKUP_PRICE_VAR, "-3"),
        ]);
        assert_eq!(cfg.pricing.post_read_usd, 0.01);
        assert_eq!(cfg.pricing.user_lookup_usd, PricingTable::default().user_lookup_usd);
        assert_eq!(cfg.pricing.last_reviewed_utc, PRICING_OVERRIDDEN);
    }

    #[test]
    fn test_rejected_overrides_keep_review_date() {
        let cfg = config(&[(POST_READ_PRICE_VAR, "free"), (USER_LOOKUP_PRICE_VAR, "-3")]);
        assert_eq!(cfg.pricing, PricingTable::default());
        assert_eq!(cfg.pricing.last_reviewed_utc, PRICING_LAST_REVIEWED_UTC);

        let cfg = config(&[(USER_LOOKUP_PRICE_VAR, "0.02")]);
        assert_eq!(cfg.pricing.user_lookup_usd, 0.02);
        assert_eq!(cfg.pricing.last_reviewed_utc, PRICING_OVERRIDDEN);
    }

    #[test]
    fn test_api_host_override() {
        let cfg = config(&[]);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);

        let cfg = config(&[]).with_api_host(Some("http://127.0.0.1:1234/"));
        assert_eq!(cfg.api_base, "http://127.0.0.1:1234/2");

        let cfg = config(&[]).with_api_host(Some("https://api.example.com/2"));
        assert_eq!(cfg.api_base, "https://api.example.com/2");
    }
}
