//! Per-client request quotas keyed on the caller's IP.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use super::API_PREFIX;
use super::state::AppState;
use crate::config::{ConfigError, RateLimitConfig, RateSpec};
use crate::error::AppError;

/// One keyed limiter per quota class.
pub struct RateLimits {
    pub default: DefaultKeyedRateLimiter<String>,
    pub login: DefaultKeyedRateLimiter<String>,
    pub bootstrap: DefaultKeyedRateLimiter<String>,
}

/// Which quota a request path falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Exempt,
    Default,
    Login,
    Bootstrap,
}

fn quota(spec: RateSpec) -> Quota {
    // `count` requests per period, replenished evenly.
    Quota::with_period(spec.per / spec.count.get())
        .unwrap_or_else(|| Quota::per_second(spec.count))
        .allow_burst(spec.count)
}

impl RateLimits {
    pub fn from_config(config: &RateLimitConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            default: RateLimiter::keyed(quota(RateSpec::parse(&config.default)?)),
            login: RateLimiter::keyed(quota(RateSpec::parse(&config.login)?)),
            bootstrap: RateLimiter::keyed(quota(RateSpec::parse(&config.bootstrap)?)),
        })
    }

    fn limiter(&self, bucket: Bucket) -> Option<&DefaultKeyedRateLimiter<String>> {
        match bucket {
            Bucket::Exempt => None,
            Bucket::Default => Some(&self.default),
            Bucket::Login => Some(&self.login),
            Bucket::Bootstrap => Some(&self.bootstrap),
        }
    }

    /// Whether `key` may make another request in `bucket`.
    pub fn check(&self, bucket: Bucket, key: &str) -> bool {
        match self.limiter(bucket) {
            Some(limiter) => limiter.check_key(&key.to_string()).is_ok(),
            None => true,
        }
    }

    /// Drop keys whose quota has fully replenished.
    pub fn retain_recent(&self) {
        self.default.retain_recent();
        self.login.retain_recent();
        self.bootstrap.retain_recent();
    }
}

pub fn bucket_for(path: &str) -> Bucket {
    match path.strip_prefix(API_PREFIX) {
        Some("/health") => Bucket::Exempt,
        Some("/auth/login") => Bucket::Login,
        Some("/auth/bootstrap") => Bucket::Bootstrap,
        _ => Bucket::Default,
    }
}

/// First `X-Forwarded-For` entry, else the peer address, else `"unknown"`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

pub async fn limit_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let bucket = bucket_for(request.uri().path());
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer);

    if !state.limits.check(bucket, &key) {
        tracing::warn!(client = %key, path = %request.uri().path(), "rate_limited");
        return AppError::RateLimited.into_response();
    }

    next.run(request).await
}

/// Prune idle limiter keys every `period` until the runtime shuts down.
pub fn spawn_pruner(state: AppState, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.limits.retain_recent();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limits(login: &str) -> RateLimits {
        RateLimits::from_config(&RateLimitConfig {
            default: "200/minute".into(),
            login: login.into(),
            bootstrap: "2/minute".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_bucket_for_path() {
        assert_eq!(bucket_for("/api/v1/health"), Bucket::Exempt);
        assert_eq!(bucket_for("/api/v1/auth/login"), Bucket::Login);
        assert_eq!(bucket_for("/api/v1/auth/bootstrap"), Bucket::Bootstrap);
        assert_eq!(bucket_for("/api/v1/employees"), Bucket::Default);
        assert_eq!(bucket_for("/other"), Bucket::Default);
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer)), "10.0.0.9");
        assert_eq!(client_key(&headers, None), "unknown");

        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"));
        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn test_login_quota_exhausts_per_key() {
        let limits = limits("3/minute");
        for _ in 0..3 {
            assert!(limits.check(Bucket::Login, "a"));
        }
        assert!(!limits.check(Bucket::Login, "a"));
        assert!(limits.check(Bucket::Login, "b"));
        assert!(limits.check(Bucket::Exempt, "a"));
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let err = RateLimits::from_config(&RateLimitConfig {
            default: "lots".into(),
            login: "5/minute".into(),
            bootstrap: "2/minute".into(),
        });
        assert!(err.is_err());
    }
}
