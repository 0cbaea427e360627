//! Process-wide bearer token cache.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::CherryPickerResult;
use crate::domain::models::AccessToken;
use crate::domain::ports::TokenProvider;

/// Source of "now" for freshness checks.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Default safety margin before expiry.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

/// Caches one bearer token and refreshes it when absent or near expiry.
///
/// The cache lock is held across the credential exchange, so concurrent
/// callers that all find the token stale wait for a single refresh instead
/// of each starting their own. A failed exchange leaves the cache untouched
/// and the next call tries again.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    margin: Duration,
    cached: Mutex<Option<AccessToken>>,
    clock: Clock,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
            cached: Mutex::new(None),
            clock: Arc::new(Utc::now),
        }
    }

    /// Override the refresh margin.
    pub fn with_margin(mut self, margin: std::time::Duration) -> Self {
        self.margin = Duration::from_std(margin)
            .unwrap_or_else(|_| Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS));
        self
    }

    /// Override the clock (tests).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Return a bearer token valid for at least the refresh margin.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> CherryPickerResult<String> {
        let mut cached = self.cached.lock().await;
        let now = (self.clock)();

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(now, self.margin) {
                debug!(expires_at = %token.expires_at, "reusing cached token");
                return Ok(token.value.clone());
            }
            debug!(expires_at = %token.expires_at, "cached token near expiry, refreshing");
        }

        let fresh = match self.provider.fetch_token().await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "credential exchange failed");
                return Err(err);
            }
        };
        info!(expires_at = %fresh.expires_at, "obtained new upstream token");

        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CherryPickerError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

    /// Clock the test can move forward.
    #[derive(Clone)]
    struct ManualClock {
        base: DateTime<Utc>,
        offset_secs: Arc<AtomicI64>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: Utc::now(),
                offset_secs: Arc::new(AtomicI64::new(0)),
            }
        }

        fn now(&self) -> DateTime<Utc> {
            self.base + Duration::seconds(self.offset_secs.load(Ordering::SeqCst))
        }

        fn advance(&self, secs: i64) {
            self.offset_secs.fetch_add(secs, Ordering::SeqCst);
        }

        fn as_clock(&self) -> Clock {
            let clock = self.clone();
            Arc::new(move || clock.now())
        }
    }

    struct CountingProvider {
        exchanges: AtomicUsize,
        ttl_secs: i64,
        clock: ManualClock,
        fail: AtomicBool,
        delay: Option<std::time::Duration>,
    }

    impl CountingProvider {
        fn new(clock: ManualClock, ttl_secs: i64) -> Self {
            Self {
                exchanges: AtomicUsize::new(0),
                ttl_secs,
                clock,
                fail: AtomicBool::new(false),
                delay: None,
            }
        }

        fn exchanges(&self) -> usize {
            self.exchanges.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenProvider for CountingProvider {
        async fn fetch_token(&self) -> CherryPickerResult<AccessToken> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(CherryPickerError::Auth("invalid_client".to_string()));
            }
            Ok(AccessToken::from_expires_in(format!("token-{n}"), self.ttl_secs, self.clock.now())
                .unwrap())
        }
    }

    #[tokio::test]
    async fn test_two_calls_within_validity_share_one_exchange() {
        let clock = ManualClock::new();
        let provider = Arc::new(CountingProvider::new(clock.clone(), 3600));
        let cache = TokenCache::new(provider.clone()).with_clock(clock.as_clock());

        let first = cache.get_token().await.unwrap();
        clock.advance(120);
        let second = cache.get_token().await.unwrap();

        assert_eq!(first, "token-1");
        assert_eq!(second, "token-1");
        assert_eq!(provider.exchanges(), 1);
    }

    #[tokio::test]
    async fn test_call_after_expiry_refreshes_and_overwrites() {
        let clock = ManualClock::new();
        let provider = Arc::new(CountingProvider::new(clock.clone(), 3600));
        let cache = TokenCache::new(provider.clone()).with_clock(clock.as_clock());

        cache.get_token().await.unwrap();

        clock.advance(3600);
        let token = cache.get_token().await.unwrap();
        assert_eq!(token, "token-2");
        assert_eq!(provider.exchanges(), 2);

        clock.advance(120);
        assert_eq!(cache.get_token().await.unwrap(), "token-2");
        assert_eq!(provider.exchanges(), 2);
    }

    #[tokio::test]
    async fn test_refreshes_inside_safety_margin() {
        let clock = ManualClock::new();
        let provider = Arc::new(CountingProvider::new(clock.clone(), 3600));
        let cache = TokenCache::new(provider.clone()).with_clock(clock.as_clock());

        cache.get_token().await.unwrap();
        clock.advance(3541);
        cache.get_token().await.unwrap();

        assert_eq!(provider.exchanges(), 2);
    }

    #[tokio::test]
    async fn test_custom_margin() {
        let clock = ManualClock::new();
        let provider = Arc::new(CountingProvider::new(clock.clone(), 3600));
        let cache = TokenCache::new(provider.clone())
            .with_margin(std::time::Duration::from_secs(0))
            .with_clock(clock.as_clock());

        cache.get_token().await.unwrap();
        clock.advance(3599);
        cache.get_token().await.unwrap();

        assert_eq!(provider.exchanges(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let clock = ManualClock::new();
        let provider = Arc::new(CountingProvider::new(clock.clone(), 3600));
        provider.fail.store(true, Ordering::SeqCst);
        let cache = TokenCache::new(provider.clone()).with_clock(clock.as_clock());

        let err = cache.get_token().await.unwrap_err();
        assert!(matches!(err, CherryPickerError::Auth(_)));

        provider.fail.store(false, Ordering::SeqCst);
        let token = cache.get_token().await.unwrap();
        assert_eq!(token, "token-2");
        assert_eq!(provider.exchanges(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_collapse_into_one_exchange() {
        let clock = ManualClock::new();
        let mut provider = CountingProvider::new(clock.clone(), 3600);
        provider.delay = Some(std::time::Duration::from_millis(50));
        let provider = Arc::new(provider);
        let cache = Arc::new(TokenCache::new(provider.clone()).with_clock(clock.as_clock()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_token().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "token-1");
        }
        assert_eq!(provider.exchanges(), 1);
    }
}
