//! Shared bearer-token cache.
//!
//! One cache is shared by every caller of a client. Authentication runs
//! while the cache lock is held, so concurrent callers that find the token
//! missing or stale wait for a single login instead of each performing
//! their own.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::error::BrokerageError;

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN: Duration = Duration::seconds(60);

/// A bearer token and its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// Create a token.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Raw token for the `Authorization` header.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expiry time.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Usable at `now` with the refresh margin to spare.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > REFRESH_MARGIN
    }
}

/// Single-flight token cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
    refreshes: AtomicU64,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token, or run `authenticate` and cache its result.
    ///
    /// # Errors
    ///
    /// Propagates the authentication error; the cache stays empty.
    pub async fn get_or_authenticate<F, Fut>(
        &self,
        authenticate: F,
    ) -> Result<AccessToken, BrokerageError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<AccessToken, BrokerageError>> + Send,
    {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.clone());
        }

        let token = authenticate().await?;
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Clear the cache if it still holds `stale`.
    ///
    /// A caller that saw a 401 with an old token must not discard a fresh
    /// token another caller has already installed.
    pub async fn invalidate(&self, stale: &AccessToken) {
        let mut slot = self.slot.lock().await;
        if slot.as_ref() == Some(stale) {
            *slot = None;
        }
    }

    /// Number of successful authentications.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn token(value: &str) -> AccessToken {
        AccessToken::new(value, Utc::now() + Duration::minutes(90))
    }

    #[tokio::test]
    async fn caches_after_first_login() {
        let cache = TokenCache::new();
        let first = cache
            .get_or_authenticate(|| async { Ok(token("t1")) })
            .await
            .unwrap();
        let second = cache
            .get_or_authenticate(|| async { Ok(token("t2")) })
            .await
            .unwrap();
        assert_eq!(first.value(), "t1");
        assert_eq!(second.value(), "t1");
        assert_eq!(cache.refresh_count(), 1);
    }

    #[tokio::test]
    async fn refreshes_near_expiry() {
        let cache = TokenCache::new();
        let expiring = AccessToken::new("old", Utc::now() + Duration::seconds(30));
        cache
            .get_or_authenticate(|| async { Ok(expiring) })
            .await
            .unwrap();
        let next = cache
            .get_or_authenticate(|| async { Ok(token("new")) })
            .await
            .unwrap();
        assert_eq!(next.value(), "new");
        assert_eq!(cache.refresh_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_login() {
        let cache = Arc::new(TokenCache::new());
        let logins = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let logins = Arc::clone(&logins);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_authenticate(|| async move {
                        logins.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(token("shared"))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().value(), "shared");
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_only_clears_matching_token() {
        let cache = TokenCache::new();
        let current = cache
            .get_or_authenticate(|| async { Ok(token("current")) })
            .await
            .unwrap();

        cache.invalidate(&token("someone-elses")).await;
        let still = cache
            .get_or_authenticate(|| async { Ok(token("unused")) })
            .await
            .unwrap();
        assert_eq!(still.value(), "current");

        cache.invalidate(&current).await;
        let fresh = cache
            .get_or_authenticate(|| async { Ok(token("fresh")) })
            .await
            .unwrap();
        assert_eq!(fresh.value(), "fresh");
    }

    #[tokio::test]
    async fn failed_login_leaves_cache_empty() {
        let cache = TokenCache::new();
        let err = cache
            .get_or_authenticate(|| async {
                Err(BrokerageError::AuthenticationFailed {
                    message: "bad password".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerageError::AuthenticationFailed { .. }));
        assert_eq!(cache.refresh_count(), 0);
    }
}
