//! Single-flight bearer-token cache.
//!
//! The cache holds at most one token. [`TokenCache::get_valid_token`] runs the whole
//! check-then-refresh sequence under an async mutex, so concurrent callers queue behind a single
//! in-flight login and then observe its outcome. A failed login is handed to every caller that
//! was already queued behind it as [`Error::Refresh`] and leaves the held token in place; callers
//! arriving after the failure try again.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::BearerToken,
	oauth::OAuthClient,
};

/// Thread-safe counters describing cache decisions.
#[derive(Debug, Default)]
pub struct CacheMetrics {
	hits: AtomicU64,
	refreshes: AtomicU64,
	failures: AtomicU64,
}
impl CacheMetrics {
	/// Number of lookups served from the held token.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Number of successful logins performed by the cache.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Number of failed logins.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}

#[derive(Debug, Default)]
struct Slot {
	token: Option<BearerToken>,
	// Login attempt that produced the failure, numbered like `TokenCache::attempts`.
	last_failure: Option<(u64, Arc<Error>)>,
}

/// Holds the current bearer token for one client instance.
#[derive(Debug, Default)]
pub struct TokenCache {
	slot: AsyncMutex<Slot>,
	// Completed login attempts; only written while `slot` is locked.
	attempts: AtomicU64,
	metrics: CacheMetrics,
}
impl TokenCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a cache already holding `token`.
	pub fn seeded(token: BearerToken) -> Self {
		Self {
			slot: AsyncMutex::new(Slot { token: Some(token), last_failure: None }),
			..Default::default()
		}
	}

	/// Decision counters for this cache.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	/// Returns the held token, fresh or not, without contacting the OAuth endpoint.
	pub async fn current(&self) -> Option<BearerToken> {
		self.slot.lock().await.token.clone()
	}

	/// Drops the held token so the next lookup logs in again.
	pub async fn invalidate(&self) {
		self.slot.lock().await.token.take();
	}

	/// Returns a token that is fresh now, logging in through `oauth` when needed.
	pub async fn get_valid_token(&self, oauth: &OAuthClient) -> Result<BearerToken> {
		self.get_valid_token_at(oauth, OffsetDateTime::now_utc).await
	}

	/// Same as [`TokenCache::get_valid_token`] with an injectable clock, read after the lock is
	/// acquired.
	///
	/// A failed login is returned as [`Error::Refresh`], both to the caller that ran it and to
	/// every caller that was waiting on the lock while it ran.
	pub async fn get_valid_token_at<N>(&self, oauth: &OAuthClient, now: N) -> Result<BearerToken>
	where
		N: FnOnce() -> OffsetDateTime,
	{
		let seen = self.attempts.load(Ordering::Acquire);
		let mut slot = self.slot.lock().await;

		if let Some(token) = slot.token.as_ref().filter(|token| token.is_fresh_at(now())) {
			self.metrics.record_hit();

			#[cfg(feature = "tracing")]
			tracing::debug!(effective_expiry = %token.effective_expiry(), "Reusing cached bearer token.");

			return Ok(token.clone());
		}
		if let Some((_, e)) = slot.last_failure.as_ref().filter(|(attempt, _)| *attempt > seen) {
			#[cfg(feature = "tracing")]
			tracing::debug!(error = %e, "Sharing failed bearer token refresh.");

			return Err(Error::Refresh(e.clone()));
		}

		let outcome = oauth.login().await;
		let attempt = self.attempts.fetch_add(1, Ordering::AcqRel) + 1;

		match outcome {
			Ok(token) => {
				self.metrics.record_refresh();

				#[cfg(feature = "tracing")]
				tracing::debug!(effective_expiry = %token.effective_expiry(), "Cached refreshed bearer token.");

				slot.token = Some(token.clone());
				slot.last_failure = None;

				Ok(token)
			},
			Err(e) => {
				self.metrics.record_failure();

				let e = Arc::new(e);

				slot.last_failure = Some((attempt, e.clone()));

				Err(Error::Refresh(e))
			},
		}
	}
}
