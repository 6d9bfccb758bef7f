//! Shared credential cache with singleflight renewal.
//!
//! [`CredentialCache::get`] serves the cached credential while it is valid and otherwise renews it
//! through the configured [`CredentialRenewal`]. Renewal runs under a per-cache async guard, and
//! callers re-check the cache after the guard is acquired. Every caller that queued behind an
//! in-flight renewal shares its outcome: a success is picked up from the cache, and a failure is
//! handed back as [`Error::RenewalFailed`] without another round trip.

mod metrics;

pub use metrics::RenewalMetrics;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialRenewal},
};

/// Holds the current credential and coordinates its renewal.
pub struct CredentialCache {
	renewal: RwLock<Option<Arc<dyn CredentialRenewal>>>,
	current: RwLock<Option<Credential>>,
	singleflight: AsyncMutex<()>,
	last_round: Mutex<RenewalRound>,
	refresh_margin: Duration,
	metrics: RenewalMetrics,
}
impl CredentialCache {
	/// Creates an empty cache that renews through `renewal`.
	pub fn new(renewal: Arc<dyn CredentialRenewal>) -> Self {
		Self {
			renewal: RwLock::new(Some(renewal)),
			current: RwLock::new(None),
			singleflight: AsyncMutex::new(()),
			last_round: Mutex::new(RenewalRound::default()),
			refresh_margin: Duration::ZERO,
			metrics: RenewalMetrics::default(),
		}
	}

	/// Renews credentials once fewer than `margin` of their lifetime remains.
	///
	/// Negative margins are clamped to zero.
	pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
		self.refresh_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Returns a valid credential, renewing first if needed.
	pub async fn get(&self) -> Result<Credential> {
		self.get_at(OffsetDateTime::now_utc()).await
	}

	/// Returns a credential valid at `now`, renewing first if none is cached or the cached one is
	/// stale at `now`.
	///
	/// `now` only decides staleness; a renewed credential carries the instant it was issued.
	pub async fn get_at(&self, now: OffsetDateTime) -> Result<Credential> {
		if let Some(credential) = self.cached_at(now) {
			return Ok(credential);
		}

		let observed = self.last_round.lock().completed;
		let _singleflight = self.singleflight.lock().await;

		if let Some(credential) = self.cached_at(now) {
			return Ok(credential);
		}
		if let Some(reason) = self.failure_since(observed) {
			self.metrics.record_coalesced_failure();

			return Err(Error::RenewalFailed { reason });
		}

		let renewal = self.renewal.read().clone().ok_or(Error::Closed)?;

		self.metrics.record_attempt();

		let outcome = renewal.renew().await;
		let mut round = self.last_round.lock();

		round.completed += 1;

		match outcome {
			Ok(credential) => {
				*self.current.write() = Some(credential.clone());
				round.failure = None;

				self.metrics.record_success();

				Ok(credential)
			},
			Err(err) => {
				round.failure = Some(err.to_string());

				self.metrics.record_failure();

				Err(err)
			},
		}
	}

	/// Returns the cached credential, valid or not.
	pub fn current(&self) -> Option<Credential> {
		self.current.read().clone()
	}

	/// Drops the cached credential so the next [`get`](Self::get) renews.
	pub fn invalidate(&self) {
		self.current.write().take();
	}

	/// Releases the renewal source. Renewals requested afterwards fail with [`Error::Closed`];
	/// a still-valid cached credential keeps being served.
	pub fn close(&self) {
		self.renewal.write().take();
	}

	/// Returns `true` once [`close`](Self::close) has been called.
	pub fn is_closed(&self) -> bool {
		self.renewal.read().is_none()
	}

	/// Renewal counters.
	pub fn metrics(&self) -> &RenewalMetrics {
		&self.metrics
	}

	fn cached_at(&self, now: OffsetDateTime) -> Option<Credential> {
		self.current
			.read()
			.as_ref()
			.filter(|credential| credential.is_usable_at(now, self.refresh_margin))
			.cloned()
	}

	/// Error of the latest round, if one completed after `observed` and failed.
	fn failure_since(&self, observed: u64) -> Option<String> {
		let round = self.last_round.lock();

		if round.completed == observed { None } else { round.failure.clone() }
	}
}
impl Debug for CredentialCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache")
			.field("current", &self.current.read().as_ref().map(|credential| credential.expires_at))
			.field("refresh_margin", &self.refresh_margin)
			.field("closed", &self.is_closed())
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// Outcome of the most recent renewal round trip.
#[derive(Debug, Default)]
struct RenewalRound {
	completed: u64,
	failure: Option<String>,
}
