//! Counters describing how often the cache went back to the registry.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Renewal counters kept by a [`CredentialCache`](crate::auth::CredentialCache).
///
/// Reads are relaxed snapshots; the four numbers are not updated atomically as a group.
#[derive(Debug, Default)]
pub struct RenewalMetrics {
	round_trips: AtomicU64,
	issued: AtomicU64,
	refused: AtomicU64,
	coalesced_failures: AtomicU64,
}
impl RenewalMetrics {
	/// Renewal round trips sent to the registry.
	pub fn attempts(&self) -> u64 {
		self.round_trips.load(Ordering::Relaxed)
	}

	/// Round trips that came back with a credential.
	pub fn successes(&self) -> u64 {
		self.issued.load(Ordering::Relaxed)
	}

	/// Round trips that ended in an error.
	pub fn failures(&self) -> u64 {
		self.refused.load(Ordering::Relaxed)
	}

	/// Callers that were queued behind a failed round trip and got its error without sending
	/// their own.
	pub fn coalesced_failures(&self) -> u64 {
		self.coalesced_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.round_trips.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.issued.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.refused.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_coalesced_failure(&self) {
		self.coalesced_failures.fetch_add(1, Ordering::Relaxed);
	}
}
