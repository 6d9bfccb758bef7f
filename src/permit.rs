//! Fixed-window permit pool that caps how many submissions may start per window.
//!
//! The pool hands out at most `capacity` permits between two ticks of a background ticker. Every
//! tick resets the pool to full capacity, no matter how many permits were used: a window that
//! consumed two of five permits starts the next one with five again, never seven. Up to
//! `capacity` requests may therefore burst at the start of each window. Permits are never
//! returned early; a consumed permit stays consumed until the next tick.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{
	runtime::Handle,
	sync::Semaphore,
	task::JoinHandle,
	time::{Instant, MissedTickBehavior},
};
// self
use crate::{_prelude::*, error::ConfigError, obs};

/// Capacity-bounded pool of request slots replenished once per window.
pub struct PermitPool {
	capacity: u32,
	window: Duration,
	permits: Arc<Semaphore>,
	ticker: Mutex<Option<JoinHandle<()>>>,
}
impl PermitPool {
	/// Creates a full pool of `capacity` permits and starts the replenishment ticker on the
	/// current tokio runtime. The first reset happens one full `window` after start.
	pub fn start(capacity: u32, window: Duration) -> Result<Self, ConfigError> {
		if capacity == 0 {
			return Err(ConfigError::NonPositiveRequestLimit);
		}
		if !window.is_positive() {
			return Err(ConfigError::NonPositiveWindow);
		}

		let runtime = Handle::try_current().map_err(|_| ConfigError::RuntimeUnavailable)?;
		let permits = Arc::new(Semaphore::new(capacity as usize));
		let period = window.unsigned_abs();
		let ticker = runtime.spawn(replenish_every(
			Arc::clone(&permits),
			capacity,
			Instant::now() + period,
			period,
		));

		obs::record_permits_available(capacity);

		Ok(Self { capacity, window, permits, ticker: Mutex::new(Some(ticker)) })
	}

	/// Maximum number of permits per window.
	pub fn capacity(&self) -> u32 {
		self.capacity
	}

	/// Replenishment period.
	pub fn window(&self) -> Duration {
		self.window
	}

	/// Permits left in the current window.
	pub fn available(&self) -> u32 {
		u32::try_from(self.permits.available_permits()).unwrap_or(u32::MAX)
	}

	/// Waits until a permit is available and consumes it.
	///
	/// Dropping the returned future before it resolves consumes nothing. Blocked callers are not
	/// served in any guaranteed order.
	pub async fn acquire(&self) -> Result<()> {
		let permit = self.permits.acquire().await.map_err(|_| Error::Cancelled)?;

		permit.forget();
		obs::record_permits_available(self.available());

		Ok(())
	}

	/// Like [`acquire`](Self::acquire), but gives up with [`Error::Cancelled`] as soon as
	/// `signal` resolves. A cancelled wait never consumes a permit.
	pub async fn acquire_or_cancel<F>(&self, signal: F) -> Result<()>
	where
		F: Future,
	{
		tokio::select! {
			biased;

			_ = signal => Err(Error::Cancelled),
			acquired = self.acquire() => acquired,
		}
	}

	/// Consumes a permit only if one is available right now.
	pub fn try_acquire(&self) -> bool {
		match self.permits.try_acquire() {
			Ok(permit) => {
				permit.forget();
				obs::record_permits_available(self.available());

				true
			},
			Err(_) => false,
		}
	}

	/// Returns `true` while the replenishment ticker is alive.
	pub fn is_running(&self) -> bool {
		self.ticker.lock().as_ref().is_some_and(|handle| !handle.is_finished())
	}

	/// Cancels the replenishment ticker. Safe to call repeatedly.
	///
	/// Callers already parked in [`acquire`](Self::acquire) are not woken; they keep waiting for
	/// a permit that will no longer be replenished.
	pub fn stop(&self) {
		if let Some(handle) = self.ticker.lock().take() {
			handle.abort();
		}
	}
}
impl Drop for PermitPool {
	fn drop(&mut self) {
		self.stop();
	}
}
impl Debug for PermitPool {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PermitPool")
			.field("capacity", &self.capacity)
			.field("available", &self.available())
			.field("window", &self.window)
			.field("running", &self.is_running())
			.finish()
	}
}

async fn replenish_every(
	permits: Arc<Semaphore>,
	capacity: u32,
	first_tick: Instant,
	period: StdDuration,
) {
	let mut ticker = tokio::time::interval_at(first_tick, period);

	// Resets are idempotent, so collapsing missed ticks loses nothing.
	ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

	loop {
		ticker.tick().await;
		refill(&permits, capacity);
	}
}

/// Tops the pool back up to `capacity`.
///
/// The ticker is the only code that adds permits and concurrent acquirers only remove them, so
/// the count after the top-up never exceeds `capacity`.
fn refill(permits: &Semaphore, capacity: u32) {
	let missing = (capacity as usize).saturating_sub(permits.available_permits());

	if missing > 0 {
		permits.add_permits(missing);
	}

	obs::record_permits_available(capacity);
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	const WINDOW: Duration = Duration::seconds(1);

	fn start(capacity: u32) -> PermitPool {
		PermitPool::start(capacity, WINDOW).expect("Permit pool fixture should start.")
	}

	#[test]
	fn start_requires_a_runtime() {
		let err = PermitPool::start(1, WINDOW).expect_err("Starting outside tokio should fail.");

		assert!(matches!(err, ConfigError::RuntimeUnavailable));
	}

	#[tokio::test]
	async fn start_rejects_empty_pools_and_windows() {
		assert!(matches!(
			PermitPool::start(0, WINDOW),
			Err(ConfigError::NonPositiveRequestLimit)
		));
		assert!(matches!(
			PermitPool::start(1, Duration::ZERO),
			Err(ConfigError::NonPositiveWindow)
		));
	}

	#[tokio::test(start_paused = true)]
	async fn extra_caller_waits_for_window_boundary() {
		let pool = start(2);
		let started = Instant::now();

		pool.acquire().await.expect("First permit should be immediate.");
		pool.acquire().await.expect("Second permit should be immediate.");

		assert_eq!(started.elapsed(), StdDuration::ZERO);
		assert_eq!(pool.available(), 0);

		pool.acquire().await.expect("Third permit should be granted after the reset.");

		let waited = started.elapsed();

		assert!(waited >= StdDuration::from_secs(1), "Third caller waited only {waited:?}.");
		assert!(waited < StdDuration::from_millis(1_100), "Third caller waited {waited:?}.");
		assert_eq!(pool.available(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn reset_restores_full_capacity_without_accumulating() {
		let pool = start(5);

		pool.acquire().await.expect("Permit should be immediate.");
		pool.acquire().await.expect("Permit should be immediate.");

		assert_eq!(pool.available(), 3);

		tokio::time::sleep(StdDuration::from_millis(1_100)).await;

		assert_eq!(pool.available(), 5);

		tokio::time::sleep(StdDuration::from_secs(3)).await;

		assert_eq!(pool.available(), 5);
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_callers_never_oversubscribe() {
		let pool = Arc::new(start(3));
		let granted = Arc::new(AtomicUsize::new(0));
		let handles = (0..5)
			.map(|_| {
				let pool = Arc::clone(&pool);
				let granted = Arc::clone(&granted);

				tokio::spawn(async move {
					pool.acquire().await.expect("Permit should eventually be granted.");
					granted.fetch_add(1, Ordering::SeqCst);
				})
			})
			.collect::<Vec<_>>();

		tokio::time::sleep(StdDuration::from_millis(500)).await;

		assert_eq!(granted.load(Ordering::SeqCst), 3);
		assert_eq!(pool.available(), 0);

		for handle in handles {
			handle.await.expect("Acquiring task should not panic.");
		}

		assert_eq!(granted.load(Ordering::SeqCst), 5);
		assert_eq!(pool.available(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn single_permit_allows_one_call_per_window() {
		let pool = start(1);

		assert!(pool.try_acquire());
		assert!(!pool.try_acquire());

		tokio::time::sleep(StdDuration::from_millis(1_001)).await;

		assert!(pool.try_acquire());
		assert!(!pool.try_acquire());
	}

	#[tokio::test(start_paused = true)]
	async fn cancelled_wait_consumes_nothing() {
		let pool = start(1);

		pool.acquire().await.expect("Permit should be immediate.");

		let err = pool
			.acquire_or_cancel(tokio::time::sleep(StdDuration::from_millis(200)))
			.await
			.expect_err("Wait should be cancelled before the reset.");

		assert!(matches!(err, Error::Cancelled));

		tokio::time::sleep(StdDuration::from_secs(1)).await;

		assert_eq!(pool.available(), 1, "Cancelled waiter must not keep a claim on the pool.");

		let err = pool
			.acquire_or_cancel(std::future::ready(()))
			.await
			.expect_err("A ready signal should win over an available permit.");

		assert!(matches!(err, Error::Cancelled));
		assert_eq!(pool.available(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn stop_is_idempotent_and_halts_replenishment() {
		let pool = start(2);

		pool.acquire().await.expect("Permit should be immediate.");
		pool.acquire().await.expect("Permit should be immediate.");

		assert!(pool.is_running());

		pool.stop();
		pool.stop();

		tokio::time::sleep(StdDuration::from_secs(3)).await;

		assert!(!pool.is_running());
		assert_eq!(pool.available(), 0);
	}
}
