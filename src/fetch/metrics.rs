// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for fetch outcomes.
#[derive(Debug, Default)]
pub struct FetchMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	refresh_triggers: AtomicU64,
	restarts: AtomicU64,
}
impl FetchMetrics {
	/// Returns the total number of fetches started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of fetches that resolved with a response.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of fetches that resolved with an error.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh triggers forwarded to the token source.
	pub fn refresh_triggers(&self) -> u64 {
		self.refresh_triggers.load(Ordering::Relaxed)
	}

	/// Returns the number of expiry-triggered restarts.
	pub fn restarts(&self) -> u64 {
		self.restarts.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_trigger(&self) {
		self.refresh_triggers.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_restart(&self) {
		self.restarts.fetch_add(1, Ordering::Relaxed);
	}
}
