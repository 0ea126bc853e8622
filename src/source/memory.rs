//! Thread-safe in-memory [`TokenSource`] for local development, tests, and embedding.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	auth::Token,
	source::{ExpirySignal, TokenSource, TokenWatch},
};

/// In-process token holder whose refreshes are performed by an external driver.
///
/// [`refresh`](TokenSource::refresh) raises a refresh request that drivers observe through
/// [`refresh_requests`](Self::refresh_requests). While a request is pending, further triggers are
/// counted but not forwarded; [`set_token`](Self::set_token), [`clear`](Self::clear), or
/// [`expire`](Self::expire) settle the pending request.
#[derive(Debug)]
pub struct MemoryTokenSource {
	token: watch::Sender<Option<Token>>,
	expired: watch::Sender<u64>,
	refresh_requests: watch::Sender<u64>,
	refresh_pending: Mutex<bool>,
	refresh_calls: AtomicU64,
}
impl MemoryTokenSource {
	/// Creates an empty source.
	pub fn new() -> Self {
		Self {
			token: watch::Sender::new(None),
			expired: watch::Sender::new(0),
			refresh_requests: watch::Sender::new(0),
			refresh_pending: Mutex::new(false),
			refresh_calls: AtomicU64::new(0),
		}
	}

	/// Creates a source seeded with `token`.
	pub fn with_token(token: Token) -> Self {
		let source = Self::new();

		source.token.send_replace(Some(token));

		source
	}

	/// Returns a snapshot of the current token.
	pub fn token(&self) -> Option<Token> {
		self.token.borrow().clone()
	}

	/// Publishes `token` and settles any pending refresh request.
	///
	/// Every subscriber is woken, even when the value did not change.
	pub fn set_token(&self, token: Token) {
		*self.refresh_pending.lock() = false;

		self.token.send_replace(Some(token));
	}

	/// Removes the current token without firing the expiry signal.
	pub fn clear(&self) {
		*self.refresh_pending.lock() = false;

		self.token.send_replace(None);
	}

	/// Declares the credential unrecoverable.
	///
	/// The expiry signal fires before the token is cleared so subscribers observing both changes
	/// can tell revocation apart from a plain [`clear`](Self::clear).
	pub fn expire(&self) {
		*self.refresh_pending.lock() = false;

		self.expired.send_modify(|epoch| *epoch = epoch.wrapping_add(1));
		self.token.send_replace(None);
	}

	/// Subscribes to refresh requests; the carried value counts forwarded requests.
	///
	/// The returned receiver treats the current count as seen, so the next `changed()` resolves
	/// on the next forwarded request.
	pub fn refresh_requests(&self) -> watch::Receiver<u64> {
		self.refresh_requests.subscribe()
	}

	/// Returns `true` while a forwarded refresh request has not been settled.
	pub fn refresh_pending(&self) -> bool {
		*self.refresh_pending.lock()
	}

	/// Total number of [`refresh`](TokenSource::refresh) calls received, forwarded or not.
	pub fn refresh_calls(&self) -> u64 {
		self.refresh_calls.load(Ordering::SeqCst)
	}

	/// Number of refresh requests forwarded to drivers.
	pub fn forwarded_refreshes(&self) -> u64 {
		*self.refresh_requests.borrow()
	}

	/// Number of live token subscriptions.
	pub fn token_subscribers(&self) -> usize {
		self.token.receiver_count()
	}

	/// Number of live expiry-signal subscriptions.
	pub fn expiry_subscribers(&self) -> usize {
		self.expired.receiver_count()
	}
}
impl Default for MemoryTokenSource {
	fn default() -> Self {
		Self::new()
	}
}
impl TokenSource for MemoryTokenSource {
	fn current_token(&self) -> TokenWatch {
		self.token.subscribe()
	}

	fn refresh(&self) {
		self.refresh_calls.fetch_add(1, Ordering::SeqCst);

		let mut pending = self.refresh_pending.lock();

		if *pending {
			return;
		}

		*pending = true;

		self.refresh_requests.send_modify(|count| *count += 1);
	}

	fn expired_signal(&self) -> ExpirySignal {
		self.expired.subscribe()
	}
}
