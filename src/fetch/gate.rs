//! Single-flight bookkeeping for expiry-triggered refreshes.

// self
use crate::_prelude::*;

#[derive(Debug, Default)]
struct GateEntry {
	waiters: usize,
	triggered: bool,
}

/// Tracks which rejected credentials already have a refresh in flight.
///
/// Entries are keyed by [`Token::fingerprint`](crate::auth::Token::fingerprint) and count the
/// fetches waiting on that refresh. Joining only registers a waiter; the first waiter that
/// actually needs a refresh claims the trigger. The entry disappears when the last waiter settles
/// or is cancelled.
#[derive(Clone, Debug, Default)]
pub(crate) struct RefreshGate(Arc<Mutex<HashMap<String, GateEntry>>>);
impl RefreshGate {
	pub(crate) fn join(&self, fingerprint: String) -> RefreshTicket {
		self.0.lock().entry(fingerprint.clone()).or_default().waiters += 1;

		RefreshTicket { gate: self.clone(), fingerprint }
	}

	pub(crate) fn in_flight(&self) -> usize {
		self.0.lock().len()
	}
}

/// Membership in a [`RefreshGate`] entry; dropping it leaves the entry.
#[derive(Debug)]
pub(crate) struct RefreshTicket {
	gate: RefreshGate,
	fingerprint: String,
}
impl RefreshTicket {
	/// Returns `true` for exactly one caller per entry lifetime: the one that must trigger.
	pub(crate) fn claim_trigger(&self) -> bool {
		let mut entries = self.gate.0.lock();

		match entries.get_mut(&self.fingerprint) {
			Some(entry) if !entry.triggered => {
				entry.triggered = true;

				true
			},
			_ => false,
		}
	}
}
impl Drop for RefreshTicket {
	fn drop(&mut self) {
		let mut entries = self.gate.0.lock();

		if let Some(entry) = entries.get_mut(&self.fingerprint) {
			entry.waiters -= 1;

			if entry.waiters == 0 {
				entries.remove(&self.fingerprint);
			}
		}
	}
}
