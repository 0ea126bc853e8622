//! Optional observability helpers for the fetch pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `authorized_fetch.fetch` with the `stage`
//!   (call site) and `request` (`METHOD URI`) fields, and to route [`TracingLogger`] lines into
//!   `tracing` events.
//! - Enable `metrics` to increment the `authorized_fetch_total` counter for every
//!   attempt/success/failure/restart/refresh trigger, labeled by `outcome`.

mod log;
mod metrics;
mod tracing;

pub use self::{log::*, metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Outcome labels recorded while a fetch runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Entry to [`AuthorizedFetch::fetch`](crate::fetch::AuthorizedFetch::fetch).
	Attempt,
	/// Resolved with a response.
	Success,
	/// Resolved with an error.
	Failure,
	/// Replayed after an expiry-triggered refresh.
	Restart,
	/// Forwarded a refresh trigger to the token source.
	RefreshTriggered,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
			FetchOutcome::Restart => "restart",
			FetchOutcome::RefreshTriggered => "refresh_triggered",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
