//! Token source contracts and the built-in in-memory implementation.
//!
//! A [`TokenSource`] owns the current credential. The fetch pipeline only reads from it through
//! watch receivers and nudges it through [`TokenSource::refresh`]; it never writes tokens itself.

pub mod memory;

pub use memory::MemoryTokenSource;

// crates.io
use tokio::sync::watch;
// self
use crate::auth::Token;

/// Live view of the current token.
///
/// The receiver holds the latest known value immediately and is notified on every change.
/// `None` means the source holds no credential.
pub type TokenWatch = watch::Receiver<Option<Token>>;

/// Notification channel that fires when the credential is confirmed unrecoverable.
///
/// The carried value is an epoch incremented on every firing; only changes matter.
pub type ExpirySignal = watch::Receiver<u64>;

/// Holder of the current bearer credential shared by every concurrent fetch.
///
/// Receivers handed out by [`current_token`](Self::current_token) and
/// [`expired_signal`](Self::expired_signal) are owned by their subscriber; dropping them is the
/// only unsubscription step.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Subscribes to the current token and its future replacements.
	fn current_token(&self) -> TokenWatch;

	/// Requests a refresh of the credential.
	///
	/// The call is fire-and-forget and must be safe to repeat while a refresh is in flight.
	/// Completion is observed through [`current_token`](Self::current_token) (new token) or
	/// [`expired_signal`](Self::expired_signal) (unrecoverable).
	fn refresh(&self);

	/// Subscribes to unrecoverable-expiry notifications.
	fn expired_signal(&self) -> ExpirySignal;
}
