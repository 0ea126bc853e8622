//! Bearer token value object with a redacted secret and a stable fingerprint.

pub mod secret;

// std
use std::sync::OnceLock;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Opaque bearer credential published by a [`TokenSource`](crate::source::TokenSource).
///
/// The expiry is advisory: the server decides when a token stops working and the fetch pipeline
/// learns about it from responses. The [`fingerprint`](Self::fingerprint) is a base64 (no padding)
/// SHA-256 digest of the secret, cached after the first calculation, so tokens can be told apart
/// in logs and refresh bookkeeping without exposing the secret.
#[derive(Serialize, Deserialize)]
pub struct Token {
	/// Secret bound to outgoing requests; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Expiry instant reported by the issuer, when known.
	pub expires_at: Option<OffsetDateTime>,
	#[serde(skip)]
	fingerprint_cache: OnceLock<String>,
}
impl Token {
	/// Wraps a secret with no known expiry.
	pub fn new(secret: impl Into<TokenSecret>) -> Self {
		Self { secret: secret.into(), expires_at: None, fingerprint_cache: OnceLock::new() }
	}

	/// Records the issuer-reported expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Records the expiry relative to `issued_at`.
	pub fn with_expires_in(self, issued_at: OffsetDateTime, expires_in: Duration) -> Self {
		self.with_expires_at(issued_at + expires_in)
	}

	/// Returns `true` if the issuer-reported expiry has passed at the provided instant.
	///
	/// Tokens without a known expiry are never considered expired locally.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Stable, non-reversible identifier for the secret.
	pub fn fingerprint(&self) -> String {
		self.fingerprint_cache.get_or_init(|| compute_fingerprint(&self.secret)).clone()
	}
}
impl Clone for Token {
	fn clone(&self) -> Self {
		Self {
			secret: self.secret.clone(),
			expires_at: self.expires_at,
			fingerprint_cache: self.fingerprint_cache.clone(),
		}
	}
}
impl PartialEq for Token {
	fn eq(&self, other: &Self) -> bool {
		self.secret == other.secret && self.expires_at == other.expires_at
	}
}
impl Eq for Token {}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("secret", &"<redacted>")
			.field("fingerprint", &self.fingerprint())
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
impl From<TokenSecret> for Token {
	fn from(secret: TokenSecret) -> Self {
		Self::new(secret)
	}
}

fn compute_fingerprint(secret: &TokenSecret) -> String {
	let digest = Sha256::digest(secret.expose().as_bytes());

	STANDARD_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn fingerprint_is_stable_and_secret_free() {
		let token = Token::new("access-123");
		let same = Token::new("access-123");
		let other = Token::new("access-456");

		assert_eq!(token.fingerprint(), same.fingerprint());
		assert_ne!(token.fingerprint(), other.fingerprint());
		assert!(!token.fingerprint().contains("access"));
		assert_eq!(token.fingerprint().len(), 43);
	}

	#[test]
	fn debug_output_redacts_secret() {
		let token = Token::new("super-secret");
		let rendered = format!("{token:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("super-secret"));
	}

	#[test]
	fn expiry_is_advisory() {
		let issued = datetime!(2025-01-01 00:00 UTC);
		let token = Token::new("t").with_expires_in(issued, Duration::minutes(5));

		assert!(!token.is_expired_at(issued + Duration::minutes(4)));
		assert!(token.is_expired_at(issued + Duration::minutes(5)));
		assert!(!Token::new("no-expiry").is_expired_at(issued + Duration::days(365)));
	}

	#[test]
	fn serde_skips_fingerprint_cache() {
		let token = Token::new("serialized");
		let _ = token.fingerprint();
		let payload = serde_json::to_string(&token).expect("Token should serialize to JSON.");

		assert_eq!(payload, "{\"secret\":\"serialized\",\"expires_at\":null}");

		let round_trip: Token =
			serde_json::from_str(&payload).expect("Token should deserialize from JSON.");

		assert_eq!(round_trip, token);
		assert_eq!(round_trip.fingerprint(), token.fingerprint());
	}
}
