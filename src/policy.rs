//! Expiry classification hooks that decide whether a response rejects the current token.
//!
//! Implementations inspect only the crate-owned [`HttpResponse`] so policies stay decoupled from
//! the transport that produced it.

// crates.io
use http::{
	StatusCode,
	header::{HeaderMap, WWW_AUTHENTICATE},
};
// self
use crate::{_prelude::*, transport::HttpResponse};

/// Strategy hook that classifies responses as token expiry.
///
/// A response classified as expired is provisional: the pipeline drops it, waits for a new token,
/// and replays the request.
pub trait ExpiryPolicy: Send + Sync {
	/// Returns `true` when the response signals that the token used to sign the request expired.
	fn is_expired(&self, response: &HttpResponse) -> bool;
}
impl<F> ExpiryPolicy for F
where
	F: Send + Sync + Fn(&HttpResponse) -> bool,
{
	fn is_expired(&self, response: &HttpResponse) -> bool {
		self(response)
	}
}

/// Policy treating a fixed set of status codes as expiry.
///
/// The default set is `401 Unauthorized`. A `401` whose `WWW-Authenticate` challenge reports
/// `error="insufficient_scope"` is a permission problem rather than an expired token, so it is
/// never classified as expiry; refreshing would not change the outcome.
#[derive(Clone, Debug)]
pub struct StatusExpiryPolicy {
	statuses: Vec<StatusCode>,
}
impl StatusExpiryPolicy {
	/// Creates a policy for the provided status codes.
	///
	/// Codes outside `100..=999` are ignored.
	pub fn new<I>(statuses: I) -> Self
	where
		I: IntoIterator<Item = u16>,
	{
		let mut statuses: Vec<_> =
			statuses.into_iter().filter_map(|code| StatusCode::from_u16(code).ok()).collect();

		statuses.sort_unstable();
		statuses.dedup();

		Self { statuses }
	}

	/// Status codes classified as expiry.
	pub fn statuses(&self) -> &[StatusCode] {
		&self.statuses
	}
}
impl Default for StatusExpiryPolicy {
	fn default() -> Self {
		Self::new([StatusCode::UNAUTHORIZED.as_u16()])
	}
}
impl Display for StatusExpiryPolicy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("expiry on ")?;

		for (idx, status) in self.statuses.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}

			write!(f, "{}", status.as_u16())?;
		}

		Ok(())
	}
}
impl ExpiryPolicy for StatusExpiryPolicy {
	fn is_expired(&self, response: &HttpResponse) -> bool {
		self.statuses.binary_search(&response.status()).is_ok()
			&& !challenges_scope(response.headers())
	}
}

fn challenges_scope(headers: &HeaderMap) -> bool {
	headers.get_all(WWW_AUTHENTICATE).iter().filter_map(|value| value.to_str().ok()).any(
		|challenge| {
			let lowered = challenge.to_ascii_lowercase();

			lowered.contains("error=\"insufficient_scope\"")
				|| lowered.contains("error=insufficient_scope")
		},
	)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, challenge: Option<&str>) -> HttpResponse {
		let mut builder = http::Response::builder().status(status);

		if let Some(challenge) = challenge {
			builder = builder.header(WWW_AUTHENTICATE, challenge);
		}

		builder.body(Vec::new()).expect("Response fixture should build.")
	}

	#[test]
	fn default_policy_flags_unauthorized_only() {
		let policy = StatusExpiryPolicy::default();

		assert!(policy.is_expired(&response(401, None)));
		assert!(policy.is_expired(&response(401, Some("Bearer error=\"invalid_token\""))));
		assert!(!policy.is_expired(&response(200, None)));
		assert!(!policy.is_expired(&response(403, None)));
		assert!(!policy.is_expired(&response(500, None)));
	}

	#[test]
	fn insufficient_scope_is_not_expiry() {
		let policy = StatusExpiryPolicy::default();

		assert!(!policy.is_expired(&response(
			401,
			Some("Bearer realm=\"api\", error=\"insufficient_scope\", scope=\"admin\""),
		)));
	}

	#[test]
	fn custom_statuses_are_normalized() {
		let policy = StatusExpiryPolicy::new([419, 401, 419, 42]);

		let expected = [
			StatusCode::UNAUTHORIZED,
			StatusCode::from_u16(419).expect("419 should be a valid status code."),
		];

		assert_eq!(policy.statuses(), &expected);
		assert!(policy.is_expired(&response(419, None)));
		assert_eq!(policy.to_string(), "expiry on 401, 419");
		assert_eq!(StatusExpiryPolicy::default().to_string(), "expiry on 401");
	}

	#[test]
	fn closures_act_as_policies() {
		let policy = |response: &HttpResponse| response.status() == StatusCode::FORBIDDEN;

		assert!(ExpiryPolicy::is_expired(&policy, &response(403, None)));
		assert!(!ExpiryPolicy::is_expired(&policy, &response(401, None)));
	}
}
