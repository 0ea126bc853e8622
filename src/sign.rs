//! Request signing contracts that bind a [`Token`] to an outgoing request.

// crates.io
use http::{HeaderName, HeaderValue, header::AUTHORIZATION};
// self
use crate::{_prelude::*, auth::Token, error::SignError, transport::HttpRequest};

/// Describes how to attach a [`Token`] to an outbound request.
///
/// Signing is a pure transform: implementations must not perform I/O or mutate shared state,
/// and the pipeline never touches the returned request afterwards. A signer error is surfaced
/// to the caller as [`Error::TokenUnavailable`].
pub trait RequestSigner
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects authorization state derived from `token`.
	fn sign(&self, request: HttpRequest, token: &Token) -> Result<HttpRequest, SignError>;
}
impl<F> RequestSigner for F
where
	F: Send + Sync + Fn(HttpRequest, &Token) -> Result<HttpRequest, SignError>,
{
	fn sign(&self, request: HttpRequest, token: &Token) -> Result<HttpRequest, SignError> {
		self(request, token)
	}
}

/// Default signer writing `Authorization: Bearer <token>`.
///
/// Any existing value of the target header is replaced, so a request that already went through
/// one signing pass can be signed again with a fresh token.
#[derive(Clone, Debug)]
pub struct BearerSigner {
	header: HeaderName,
	scheme: String,
}
impl BearerSigner {
	/// Uses a custom authorization scheme (e.g., `token` for GitHub-style APIs).
	pub fn with_scheme(scheme: impl Into<String>) -> Self {
		Self { scheme: scheme.into(), ..Self::default() }
	}

	/// Writes the credential into a header other than `Authorization`.
	pub fn with_header(mut self, header: HeaderName) -> Self {
		self.header = header;

		self
	}
}
impl Default for BearerSigner {
	fn default() -> Self {
		Self { header: AUTHORIZATION, scheme: "Bearer".into() }
	}
}
impl RequestSigner for BearerSigner {
	fn sign(&self, mut request: HttpRequest, token: &Token) -> Result<HttpRequest, SignError> {
		let raw = if self.scheme.is_empty() {
			token.secret.expose().to_owned()
		} else {
			format!("{} {}", self.scheme, token.secret.expose())
		};
		let mut value = HeaderValue::from_str(&raw)?;

		value.set_sensitive(true);
		request.headers_mut().insert(self.header.clone(), value);

		Ok(request)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request() -> HttpRequest {
		http::Request::builder()
			.uri("https://api.example.com/me")
			.header(AUTHORIZATION, "Bearer stale")
			.body(Vec::new())
			.expect("Request fixture should build.")
	}

	#[test]
	fn bearer_signer_replaces_authorization() {
		let signed = BearerSigner::default()
			.sign(request(), &Token::new("fresh"))
			.expect("Bearer signing should succeed.");
		let values: Vec<_> = signed.headers().get_all(AUTHORIZATION).iter().collect();

		assert_eq!(values.len(), 1);
		assert_eq!(values[0], "Bearer fresh");
		assert!(values[0].is_sensitive());
	}

	#[test]
	fn custom_scheme_and_header() {
		let header = HeaderName::from_static("x-api-token");
		let signed = BearerSigner::with_scheme("")
			.with_header(header.clone())
			.sign(request(), &Token::new("raw"))
			.expect("Custom signing should succeed.");

		assert_eq!(signed.headers().get(&header).map(|v| v.as_bytes()), Some(&b"raw"[..]));
	}

	#[test]
	fn invalid_secrets_fail_to_sign() {
		let err = BearerSigner::default()
			.sign(request(), &Token::new("line\nbreak"))
			.expect_err("Secrets with control characters cannot become headers.");

		assert!(matches!(err, SignError::InvalidHeader { .. }));
	}

	#[test]
	fn closures_act_as_signers() {
		let signer = |mut request: HttpRequest, token: &Token| -> Result<_, SignError> {
			let value = HeaderValue::from_str(token.secret.expose())?;

			request.headers_mut().insert("x-token", value);

			Ok(request)
		};
		let signed =
			RequestSigner::sign(&signer, request(), &Token::new("t")).expect("Closure should sign.");

		assert_eq!(signed.headers().get("x-token").map(|v| v.as_bytes()), Some(&b"t"[..]));
	}
}
