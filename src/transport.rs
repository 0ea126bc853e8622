//! Transport primitives that execute signed requests.
//!
//! The module exposes [`HttpTransport`], the pipeline's only dependency on an HTTP stack, and
//! the [`HttpRequest`]/[`HttpResponse`] aliases built on the `http` crate so downstream crates can
//! plug in custom clients without depending on reqwest. With the `reqwest` feature enabled,
//! [`ReqwestTransport`] provides the default implementation.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy as RedirectPolicy;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Request shape consumed by signers and transports.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response shape produced by transports.
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`HttpTransport::dispatch`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing fully signed requests.
///
/// Implementations must be `Send + Sync` so one transport can serve every concurrent fetch, and
/// the futures they return must be `Send` so fetches can hop executors. A transport reports only
/// transport-level failures; any HTTP status, including authorization failures, is a successful
/// dispatch.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Executes the request and resolves with the full response.
	fn dispatch(&self, request: HttpRequest) -> TransportFuture<'_>;
}
impl<T> HttpTransport for Arc<T>
where
	T: ?Sized + HttpTransport,
{
	fn dispatch(&self, request: HttpRequest) -> TransportFuture<'_> {
		(**self).dispatch(request)
	}
}

/// Renders the request identity used in log lines (`METHOD URI`).
pub fn describe_request(request: &HttpRequest) -> String {
	format!("{} {}", request.method(), request.uri())
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client does not follow redirects: a redirected request would carry the bearer
/// token to a host the caller never named.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Starts a client builder with the crate's transport defaults (redirects disabled).
	pub fn client_builder() -> ReqwestClientBuilder {
		ReqwestClient::builder().redirect(RedirectPolicy::none())
	}

	/// Builds a default client that fails requests exceeding `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		Self::from_builder_with_timeout(Self::client_builder(), timeout)
	}

	/// Finishes `builder` with a request timeout, rejecting a zero duration.
	pub fn from_builder_with_timeout(
		builder: ReqwestClientBuilder,
		timeout: std::time::Duration,
	) -> Result<Self, ConfigError> {
		if timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		Ok(Self(builder.timeout(timeout).build()?))
	}

	/// Builds the default client (no redirects, no request timeout).
	pub fn try_default() -> Result<Self, ConfigError> {
		Ok(Self(Self::client_builder().build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn dispatch(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let version = response.version();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();
			let mut response_new = HttpResponse::new(body);

			*response_new.status_mut() = status;
			*response_new.version_mut() = version;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn describe_request_uses_method_and_uri() {
		let request = http::Request::builder()
			.method("POST")
			.uri("https://api.example.com/v1/items?page=2")
			.body(Vec::new())
			.expect("Request fixture should build.");

		assert_eq!(describe_request(&request), "POST https://api.example.com/v1/items?page=2");
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn zero_timeout_is_rejected() {
		let err = ReqwestTransport::with_timeout(std::time::Duration::ZERO)
			.expect_err("A zero timeout should be rejected.");

		assert!(matches!(err, ConfigError::ZeroTimeout));
	}
}
