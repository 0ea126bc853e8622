//! Authorized HTTP fetches that sign requests with a bearer token, notice when the token has
//! expired, refresh it once for every caller that noticed, and replay the request with the new
//! token so callers only ever see the final outcome.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod fetch;
pub mod obs;
pub mod policy;
pub mod sign;
pub mod source;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// self
	use crate::{
		auth::Token,
		error::TransportError,
		fetch::AuthorizedFetch,
		source::{MemoryTokenSource, TokenSource},
		transport::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	};
	#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

	/// Response step served by [`ScriptedTransport`].
	pub type ScriptedStep = Result<HttpResponse, TransportError>;

	/// Transport double that answers from a per-token script and records every dispatch.
	///
	/// Requests signed with a token that has no remaining script entries receive `200 OK` with an
	/// empty body.
	#[derive(Default)]
	pub struct ScriptedTransport {
		scripts: Mutex<HashMap<String, VecDeque<ScriptedStep>>>,
		dispatched: Mutex<Vec<HttpRequest>>,
		calls: AtomicUsize,
	}
	impl ScriptedTransport {
		/// Queues a response for requests carrying `Authorization: Bearer {token}`.
		pub fn respond(&self, token: &str, step: ScriptedStep) -> &Self {
			self.respond_header(&bearer(token), step)
		}

		/// Queues a response for requests whose `Authorization` header equals `value` exactly.
		pub fn respond_header(&self, value: &str, step: ScriptedStep) -> &Self {
			self.scripts.lock().entry(value.to_owned()).or_default().push_back(step);

			self
		}

		/// Queues a bodyless response with the given status.
		pub fn respond_status(&self, token: &str, status: u16) -> &Self {
			self.respond(token, Ok(response(status, "")))
		}

		/// Number of dispatches observed so far.
		pub fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		/// Snapshot of every signed request that reached the transport.
		pub fn dispatched(&self) -> Vec<HttpRequest> {
			self.dispatched.lock().clone()
		}

		/// Authorization headers of every dispatched request, in order.
		pub fn authorizations(&self) -> Vec<String> {
			self.dispatched
				.lock()
				.iter()
				.filter_map(|request| {
					request
						.headers()
						.get(::http::header::AUTHORIZATION)
						.and_then(|value| value.to_str().ok())
						.map(str::to_owned)
				})
				.collect()
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn dispatch(&self, request: HttpRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				self.calls.fetch_add(1, Ordering::SeqCst);

				let key = request
					.headers()
					.get(::http::header::AUTHORIZATION)
					.and_then(|value| value.to_str().ok())
					.unwrap_or_default()
					.to_owned();

				self.dispatched.lock().push(request);

				let step = self.scripts.lock().get_mut(&key).and_then(VecDeque::pop_front);

				step.unwrap_or_else(|| Ok(response(200, "")))
			})
		}
	}

	/// Builds a response with the provided status and body.
	pub fn response(status: u16, body: &str) -> HttpResponse {
		::http::Response::builder()
			.status(status)
			.body(body.as_bytes().to_vec())
			.expect("Test response should build.")
	}

	/// Builds a `GET` request for the provided URI.
	pub fn get(uri: &str) -> HttpRequest {
		::http::Request::builder()
			.method("GET")
			.uri(uri)
			.body(Vec::new())
			.expect("Test request should build.")
	}

	/// Formats the default bearer authorization header value.
	pub fn bearer(token: &str) -> String {
		format!("Bearer {token}")
	}

	/// Builds a pipeline over the scripted transport and a memory source seeded with `token`.
	pub fn build_scripted_fetch(
		token: Option<&str>,
	) -> (AuthorizedFetch<ScriptedTransport>, Arc<ScriptedTransport>, Arc<MemoryTokenSource>) {
		let source = Arc::new(match token {
			Some(token) => MemoryTokenSource::with_token(Token::new(token)),
			None => MemoryTokenSource::new(),
		});
		let transport = Arc::new(ScriptedTransport::default());
		let token_source: Arc<dyn TokenSource> = source.clone();
		let fetch = AuthorizedFetch::with_transport(token_source, transport.clone());

		(fetch, transport, source)
	}

	/// Answers the first refresh request raised on `source` by installing `next`.
	///
	/// The subscription is taken before the future is returned, so spawning it never misses a
	/// request raised in the meantime.
	pub fn answer_refresh(
		source: Arc<MemoryTokenSource>,
		next: Token,
	) -> impl Future<Output = ()> + Send + 'static {
		let mut requests = source.refresh_requests();

		async move {
			if requests.changed().await.is_ok() {
				source.set_token(next);
			}
		}
	}

	/// Answers the first refresh request raised on `source` by firing the expiry signal.
	pub fn answer_refresh_with_expiry(
		source: Arc<MemoryTokenSource>,
	) -> impl Future<Output = ()> + Send + 'static {
		let mut requests = source.refresh_requests();

		async move {
			if requests.changed().await.is_ok() {
				source.expire();
			}
		}
	}

	/// Starts from the crate's transport defaults and additionally accepts the self-signed
	/// certificates produced by `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_client_builder() -> ReqwestClientBuilder {
		ReqwestTransport::client_builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
	}

	/// Builds a reqwest transport from [`test_reqwest_client_builder`].
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = test_reqwest_client_builder()
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{
		Client as ReqwestClient, ClientBuilder as ReqwestClientBuilder, Error as ReqwestError,
	};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
#[cfg(test)] use {color_eyre as _, httpmock as _, serde_json as _};
