//! Authorized fetch pipeline with expiry detection, single-flight refresh, and bounded restarts.
//!
//! [`AuthorizedFetch::fetch`] reads the current token, signs the caller's request, dispatches
//! it, and classifies the response. A response that signals token expiry is provisional: the
//! pipeline drops it, asks the token source for a refresh (once per rejected credential across
//! every concurrent fetch), and races the next token against the source's expiry signal. A new
//! token restarts the fetch; the expiry signal ends it with [`Error::Unrecoverable`].

mod gate;
mod metrics;

pub use self::metrics::FetchMetrics;

// crates.io
use http::StatusCode;
// self
use crate::{
	_prelude::*,
	auth::Token,
	fetch::gate::RefreshGate,
	obs::{self, FetchLogger, FetchOutcome, FetchSpan, TracingLogger},
	policy::{ExpiryPolicy, StatusExpiryPolicy},
	sign::{BearerSigner, RequestSigner},
	source::{ExpirySignal, TokenSource, TokenWatch},
	transport::{self, HttpRequest, HttpResponse, HttpTransport},
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, transport::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Pipeline specialized for the crate's default reqwest transport.
pub type ReqwestAuthorizedFetch = AuthorizedFetch<ReqwestTransport>;

/// Successful outcome of a fetch: the final response and the signed request that produced it.
#[derive(Clone, Debug)]
pub struct FetchResult {
	/// Signed request that produced [`response`](Self::response).
	pub request: HttpRequest,
	/// Final response.
	pub response: HttpResponse,
}
impl FetchResult {
	/// Status code of the final response.
	pub fn status(&self) -> StatusCode {
		self.response.status()
	}

	/// Body of the final response.
	pub fn body(&self) -> &[u8] {
		self.response.body()
	}

	/// Consumes the result, keeping only the response.
	pub fn into_response(self) -> HttpResponse {
		self.response
	}
}

/// Tunables for [`AuthorizedFetch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
	/// Maximum number of expiry-triggered restarts per fetch (defaults to 1).
	///
	/// Once exhausted, an expired response is returned as the final result.
	pub max_expiry_restarts: u8,
}
impl FetchOptions {
	const DEFAULT_MAX_EXPIRY_RESTARTS: u8 = 1;

	/// Overrides the restart bound.
	pub fn with_max_expiry_restarts(mut self, restarts: u8) -> Self {
		self.max_expiry_restarts = restarts;

		self
	}
}
impl Default for FetchOptions {
	fn default() -> Self {
		Self { max_expiry_restarts: Self::DEFAULT_MAX_EXPIRY_RESTARTS }
	}
}

/// Executes requests on behalf of a shared [`TokenSource`].
///
/// The pipeline owns the transport, signer, expiry policy, and logger references so a single
/// instance (or its clones, which share refresh bookkeeping and metrics) can serve any number of
/// concurrent fetches.
pub struct AuthorizedFetch<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every dispatch.
	pub transport: Arc<T>,
	/// Shared credential holder.
	pub source: Arc<dyn TokenSource>,
	/// Binds tokens to requests.
	pub signer: Arc<dyn RequestSigner>,
	/// Decides which responses signal token expiry.
	pub expiry_policy: Arc<dyn ExpiryPolicy>,
	/// Receives one line per terminal outcome.
	pub logger: Arc<dyn FetchLogger>,
	/// Restart bound and other tunables.
	pub options: FetchOptions,
	/// Shared counters for fetch outcomes.
	pub metrics: Arc<FetchMetrics>,
	refresh_gate: RefreshGate,
}
impl<T> AuthorizedFetch<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a pipeline over the caller-provided transport.
	///
	/// Defaults: [`BearerSigner`], [`StatusExpiryPolicy`] (401), [`TracingLogger`], and
	/// [`FetchOptions::default`].
	///
	/// Without the `tracing` feature the default [`TracingLogger`] discards every outcome line;
	/// install a sink through [`with_logger`](Self::with_logger) to keep them.
	pub fn with_transport(source: Arc<dyn TokenSource>, transport: impl Into<Arc<T>>) -> Self {
		Self {
			transport: transport.into(),
			source,
			signer: Arc::new(BearerSigner::default()),
			expiry_policy: Arc::new(StatusExpiryPolicy::default()),
			logger: Arc::new(TracingLogger),
			options: FetchOptions::default(),
			metrics: Default::default(),
			refresh_gate: Default::default(),
		}
	}

	/// Replaces the request signer.
	pub fn with_signer(mut self, signer: impl 'static + RequestSigner) -> Self {
		self.signer = Arc::new(signer);

		self
	}

	/// Replaces the expiry policy.
	pub fn with_expiry_policy(mut self, policy: impl 'static + ExpiryPolicy) -> Self {
		self.expiry_policy = Arc::new(policy);

		self
	}

	/// Replaces the outcome logger.
	pub fn with_logger(mut self, logger: impl 'static + FetchLogger) -> Self {
		self.logger = Arc::new(logger);

		self
	}

	/// Replaces the pipeline options.
	pub fn with_options(mut self, options: FetchOptions) -> Self {
		self.options = options;

		self
	}

	/// Number of rejected credentials with fetches currently waiting on their refresh.
	pub fn pending_refreshes(&self) -> usize {
		self.refresh_gate.in_flight()
	}

	/// Fetches `request` with the current token, transparently refreshing and retrying once
	/// when the response signals expiry.
	///
	/// Resolves with exactly one [`FetchResult`] or one error:
	///
	/// - [`Error::TokenUnavailable`] when the source holds no token (nothing is dispatched), the
	///   signer rejects the token, or the source clears the token instead of replacing it.
	/// - [`Error::Transport`] when dispatch fails; transport failures are never retried.
	/// - [`Error::Unrecoverable`] when the source fires its expiry signal while the fetch waits
	///   for a replacement token.
	///
	/// Dropping the returned future stops waiting and releases every subscription the fetch
	/// holds; a refresh it already triggered is left to complete.
	pub async fn fetch(&self, request: HttpRequest) -> Result<FetchResult> {
		let label = transport::describe_request(&request);
		let span = FetchSpan::new("fetch", &label);

		obs::record_fetch_outcome(FetchOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span.instrument(self.run(request, &label)).await;

		match &result {
			Ok(fetched) => {
				obs::record_fetch_outcome(FetchOutcome::Success);
				self.metrics.record_success();
				self.logger
					.log(&format!("Fetch {label} response code {}", fetched.status().as_u16()));
			},
			Err(err) => {
				obs::record_fetch_outcome(FetchOutcome::Failure);
				self.metrics.record_failure();
				self.logger.log(&format!("Fetch {label} failed: {err}"));
			},
		}

		result
	}

	async fn run(&self, request: HttpRequest, label: &str) -> Result<FetchResult> {
		let mut tokens = self.source.current_token();
		let mut expired = self.source.expired_signal();

		expired.borrow_and_update();

		let mut token = tokens.borrow_and_update().clone().ok_or(Error::TokenUnavailable)?;
		let mut restarts = 0;

		loop {
			let signed = self.signer.sign(request.clone(), &token)?;
			let response = self.transport.dispatch(signed.clone()).await?;
			let result = FetchResult { request: signed, response };

			if !self.expiry_policy.is_expired(&result.response)
				|| restarts >= self.options.max_expiry_restarts
			{
				return Ok(result);
			}

			drop(result);

			token = FetchSpan::new("await_refresh", label)
				.instrument(self.await_replacement(&token, &mut tokens, &mut expired))
				.await?;
			restarts += 1;

			obs::record_fetch_outcome(FetchOutcome::Restart);
			self.metrics.record_restart();
		}
	}

	async fn await_replacement(
		&self,
		rejected: &Token,
		tokens: &mut TokenWatch,
		expired: &mut ExpirySignal,
	) -> Result<Token> {
		if expired.has_changed().unwrap_or(false) {
			return Err(Error::Unrecoverable);
		}

		let ticket = self.refresh_gate.join(rejected.fingerprint());

		// A replacement published after this fetch subscribed is already the refreshed token.
		if !tokens.has_changed().unwrap_or(false) {
			if ticket.claim_trigger() {
				self.source.refresh();

				obs::record_fetch_outcome(FetchOutcome::RefreshTriggered);
				self.metrics.record_refresh_trigger();
			}

			tokio::select! {
				biased;

				_ = expiry_fired(&mut *expired) => return Err(Error::Unrecoverable),
				changed = tokens.changed() => changed.map_err(|_| Error::TokenUnavailable)?,
			}
		}

		drop(ticket);

		let next = tokens.borrow_and_update().clone();

		match next {
			Some(token) => Ok(token),
			None if expired.has_changed().unwrap_or(false) => Err(Error::Unrecoverable),
			None => Err(Error::TokenUnavailable),
		}
	}
}
#[cfg(feature = "reqwest")]
impl AuthorizedFetch<ReqwestTransport> {
	/// Creates a pipeline that provisions its own reqwest transport.
	pub fn new(source: Arc<dyn TokenSource>) -> Result<Self, ConfigError> {
		Ok(Self::with_transport(source, ReqwestTransport::try_default()?))
	}
}
impl<T> Clone for AuthorizedFetch<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			source: self.source.clone(),
			signer: self.signer.clone(),
			expiry_policy: self.expiry_policy.clone(),
			logger: self.logger.clone(),
			options: self.options,
			metrics: self.metrics.clone(),
			refresh_gate: self.refresh_gate.clone(),
		}
	}
}
impl<T> Debug for AuthorizedFetch<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizedFetch")
			.field("options", &self.options)
			.field("pending_refreshes", &self.pending_refreshes())
			.finish()
	}
}

// A closed expiry channel can never fire.
async fn expiry_fired(signal: &mut ExpirySignal) {
	if signal.changed().await.is_err() {
		std::future::pending::<()>().await;
	}
}
