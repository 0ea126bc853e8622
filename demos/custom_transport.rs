//! Demonstrates plugging a custom [`HttpTransport`] into the pipeline and answering refresh
//! requests from an in-memory token source.
//!
//! 1. Implement [`HttpTransport`] for any client; here an in-process fake that rejects the stale
//!    token with `401` and greets the fresh one.
//! 2. Seed a [`MemoryTokenSource`] and spawn a driver that installs a new token whenever the
//!    pipeline asks for a refresh.
//! 3. Fetch through [`AuthorizedFetch::with_transport`]; the caller only sees the replayed result.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use authorized_fetch::{
	auth::Token,
	error::TransportError,
	fetch::AuthorizedFetch,
	http,
	source::{MemoryTokenSource, TokenSource},
	transport::{HttpRequest, HttpTransport, TransportFuture},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let source = Arc::new(MemoryTokenSource::with_token(Token::new("demo-stale")));
	let mut requests = source.refresh_requests();
	let driver = {
		let source = source.clone();

		tokio::spawn(async move {
			if requests.changed().await.is_ok() {
				println!("Refresh requested; installing a new token.");

				source.set_token(Token::new("demo-fresh"));
			}
		})
	};
	let token_source: Arc<dyn TokenSource> = source.clone();
	let fetch: AuthorizedFetch<GreetingTransport> =
		AuthorizedFetch::with_transport(token_source, GreetingTransport)
			.with_logger(|line: &str| println!("{line}."));
	let request = http::Request::builder()
		.method("GET")
		.uri("https://api.example.com/v1/greeting")
		.body(Vec::new())?;
	let result = fetch.fetch(request).await?;

	driver.await?;

	println!(
		"Final status {} with body {:?} after {} restart(s).",
		result.status(),
		String::from_utf8_lossy(result.body()),
		fetch.metrics.restarts()
	);

	Ok(())
}

struct GreetingTransport;
impl HttpTransport for GreetingTransport {
	fn dispatch(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let fresh = request
				.headers()
				.get(http::header::AUTHORIZATION)
				.is_some_and(|value| value.as_bytes() == b"Bearer demo-fresh");
			let (status, body) =
				if fresh { (200, &b"hello"[..]) } else { (401, &b"token expired"[..]) };

			http::Response::builder()
				.status(status)
				.body(body.to_vec())
				.map_err(TransportError::invalid_response)
		})
	}
}
