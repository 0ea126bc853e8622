//! Demonstrates the reqwest-backed pipeline against a mock API whose first answer rejects the
//! cached token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use authorized_fetch::{
	auth::Token,
	fetch::ReqwestAuthorizedFetch,
	http,
	source::{MemoryTokenSource, TokenSource},
	transport::ReqwestTransport,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer demo-stale");
			then.status(401).header("www-authenticate", "Bearer error=\"invalid_token\"");
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer demo-fresh");
			then.status(200).header("content-type", "application/json").body("{\"name\":\"ada\"}");
		})
		.await;
	let source = Arc::new(MemoryTokenSource::with_token(Token::new("demo-stale")));
	let mut requests = source.refresh_requests();
	let driver = {
		let source = source.clone();

		tokio::spawn(async move {
			if requests.changed().await.is_ok() {
				source.set_token(Token::new("demo-fresh"));
			}
		})
	};
	// The mock server uses a self-signed certificate.
	let transport = ReqwestTransport::with_client(
		ReqwestTransport::client_builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let token_source: Arc<dyn TokenSource> = source.clone();
	let fetch = ReqwestAuthorizedFetch::with_transport(token_source, transport)
		.with_logger(|line: &str| println!("{line}."));
	let request =
		http::Request::builder().method("GET").uri(server.url("/v1/profile")).body(Vec::new())?;
	let result = fetch.fetch(request).await?;

	driver.await?;
	stale.assert_async().await;
	fresh.assert_async().await;

	println!("Profile fetched after one refresh: {}.", String::from_utf8_lossy(result.body()));

	Ok(())
}
