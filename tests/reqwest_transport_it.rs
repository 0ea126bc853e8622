#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use authorized_fetch::{
	_preludet::*,
	auth::Token,
	error::TransportError,
	fetch::ReqwestAuthorizedFetch,
	obs::MemoryLogger,
	source::{MemoryTokenSource, TokenSource},
	transport::{HttpTransport, ReqwestTransport},
};

fn build_fetch(source: &Arc<MemoryTokenSource>) -> ReqwestAuthorizedFetch {
	let token_source: Arc<dyn TokenSource> = source.clone();

	ReqwestAuthorizedFetch::with_transport(token_source, test_reqwest_transport())
}

#[tokio::test]
async fn reqwest_fetch_refreshes_on_unauthorized() {
	let server = MockServer::start_async().await;
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer access-stale");
			then.status(401).header("www-authenticate", "Bearer error=\"invalid_token\"");
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer access-fresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"name\":\"ada\"}");
		})
		.await;
	let source = Arc::new(MemoryTokenSource::with_token(Token::new("access-stale")));
	let logger = MemoryLogger::default();
	let fetch = build_fetch(&source).with_logger(logger.clone());
	let driver = tokio::spawn(answer_refresh(source.clone(), Token::new("access-fresh")));
	let uri = server.url("/v1/profile");
	let result = fetch.fetch(get(&uri)).await.expect("Reqwest-backed fetch should succeed.");

	driver.await.expect("Refresh driver should finish.");
	stale.assert_calls_async(1).await;
	fresh.assert_calls_async(1).await;

	assert_eq!(result.status(), 200);
	assert_eq!(result.body(), b"{\"name\":\"ada\"}");
	assert_eq!(
		result.response.headers().get("content-type").map(|v| v.as_bytes()),
		Some(&b"application/json"[..])
	);
	assert_eq!(source.refresh_calls(), 1);
	assert_eq!(logger.lines(), vec![format!("Fetch GET {uri} response code 200")]);
}

#[tokio::test]
async fn reqwest_fetch_forwards_method_body_and_headers() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/items")
				.header("authorization", "Bearer access-post")
				.header("x-trace", "abc")
				.body("{\"sku\":42}");
			then.status(201).body("created");
		})
		.await;
	let source = Arc::new(MemoryTokenSource::with_token(Token::new("access-post")));
	let fetch = build_fetch(&source);
	let request = http::Request::builder()
		.method("POST")
		.uri(server.url("/v1/items"))
		.header("x-trace", "abc")
		.body(b"{\"sku\":42}".to_vec())
		.expect("POST request fixture should build.");
	let result = fetch.fetch(request).await.expect("POST fetch should succeed.");

	mock.assert_async().await;

	assert_eq!(result.status(), 201);
	assert_eq!(result.body(), b"created");
	assert_eq!(source.refresh_calls(), 0);
}

#[tokio::test]
async fn reqwest_transport_maps_connection_failures() {
	let transport = test_reqwest_transport();
	let err = transport
		.dispatch(get("http://127.0.0.1:1/unreachable"))
		.await
		.expect_err("Dispatching to a closed port should fail.");

	assert!(matches!(err, TransportError::Network { .. }));
}

#[tokio::test]
async fn reqwest_transport_maps_timeouts() {
	let server = MockServer::start_async().await;
	let _slow = server
		.mock_async(|when, then| {
			when.method(GET).path("/slow");
			then.status(200).delay(std::time::Duration::from_millis(500));
		})
		.await;
	let transport = ReqwestTransport::from_builder_with_timeout(
		test_reqwest_client_builder(),
		std::time::Duration::from_millis(50),
	)
	.expect("Timeout transport should build.");
	let err = transport
		.dispatch(get(&server.url("/slow")))
		.await
		.expect_err("Slow responses should time out.");

	assert!(matches!(err, TransportError::Timeout { .. }));
}

#[tokio::test]
async fn reqwest_transport_defaults_do_not_follow_redirects() {
	let server = MockServer::start_async().await;
	let redirect = server
		.mock_async(|when, then| {
			when.method(GET).path("/moved");
			then.status(302).header("location", "https://elsewhere.example.com/steal");
		})
		.await;
	let source = Arc::new(MemoryTokenSource::with_token(Token::new("access-redirect")));
	let fetch = build_fetch(&source);
	let result = fetch.fetch(get(&server.url("/moved"))).await.expect("Redirects are returned.");

	redirect.assert_async().await;

	assert_eq!(result.status(), 302);
	assert_eq!(
		result.response.headers().get("location").map(|v| v.as_bytes()),
		Some(&b"https://elsewhere.example.com/steal"[..])
	);
}

#[tokio::test]
async fn default_reqwest_pipeline_builds() {
	let source = Arc::new(MemoryTokenSource::new());
	let token_source: Arc<dyn TokenSource> = source.clone();
	let fetch = ReqwestAuthorizedFetch::new(token_source).expect("Default pipeline should build.");
	let err = fetch
		.fetch(get("https://api.example.com/v1/profile"))
		.await
		.expect_err("An empty source should fail before dispatch.");

	assert!(matches!(err, Error::TokenUnavailable));
	assert!(ReqwestTransport::with_timeout(std::time::Duration::from_secs(5)).is_ok());
}
