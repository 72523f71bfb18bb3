// crates.io
use futures::future;
use httpmock::prelude::*;
use serde_json::json;
// self
use bika_client::{
	_preludet::*,
	auth::{CredentialStore, PasswordLogin, SessionToken, StaticToken},
	error::AuthError,
	request::{ApiRequest, RequestContext},
};

const EMAIL: &str = "reader@example.com";
const PASSWORD: &str = "correct-horse";

fn build_client(server: &MockServer) -> ReqwestTestClient {
	build_reqwest_test_client(
		test_config(&server.base_url()),
		Arc::new(PasswordLogin::new(EMAIL, PASSWORD)),
	)
}

#[tokio::test]
async fn concurrent_requests_share_one_sign_in() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let sign_in = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/sign-in")
				.json_body(json!({ "email": EMAIL, "password": PASSWORD }));
			then.status(200).delay(std::time::Duration::from_millis(100)).json_body(json!({
				"code": 200,
				"message": "success",
				"data": { "token": "issued" }
			}));
		})
		.await;
	let comments = server
		.mock_async(|when, then| {
			when.method(GET).path("/comics/x/comments").header("Authorization", "issued");
			then.status(200).json_body(json!({ "code": 200, "data": { "comments": [] } }));
		})
		.await;
	let context = RequestContext::new();
	let results =
		future::join_all((1..=5).map(|page| client.comic_comments("x", page, &context))).await;

	for result in results {
		result.expect("Every concurrent request should succeed with the shared token.");
	}

	sign_in.assert_calls_async(1).await;
	comments.assert_calls_async(5).await;

	assert_eq!(client.metrics.logins(), 1);
	assert_eq!(
		client.credentials().current().expect("Token should be stored after login.").expose(),
		"issued"
	);
}

#[tokio::test]
async fn rejected_sign_in_reaches_every_waiter() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let sign_in = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/sign-in");
			then.status(400).delay(std::time::Duration::from_millis(100)).json_body(json!({
				"code": 400,
				"error": "1004",
				"message": "invalid email or password"
			}));
		})
		.await;
	let context = RequestContext::new();
	let results = future::join_all((1..=3).map(|page| client.games(page, &context))).await;
	let sources = results
		.into_iter()
		.map(|result| match result {
			Err(Error::Auth(AuthError::Login(source))) => source,
			other => panic!("Expected a shared login failure, got {other:?}."),
		})
		.collect::<Vec<_>>();

	assert!(sources.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
	assert!(matches!(
		sources[0].as_ref(),
		Error::Auth(AuthError::LoginRejected { message }) if message == "invalid email or password"
	));
	assert!(client.credentials().current().is_none());

	sign_in.assert_calls_async(1).await;

	client.games(1, &context).await.expect_err("A later call should retry and fail again.");

	sign_in.assert_calls_async(2).await;
}

#[tokio::test]
async fn seeded_token_skips_sign_in() {
	let server = MockServer::start_async().await;
	let client = build_client(&server).with_token(SessionToken::new("seeded"));
	let sign_in = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/sign-in");
			then.status(500);
		})
		.await;
	let keywords = server
		.mock_async(|when, then| {
			when.method(GET).path("/keywords").header("Authorization", "seeded");
			then.status(200).json_body(json!({ "code": 200, "data": { "keywords": [] } }));
		})
		.await;

	client.keywords(&RequestContext::new()).await.expect("Seeded token should authorize calls.");

	sign_in.assert_calls_async(0).await;
	keywords.assert_calls_async(1).await;
}

#[tokio::test]
async fn clients_can_share_a_session() {
	let server = MockServer::start_async().await;
	let store = Arc::new(CredentialStore::new());
	let first = build_reqwest_test_client(
		test_config(&server.base_url()),
		Arc::new(StaticToken::new(SessionToken::new("static"))),
	)
	.with_credential_store(store.clone());
	let second = build_client(&server).with_credential_store(store.clone());
	let sign_in = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/sign-in");
			then.status(500);
		})
		.await;
	let categories = server
		.mock_async(|when, then| {
			when.method(GET).path("/categories").header("Authorization", "static");
			then.status(200).json_body(json!({ "code": 200 }));
		})
		.await;

	first.categories(&RequestContext::new()).await.expect("Static login should succeed.");
	second
		.dispatch(ApiRequest::new("categories"))
		.await
		.expect("Second client should reuse the shared token.");

	sign_in.assert_calls_async(0).await;
	categories.assert_calls_async(2).await;

	assert_eq!(store.current().map(|token| token.expose().to_owned()).as_deref(), Some("static"));
}
