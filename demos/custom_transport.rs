//! Demonstrates plugging a custom transport into the client.
//!
//! 1. Implement [`ApiHttpClient`] so the transport answers signed GET and POST calls.
//! 2. Pass it to [`Client::with_http_client`] together with a [`PasswordLogin`].
//! 3. Watch the single sign-in, the cache hit, and a transport failure mapped into [`Error`].

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use color_eyre::Result;
use serde_json::{Value as JsonValue, json};
use url::Url;
// self
use bika_client::{
	auth::{ApiCredentials, PasswordLogin},
	client::Client,
	config::ClientConfig,
	error::Error,
	http::{ApiHttpClient, ApiResponse, HttpFuture},
	request::{ImageQuality, RequestContext},
	sign::SignedHeaders,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let credentials = ApiCredentials::new("demo-digest-key", "demo-api-key");
	let config = ClientConfig::builder(credentials)
		.base_url(Url::parse("https://api.example.com/")?)
		.build()?;
	let transport = Arc::new(MockHttpClient::default());
	let client: Client<MockHttpClient> = Client::with_http_client(
		config.clone(),
		Arc::clone(&transport),
		Arc::new(PasswordLogin::new("reader@example.com", "demo-password")),
	)?;
	let context = RequestContext::new().with_image_quality(ImageQuality::High);
	let first = client.comic_comments("demo", 1, &context).await?;
	let second = client.comic_comments("demo", 1, &context).await?;

	println!("Comments served twice: {}.", first == second);
	println!(
		"Transport calls: {} (one sign-in, one listing); cache hits: {}.",
		transport.calls.load(Ordering::Relaxed),
		client.metrics.cache_hits()
	);

	let failing: Client<MockHttpClient> = Client::with_http_client(
		config,
		MockHttpClient::unreachable("api.example.com"),
		Arc::new(PasswordLogin::new("reader@example.com", "demo-password")),
	)?;

	match failing.categories(&RequestContext::new()).await {
		Ok(_) => println!("Unreachable transport unexpectedly answered."),
		Err(Error::Auth(e)) => println!("Sign-in failed before the call could be sent: {e}."),
		Err(e) => println!("Transport error surfaced by the client: {e}."),
	}

	Ok(())
}

#[derive(Clone, Debug)]
enum MockTransportError {
	DnsFailure { host: &'static str },
}
impl Display for MockTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::DnsFailure { host } => write!(f, "DNS lookup failed for {host}"),
		}
	}
}
impl StdError for MockTransportError {}

#[derive(Debug, Default)]
struct MockHttpClient {
	unreachable: Option<&'static str>,
	calls: AtomicUsize,
}
impl MockHttpClient {
	fn unreachable(host: &'static str) -> Self {
		Self { unreachable: Some(host), calls: AtomicUsize::new(0) }
	}

	fn respond(
		&self,
		url: &Url,
		headers: &SignedHeaders,
	) -> Result<ApiResponse, MockTransportError> {
		self.calls.fetch_add(1, Ordering::Relaxed);

		if let Some(host) = self.unreachable {
			return Err(MockTransportError::DnsFailure { host });
		}

		let body: JsonValue = match url.path() {
			"/auth/sign-in" => json!({ "code": 200, "data": { "token": "demo-token" } }),
			path if headers.authorization.is_empty() => {
				json!({ "code": 401, "message": format!("{path} requires a session") })
			},
			path => json!({
				"code": 200,
				"data": { "path": path, "quality": headers.image_quality }
			}),
		};

		Ok(ApiResponse::new(200, body.to_string()))
	}
}
impl ApiHttpClient for MockHttpClient {
	type TransportError = MockTransportError;

	fn get<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a SignedHeaders,
	) -> HttpFuture<'a, Self::TransportError> {
		Box::pin(async move { self.respond(url, headers) })
	}

	fn post<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a SignedHeaders,
		_body: &'a JsonValue,
	) -> HttpFuture<'a, Self::TransportError> {
		Box::pin(async move { self.respond(url, headers) })
	}
}
