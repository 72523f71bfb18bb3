//! Transport primitives for signed API calls.
//!
//! The module exposes [`ApiHttpClient`] alongside [`ApiResponse`] so downstream crates can plug
//! in custom HTTP clients. Implementations only move bytes: they send the pre-computed
//! [`SignedHeaders`], return the status and raw body, and report failures through their own
//! error type. The client maps every transport error into a single
//! [`NetworkError`](crate::error::NetworkError) kind and parses bodies itself.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::DecodeError, sign::SignedHeaders};

/// Boxed future returned by [`ApiHttpClient`] calls.
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of issuing the API's GET and POST calls.
///
/// The trait acts as the client's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a single transport can be shared (behind `Arc<T>`) by every
/// in-flight request, and the returned futures must be `Send` so dispatches can hop executors.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Issues a GET request with the signed header set.
	fn get<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a SignedHeaders,
	) -> HttpFuture<'a, Self::TransportError>;

	/// Issues a POST request with the signed header set and a JSON body.
	fn post<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a SignedHeaders,
		body: &'a JsonValue,
	) -> HttpFuture<'a, Self::TransportError>;
}

/// Raw response handed back by an [`ApiHttpClient`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Undecoded response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Parses the body as JSON.
	pub fn json(&self) -> Result<JsonValue, DecodeError> {
		serde_json::from_slice(&self.body)
			.map_err(|source| DecodeError::Body { source, status: self.status })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn send(
		builder: reqwest::RequestBuilder,
		headers: &SignedHeaders,
	) -> Result<ApiResponse, ReqwestError> {
		let builder =
			headers.iter().fold(builder, |builder, (name, value)| builder.header(name, value));
		let response = builder.send().await?;
		let status = response.status().as_u16();
		let body = response.bytes().await?.to_vec();

		Ok(ApiResponse { status, body })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestHttpClient(..)")
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn get<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a SignedHeaders,
	) -> HttpFuture<'a, Self::TransportError> {
		Box::pin(Self::send(self.0.get(url.clone()), headers))
	}

	fn post<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a SignedHeaders,
		body: &'a JsonValue,
	) -> HttpFuture<'a, Self::TransportError> {
		Box::pin(Self::send(self.0.post(url.clone()).json(body), headers))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn response_json_reports_status_on_failure() {
		let err = ApiResponse::new(502, "<html>bad gateway</html>")
			.json()
			.expect_err("HTML bodies should not parse as JSON.");

		assert!(matches!(err, DecodeError::Body { status: 502, .. }));
	}
}
