//! Request execution: credential resolution, signing, transport, decoding, and caching.
//!
//! [`Client::dispatch`] runs one call end to end and never consults the cache.
//! [`Client::cached`] wraps it for named operations: a fresh entry is served without touching the
//! transport, anything else dispatches and stores the result for the operation's TTL. Errors are
//! never stored.

// self
use crate::{
	_prelude::*,
	auth::LoginFuture,
	cache::{CacheEntry, CacheKey},
	client::{Client, Operation},
	error::{AuthError, NetworkError},
	http::{ApiHttpClient, ApiResponse},
	obs::{self, CacheOutcome, RequestOutcome, RequestSpan},
	request::ApiRequest,
	sign::Timestamp,
};

const DISPATCH: &str = "dispatch";
const UNAUTHORIZED: u16 = 401;

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Executes a request and returns the parsed response body.
	///
	/// Unless the request skips authentication, the session token is obtained first, logging in
	/// when none is stored. Non-2xx responses other than 401 are returned as-is because the API
	/// reports most failures inside the JSON envelope.
	pub async fn dispatch(&self, request: ApiRequest) -> Result<JsonValue> {
		let span = RequestSpan::new(DISPATCH, "dispatch");

		obs::record_request_outcome(DISPATCH, RequestOutcome::Attempt);

		let result = span
			.instrument(async move {
				let resolved = request.resolve(&self.config.base_url)?;
				let token =
					self.credentials.get_token(!request.skip_auth, || self.start_login()).await?;
				let quality =
					request.context.image_quality.unwrap_or(self.config.default_image_quality);
				let timestamp = Timestamp::from_datetime(request.context.now());
				let headers =
					self.signer.signed_headers(&resolved, token.as_ref(), quality, timestamp);

				self.metrics.record_dispatch();

				let response = match &resolved.body {
					Some(body) => self.http_client.post(&resolved.url, &headers, body).await,
					None => self.http_client.get(&resolved.url, &headers).await,
				}
				.map_err(NetworkError::transport)?;

				parse_response(&response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_request_outcome(DISPATCH, RequestOutcome::Success),
			Err(_) => {
				self.metrics.record_failure();
				obs::record_request_outcome(DISPATCH, RequestOutcome::Failure);
			},
		}

		result
	}

	/// Executes a named operation through the response cache.
	///
	/// The cache key covers the operation and the request's parameters and body; the request
	/// context (image quality, timestamp) is excluded. Freshness is judged at the context's
	/// instant, and a stored entry expires one TTL after the call that produced it.
	pub async fn cached(&self, operation: Operation, request: ApiRequest) -> Result<JsonValue> {
		let label = operation.as_str();
		let span = RequestSpan::new(label, "cached");

		obs::record_request_outcome(label, RequestOutcome::Attempt);

		let result = span
			.instrument(async move {
				let Some(ttl) = self.config.cache_policy(operation).ttl() else {
					obs::record_cache_outcome(label, CacheOutcome::Bypass);

					return self.dispatch(request).await;
				};
				let key = CacheKey::new(label, &request.params, request.body.as_ref());
				let now = request.context.now();

				if let Some(value) = self.cache.get(&key, now) {
					self.metrics.record_cache_hit();
					obs::record_cache_outcome(label, CacheOutcome::Hit);

					return Ok(value);
				}

				self.metrics.record_cache_miss();
				obs::record_cache_outcome(label, CacheOutcome::Miss);

				let value = self.dispatch(request).await?;

				self.cache.insert(key, CacheEntry { value: value.clone(), expires_at: now + ttl });

				Ok(value)
			})
			.await;

		match &result {
			Ok(_) => obs::record_request_outcome(label, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(label, RequestOutcome::Failure),
		}

		result
	}

	fn start_login(&self) -> LoginFuture {
		self.metrics.record_login();

		self.login.login(self.clone())
	}
}

fn parse_response(response: &ApiResponse) -> Result<JsonValue> {
	if response.status == UNAUTHORIZED {
		let message = response
			.json()
			.ok()
			.and_then(|body| body.get("message").and_then(JsonValue::as_str).map(str::to_owned))
			.unwrap_or_default();

		return Err(AuthError::Rejected { status: response.status, message }.into());
	}

	Ok(response.json()?)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::error::DecodeError;

	#[test]
	fn unauthorized_maps_to_rejection_with_message() {
		let err = parse_response(&ApiResponse::new(
			401,
			json!({ "code": 401, "message": "unauthorized" }).to_string(),
		))
		.expect_err("401 responses should be rejected.");

		assert!(matches!(
			err,
			Error::Auth(AuthError::Rejected { status: 401, ref message }) if message == "unauthorized"
		));

		let err = parse_response(&ApiResponse::new(401, "not json"))
			.expect_err("401 responses should be rejected even without a JSON body.");

		assert!(matches!(
			err,
			Error::Auth(AuthError::Rejected { ref message, .. }) if message.is_empty()
		));
	}

	#[test]
	fn other_statuses_return_their_body() {
		let body = json!({ "code": 400, "error": "1014", "message": "comic not found" });
		let value = parse_response(&ApiResponse::new(400, body.to_string()))
			.expect("Non-401 error envelopes should be returned to the caller.");

		assert_eq!(value, body);
	}

	#[test]
	fn invalid_json_is_a_decode_error() {
		let err = parse_response(&ApiResponse::new(200, "<html></html>"))
			.expect_err("HTML bodies should not decode.");

		assert!(matches!(err, Error::Decode(DecodeError::Body { status: 200, .. })));
	}
}
