//! Client-level error types shared across signing, login, dispatch, and caching.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session credential could not be obtained or was rejected upstream.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Transport failure (DNS, TCP, TLS, timeouts); safe to retry.
	#[error(transparent)]
	Network(#[from] NetworkError),
	/// Response body was not the JSON the protocol promises.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Endpoint template and parameters do not match.
	#[error(transparent)]
	Build(#[from] BuildError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Authentication failures; never retried by the client.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The shared login attempt failed. Every caller waiting on that attempt receives the same
	/// underlying error.
	#[error("Login failed: {0}")]
	Login(#[source] Arc<Error>),
	/// The sign-in endpoint answered without a session token.
	#[error("Sign-in was rejected: {message}.")]
	LoginRejected {
		/// Server-supplied message, when present.
		message: String,
	},
	/// The API rejected the request credentials or signature.
	#[error("Request was rejected with HTTP {status}: {message}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Server-supplied message, when present.
		message: String,
	},
}
impl AuthError {
	/// Returns the shared login failure, if this error came from the single-flight login.
	pub fn login_source(&self) -> Option<&Arc<Error>> {
		match self {
			Self::Login(source) => Some(source),
			_ => None,
		}
	}
}

/// Transport-level failures, surfaced uniformly regardless of the underlying client.
#[derive(Debug, ThisError)]
pub enum NetworkError {
	/// Underlying HTTP client reported a failure.
	#[error("Network error occurred while calling the API.")]
	Transport {
		/// Transport-specific error.
		#[source]
		source: BoxError,
	},
}
impl NetworkError {
	/// Wraps a transport-specific error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Response decoding failures; they indicate protocol drift, not transience.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not valid JSON.
	#[error("API returned a body that is not valid JSON.")]
	Body {
		/// Parser failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code of the response.
		status: u16,
	},
	/// JSON does not have the expected shape.
	#[error("API returned JSON with an unexpected shape.")]
	Shape {
		/// Structured failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Template/parameter mismatches; caller programming errors that are never retried.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum BuildError {
	/// A `{name}` placeholder has no matching parameter.
	#[error("Template `{template}` requires the `{name}` parameter.")]
	MissingParameter {
		/// Endpoint template.
		template: String,
		/// Placeholder name.
		name: String,
	},
	/// A placeholder is empty or never closed.
	#[error("Template `{template}` contains a malformed placeholder.")]
	MalformedTemplate {
		/// Endpoint template.
		template: String,
	},
	/// Leftover parameters cannot be merged into a body that is not a JSON object.
	#[error("Template `{template}` leaves parameters that cannot join a non-object body.")]
	NonObjectBody {
		/// Endpoint template.
		template: String,
	},
	/// The resolved URL is invalid.
	#[error("Resolved URL is invalid: {source}.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL is not an absolute http(s) URL with a host.
	#[error("Base URL must be an absolute http(s) URL with a host: {url}.")]
	InvalidBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Digest key cannot seed the HMAC.
	#[error("Digest key is not usable as an HMAC key.")]
	InvalidDigestKey,
	/// Cache TTLs must be positive.
	#[error("Cache TTL for `{operation}` must be positive.")]
	NonPositiveTtl {
		/// Operation label (or `default`).
		operation: &'static str,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn network_error_keeps_transport_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err: Error = NetworkError::transport(io).into();

		assert!(matches!(err, Error::Network(NetworkError::Transport { .. })));

		let source = StdError::source(&err)
			.expect("Network error should expose the transport failure as its source.");

		assert_eq!(source.to_string(), "refused");
	}

	#[test]
	fn login_failure_is_shared() {
		let shared = Arc::new(Error::from(AuthError::LoginRejected { message: "bad".into() }));
		let first = AuthError::Login(shared.clone());
		let second = AuthError::Login(shared.clone());

		assert!(Arc::ptr_eq(
			first.login_source().expect("First error should carry the shared source."),
			second.login_source().expect("Second error should carry the shared source."),
		));
		assert_eq!(first.to_string(), "Login failed: Sign-in was rejected: bad.");
	}
}
