//! Signed-request client for the Bika content API: HMAC request signing, single-flight session
//! login, and TTL response caching in one async crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod request;
pub mod sign;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ApiCredentials, Login},
		client::Client,
		config::ClientConfig,
		http::ReqwestHttpClient,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = Client<ReqwestHttpClient>;

	/// Digest key shared by the integration test fixtures.
	pub const TEST_DIGEST_KEY: &str = "test-digest-key";
	/// API key shared by the integration test fixtures.
	pub const TEST_API_KEY: &str = "test-api-key";

	/// Credentials built from [`TEST_DIGEST_KEY`] and [`TEST_API_KEY`].
	pub fn test_credentials() -> ApiCredentials {
		ApiCredentials::new(TEST_DIGEST_KEY, TEST_API_KEY)
	}

	/// Builds a configuration pointing at a mock server base URL.
	pub fn test_config(base_url: &str) -> ClientConfig {
		ClientConfig::builder(test_credentials())
			.base_url(Url::parse(base_url).expect("Mock server base URL should parse."))
			.build()
			.expect("Test client configuration should be valid.")
	}

	/// Constructs a reqwest-backed [`Client`] for the provided configuration and login
	/// collaborator.
	pub fn build_reqwest_test_client(
		config: ClientConfig,
		login: Arc<dyn Login<ReqwestHttpClient>>,
	) -> ReqwestTestClient {
		Client::with_http_client(config, ReqwestHttpClient::default(), login)
			.expect("Test client should build from a valid configuration.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {bika_client as _, color_eyre as _, httpmock as _};
