//! The signed-request client and its named API operations.

pub mod endpoints;
pub mod operation;

mod dispatch;
mod metrics;

pub use endpoints::*;
pub use metrics::*;
pub use operation::*;

// self
use crate::{
	_prelude::*,
	auth::{CredentialStore, Login, SessionToken},
	cache::{CacheStore, MemoryCache},
	config::ClientConfig,
	http::ApiHttpClient,
	sign::Signer,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Signs, authenticates, and caches calls against a single API host.
///
/// The client owns the HTTP transport, the signing key pair, the session credential store, the
/// login collaborator, and the response cache. Clones share all of them, so a clone handed to a
/// spawned task sees the same session token and the same cached responses.
pub struct Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Validated configuration.
	pub config: Arc<ClientConfig>,
	/// Shared counters for dispatch, login, and cache outcomes.
	pub metrics: Arc<ClientMetrics>,
	signer: Signer,
	credentials: Arc<CredentialStore>,
	login: Arc<dyn Login<C>>,
	cache: Arc<dyn CacheStore>,
}
impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
		login: Arc<dyn Login<C>>,
	) -> Result<Self> {
		let signer = Signer::new(&config.credentials)?;

		Ok(Self {
			http_client: http_client.into(),
			config: Arc::new(config),
			metrics: Default::default(),
			signer,
			credentials: Default::default(),
			login,
			cache: Arc::new(MemoryCache::default()),
		})
	}

	/// Replaces the response cache backend.
	pub fn with_cache_store(mut self, cache: Arc<dyn CacheStore>) -> Self {
		self.cache = cache;

		self
	}

	/// Shares a credential store with other clients so they reuse one session.
	pub fn with_credential_store(mut self, credentials: Arc<CredentialStore>) -> Self {
		self.credentials = credentials;

		self
	}

	/// Seeds the session with an already issued token; no login happens until it is missing.
	pub fn with_token(mut self, token: SessionToken) -> Self {
		self.credentials = Arc::new(CredentialStore::with_token(token));

		self
	}

	/// Session credential store.
	pub fn credentials(&self) -> &CredentialStore {
		&self.credentials
	}

	/// Response cache backend.
	pub fn cache(&self) -> &dyn CacheStore {
		self.cache.as_ref()
	}

	/// Request signer built from the configured key pair.
	pub fn signer(&self) -> &Signer {
		&self.signer
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Creates a client backed by a fresh reqwest transport.
	pub fn new(config: ClientConfig, login: Arc<dyn Login<ReqwestHttpClient>>) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::default(), login)
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			metrics: self.metrics.clone(),
			signer: self.signer.clone(),
			credentials: self.credentials.clone(),
			login: self.login.clone(),
			cache: self.cache.clone(),
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("base_url", &self.config.base_url.as_str())
			.field("credentials", &self.credentials)
			.field("cached_entries", &self.cache.len())
			.finish()
	}
}
