//! Client configuration and its validating builder.

// self
use crate::{
	_prelude::*,
	auth::ApiCredentials,
	cache::CachePolicy,
	client::Operation,
	error::ConfigError,
	request::ImageQuality,
};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://picaapi.picacomic.com/";
/// TTL applied to operations that do not declare their own.
pub const DEFAULT_CACHE_TTL: Duration = Duration::hours(1);

/// Cache settings shared by every operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
	/// Master switch; when unset every operation dispatches.
	pub enabled: bool,
	/// TTL for operations without a declared one.
	pub default_ttl: Duration,
	/// Per-operation policy overrides.
	pub overrides: HashMap<Operation, CachePolicy>,
}
impl CacheConfig {
	/// Effective policy for `operation`: override, then declared TTL, then the default TTL.
	pub fn policy(&self, operation: Operation) -> CachePolicy {
		if !self.enabled {
			return CachePolicy::Disabled;
		}
		if let Some(policy) = self.overrides.get(&operation) {
			return *policy;
		}

		CachePolicy::Ttl(operation.declared_ttl().unwrap_or(self.default_ttl))
	}
}
impl Default for CacheConfig {
	fn default() -> Self {
		Self { enabled: true, default_ttl: DEFAULT_CACHE_TTL, overrides: HashMap::new() }
	}
}

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Signing key pair.
	pub credentials: ApiCredentials,
	/// API base URL; always ends with `/`.
	pub base_url: Url,
	/// Image quality used when a call does not override it.
	pub default_image_quality: ImageQuality,
	/// Response cache settings.
	pub cache: CacheConfig,
}
impl ClientConfig {
	/// Creates a new builder seeded with the provided credentials.
	pub fn builder(credentials: ApiCredentials) -> ClientConfigBuilder {
		ClientConfigBuilder::new(credentials)
	}

	/// Effective cache policy for `operation`.
	pub fn cache_policy(&self, operation: Operation) -> CachePolicy {
		self.cache.policy(operation)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Signing key pair.
	pub credentials: ApiCredentials,
	/// Optional base URL override.
	pub base_url: Option<Url>,
	/// Default image quality.
	pub default_image_quality: ImageQuality,
	/// Cache settings.
	pub cache: CacheConfig,
}
impl ClientConfigBuilder {
	/// Creates a new builder with production defaults.
	pub fn new(credentials: ApiCredentials) -> Self {
		Self {
			credentials,
			base_url: None,
			default_image_quality: ImageQuality::default(),
			cache: CacheConfig::default(),
		}
	}

	/// Points the client at another host (mirrors, tests).
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the image quality used when calls do not override it.
	pub fn default_image_quality(mut self, quality: ImageQuality) -> Self {
		self.default_image_quality = quality;

		self
	}

	/// Enables or disables response caching globally.
	pub fn cache_enabled(mut self, enabled: bool) -> Self {
		self.cache.enabled = enabled;

		self
	}

	/// Overrides the TTL used by operations without a declared one.
	pub fn default_ttl(mut self, ttl: Duration) -> Self {
		self.cache.default_ttl = ttl;

		self
	}

	/// Overrides the cache policy of a single operation.
	pub fn cache_policy(mut self, operation: Operation, policy: CachePolicy) -> Self {
		self.cache.overrides.insert(operation, policy);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(DEFAULT_BASE_URL)
				.map_err(|_| ConfigError::InvalidBaseUrl { url: DEFAULT_BASE_URL.into() })?,
		};
		let config = ClientConfig {
			credentials: self.credentials,
			base_url: normalize_base_url(base_url)?,
			default_image_quality: self.default_image_quality,
			cache: self.cache,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		validate_ttl("default", self.cache.default_ttl)?;

		for (operation, policy) in &self.cache.overrides {
			if let CachePolicy::Ttl(ttl) = policy {
				validate_ttl(operation.as_str(), *ttl)?;
			}
		}

		Ok(())
	}
}

fn normalize_base_url(mut url: Url) -> Result<Url, ConfigError> {
	if !matches!(url.scheme(), "http" | "https") || !url.has_host() || url.cannot_be_a_base() {
		return Err(ConfigError::InvalidBaseUrl { url: url.to_string() });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url.set_query(None);
	url.set_fragment(None);

	Ok(url)
}

fn validate_ttl(operation: &'static str, ttl: Duration) -> Result<(), ConfigError> {
	if ttl.is_positive() { Ok(()) } else { Err(ConfigError::NonPositiveTtl { operation }) }
}
