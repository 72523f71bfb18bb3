//! Process-wide API key material.

// self
use crate::_prelude::*;

/// Digest key and API key shipped with the official client.
///
/// Both keys are fixed for the lifetime of the process. The digest key seeds the request HMAC and
/// the API key is appended to every signed payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredentials {
	digest_key: String,
	api_key: String,
}
impl ApiCredentials {
	/// Creates a new key pair.
	pub fn new(digest_key: impl Into<String>, api_key: impl Into<String>) -> Self {
		Self { digest_key: digest_key.into(), api_key: api_key.into() }
	}

	/// Key bytes used to seed the HMAC.
	pub fn digest_key(&self) -> &[u8] {
		self.digest_key.as_bytes()
	}

	/// Key bytes appended to the signed material.
	pub fn api_key(&self) -> &[u8] {
		self.api_key.as_bytes()
	}
}
impl Debug for ApiCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiCredentials")
			.field("digest_key", &"<redacted>")
			.field("api_key", &"<redacted>")
			.finish()
	}
}
