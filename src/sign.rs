//! Request signing primitives.
//!
//! Every API call carries a `Signature` header: HMAC-SHA256, keyed with the digest key, over the
//! ASCII-lower-cased concatenation of the request target (path plus query, without the leading
//! slash), the `Time` header bytes, the `Nonce` header bytes, the method, and the API key. The
//! server recomputes the same digest, so any drift in field order or casing surfaces as an
//! authentication rejection rather than a local failure.
//!
//! The nonce is the hex MD5 of the timestamp bytes. It is deterministic per second and carries no
//! entropy; the protocol requires exactly this derivation.

// crates.io
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::{ApiCredentials, SessionToken},
	error::ConfigError,
	request::{ImageQuality, Method, ResolvedRequest},
};

type HmacSha256 = Hmac<Sha256>;

/// Unix timestamp rendered the way the `Time` header expects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);
impl Timestamp {
	/// Captures the whole seconds of the provided instant.
	pub fn from_datetime(instant: OffsetDateTime) -> Self {
		Self(instant.unix_timestamp())
	}

	/// Wraps raw unix seconds.
	pub const fn from_unix(secs: i64) -> Self {
		Self(secs)
	}

	/// Returns the raw unix seconds.
	pub const fn unix(self) -> i64 {
		self.0
	}

	/// Decimal header value without a fractional part.
	pub fn header_value(self) -> String {
		self.0.to_string()
	}
}
impl Display for Timestamp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.0)
	}
}

/// Computes request signatures with the configured key pair.
///
/// The HMAC state is keyed once at construction and cloned per signature, so signing itself is
/// infallible.
#[derive(Clone)]
pub struct Signer {
	mac: HmacSha256,
	api_key: Arc<[u8]>,
}
impl Signer {
	/// Prepares a signer for the provided credentials.
	pub fn new(credentials: &ApiCredentials) -> Result<Self, ConfigError> {
		let mac = <HmacSha256 as Mac>::new_from_slice(credentials.digest_key())
			.map_err(|_| ConfigError::InvalidDigestKey)?;

		Ok(Self { mac, api_key: Arc::from(credentials.api_key()) })
	}

	/// Derives the nonce for a timestamp: lowercase hex MD5 of its decimal bytes.
	pub fn nonce(timestamp: &str) -> String {
		format!("{:x}", Md5::digest(timestamp.as_bytes()))
	}

	/// Signs a request target.
	///
	/// `target` may carry a leading slash; it is stripped before signing.
	pub fn sign(&self, target: &str, timestamp: &str, nonce: &str, method: Method) -> String {
		let target = target.trim_start_matches('/');
		let method = method.as_str();
		let mut material = Vec::with_capacity(
			target.len() + timestamp.len() + nonce.len() + method.len() + self.api_key.len(),
		);

		material.extend_from_slice(target.as_bytes());
		material.extend_from_slice(timestamp.as_bytes());
		material.extend_from_slice(nonce.as_bytes());
		material.extend_from_slice(method.as_bytes());
		material.extend_from_slice(&self.api_key);
		material.make_ascii_lowercase();

		let mut mac = self.mac.clone();

		mac.update(&material);

		format!("{:x}", mac.finalize().into_bytes())
	}

	/// Builds the complete header set for a resolved request.
	pub fn signed_headers(
		&self,
		request: &ResolvedRequest,
		token: Option<&SessionToken>,
		image_quality: ImageQuality,
		timestamp: Timestamp,
	) -> SignedHeaders {
		let time = timestamp.header_value();
		let nonce = Self::nonce(&time);
		let signature = self.sign(&request.target(), &time, &nonce, request.method);

		SignedHeaders {
			authorization: token.map(|token| token.expose().to_owned()).unwrap_or_default(),
			time,
			image_quality,
			nonce,
			signature,
		}
	}
}
impl Debug for Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Signer(..)")
	}
}

/// Per-call header set; never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeaders {
	/// Session token, or an empty string for unauthenticated calls.
	pub authorization: String,
	/// Unix seconds.
	pub time: String,
	/// Requested image quality.
	pub image_quality: ImageQuality,
	/// Hex MD5 of [`time`](Self::time).
	pub nonce: String,
	/// Hex HMAC-SHA256 request signature.
	pub signature: String,
}
impl SignedHeaders {
	/// `Authorization` header name.
	pub const AUTHORIZATION: &'static str = "Authorization";
	/// `Image-Quality` header name.
	pub const IMAGE_QUALITY: &'static str = "Image-Quality";
	/// `Nonce` header name.
	pub const NONCE: &'static str = "Nonce";
	/// `Signature` header name.
	pub const SIGNATURE: &'static str = "Signature";
	/// `Time` header name.
	pub const TIME: &'static str = "Time";

	/// Iterates `(name, value)` pairs in wire order.
	pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
		[
			(Self::AUTHORIZATION, self.authorization.as_str()),
			(Self::TIME, self.time.as_str()),
			(Self::IMAGE_QUALITY, self.image_quality.as_str()),
			(Self::NONCE, self.nonce.as_str()),
			(Self::SIGNATURE, self.signature.as_str()),
		]
		.into_iter()
	}
}
impl Debug for SignedHeaders {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignedHeaders")
			.field("authorization_set", &!self.authorization.is_empty())
			.field("time", &self.time)
			.field("image_quality", &self.image_quality)
			.field("nonce", &self.nonce)
			.field("signature", &self.signature)
			.finish()
	}
}
