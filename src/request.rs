//! Request shape derivation: template expansion, method selection, and per-call context.
//!
//! Endpoint templates use `{name}` placeholders. Each placeholder consumes the matching
//! parameter; whatever is left becomes the query string of a GET or joins the JSON object body
//! of a POST. A request is a POST exactly when it carries a body.

pub mod params;

pub use params::Params;

// std
use std::{borrow::Cow, collections::HashSet};
// self
use crate::{_prelude::*, error::BuildError, request::params::render};

/// HTTP methods spoken by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// Body-less read.
	Get,
	/// JSON body submission.
	Post,
}
impl Method {
	/// Picks the method implied by the presence of a body.
	pub fn for_body(body: Option<&JsonValue>) -> Self {
		if body.is_some() { Self::Post } else { Self::Get }
	}

	/// Returns the method name fed into the signature.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Image quality requested through the `Image-Quality` header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
	/// Smallest renditions.
	Low,
	#[default]
	/// Default rendition.
	Medium,
	/// Large renditions.
	High,
	/// Source files.
	Original,
}
impl ImageQuality {
	/// Returns the header value.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
			Self::Original => "original",
		}
	}
}
impl Display for ImageQuality {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl std::str::FromStr for ImageQuality {
	type Err = UnknownImageQuality;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"low" => Ok(Self::Low),
			"medium" => Ok(Self::Medium),
			"high" => Ok(Self::High),
			"original" => Ok(Self::Original),
			_ => Err(UnknownImageQuality { value: s.to_owned() }),
		}
	}
}

/// Raised when parsing an unknown image quality label.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown image quality `{value}`.")]
pub struct UnknownImageQuality {
	/// Rejected input.
	pub value: String,
}

/// Caller-scoped settings that shape headers but never the response identity.
///
/// The context is threaded explicitly through every call and is excluded from cache keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
	/// Image quality override; `None` falls back to the client default.
	pub image_quality: Option<ImageQuality>,
	/// Instant treated as "now" for the `Time` header and cache freshness; `None` reads the
	/// wall clock at dispatch.
	pub requested_at: Option<OffsetDateTime>,
}
impl RequestContext {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the image quality for this call.
	pub fn with_image_quality(mut self, quality: ImageQuality) -> Self {
		self.image_quality = Some(quality);

		self
	}

	/// Overrides the instant used for timestamps and freshness checks.
	///
	/// The pinned instant is also the signed `Time` header, and the server may reject a stale one,
	/// so pin it only to replay a call or to drive the cache clock against a test server.
	pub fn with_requested_at(mut self, instant: OffsetDateTime) -> Self {
		self.requested_at = Some(instant);

		self
	}

	/// Returns the pinned instant or the current wall-clock time.
	pub fn now(&self) -> OffsetDateTime {
		self.requested_at.unwrap_or_else(OffsetDateTime::now_utc)
	}
}

/// One call against the API, before resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// Path template relative to the base URL, e.g. `comics/{id}`.
	pub template: Cow<'static, str>,
	/// Placeholder, query, or body parameters.
	pub params: Params,
	/// JSON body; its presence makes the call a POST.
	pub body: Option<JsonValue>,
	/// Skips the login step (used by the sign-in call itself).
	pub skip_auth: bool,
	/// Per-call header context.
	pub context: RequestContext,
}
impl ApiRequest {
	/// Creates a body-less, authenticated request for `template`.
	pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
		Self {
			template: template.into(),
			params: Params::new(),
			body: None,
			skip_auth: false,
			context: RequestContext::default(),
		}
	}

	/// Replaces the parameter set.
	pub fn with_params(mut self, params: Params) -> Self {
		self.params = params;

		self
	}

	/// Attaches a JSON body, turning the call into a POST.
	pub fn with_body(mut self, body: JsonValue) -> Self {
		self.body = Some(body);

		self
	}

	/// Sends the call without acquiring a session token first.
	pub fn skip_auth(mut self) -> Self {
		self.skip_auth = true;

		self
	}

	/// Overrides the per-call context.
	pub fn with_context(mut self, context: RequestContext) -> Self {
		self.context = context;

		self
	}

	/// Resolves the request against `base`.
	pub fn resolve(&self, base: &Url) -> Result<ResolvedRequest, BuildError> {
		resolve(base, &self.template, &self.params, self.body.as_ref())
	}
}

/// Concrete request ready for signing and transport.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRequest {
	/// Absolute URL including any query string.
	pub url: Url,
	/// Method implied by the body.
	pub method: Method,
	/// JSON body for POST requests.
	pub body: Option<JsonValue>,
}
impl ResolvedRequest {
	/// Request target fed into the signature: path plus query, without the leading slash.
	pub fn target(&self) -> String {
		let path = self.url.path().trim_start_matches('/');

		match self.url.query() {
			Some(query) => format!("{path}?{query}"),
			None => path.to_owned(),
		}
	}
}

/// Expands `template` against `base` and derives the method from `body`.
pub fn resolve(
	base: &Url,
	template: &str,
	params: &Params,
	body: Option<&JsonValue>,
) -> Result<ResolvedRequest, BuildError> {
	let mut url = base.clone();
	let mut consumed = HashSet::new();

	{
		let mut segments = url.path_segments_mut().map_err(|_| BuildError::InvalidUrl {
			source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
		})?;

		segments.pop_if_empty();

		for segment in template.split('/').filter(|segment| !segment.is_empty()) {
			segments.push(&expand_segment(template, segment, params, &mut consumed)?);
		}
	}

	let residual = params.iter().filter(|(name, _)| !consumed.contains(name)).collect::<Vec<_>>();
	let method = Method::for_body(body);
	let body = match body {
		None => {
			if !residual.is_empty() {
				let mut query = url.query_pairs_mut();

				for (name, value) in &residual {
					query.append_pair(name, &render(value));
				}
			}

			None
		},
		Some(body) => Some(merge_body(template, body, &residual)?),
	};

	Ok(ResolvedRequest { url, method, body })
}

fn expand_segment<'p>(
	template: &str,
	segment: &str,
	params: &'p Params,
	consumed: &mut HashSet<&'p str>,
) -> Result<String, BuildError> {
	let malformed = || BuildError::MalformedTemplate { template: template.to_owned() };
	let mut out = String::with_capacity(segment.len());
	let mut rest = segment;

	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);

		let after = &rest[open + 1..];
		let close = after.find('}').ok_or_else(malformed)?;
		let name = &after[..close];

		if name.is_empty() || name.contains('{') {
			return Err(malformed());
		}

		let (key, value) = params.iter().find(|(key, _)| *key == name).ok_or_else(|| {
			BuildError::MissingParameter { template: template.to_owned(), name: name.to_owned() }
		})?;

		out.push_str(&render(value));
		consumed.insert(key);

		rest = &after[close + 1..];
	}

	if rest.contains('}') {
		return Err(malformed());
	}

	out.push_str(rest);

	Ok(out)
}

fn merge_body(
	template: &str,
	body: &JsonValue,
	residual: &[(&str, &JsonValue)],
) -> Result<JsonValue, BuildError> {
	if residual.is_empty() {
		return Ok(body.clone());
	}

	let mut body = body.clone();
	let object = body
		.as_object_mut()
		.ok_or_else(|| BuildError::NonObjectBody { template: template.to_owned() })?;

	for (name, value) in residual {
		object.entry(*name).or_insert_with(|| (*value).clone());
	}

	Ok(body)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://api.example.com/").expect("Base URL fixture should parse.")
	}

	#[test]
	fn placeholder_is_substituted_and_not_repeated_in_query() {
		let params = Params::new().with("id", "abc");
		let resolved =
			resolve(&base(), "comics/{id}", &params, None).expect("Template should resolve.");

		assert_eq!(resolved.url.as_str(), "https://api.example.com/comics/abc");
		assert_eq!(resolved.method, Method::Get);
		assert_eq!(resolved.target(), "comics/abc");
		assert!(resolved.body.is_none());
	}

	#[test]
	fn residual_params_become_query_pairs_in_order() {
		let params = Params::new().with("id", "x").with("page", 2);
		let resolved = resolve(&base(), "comics/{id}/comments", &params, None)
			.expect("Template should resolve.");

		assert_eq!(resolved.url.as_str(), "https://api.example.com/comics/x/comments?page=2");
		assert_eq!(resolved.target(), "comics/x/comments?page=2");

		let params = Params::new().with("page", 1).with("c", "Cosplay").with("s", "dd");
		let resolved = resolve(&base(), "comics", &params, None).expect("Template should resolve.");

		assert_eq!(resolved.target(), "comics?page=1&c=Cosplay&s=dd");
	}

	#[test]
	fn multiple_placeholders_resolve() {
		let params = Params::new().with("id", "x").with("order", 3).with("page", 1);
		let resolved = resolve(&base(), "comics/{id}/order/{order}/pages", &params, None)
			.expect("Template should resolve.");

		assert_eq!(resolved.target(), "comics/x/order/3/pages?page=1");
	}

	#[test]
	fn body_always_means_post() {
		let body = json!({ "keyword": "cat", "page": 1 });
		let resolved = resolve(&base(), "comics/advanced-search", &Params::new(), Some(&body))
			.expect("Template should resolve.");

		assert_eq!(resolved.method, Method::Post);
		assert_eq!(resolved.body, Some(body));
		assert!(resolved.url.query().is_none());
	}

	#[test]
	fn post_residual_params_join_body_without_overwriting() {
		let body = json!({ "keyword": "cat" });
		let params = Params::new().with("keyword", "dog").with("page", 2);
		let resolved = resolve(&base(), "comics/advanced-search", &params, Some(&body))
			.expect("Template should resolve.");

		assert_eq!(resolved.body, Some(json!({ "keyword": "cat", "page": 2 })));
		assert!(resolved.url.query().is_none());
	}

	#[test]
	fn post_residual_params_need_object_body() {
		let err = resolve(&base(), "items", &Params::new().with("a", 1), Some(&json!([1])))
			.expect_err("Array bodies cannot absorb parameters.");

		assert_eq!(err, BuildError::NonObjectBody { template: "items".into() });
	}

	#[test]
	fn missing_placeholder_fails_fast() {
		let err = resolve(&base(), "comics/{id}", &Params::new(), None)
			.expect_err("Missing placeholder parameters should fail.");

		assert_eq!(
			err,
			BuildError::MissingParameter { template: "comics/{id}".into(), name: "id".into() }
		);
	}

	#[test]
	fn malformed_templates_are_rejected() {
		for template in ["comics/{id", "comics/{}", "comics/id}"] {
			let err = resolve(&base(), template, &Params::new().with("id", "x"), None)
				.expect_err("Malformed templates should fail.");

			assert_eq!(err, BuildError::MalformedTemplate { template: template.into() });
		}
	}

	#[test]
	fn placeholder_values_are_segment_encoded() {
		let params = Params::new().with("id", "a/b c");
		let resolved =
			resolve(&base(), "comics/{id}", &params, None).expect("Template should resolve.");

		assert_eq!(resolved.target(), "comics/a%2Fb%20c");
	}

	#[test]
	fn base_path_prefix_is_kept() {
		let base =
			Url::parse("https://api.example.com/v1/").expect("Base URL fixture should parse.");
		let resolved = resolve(&base, "games", &Params::new().with("page", 1), None)
			.expect("Template should resolve.");

		assert_eq!(resolved.url.as_str(), "https://api.example.com/v1/games?page=1");
		assert_eq!(resolved.target(), "v1/games?page=1");
	}

	#[test]
	fn image_quality_parses_labels() {
		assert_eq!("HIGH".parse::<ImageQuality>(), Ok(ImageQuality::High));
		assert_eq!(ImageQuality::default().as_str(), "medium");
		assert!("ultra".parse::<ImageQuality>().is_err());
	}

	#[test]
	fn unpinned_context_reads_wall_clock() {
		let before = OffsetDateTime::now_utc();
		let now = RequestContext::new().now();
		let pinned = time::macros::datetime!(2023-11-14 22:13:20 UTC);

		assert!(now >= before && now - before < Duration::seconds(5));
		assert_eq!(RequestContext::new().with_requested_at(pinned).now(), pinned);
	}
}
