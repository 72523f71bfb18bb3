//! Typed wrappers for every named API operation.
//!
//! Each method builds the operation's request and routes it through [`Client::cached`], so the
//! configured cache policy applies uniformly. The trailing [`RequestContext`] carries per-call
//! header settings and never affects which cached entry is served.

// self
use crate::{
	_prelude::*,
	client::{Client, Operation},
	http::ApiHttpClient,
	request::{ApiRequest, Params, RequestContext},
};

/// Ordering of comic listings and search results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultSort {
	/// Newest first.
	#[default]
	#[serde(rename = "dd")]
	DateDescending,
	/// Oldest first.
	#[serde(rename = "da")]
	DateAscending,
	/// Most liked first.
	#[serde(rename = "ld")]
	LikesDescending,
	/// Most viewed first.
	#[serde(rename = "vd")]
	ViewsDescending,
}
impl ResultSort {
	/// Wire value of the sort order.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResultSort::DateDescending => "dd",
			ResultSort::DateAscending => "da",
			ResultSort::LikesDescending => "ld",
			ResultSort::ViewsDescending => "vd",
		}
	}
}
impl Display for ResultSort {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Favourite comics of the signed-in user.
	pub async fn collections(&self, context: &RequestContext) -> Result<JsonValue> {
		self.call(Operation::Collections, Params::new(), None, context).await
	}

	/// Category catalogue.
	pub async fn categories(&self, context: &RequestContext) -> Result<JsonValue> {
		self.call(Operation::Categories, Params::new(), None, context).await
	}

	/// Trending search keywords.
	pub async fn keywords(&self, context: &RequestContext) -> Result<JsonValue> {
		self.call(Operation::Keywords, Params::new(), None, context).await
	}

	/// Searches comics by keyword; sent as a POST.
	pub async fn advanced_search(
		&self,
		keyword: &str,
		page: u32,
		sort: ResultSort,
		context: &RequestContext,
	) -> Result<JsonValue> {
		let body = serde_json::json!({ "keyword": keyword, "page": page, "sort": sort });

		self.call(Operation::AdvancedSearch, Params::new(), Some(body), context).await
	}

	/// Lists comics in `category`.
	pub async fn category_list(
		&self,
		category: &str,
		page: u32,
		sort: ResultSort,
		context: &RequestContext,
	) -> Result<JsonValue> {
		let params =
			Params::new().with("page", page).with("c", category).with("s", sort.as_str());

		self.call(Operation::CategoryList, params, None, context).await
	}

	/// Lists comics by `author`.
	pub async fn author_list(
		&self,
		author: &str,
		page: u32,
		sort: ResultSort,
		context: &RequestContext,
	) -> Result<JsonValue> {
		let params = Params::new().with("page", page).with("a", author).with("s", sort.as_str());

		self.call(Operation::AuthorList, params, None, context).await
	}

	/// Comic metadata.
	pub async fn comic_detail(&self, id: &str, context: &RequestContext) -> Result<JsonValue> {
		self.call(Operation::ComicDetail, Params::new().with("id", id), None, context).await
	}

	/// Comics related to `id`.
	pub async fn comic_recommendation(
		&self,
		id: &str,
		context: &RequestContext,
	) -> Result<JsonValue> {
		self.call(Operation::ComicRecommendation, Params::new().with("id", id), None, context)
			.await
	}

	/// One page of a comic's episode listing.
	pub async fn comic_episodes(
		&self,
		id: &str,
		page: u32,
		context: &RequestContext,
	) -> Result<JsonValue> {
		let params = Params::new().with("id", id).with("page", page);

		self.call(Operation::ComicEpisodes, params, None, context).await
	}

	/// Page images of episode `order`.
	pub async fn comic_page(
		&self,
		id: &str,
		order: u32,
		page: u32,
		context: &RequestContext,
	) -> Result<JsonValue> {
		let params = Params::new().with("id", id).with("order", order).with("page", page);

		self.call(Operation::ComicPage, params, None, context).await
	}

	/// One page of a comic's comments.
	pub async fn comic_comments(
		&self,
		id: &str,
		page: u32,
		context: &RequestContext,
	) -> Result<JsonValue> {
		let params = Params::new().with("id", id).with("page", page);

		self.call(Operation::ComicComments, params, None, context).await
	}

	/// One page of the game listing.
	pub async fn games(&self, page: u32, context: &RequestContext) -> Result<JsonValue> {
		self.call(Operation::Games, Params::new().with("page", page), None, context).await
	}

	/// Game metadata.
	pub async fn game_detail(&self, id: &str, context: &RequestContext) -> Result<JsonValue> {
		self.call(Operation::GameDetail, Params::new().with("id", id), None, context).await
	}

	async fn call(
		&self,
		operation: Operation,
		params: Params,
		body: Option<JsonValue>,
		context: &RequestContext,
	) -> Result<JsonValue> {
		let mut request =
			ApiRequest::new(operation.template()).with_params(params).with_context(context.clone());

		request.body = body;

		self.cached(operation, request).await
	}
}
