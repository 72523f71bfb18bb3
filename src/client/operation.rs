//! Named API operations and their declared cache lifetimes.

// self
use crate::_prelude::*;

/// Every named operation the client exposes.
///
/// The operation is the first component of a cache key, so two operations that share a path
/// template (category and author listings both hit `comics`) never share entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	/// Favourite comics of the signed-in user.
	Collections,
	/// Category catalogue.
	Categories,
	/// Trending search keywords.
	Keywords,
	/// Keyword search with sorting.
	AdvancedSearch,
	/// Comics in a category.
	CategoryList,
	/// Comics by an author.
	AuthorList,
	/// Comic metadata.
	ComicDetail,
	/// Comics related to a comic.
	ComicRecommendation,
	/// Episode listing of a comic.
	ComicEpisodes,
	/// Page images of one episode.
	ComicPage,
	/// Comment listing of a comic.
	ComicComments,
	/// Game listing.
	Games,
	/// Game metadata.
	GameDetail,
}
impl Operation {
	/// All operations, in declaration order.
	pub const ALL: [Operation; 13] = [
		Operation::Collections,
		Operation::Categories,
		Operation::Keywords,
		Operation::AdvancedSearch,
		Operation::CategoryList,
		Operation::AuthorList,
		Operation::ComicDetail,
		Operation::ComicRecommendation,
		Operation::ComicEpisodes,
		Operation::ComicPage,
		Operation::ComicComments,
		Operation::Games,
		Operation::GameDetail,
	];

	/// Stable label used in cache keys, spans, and metrics.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Collections => "collections",
			Operation::Categories => "categories",
			Operation::Keywords => "keywords",
			Operation::AdvancedSearch => "advanced_search",
			Operation::CategoryList => "category_list",
			Operation::AuthorList => "author_list",
			Operation::ComicDetail => "comic_detail",
			Operation::ComicRecommendation => "comic_recommendation",
			Operation::ComicEpisodes => "comic_episodes",
			Operation::ComicPage => "comic_page",
			Operation::ComicComments => "comic_comments",
			Operation::Games => "games",
			Operation::GameDetail => "game_detail",
		}
	}

	/// Path template relative to the API base URL.
	pub const fn template(self) -> &'static str {
		match self {
			Operation::Collections => "collections",
			Operation::Categories => "categories",
			Operation::Keywords => "keywords",
			Operation::AdvancedSearch => "comics/advanced-search",
			Operation::CategoryList | Operation::AuthorList => "comics",
			Operation::ComicDetail => "comics/{id}",
			Operation::ComicRecommendation => "comics/{id}/recommendation",
			Operation::ComicEpisodes => "comics/{id}/eps",
			Operation::ComicPage => "comics/{id}/order/{order}/pages",
			Operation::ComicComments => "comics/{id}/comments",
			Operation::Games => "games",
			Operation::GameDetail => "games/{id}",
		}
	}

	/// TTL the operation declares for itself; `None` falls back to the configured default.
	pub const fn declared_ttl(self) -> Option<Duration> {
		match self {
			Operation::Collections => Some(Duration::days(1)),
			Operation::Categories
			| Operation::Keywords
			| Operation::ComicDetail
			| Operation::GameDetail => Some(Duration::days(3)),
			_ => None,
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
