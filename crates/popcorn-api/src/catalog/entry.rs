//! Domain entries (`Show`, `Anime`, `Movie`) built from catalog records.
//!
//! Entries keep the raw record and read fields lazily, so a summary record,
//! a full record and even an error body all wrap without failing.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::route::RouteRef;
use super::types::{Identified, Identifier, Payload, Tab};

/// Artwork URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Images {
    /// Poster image URL.
    pub poster: Option<String>,
    /// Fanart (backdrop) image URL.
    pub fanart: Option<String>,
    /// Banner image URL.
    pub banner: Option<String>,
}

/// Community rating summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Rating {
    /// Score out of 100.
    pub percentage: u32,
    /// Number of votes.
    pub votes: u64,
    /// Users currently watching.
    pub watching: u64,
    /// Loved count.
    pub loved: u64,
    /// Hated count.
    pub hated: u64,
}

/// One episode of a show, present only in detail records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Episode {
    /// Season number.
    pub season: u32,
    /// Episode number within the season.
    pub episode: u32,
    /// Episode title.
    pub title: Option<String>,
    /// Episode overview.
    pub overview: Option<String>,
    /// First air date (unix seconds).
    pub first_aired: Option<i64>,
}

/// A catalog entry type that a `RouteController` can build.
///
/// Field accessors read from the raw record and return `None` (or an empty
/// value) when a field is missing or has an unexpected shape.
pub trait CatalogEntry: Sized + Clone {
    /// Tab this entry type lives under.
    const TAB: Tab;

    /// Wraps a tagged payload.
    fn from_payload(route: RouteRef<Self>, payload: Payload) -> Self;

    /// Returns the tagged payload.
    fn payload(&self) -> &Payload;

    /// Returns the back-reference to the controller that built this entry.
    fn route(&self) -> &RouteRef<Self>;

    /// Returns the raw record.
    fn record(&self) -> &Value {
        self.payload().record()
    }

    /// Returns `true` if the entry came from a detail lookup.
    fn is_detailed(&self) -> bool {
        self.payload().is_detailed()
    }

    /// Catalog id (`_id`).
    fn id(&self) -> Option<&str> {
        str_field(self.record(), "_id")
    }

    /// IMDb id.
    fn imdb_id(&self) -> Option<&str> {
        str_field(self.record(), "imdb_id")
    }

    /// Title.
    fn title(&self) -> Option<&str> {
        str_field(self.record(), "title")
    }

    /// URL slug.
    fn slug(&self) -> Option<&str> {
        str_field(self.record(), "slug")
    }

    /// Release year. Accepts both `"2011"` and `2011`.
    fn year(&self) -> Option<u32> {
        u32_field(self.record(), "year")
    }

    /// Synopsis (detail records only).
    fn synopsis(&self) -> Option<&str> {
        str_field(self.record(), "synopsis")
    }

    /// Genre names.
    fn genres(&self) -> Vec<&str> {
        self.record()
            .get("genres")
            .and_then(Value::as_array)
            .map(|genres| genres.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Artwork URLs.
    fn images(&self) -> Images {
        typed_field(self.record(), "images").unwrap_or_default()
    }

    /// Rating summary.
    fn rating(&self) -> Option<Rating> {
        typed_field(self.record(), "rating")
    }
}

fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn u32_field(record: &Value, key: &str) -> Option<u32> {
    match record.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn typed_field<T: for<'de> Deserialize<'de>>(record: &Value, key: &str) -> Option<T> {
    record
        .get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn episodes_field(record: &Value) -> Vec<Episode> {
    record
        .get("episodes")
        .and_then(Value::as_array)
        .map(|episodes| {
            episodes
                .iter()
                .filter_map(|e| serde_json::from_value(e.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the detailed form of `entry`, fetching it through the entry's
/// controller unless it already is one.
async fn fetch_details<T: CatalogEntry>(entry: &T) -> Result<T> {
    if entry.is_detailed() {
        return Ok(entry.clone());
    }
    let id = entry.id().context("entry has no id")?;
    let route = entry
        .route()
        .upgrade()
        .context("route controller is no longer available")?;
    route.get(Identifier::Raw(id)).await
}

// --- Show ---

/// A TV series.
#[derive(Debug, Clone)]
pub struct Show {
    route: RouteRef<Self>,
    payload: Payload,
}

impl CatalogEntry for Show {
    const TAB: Tab = Tab::Show;

    fn from_payload(route: RouteRef<Self>, payload: Payload) -> Self {
        Self { route, payload }
    }

    fn payload(&self) -> &Payload {
        &self.payload
    }

    fn route(&self) -> &RouteRef<Self> {
        &self.route
    }
}

impl Show {
    /// Number of seasons.
    #[must_use]
    pub fn num_seasons(&self) -> Option<u32> {
        u32_field(self.record(), "num_seasons")
    }

    /// Episodes (detail records only).
    #[must_use]
    pub fn episodes(&self) -> Vec<Episode> {
        episodes_field(self.record())
    }

    /// Returns the detailed form of this show.
    ///
    /// # Errors
    ///
    /// Returns an error if the show has no id, its controller has been
    /// dropped, or the lookup fails.
    pub async fn details(&self) -> Result<Self> {
        fetch_details(self).await
    }
}

// --- Anime ---

/// An anime series or film.
#[derive(Debug, Clone)]
pub struct Anime {
    route: RouteRef<Self>,
    payload: Payload,
}

impl CatalogEntry for Anime {
    const TAB: Tab = Tab::Anime;

    fn from_payload(route: RouteRef<Self>, payload: Payload) -> Self {
        Self { route, payload }
    }

    fn payload(&self) -> &Payload {
        &self.payload
    }

    fn route(&self) -> &RouteRef<Self> {
        &self.route
    }
}

impl Anime {
    /// Kind of anime (`show` or `movie`).
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        str_field(self.record(), "type")
    }

    /// Number of seasons (series only).
    #[must_use]
    pub fn num_seasons(&self) -> Option<u32> {
        u32_field(self.record(), "num_seasons")
    }

    /// Episodes (detail records of series only).
    #[must_use]
    pub fn episodes(&self) -> Vec<Episode> {
        episodes_field(self.record())
    }

    /// Returns the detailed form of this anime.
    ///
    /// # Errors
    ///
    /// Returns an error if the anime has no id, its controller has been
    /// dropped, or the lookup fails.
    pub async fn details(&self) -> Result<Self> {
        fetch_details(self).await
    }
}

// --- Movie ---

/// A feature film.
#[derive(Debug, Clone)]
pub struct Movie {
    route: RouteRef<Self>,
    payload: Payload,
}

impl CatalogEntry for Movie {
    const TAB: Tab = Tab::Movie;

    fn from_payload(route: RouteRef<Self>, payload: Payload) -> Self {
        Self { route, payload }
    }

    fn payload(&self) -> &Payload {
        &self.payload
    }

    fn route(&self) -> &RouteRef<Self> {
        &self.route
    }
}

impl Movie {
    /// Runtime in minutes.
    #[must_use]
    pub fn runtime(&self) -> Option<u32> {
        u32_field(self.record(), "runtime")
    }

    /// Trailer URL.
    #[must_use]
    pub fn trailer(&self) -> Option<&str> {
        str_field(self.record(), "trailer")
    }

    /// Release date (unix seconds).
    #[must_use]
    pub fn released(&self) -> Option<i64> {
        self.record().get("released").and_then(Value::as_i64)
    }

    /// Age certification (e.g. `PG-13`).
    #[must_use]
    pub fn certification(&self) -> Option<&str> {
        str_field(self.record(), "certification")
    }

    /// Returns the detailed form of this movie.
    ///
    /// # Errors
    ///
    /// Returns an error if the movie has no id, its controller has been
    /// dropped, or the lookup fails.
    pub async fn details(&self) -> Result<Self> {
        fetch_details(self).await
    }
}

impl Identified for Show {
    fn catalog_id(&self) -> Option<&str> {
        self.id()
    }
}

impl Identified for Anime {
    fn catalog_id(&self) -> Option<&str> {
        self.id()
    }
}

impl Identified for Movie {
    fn catalog_id(&self) -> Option<&str> {
        self.id()
    }
}

impl<'a> From<&'a Show> for Identifier<'a> {
    fn from(entry: &'a Show) -> Self {
        Self::Reference(entry)
    }
}

impl<'a> From<&'a Anime> for Identifier<'a> {
    fn from(entry: &'a Anime) -> Self {
        Self::Reference(entry)
    }
}

impl<'a> From<&'a Movie> for Identifier<'a> {
    fn from(entry: &'a Movie) -> Self {
        Self::Reference(entry)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use serde_json::json;

    use super::*;

    fn detached<T: CatalogEntry>(payload: Payload) -> T {
        T::from_payload(RouteRef::detached(), payload)
    }

    #[test]
    fn test_show_accessors_from_detail_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/popcorn/show_tt0944947.json");
        let record: Value = serde_json::from_str(json).unwrap();

        // Act
        let show: Show = detached(Payload::detail(record));

        // Assert
        assert!(show.is_detailed());
        assert_eq!(show.id(), Some("tt0944947"));
        assert_eq!(show.title(), Some("Game of Thrones"));
        assert_eq!(show.year(), Some(2011));
        assert_eq!(show.num_seasons(), Some(8));
        assert_eq!(show.genres()[0], "drama");
        assert_eq!(show.rating().unwrap().percentage, 92);
        let episodes = show.episodes();
        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].title.as_deref(), Some("Winter Is Coming"));
        assert_eq!(episodes[2].season, 2);
        assert!(episodes[2].overview.is_none());
    }

    #[test]
    fn test_movie_accessors_from_random_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/popcorn/random_movie.json");
        let record: Value = serde_json::from_str(json).unwrap();

        // Act
        let movie: Movie = detached(Payload::list(record));

        // Assert
        assert!(!movie.is_detailed());
        assert_eq!(movie.runtime(), Some(148));
        assert_eq!(movie.released(), Some(1_279_238_400));
        assert_eq!(movie.certification(), Some("PG-13"));
        assert!(movie.trailer().unwrap().contains("youtube"));
        assert!(movie.images().poster.is_some());
    }

    #[test]
    fn test_anime_kind_from_list_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/popcorn/animes_page_1.json");
        let records: Vec<Value> = serde_json::from_str(json).unwrap();

        // Act
        let animes: Vec<Anime> = records
            .into_iter()
            .map(|r| detached(Payload::list(r)))
            .collect();

        // Assert
        assert_eq!(animes[0].kind(), Some("show"));
        assert_eq!(animes[0].num_seasons(), Some(1));
        assert_eq!(animes[1].kind(), Some("movie"));
        assert!(animes[1].num_seasons().is_none());
        assert_eq!(animes[1].images(), Images::default());
    }

    #[test]
    fn test_error_body_wraps_without_failing() {
        // Arrange
        let record = json!({"error": "not found", "rating": "n/a", "year": []});

        // Act
        let show: Show = detached(Payload::detail(record));

        // Assert
        assert!(show.id().is_none());
        assert!(show.title().is_none());
        assert!(show.year().is_none());
        assert!(show.rating().is_none());
        assert!(show.genres().is_empty());
        assert!(show.episodes().is_empty());
    }

    #[test]
    fn test_entry_converts_to_reference_identifier() {
        // Arrange
        let show: Show = detached(Payload::list(json!({"_id": "abc123"})));

        // Act
        let id = Identifier::from(&show).resolve().unwrap();

        // Assert
        assert_eq!(id, "abc123");
    }

    #[tokio::test]
    async fn test_details_on_detailed_entry_returns_clone() {
        // Arrange
        let show: Show = detached(Payload::detail(json!({"_id": "abc123"})));

        // Act
        let details = show.details().await.unwrap();

        // Assert
        assert!(details.is_detailed());
        assert_eq!(details.id(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_details_without_controller_fails() {
        // Arrange
        let movie: Movie = detached(Payload::list(json!({"_id": "tt1375666"})));

        // Act
        let result = movie.details().await;

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("route controller is no longer available")
        );
    }

    #[tokio::test]
    async fn test_details_without_id_fails() {
        // Arrange
        let anime: Anime = detached(Payload::list(json!({"title": "untitled"})));

        // Act
        let result = anime.details().await;

        // Assert
        assert!(result.unwrap_err().to_string().contains("entry has no id"));
    }
}
