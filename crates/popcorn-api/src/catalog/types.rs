//! Catalog request parameters, identifiers and tagged payloads.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde_json::Value;

// --- Tab ---

/// Resource category used to build endpoint paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    /// TV series (`show`).
    Show,
    /// Anime series and films (`anime`).
    Anime,
    /// Feature films (`movie`).
    Movie,
}

impl Tab {
    /// Returns the singular path segment (`show`, `anime`, `movie`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Anime => "anime",
            Self::Movie => "movie",
        }
    }

    /// Returns the collection path segment (`shows`, `animes`, `movies`).
    #[must_use]
    pub fn collection(self) -> String {
        format!("{}s", self.as_str())
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "show" => Ok(Self::Show),
            "anime" => Ok(Self::Anime),
            "movie" => Ok(Self::Movie),
            other => bail!("unknown tab: {other} (expected show, anime or movie)"),
        }
    }
}

// --- Search ---

/// Sort key for list searches.
///
/// Values outside the documented set are forwarded verbatim through
/// [`SortBy::Other`]; the remote service decides what to do with them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortBy {
    /// `name`
    Name,
    /// `rating`
    Rating,
    /// `released`
    Released,
    /// `updated`
    Updated,
    /// `trending`
    #[default]
    Trending,
    /// `year`
    Year,
    /// Any other value, sent as-is.
    Other(String),
}

impl SortBy {
    /// Returns the query value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name => "name",
            Self::Rating => "rating",
            Self::Released => "released",
            Self::Updated => "updated",
            Self::Trending => "trending",
            Self::Year => "year",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "name" => Self::Name,
            "rating" => Self::Rating,
            "released" => Self::Released,
            "updated" => Self::Updated,
            "trending" => Self::Trending,
            "year" => Self::Year,
            other => Self::Other(String::from(other)),
        })
    }
}

/// Parameters for a paged list search (`{tab}s/{page}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Page index (default: 1).
    pub page: u32,
    /// Sort key (default: `trending`).
    pub sort: SortBy,
    /// Sort order (default: -1, descending by remote convention).
    pub order: i32,
    /// Genre filter (default: `"all"`).
    pub genre: String,
    /// Keywords. `None` is sent as an empty `keywords=` value.
    pub query: Option<String>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            page: 1,
            sort: SortBy::Trending,
            order: -1,
            genre: String::from("all"),
            query: None,
        }
    }
}

impl SearchParams {
    /// Creates parameters with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page index.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the sort key.
    #[must_use]
    pub fn sort(mut self, sort: SortBy) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Sets the genre filter.
    #[must_use]
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    /// Sets the search keywords.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Builds the query pairs in wire order.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sort", String::from(self.sort.as_str())),
            ("order", self.order.to_string()),
            ("genre", self.genre.clone()),
            ("keywords", self.query.clone().unwrap_or_default()),
        ]
    }
}

// --- Identifier ---

/// Anything that carries a catalog id.
pub trait Identified {
    /// Returns the catalog id, if the record has one.
    fn catalog_id(&self) -> Option<&str>;
}

/// Argument accepted by detail lookups: a raw id or a reference to an
/// entry that exposes one.
#[derive(Clone, Copy)]
pub enum Identifier<'a> {
    /// A bare id string.
    Raw(&'a str),
    /// An entry whose id is extracted at lookup time.
    Reference(&'a (dyn Identified + Sync)),
}

impl<'a> Identifier<'a> {
    /// Resolves to the id string.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entry has no id.
    pub fn resolve(self) -> Result<&'a str> {
        match self {
            Self::Raw(id) => Ok(id),
            Self::Reference(entry) => entry.catalog_id().context("entry has no id"),
        }
    }
}

impl fmt::Debug for Identifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(id) => f.debug_tuple("Raw").field(id).finish(),
            Self::Reference(entry) => f
                .debug_tuple("Reference")
                .field(&entry.catalog_id())
                .finish(),
        }
    }
}

impl<'a> From<&'a str> for Identifier<'a> {
    fn from(id: &'a str) -> Self {
        Self::Raw(id)
    }
}

impl<'a> From<&'a String> for Identifier<'a> {
    fn from(id: &'a String) -> Self {
        Self::Raw(id.as_str())
    }
}

// --- Payload ---

/// How a record was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Summary record from a list, search or random fetch.
    List,
    /// Full record from a single-item detail lookup.
    Detail,
}

/// A raw JSON record tagged with the fetch that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    source: Source,
    record: Value,
}

impl Payload {
    /// Creates a payload.
    #[must_use]
    pub const fn new(source: Source, record: Value) -> Self {
        Self { source, record }
    }

    /// Tags a record from a list, search or random fetch.
    #[must_use]
    pub const fn list(record: Value) -> Self {
        Self::new(Source::List, record)
    }

    /// Tags a record from a detail lookup.
    #[must_use]
    pub const fn detail(record: Value) -> Self {
        Self::new(Source::Detail, record)
    }

    /// Returns how the record was fetched.
    #[must_use]
    pub const fn source(&self) -> Source {
        self.source
    }

    /// Returns `true` if the record came from a detail lookup.
    #[must_use]
    pub fn is_detailed(&self) -> bool {
        self.source == Source::Detail
    }

    /// Returns the raw record.
    #[must_use]
    pub const fn record(&self) -> &Value {
        &self.record
    }

    /// Consumes the payload and returns the raw record.
    #[must_use]
    pub fn into_record(self) -> Value {
        self.record
    }
}
