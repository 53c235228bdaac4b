//! Popcorn catalog API client module.
//!
//! Routes GET requests for the `show`, `anime` and `movie` tabs and wraps
//! the JSON records that come back into typed entries.

mod api;
mod client;
mod entry;
mod route;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{CatalogClient, CatalogClientBuilder, DEFAULT_BASE_URL};
#[allow(clippy::module_name_repetitions)]
pub use entry::{Anime, CatalogEntry, Episode, Images, Movie, Rating, Show};
pub use route::{Factory, RouteController, RouteRef};
pub use types::{Identified, Identifier, Payload, SearchParams, SortBy, Source, Tab};
