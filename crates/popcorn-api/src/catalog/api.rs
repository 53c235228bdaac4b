//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{Payload, SearchParams, Tab};

/// Raw catalog API trait.
///
/// Abstracts the per-tab endpoints for mock substitution in tests.
/// Records come back untyped and tagged with how they were fetched;
/// wrapping them into entries is left to `RouteController`.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Fetches `{tab}s` and returns the number of pages it lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails, or the
    /// body is not a JSON array.
    async fn pages(&self, tab: Tab) -> Result<usize>;

    /// Fetches one page of `{tab}s/{page}` with sort, order, genre and
    /// keyword filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails, or the
    /// body is not a JSON array.
    async fn search(&self, tab: Tab, params: &SearchParams) -> Result<Vec<Payload>>;

    /// Fetches a random record from `random/{tab}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn random(&self, tab: Tab) -> Result<Payload>;

    /// Fetches the full record `{tab}/{id}`, tagged as a detail fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn raw_details(&self, tab: Tab, id: &str) -> Result<Payload>;
}
