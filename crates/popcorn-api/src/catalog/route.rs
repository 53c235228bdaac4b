//! `RouteController` - typed access to one catalog tab.

use std::fmt;
use std::sync::{Arc, Weak};

use anyhow::Result;
use tracing::instrument;

use super::api::LocalCatalogApi;
use super::client::CatalogClient;
use super::entry::CatalogEntry;
use super::types::{Identifier, Payload, SearchParams, Tab};

/// Wraps a tagged payload into a domain entry.
pub type Factory<T> = fn(RouteRef<T>, Payload) -> T;

/// Shared state behind a controller and its back-references.
struct RouteInner<T> {
    client: Arc<CatalogClient>,
    tab: Tab,
    factory: Factory<T>,
}

/// Routes requests for one tab and wraps the records it gets back.
///
/// Cloning is cheap and yields a handle to the same route. Entries created
/// by a controller hold only a [`RouteRef`] to it, so they never keep it
/// alive.
pub struct RouteController<T> {
    inner: Arc<RouteInner<T>>,
}

/// Non-owning back-reference from an entry to the controller that built it.
pub struct RouteRef<T> {
    inner: Weak<RouteInner<T>>,
}

impl<T> RouteController<T> {
    /// Creates a controller for `tab` that wraps records with `factory`.
    #[must_use]
    pub fn new(client: Arc<CatalogClient>, tab: Tab, factory: Factory<T>) -> Self {
        Self {
            inner: Arc::new(RouteInner {
                client,
                tab,
                factory,
            }),
        }
    }

    /// Returns the tab this controller routes to.
    #[must_use]
    pub fn tab(&self) -> Tab {
        self.inner.tab
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &CatalogClient {
        &self.inner.client
    }

    /// Returns a non-owning reference to this controller.
    #[must_use]
    pub fn downgrade(&self) -> RouteRef<T> {
        RouteRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn wrap(&self, payload: Payload) -> T {
        (self.inner.factory)(self.downgrade(), payload)
    }

    /// Returns the number of pages listed for this tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON array.
    #[instrument(skip_all, fields(tab = %self.inner.tab))]
    pub async fn pages(&self) -> Result<usize> {
        self.inner.client.pages(self.inner.tab).await
    }

    /// Searches one page of this tab, preserving response order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON array.
    /// No entry is built when an error is returned.
    #[instrument(skip_all, fields(tab = %self.inner.tab))]
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<T>> {
        let payloads = self.inner.client.search(self.inner.tab, params).await?;
        Ok(payloads.into_iter().map(|p| self.wrap(p)).collect())
    }

    /// Fetches a random entry of this tab.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or JSON parsing fails.
    #[instrument(skip_all, fields(tab = %self.inner.tab))]
    pub async fn random(&self) -> Result<T> {
        let payload = self.inner.client.random(self.inner.tab).await?;
        Ok(self.wrap(payload))
    }

    /// Fetches the full record for a raw id or for an entry's id.
    ///
    /// # Errors
    ///
    /// Returns an error if the referenced entry has no id, or the request or
    /// JSON parsing fails.
    #[instrument(skip_all, fields(tab = %self.inner.tab))]
    pub async fn get<'a>(&self, id: impl Into<Identifier<'a>>) -> Result<T> {
        let id = id.into().resolve()?;
        let payload = self.inner.client.raw_details(self.inner.tab, id).await?;
        Ok(self.wrap(payload))
    }
}

impl<T: CatalogEntry> RouteController<T> {
    /// Creates a controller for a built-in entry type.
    #[must_use]
    pub fn for_entry(client: Arc<CatalogClient>) -> Self {
        Self::new(client, T::TAB, T::from_payload)
    }
}

impl<T> Clone for RouteController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for RouteController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteController")
            .field("tab", &self.inner.tab)
            .field("base_url", &self.inner.client.base_url().as_str())
            .finish_non_exhaustive()
    }
}

impl<T> RouteRef<T> {
    /// Creates a reference that points at no controller.
    #[must_use]
    pub const fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// Returns the controller if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<RouteController<T>> {
        self.inner.upgrade().map(|inner| RouteController { inner })
    }
}

impl<T> Clone for RouteRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for RouteRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tab = self.inner.upgrade().map(|inner| inner.tab);
        f.debug_struct("RouteRef").field("tab", &tab).finish()
    }
}
