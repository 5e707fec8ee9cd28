//! Product grid with filter, sort and pagination over the loaded catalog.

use parking_lot::RwLock;
use pshowcase_core::view::view;
use pshowcase_core::{Catalog, CatalogPage, CategoryFilter, SortKey, ViewQuery};
use serde::Serialize;
use tracing::warn;

use super::{Mounted, Widget, WidgetState, attach, refresh};
use crate::cart::{CartError, CartHandle, CartObserver, CartReader};
use crate::catalog::CatalogLoader;

/// Everything the listing page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub categories: Vec<String>,
    pub query: ViewQuery,
    #[serde(flatten)]
    pub page: CatalogPage,
}

/// Product grid with category filter, sort and pagination.
///
/// The selection is kept as set: changing the filter does not reset the
/// page, so a filter that shrinks the result can leave the page out of range.
pub struct ProductListing {
    cart: CartReader,
    query: RwLock<ViewQuery>,
    state: RwLock<WidgetState<Catalog>>,
}

impl ProductListing {
    /// Mount the listing and fetch the catalog once.
    ///
    /// A failed fetch leaves the widget in [`WidgetState::Failed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart service has stopped.
    pub async fn mount(
        query: ViewQuery,
        loader: &CatalogLoader,
        cart: &CartHandle,
    ) -> Result<Mounted<Self>, CartError> {
        let listing = attach(
            Self {
                cart: cart.reader(),
                query: RwLock::new(query),
                state: RwLock::new(WidgetState::Loading),
            },
            cart,
        )
        .await?;

        let fetched = loader.load_catalog().await;
        {
            let mut state = listing.state.write();
            if !state.is_unmounted() {
                *state = match fetched {
                    Ok(mut catalog) => {
                        // The cart may have changed while the fetch was in flight.
                        catalog.remerge(&listing.cart.load());
                        WidgetState::Ready(catalog)
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to load catalog");
                        WidgetState::Failed(e.to_string())
                    }
                };
            }
        }
        Ok(listing)
    }

    #[must_use]
    pub fn query(&self) -> ViewQuery {
        self.query.read().clone()
    }

    #[must_use]
    pub fn catalog(&self) -> Option<Catalog> {
        self.state.read().ready().cloned()
    }

    /// The derived view for the current selection.
    #[must_use]
    pub fn state(&self) -> WidgetState<ListingView> {
        match &*self.state.read() {
            WidgetState::Ready(catalog) => {
                let query = self.query();
                WidgetState::Ready(ListingView {
                    categories: catalog.categories().to_vec(),
                    page: view(catalog.products(), &query),
                    query,
                })
            }
            WidgetState::Unmounted => WidgetState::Unmounted,
            WidgetState::Loading => WidgetState::Loading,
            WidgetState::Failed(message) => WidgetState::Failed(message.clone()),
        }
    }

    #[must_use]
    pub fn view(&self) -> Option<ListingView> {
        match self.state() {
            WidgetState::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn set_category(&self, category: CategoryFilter) {
        self.query.write().category = category;
    }

    pub fn set_sort(&self, sort: SortKey) {
        self.query.write().sort = sort;
    }

    /// Jump to `page` if it is within `1..=total_pages`.
    ///
    /// Returns `true` if the page changed.
    pub fn go_to(&self, page: u32) -> bool {
        let total = self.total_pages();
        let mut query = self.query.write();
        if page == 0 || page > total || page == query.page {
            return false;
        }
        query.page = page;
        true
    }

    /// Advance one page unless already on the last.
    pub fn next(&self) -> bool {
        let page = self.query.read().page;
        page.checked_add(1).is_some_and(|next| self.go_to(next))
    }

    /// Go back one page unless already on the first.
    ///
    /// Unlike [`go_to`](Self::go_to) this does not check the upper bound, so
    /// a page left out of range by a filter change can still step back.
    pub fn previous(&self) -> bool {
        let mut query = self.query.write();
        if query.page <= 1 {
            return false;
        }
        query.page -= 1;
        true
    }

    fn total_pages(&self) -> u32 {
        self.view().map_or(1, |view| view.page.total_pages)
    }
}

impl CartObserver for ProductListing {
    fn cart_changed(&self) {
        let cart = self.cart.load();
        refresh(&self.state, |catalog| catalog.remerge(&cart));
    }
}

impl Widget for ProductListing {
    fn unmount(&self) {
        *self.state.write() = WidgetState::Unmounted;
    }
}
