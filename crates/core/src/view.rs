//! Derived listing view: filter, sort and paginate a catalog.
//!
//! The view is a pure function of `(catalog, category, sort key, page)` and
//! is recomputed on every render; nothing here is persisted.

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::types::Product;

/// Products shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Category selection for the listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// The query value that selects every category.
    pub const ALL: &'static str = "all";

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => product.category == *category,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Only(category) => category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == Self::ALL {
            Self::All
        } else {
            Self::Only(value.to_owned())
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        if value == Self::ALL {
            Self::All
        } else {
            Self::Only(value)
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => CategoryFilter::ALL.to_owned(),
            CategoryFilter::Only(category) => category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing sort order.
///
/// Unknown keys parse to [`SortKey::Unsorted`], which keeps catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum SortKey {
    /// Ascending by price.
    #[default]
    Price,
    /// Descending by rating.
    Popularity,
    /// Ascending by title.
    Name,
    /// Catalog order.
    Unsorted,
}

impl SortKey {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "price" => Self::Price,
            "popularity" => Self::Popularity,
            "name" => Self::Name,
            _ => Self::Unsorted,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Popularity => "popularity",
            Self::Name => "name",
            Self::Unsorted => "unsorted",
        }
    }

    /// Total ordering of two products under this key.
    #[must_use]
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Price => a.price.cmp(&b.price),
            Self::Popularity => b.rating.rate.total_cmp(&a.rating.rate),
            Self::Name => compare_titles(&a.title, &b.title),
            Self::Unsorted => Ordering::Equal,
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SortKey> for &'static str {
    fn from(key: SortKey) -> Self {
        key.as_str()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dictionary order for titles.
///
/// Compares base letters first (accents and case ignored), then accents,
/// then case, so "eclair" < "Éclair" < "zebra".
fn compare_titles(a: &str, b: &str) -> Ordering {
    let base = |s: &str| {
        s.nfd()
            .filter(|&c| !is_combining_mark(c))
            .flat_map(char::to_lowercase)
            .collect::<Vec<_>>()
    };
    let folded = |s: &str| s.nfd().flat_map(char::to_lowercase).collect::<Vec<_>>();

    base(a)
        .cmp(&base(b))
        .then_with(|| folded(a).cmp(&folded(b)))
        .then_with(|| a.cmp(b))
}

/// The selection a listing is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub category: CategoryFilter,
    pub sort: SortKey,
    /// 1-based page number.
    pub page: u32,
    pub page_size: usize,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            sort: SortKey::Price,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A numbered pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub number: u32,
    pub current: bool,
}

/// One page of the derived view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<Product>,
    pub page: u32,
    pub total_pages: u32,
    pub filtered_count: usize,
}

impl CatalogPage {
    /// Whether the "previous" control is enabled.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether the "next" control is enabled.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Returns `true` if the requested page lies outside `1..=total_pages`.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        self.page == 0 || self.page > self.total_pages
    }

    /// Links for every page, with the current one flagged.
    #[must_use]
    pub fn links(&self) -> Vec<PageLink> {
        (1..=self.total_pages)
            .map(|number| PageLink {
                number,
                current: number == self.page,
            })
            .collect()
    }
}

/// Number of pages needed for `count` items, never less than one.
#[must_use]
pub fn total_pages(count: usize, page_size: usize) -> u32 {
    let pages = count.div_ceil(page_size.max(1)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Filter, sort and slice `products` for `query`.
///
/// Sorting is stable. A page outside `1..=total_pages` yields no items; the
/// page number is reported back unchanged.
#[must_use]
pub fn view(products: &[Product], query: &ViewQuery) -> CatalogPage {
    let page_size = query.page_size.max(1);

    let mut filtered: Vec<&Product> = products
        .iter()
        .filter(|product| query.category.matches(product))
        .collect();
    filtered.sort_by(|a, b| query.sort.compare(a, b));

    let filtered_count = filtered.len();
    let total_pages = total_pages(filtered_count, page_size);

    let items = usize::try_from(query.page)
        .ok()
        .and_then(|page| page.checked_sub(1))
        .and_then(|index| index.checked_mul(page_size))
        .map(|start| {
            filtered
                .iter()
                .skip(start)
                .take(page_size)
                .map(|product| (*product).clone())
                .collect()
        })
        .unwrap_or_default();

    CatalogPage {
        items,
        page: query.page,
        total_pages,
        filtered_count,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Price, ProductId, Rating};

    fn product(id: i32, cents: i64, rate: f64, title: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::from_cents(cents),
            description: String::new(),
            category: category.to_string(),
            image: String::new(),
            rating: Rating { rate, count: 1 },
            quantity: 0,
        }
    }

    fn query(category: &str, sort: &str, page: u32) -> ViewQuery {
        ViewQuery {
            category: CategoryFilter::from(category),
            sort: SortKey::parse(sort),
            page,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product(1, 2500, 3.9, "backpack", "bags"),
            product(2, 999, 4.7, "Anorak", "clothing"),
            product(3, 15000, 2.1, "camera", "electronics"),
            product(4, 999, 4.7, "belt", "clothing"),
        ]
    }

    fn ids(page: &CatalogPage) -> Vec<i32> {
        page.items.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_sort_by_price_ascending_is_stable() {
        let page = view(&sample(), &query("all", "price", 1));
        assert_eq!(ids(&page), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_sort_by_popularity_descending() {
        let page = view(&sample(), &query("all", "popularity", 1));
        assert_eq!(ids(&page), vec![2, 4, 1, 3]);
        let rates: Vec<f64> = page.items.iter().map(|p| p.rating.rate).collect();
        assert!(rates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let page = view(&sample(), &query("all", "name", 1));
        assert_eq!(ids(&page), vec![2, 1, 4, 3]);
    }

    #[test]
    fn test_name_order_folds_accents() {
        let mut titles = vec!["zebra", "Éclair", "apple", "eclair", "Zèbre"];
        titles.sort_by(|a, b| compare_titles(a, b));
        assert_eq!(titles, vec!["apple", "eclair", "Éclair", "zebra", "Zèbre"]);
    }

    #[test]
    fn test_unknown_sort_keeps_catalog_order() {
        let page = view(&sample(), &query("all", "rating-desc", 1));
        assert_eq!(ids(&page), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_by_category_then_sort() {
        let products = vec![
            product(1, 1000, 1.0, "a", "a"),
            product(2, 500, 1.0, "b", "b"),
        ];
        let page = view(&products, &query("b", "price", 1));
        assert_eq!(ids(&page), vec![2]);
    }

    #[test]
    fn test_pagination_of_25_items() {
        let products: Vec<Product> = (1..=25)
            .map(|id| product(id, i64::from(id) * 100, 1.0, "item", "misc"))
            .collect();

        let first = view(&products, &query("all", "price", 1));
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items.len(), 10);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = view(&products, &query("all", "price", 3));
        assert_eq!(last.items.len(), 5);
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert_eq!(last.links().len(), 3);
        assert!(last.links()[2].current);
    }

    #[test]
    fn test_empty_catalog_has_one_page() {
        let page = view(&[], &ViewQuery::default());
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.is_out_of_range());
    }

    #[test]
    fn test_out_of_range_page_is_empty_not_clamped() {
        let page = view(&sample(), &query("electronics", "price", 3));
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 3);
        assert!(page.items.is_empty());
        assert!(page.is_out_of_range());

        let zero = view(&sample(), &query("all", "price", 0));
        assert!(zero.items.is_empty());
        assert!(zero.is_out_of_range());
    }

    #[test]
    fn test_zero_page_size_treated_as_one() {
        let page = view(
            &sample(),
            &ViewQuery {
                page_size: 0,
                ..ViewQuery::default()
            },
        );
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn test_query_values_round_trip_through_strings() {
        assert_eq!(CategoryFilter::from("all"), CategoryFilter::All);
        assert_eq!(String::from(CategoryFilter::from("jewelery")), "jewelery");
        assert_eq!(SortKey::parse("popularity"), SortKey::Popularity);
        let json = serde_json::to_string(&SortKey::Name).unwrap();
        assert_eq!(json, "\"name\"");
    }
}
