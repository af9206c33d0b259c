//! Category page: filter form plus the filtered, sorted, paginated listing.
//!
//! Filters arrive as a plain GET query so result pages can be bookmarked.
//! Multi-select dimensions repeat their key (`?color=red&color=blue`), which
//! is why the query is parsed from the raw string instead of through
//! `axum::extract::Query`.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{RawQuery, State};
use casualwear_core::{FilterCriteria, Page, PriceRange, SortOrder};
use tracing::instrument;
use url::form_urlencoded;

use crate::catalog::{CatalogSnapshot, LoadState};
use crate::filters;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Parsed category page query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    pub q: String,
    pub min_price: String,
    pub max_price: String,
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub genders: Vec<String>,
    pub colors: Vec<String>,
    pub sort: SortOrder,
    pub page: usize,
}

impl Default for CategoryQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            min_price: String::new(),
            max_price: String::new(),
            categories: Vec::new(),
            brands: Vec::new(),
            genders: Vec::new(),
            colors: Vec::new(),
            sort: SortOrder::default(),
            page: 1,
        }
    }
}

impl CategoryQuery {
    /// Parse a raw query string. Unknown keys are ignored and malformed
    /// values fall back to their defaults.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::default();

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let value = value.trim().to_string();
            match key.as_ref() {
                "q" => query.q = value,
                "min_price" => query.min_price = value,
                "max_price" => query.max_price = value,
                "category" => query.categories.push(value),
                "brand" => query.brands.push(value),
                "gender" => query.genders.push(value),
                "color" => query.colors.push(value),
                "sort" => query.sort = SortOrder::parse(&value).unwrap_or_default(),
                "page" => query.page = value.parse().unwrap_or(1),
                _ => {}
            }
        }

        query
    }

    /// The filter criteria this query selects.
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new()
            .with_search(self.q.as_str())
            .with_price(PriceRange::from_inputs(
                Some(self.min_price.as_str()),
                Some(self.max_price.as_str()),
            ))
            .with_categories(self.categories.iter().map(String::as_str))
            .with_brands(self.brands.iter().map(String::as_str))
            .with_genders(self.genders.iter().map(String::as_str))
            .with_colors(self.colors.iter().map(String::as_str))
    }

    /// Link to `page` of this same listing.
    #[must_use]
    pub fn page_url(&self, page: usize) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());

        for (key, value) in [
            ("q", &self.q),
            ("min_price", &self.min_price),
            ("max_price", &self.max_price),
        ] {
            if !value.is_empty() {
                params.append_pair(key, value);
            }
        }
        for (key, values) in [
            ("category", &self.categories),
            ("brand", &self.brands),
            ("gender", &self.genders),
            ("color", &self.colors),
        ] {
            for value in values.iter().filter(|v| !v.is_empty()) {
                params.append_pair(key, value);
            }
        }
        if self.sort != SortOrder::Featured {
            params.append_pair("sort", self.sort.as_str());
        }
        if page > 1 {
            params.append_pair("page", &page.to_string());
        }

        let params = params.finish();
        if params.is_empty() {
            "/category".to_string()
        } else {
            format!("/category?{params}")
        }
    }
}

/// One selectable value in a filter group.
#[derive(Clone)]
pub struct FacetOption {
    pub value: String,
    pub checked: bool,
}

/// A filter dimension with its options.
#[derive(Clone)]
pub struct FacetGroup {
    /// Query key, e.g. `color`.
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<FacetOption>,
}

impl FacetGroup {
    fn new(name: &'static str, label: &'static str, values: &[String], selected: &[String]) -> Self {
        Self {
            name,
            label,
            options: values
                .iter()
                .map(|value| FacetOption {
                    value: value.clone(),
                    checked: selected.contains(value),
                })
                .collect(),
        }
    }
}

/// An entry of the sort dropdown.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub query: CategoryQuery,
    pub groups: Vec<FacetGroup>,
    pub sort_options: Vec<SortOption>,
    pub products: Vec<ProductView>,
    pub page_number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    /// The catalog has not finished its first load.
    pub loading: bool,
    /// The catalog failed to load and there is nothing to show.
    pub unavailable: bool,
}

impl CategoryTemplate {
    /// Filter, sort and paginate `snapshot` for `query`.
    #[must_use]
    pub fn listing(query: CategoryQuery, snapshot: &CatalogSnapshot, page_size: usize) -> Self {
        let mut visible = query.criteria().apply(&snapshot.products);
        query.sort.sort(&mut visible);
        let page = Page::paginate(visible, query.page, page_size);

        let facets = &snapshot.facets;
        let groups = vec![
            FacetGroup::new("category", "Category", &facets.categories, &query.categories),
            FacetGroup::new("brand", "Brand", &facets.brands, &query.brands),
            FacetGroup::new("gender", "Gender", &facets.genders, &query.genders),
            FacetGroup::new("color", "Color", &facets.colors, &query.colors),
        ];

        Self {
            groups,
            sort_options: sort_options(query.sort),
            products: page.items.iter().map(|p| ProductView::from(*p)).collect(),
            page_number: page.number,
            total_pages: page.total_pages,
            total_items: page.total_items,
            prev_url: page
                .has_previous()
                .then(|| query.page_url(page.number - 1)),
            next_url: page.has_next().then(|| query.page_url(page.number + 1)),
            loading: false,
            unavailable: false,
            query,
        }
    }

    /// The page shell without products, while loading or after a failure.
    #[must_use]
    pub fn without_products(query: CategoryQuery, loading: bool) -> Self {
        Self {
            groups: Vec::new(),
            sort_options: sort_options(query.sort),
            products: Vec::new(),
            page_number: 1,
            total_pages: 1,
            total_items: 0,
            prev_url: None,
            next_url: None,
            loading,
            unavailable: !loading,
            query,
        }
    }
}

fn sort_options(current: SortOrder) -> Vec<SortOption> {
    SortOrder::ALL
        .into_iter()
        .map(|order| SortOption {
            value: order.as_str(),
            label: order.label(),
            selected: order == current,
        })
        .collect()
}

/// Display the category page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, RawQuery(raw): RawQuery) -> CategoryTemplate {
    let query = CategoryQuery::parse(raw.as_deref().unwrap_or_default());

    match state.catalog().state() {
        LoadState::Loaded(snapshot) => {
            CategoryTemplate::listing(query, &snapshot, state.config().page_size)
        }
        LoadState::Idle | LoadState::Loading => CategoryTemplate::without_products(query, true),
        LoadState::Failed(error) => {
            tracing::warn!(%error, "Category page rendered without catalog");
            CategoryTemplate::without_products(query, false)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog::decode_products;

    fn snapshot() -> CatalogSnapshot {
        let products = decode_products(&json!([
            {"id": 1, "title": "Classic Tee", "price": 20, "image": "1.png", "rating": 4.1,
             "category": "T-shirts", "brand": "Acme", "gender": "Men", "colors": ["white", "black"]},
            {"id": 2, "title": "Slim Jeans", "price": 60, "image": "2.png", "rating": 4.8,
             "category": "Jeans", "brand": "Denimco", "gender": "Women", "colors": ["blue"]},
            {"id": 3, "title": "Graphic Tee", "price": 25, "image": "3.png", "rating": 3.9,
             "category": "T-shirts", "brand": "Acme", "gender": "Women", "colors": ["black"]},
            {"id": 4, "title": "Hoodie", "price": 45, "image": "4.png", "rating": 4.4,
             "category": "Hoodies", "brand": "Denimco", "gender": "Men", "colors": ["grey"]}
        ]))
        .unwrap();
        CatalogSnapshot::new(products)
    }

    fn ids(template: &CategoryTemplate) -> Vec<i32> {
        template.products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_parse_repeated_keys() {
        let query = CategoryQuery::parse(
            "q=tee&color=black&color=white&category=T-shirts&min_price=10&sort=price_desc&page=2",
        );

        assert_eq!(query.q, "tee");
        assert_eq!(query.colors, vec!["black", "white"]);
        assert_eq!(query.categories, vec!["T-shirts"]);
        assert_eq!(query.min_price, "10");
        assert_eq!(query.sort, SortOrder::PriceDesc);
        assert_eq!(query.page, 2);
    }

    #[test]
    fn test_parse_tolerates_garbage() {
        let query = CategoryQuery::parse("sort=cheapest&page=abc&unknown=1&min_price=cheap");
        assert_eq!(query.sort, SortOrder::Featured);
        assert_eq!(query.page, 1);
        assert!(query.criteria().price.is_unbounded());
    }

    #[test]
    fn test_empty_query_lists_everything_in_catalog_order() {
        let page = CategoryTemplate::listing(CategoryQuery::default(), &snapshot(), 9);
        assert_eq!(ids(&page), vec![1, 2, 3, 4]);
        assert_eq!(page.total_items, 4);
        assert!(page.prev_url.is_none());
        assert!(page.next_url.is_none());
    }

    #[test]
    fn test_and_across_or_within() {
        let query = CategoryQuery::parse("category=T-shirts&color=black&color=grey&gender=Women");
        let page = CategoryTemplate::listing(query, &snapshot(), 9);
        assert_eq!(ids(&page), vec![3]);
    }

    #[test]
    fn test_search_and_price_bounds() {
        let query = CategoryQuery::parse("q=TEE&max_price=20");
        let page = CategoryTemplate::listing(query, &snapshot(), 9);
        assert_eq!(ids(&page), vec![1]);
    }

    #[test]
    fn test_sort_and_paginate() {
        let query = CategoryQuery::parse("sort=price_asc&page=2");
        let page = CategoryTemplate::listing(query, &snapshot(), 3);

        assert_eq!(ids(&page), vec![2]);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.prev_url.as_deref(), Some("/category?sort=price_asc"));
        assert!(page.next_url.is_none());
    }

    #[test]
    fn test_facet_groups_mark_selection() {
        let query = CategoryQuery::parse("color=black");
        let page = CategoryTemplate::listing(query, &snapshot(), 9);

        let colors = &page.groups[3];
        assert_eq!(colors.name, "color");
        let values: Vec<_> = colors.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["black", "blue", "grey", "white"]);
        let checked: Vec<_> = colors.options.iter().filter(|o| o.checked).collect();
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].value, "black");
    }

    #[test]
    fn test_page_url_round_trips() {
        let query = CategoryQuery::parse("q=slim jeans&brand=Denimco&brand=Acme&sort=title");
        let url = query.page_url(3);
        assert_eq!(
            url,
            "/category?q=slim+jeans&brand=Denimco&brand=Acme&sort=title&page=3"
        );

        let reparsed = CategoryQuery::parse(url.trim_start_matches("/category?"));
        assert_eq!(reparsed.brands, query.brands);
        assert_eq!(reparsed.page, 3);
    }

    #[test]
    fn test_loading_shell() {
        let page = CategoryTemplate::without_products(CategoryQuery::default(), true);
        assert!(page.loading);
        assert!(!page.unavailable);
        assert!(page.products.is_empty());
    }
}
