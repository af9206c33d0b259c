//! Product catalog commands.
//!
//! # Usage
//!
//! ```bash
//! # First five products
//! cw-cli products list --limit 5
//!
//! # One product
//! cw-cli products show 3
//!
//! # Filter the full catalog
//! cw-cli products filter --category T-shirts --color black --color white --max-price 50
//!
//! # Distinct filter values
//! cw-cli products facets
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_API_URL` - Base URL of the remote product service
//! - `CATALOG_TIMEOUT_SECS` - HTTP timeout (default: 10)

use casualwear_core::{Facets, FilterCriteria, PriceRange, Product, ProductId, SortOrder};
use casualwear_storefront::catalog::{CatalogClient, CatalogError};
use casualwear_storefront::config::{CatalogConfig, ConfigError};
use clap::Args;
use thiserror::Error;

/// Errors that can occur during catalog commands.
#[derive(Debug, Error)]
pub enum ProductsError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The product service request failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Unknown `--sort` value.
    #[error("Invalid sort order: {0}. Valid orders: featured, price_asc, price_desc, rating_desc, title")]
    InvalidSort(String),
}

/// Filter options for `products filter`.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive title search
    #[arg(short, long)]
    pub q: Option<String>,

    /// Minimum price (inclusive)
    #[arg(long)]
    pub min_price: Option<String>,

    /// Maximum price (inclusive)
    #[arg(long)]
    pub max_price: Option<String>,

    /// Category to include (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Brand to include (repeatable)
    #[arg(long = "brand")]
    pub brands: Vec<String>,

    /// Gender to include (repeatable)
    #[arg(long = "gender")]
    pub genders: Vec<String>,

    /// Color to include (repeatable)
    #[arg(long = "color")]
    pub colors: Vec<String>,

    /// Sort order (`featured`, `price_asc`, `price_desc`, `rating_desc`, `title`)
    #[arg(long, default_value = "featured")]
    pub sort: String,
}

impl FilterArgs {
    /// The criteria selected by these options.
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new()
            .with_search(self.q.clone().unwrap_or_default())
            .with_price(PriceRange::from_inputs(
                self.min_price.as_deref(),
                self.max_price.as_deref(),
            ))
            .with_categories(self.categories.iter().map(String::as_str))
            .with_brands(self.brands.iter().map(String::as_str))
            .with_genders(self.genders.iter().map(String::as_str))
            .with_colors(self.colors.iter().map(String::as_str))
    }

    /// The requested sort order.
    ///
    /// # Errors
    ///
    /// Returns `ProductsError::InvalidSort` for unknown values.
    pub fn sort_order(&self) -> Result<SortOrder, ProductsError> {
        SortOrder::parse(&self.sort).ok_or_else(|| ProductsError::InvalidSort(self.sort.clone()))
    }
}

fn client() -> Result<CatalogClient, ProductsError> {
    let config = CatalogConfig::from_env()?;
    tracing::info!("Using catalog service at {}", config.api_url);
    Ok(CatalogClient::new(&config)?)
}

/// Print the product list.
///
/// # Errors
///
/// Returns an error if configuration is missing or the request fails.
pub async fn list(limit: Option<usize>) -> Result<(), ProductsError> {
    let products = client()?.list_products(limit).await?;

    for product in &products {
        tracing::info!("{}", summary_line(product));
    }
    tracing::info!("{} products", products.len());
    Ok(())
}

/// Print one product in detail.
///
/// # Errors
///
/// Returns an error if configuration is missing, the product does not exist,
/// or the request fails.
pub async fn show(id: ProductId) -> Result<(), ProductsError> {
    let product = client()?.get_product(id).await?;

    tracing::info!("{}", summary_line(&product));
    tracing::info!("  image:       {}", product.image);
    tracing::info!("  category:    {}", or_dash(&product.category));
    tracing::info!("  brand:       {}", or_dash(&product.brand));
    tracing::info!("  gender:      {}", or_dash(&product.gender));
    let colors: Vec<&str> = product.colors.iter().map(String::as_str).collect();
    tracing::info!("  colors:      {}", or_dash(&colors.join(", ")));
    if let Some(description) = &product.description {
        tracing::info!("  description: {description}");
    }
    Ok(())
}

/// Print the products matching `args`.
///
/// # Errors
///
/// Returns an error if the sort order is unknown, configuration is missing,
/// or the request fails.
pub async fn filter(args: &FilterArgs) -> Result<(), ProductsError> {
    let sort = args.sort_order()?;
    let criteria = args.criteria();
    let products = client()?.list_products(None).await?;

    let mut visible = criteria.apply(&products);
    sort.sort(&mut visible);

    for product in &visible {
        tracing::info!("{}", summary_line(product));
    }
    tracing::info!("{} of {} products match", visible.len(), products.len());
    Ok(())
}

/// Print the distinct filter values across the catalog.
///
/// # Errors
///
/// Returns an error if configuration is missing or the request fails.
pub async fn facets() -> Result<(), ProductsError> {
    let products = client()?.list_products(None).await?;
    let facets = Facets::from_products(&products);

    for (label, values) in facet_rows(&facets) {
        tracing::info!("{label:<10} {}", or_dash(&values.join(", ")));
    }
    Ok(())
}

fn facet_rows(facets: &Facets) -> [(&'static str, &[String]); 4] {
    [
        ("categories", facets.categories.as_slice()),
        ("brands", facets.brands.as_slice()),
        ("genders", facets.genders.as_slice()),
        ("colors", facets.colors.as_slice()),
    ]
}

/// One-line summary: id, title, price and rating.
fn summary_line(product: &Product) -> String {
    format!(
        "#{:<4} {:<40} {:>10}  {:.1}/5",
        product.id.to_string(),
        product.title,
        product.price.to_string(),
        product.rating
    )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use casualwear_core::Price;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_criteria_from_args() {
        let args = FilterArgs {
            q: Some("tee".to_string()),
            min_price: Some("10".to_string()),
            max_price: Some("not a number".to_string()),
            colors: vec!["black".to_string(), " ".to_string()],
            ..FilterArgs::default()
        };

        let criteria = args.criteria();
        assert_eq!(criteria.search, "tee");
        assert_eq!(criteria.price.min, Some(Decimal::new(10, 0)));
        assert!(criteria.price.max.is_none());
        assert_eq!(criteria.colors.len(), 1);
        assert!(criteria.categories.is_empty());
    }

    #[test]
    fn test_sort_order() {
        let mut args = FilterArgs {
            sort: "price_desc".to_string(),
            ..FilterArgs::default()
        };
        assert_eq!(args.sort_order().unwrap(), SortOrder::PriceDesc);

        args.sort = "cheapest".to_string();
        assert!(matches!(
            args.sort_order(),
            Err(ProductsError::InvalidSort(ref s)) if s == "cheapest"
        ));
    }

    #[test]
    fn test_summary_line() {
        let product = Product {
            id: ProductId::new(7),
            title: "Classic Tee".to_string(),
            price: Price::usd(Decimal::new(1999, 2)),
            image: "7.png".to_string(),
            rating: 4.25,
            description: None,
            category: String::new(),
            brand: String::new(),
            gender: String::new(),
            colors: std::collections::BTreeSet::new(),
        };

        let line = summary_line(&product);
        assert!(line.starts_with("#7 "));
        assert!(line.contains("Classic Tee"));
        assert!(line.contains("$19.99"));
        assert!(line.ends_with("4.2/5") || line.ends_with("4.3/5"));
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("Men"), "Men");
    }
}
