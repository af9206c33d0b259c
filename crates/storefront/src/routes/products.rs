//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use casualwear_core::{Product, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Number of products in the "You may also like" strip.
const ALSO_LIKE_COUNT: usize = 4;

/// Shown when the service has no description for a product.
const FALLBACK_DESCRIPTION: &str =
    "This is a high-quality product suitable for your casual style.";

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub title: String,
    pub price: String,
    pub image: String,
    pub rating: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub gender: String,
    pub colors: Vec<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            title: product.title.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
            rating: format_rating(product.rating),
            description: product
                .description
                .clone()
                .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
            category: product.category.clone(),
            brand: product.brand.clone(),
            gender: product.gender.clone(),
            colors: product.colors.iter().cloned().collect(),
        }
    }
}

/// Format a rating as `4.5/5`, dropping a trailing `.0`.
fn format_rating(rating: f64) -> String {
    let rounded = format!("{rating:.1}");
    let trimmed = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{trimmed}/5")
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub also_like: Vec<ProductView>,
}

/// Display product detail page.
///
/// Unknown and malformed ids both render the 404 page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let id: ProductId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("product {id}")))?;

    let product = state.client().get_product(id).await?;
    let also_like = also_like(&state, id).await;

    Ok(ProductShowTemplate {
        product: ProductView::from(&product),
        also_like,
    })
}

/// Other products to suggest next to `id`.
///
/// Taken from the loaded catalog; before the catalog is ready, a small list
/// is fetched directly. Failures leave the strip empty.
async fn also_like(state: &AppState, id: ProductId) -> Vec<ProductView> {
    let pick = |products: &[Product]| -> Vec<ProductView> {
        products
            .iter()
            .filter(|p| p.id != id)
            .take(ALSO_LIKE_COUNT)
            .map(ProductView::from)
            .collect()
    };

    if let Some(snapshot) = state.catalog().snapshot() {
        return pick(&snapshot.products);
    }

    state
        .client()
        .list_products(Some(ALSO_LIKE_COUNT + 1))
        .await
        .map_or_else(
            |e| {
                tracing::warn!(error = %e, "Failed to fetch also-like products");
                Vec::new()
            },
            |products| pick(&products),
        )
}
