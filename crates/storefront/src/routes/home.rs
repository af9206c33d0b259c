//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::catalog::LoadState;
use crate::filters;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Number of products in the "New Arrivals" grid.
const NEW_ARRIVALS_COUNT: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// First products of the catalog.
    pub new_arrivals: Vec<ProductView>,
    /// The catalog has not finished its first load.
    pub loading: bool,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> HomeTemplate {
    match state.catalog().state() {
        LoadState::Loaded(snapshot) => HomeTemplate {
            new_arrivals: snapshot
                .products
                .iter()
                .take(NEW_ARRIVALS_COUNT)
                .map(ProductView::from)
                .collect(),
            loading: false,
        },
        LoadState::Idle | LoadState::Loading => HomeTemplate {
            new_arrivals: Vec::new(),
            loading: true,
        },
        // Logged when the load failed; the page just shows an empty grid.
        LoadState::Failed(_) => HomeTemplate {
            new_arrivals: Vec::new(),
            loading: false,
        },
    }
}
