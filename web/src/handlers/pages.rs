//! Server-rendered pages.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::Html,
};
use storefront_products::ProductApi;

/// Render the storefront page for any path not claimed by another route.
///
/// `/` renders the product list, `/product/{id}/` a product, anything else
/// the not-found page with status 404. The base path is stripped before
/// routing.
///
/// # Errors
///
/// Returns 405 for methods other than `GET`/`HEAD` and 500 if the page data
/// cannot be fetched.
#[tracing::instrument(skip(state), fields(path = %uri.path()))]
pub async fn render_page<A: ProductApi>(
    State(state): State<AppState<A>>,
    method: Method,
    uri: Uri,
) -> Result<(StatusCode, Html<String>), AppError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(AppError::method_not_allowed(method));
    }

    let url = uri.path_and_query().map_or("/", |target| target.as_str());
    let page = state.renderer().render(url).await?;

    let status = if page.not_found {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };

    Ok((status, Html(page.inject(state.template()))))
}
