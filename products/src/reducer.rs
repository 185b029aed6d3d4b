//! Product reducer
//!
//! Every action that changes something yields a fresh `Arc<ProductState>`;
//! collections the action does not touch are shared with the previous
//! state. Actions that would not change anything hand back the same `Arc`
//! so the store skips notification.

use crate::action::ProductAction;
use crate::state::{LoadStatus, ProductState};
use std::convert::Infallible;
use std::sync::Arc;
use storefront_core::reducer::Reducer;

/// Reducer for the product domain
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductReducer;

impl Reducer for ProductReducer {
    type State = ProductState;
    type Action = ProductAction;
    type Error = Infallible;

    fn reduce(
        &self,
        state: &Arc<ProductState>,
        action: ProductAction,
    ) -> Result<Arc<ProductState>, Infallible> {
        Ok(reduce(state, action))
    }
}

/// Clone the state shell, apply `update`, wrap the result
fn next(state: &Arc<ProductState>, update: impl FnOnce(&mut ProductState)) -> Arc<ProductState> {
    let mut next = ProductState::clone(state);
    update(&mut next);
    Arc::new(next)
}

/// Flags every successful primary load ends with
fn finish(state: &mut ProductState) {
    state.loading = false;
    state.error = None;
    state.status = LoadStatus::Done;
}

fn reduce(state: &Arc<ProductState>, action: ProductAction) -> Arc<ProductState> {
    match action {
        ProductAction::SetStatus(status) if status == state.status => Arc::clone(state),
        ProductAction::SetStatus(status) => next(state, |s| s.status = status),

        ProductAction::SetLoading(loading) if loading == state.loading => Arc::clone(state),
        ProductAction::SetLoading(loading) => next(state, |s| s.loading = loading),

        ProductAction::SetCategories(categories) => next(state, |s| {
            s.categories = Arc::new(categories);
            finish(s);
        }),

        ProductAction::SetProducts(page) => next(state, |s| {
            s.products = Arc::new(page.products);
            s.total_count = page.total_count;
            finish(s);
        }),

        ProductAction::AddProducts(page) => next(state, |s| {
            let mut products = Vec::with_capacity(s.products.len() + page.products.len());
            products.extend_from_slice(&s.products);
            products.extend(page.products);
            s.products = Arc::new(products);
            s.total_count = page.total_count;
            finish(s);
        }),

        ProductAction::SetError(message) => next(state, |s| {
            s.error = Some(message);
            s.loading = false;
            s.status = LoadStatus::Done;
        }),

        ProductAction::SetCurrentProduct(product) => next(state, |s| {
            s.current_product = Some(Arc::new(product));
            finish(s);
        }),

        ProductAction::SetRelatedProducts(related) => next(state, |s| {
            s.related_products = Arc::new(related);
            s.status = LoadStatus::Done;
        }),

        ProductAction::Setup(patch) => next(state, |s| patch.apply_to(s)),

        ProductAction::Unknown => Arc::clone(state),
    }
}
