//! Server-to-client state handoff
//!
//! The server renders a page from prefetched data and embeds that data in
//! the document as `window.__INITIAL_DATA__`. On the client the product
//! store is built from it exactly once: the payload is taken out of its
//! [`HydrationSlot`] in the same step that reads it, so a second initializer
//! finds the slot empty and starts from the idle state.
//!
//! ```text
//! Uninitialized ─server─▶ ServerRendered
//! Uninitialized ─client finds payload─▶ HydrationPending ─take─▶ Hydrated ─dispatch─▶ Live
//! ```

use crate::error::HydrationError;
use crate::reducer::ProductReducer;
use crate::state::{LoadStatus, ProductState};
use crate::types::{CategoryTree, Product};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use storefront_runtime::{create_store, Store, Subscription};

/// Global the payload is assigned to in the document
pub const INITIAL_DATA_KEY: &str = "__INITIAL_DATA__";

/// Product store type
pub type ProductStore = Store<ProductReducer>;

/// Data prefetched on the server for one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialData {
    /// List page products
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    /// Category tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryTree>,
    /// Total matching products
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// Detail page product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    /// Products related to `product`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_products: Option<Vec<Product>>,
}

impl InitialData {
    /// Whether no field is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.products.is_none()
            && self.categories.is_none()
            && self.total_count.is_none()
            && self.product.is_none()
            && self.related_products.is_none()
    }

    /// `<script>` tag assigning this payload to `window.__INITIAL_DATA__`
    ///
    /// Every `<` inside the JSON is written as `\u003c`, so the payload can
    /// neither close the script element nor open a comment inside it.
    ///
    /// # Errors
    ///
    /// Returns [`HydrationError::Encode`] if serialization fails.
    pub fn to_script_tag(&self) -> Result<String, HydrationError> {
        let json = serde_json::to_string(self).map_err(HydrationError::Encode)?;
        Ok(format!(
            "<script>window.{INITIAL_DATA_KEY} = {};</script>",
            escape_json_for_script(&json)
        ))
    }

    /// Find and decode the payload embedded in `document`
    ///
    /// Returns `Ok(None)` when the document carries no payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the script is unterminated or its JSON is invalid.
    pub fn from_document(document: &str) -> Result<Option<Self>, HydrationError> {
        let marker = format!("window.{INITIAL_DATA_KEY} =");
        let Some(start) = document.find(&marker) else {
            return Ok(None);
        };

        let rest = &document[start + marker.len()..];
        let end = rest.find("</script>").ok_or(HydrationError::Unterminated)?;
        let json = rest[..end].trim().trim_end_matches(';').trim_end();

        serde_json::from_str(json)
            .map(Some)
            .map_err(HydrationError::Decode)
    }
}

/// Escape JSON for embedding inside `<script>`
fn escape_json_for_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}

/// Initial product state for a store built from `data`
///
/// Fields missing from the payload keep their idle defaults; the result is
/// never loading and its status is `done`.
#[must_use]
pub fn hydrated_state(data: InitialData) -> ProductState {
    ProductState {
        products: Arc::new(data.products.unwrap_or_default()),
        categories: Arc::new(data.categories.unwrap_or_default()),
        total_count: data.total_count.unwrap_or_default(),
        current_product: data.product.map(Arc::new),
        related_products: Arc::new(data.related_products.unwrap_or_default()),
        loading: false,
        status: LoadStatus::Done,
        ..ProductState::default()
    }
}

/// Create the product store, hydrated when initial data is given
#[must_use]
pub fn create_product_store(initial: Option<InitialData>) -> ProductStore {
    let state = match initial {
        Some(data) => {
            tracing::debug!(
                products = data.products.as_ref().map_or(0, Vec::len),
                has_current_product = data.product.is_some(),
                "Hydrating product store"
            );
            hydrated_state(data)
        }
        None => {
            tracing::debug!("No initial data, starting from idle state");
            ProductState::default()
        }
    };

    create_store(ProductReducer, state)
}

/// Hydration lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPhase {
    /// No payload has been written or found
    Uninitialized,
    /// The server wrote the payload into the document
    ServerRendered,
    /// The client found the payload and has not consumed it yet
    HydrationPending,
    /// A store was built from the payload
    Hydrated,
    /// The hydrated store has processed its first change
    Live,
}

struct SlotInner {
    data: Option<InitialData>,
    phase: HydrationPhase,
    live_watch: Option<Subscription>,
}

/// One-shot holder for the initial data
///
/// [`take`](Self::take) reads and clears the payload under one lock, so only
/// one initializer ever sees it.
pub struct HydrationSlot {
    inner: Mutex<SlotInner>,
}

impl HydrationSlot {
    fn with(data: Option<InitialData>, phase: HydrationPhase) -> Self {
        Self {
            inner: Mutex::new(SlotInner {
                data,
                phase,
                live_watch: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Slot without a payload
    #[must_use]
    pub fn empty() -> Self {
        Self::with(None, HydrationPhase::Uninitialized)
    }

    /// Slot holding data the server is about to embed
    #[must_use]
    pub fn server_rendered(data: InitialData) -> Self {
        Self::with(Some(data), HydrationPhase::ServerRendered)
    }

    /// Slot for a delivered document
    ///
    /// A document without a payload yields an empty slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the document carries a malformed payload.
    pub fn from_document(document: &str) -> Result<Self, HydrationError> {
        Ok(match InitialData::from_document(document)? {
            Some(data) => Self::with(Some(data), HydrationPhase::HydrationPending),
            None => Self::empty(),
        })
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> HydrationPhase {
        self.lock().phase
    }

    /// Whether a payload is still waiting to be consumed
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.lock().data.is_some()
    }

    /// Script tag for the held payload, empty when there is none
    ///
    /// # Errors
    ///
    /// Returns [`HydrationError::Encode`] if serialization fails.
    pub fn script_tag(&self) -> Result<String, HydrationError> {
        match &self.lock().data {
            Some(data) if !data.is_empty() => data.to_script_tag(),
            _ => Ok(String::new()),
        }
    }

    /// Remove and return the payload
    ///
    /// The first call after the payload was found returns it and moves the
    /// slot to [`HydrationPhase::Hydrated`]; later calls return `None`.
    pub fn take(&self) -> Option<InitialData> {
        let mut inner = self.lock();
        let data = inner.data.take();
        if data.is_some() {
            inner.phase = HydrationPhase::Hydrated;
        }
        data
    }
}

impl std::fmt::Debug for HydrationSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("HydrationSlot")
            .field("phase", &inner.phase)
            .field("filled", &inner.data.is_some())
            .finish_non_exhaustive()
    }
}

/// Create the product store from a slot, consuming its payload
///
/// When the slot held a payload, the slot moves to
/// [`HydrationPhase::Live`] after the store's first change.
#[must_use]
pub fn create_product_store_from_slot(slot: &Arc<HydrationSlot>) -> ProductStore {
    let initial = slot.take();
    let hydrated = initial.is_some();
    let store = create_product_store(initial);

    if hydrated {
        let watched: Weak<HydrationSlot> = Arc::downgrade(slot);
        let subscription = store.subscribe(move || {
            let Some(slot) = watched.upgrade() else {
                return;
            };
            let finished = {
                let mut inner = slot.lock();
                inner.phase = HydrationPhase::Live;
                inner.live_watch.take()
            };
            drop(finished);
        });
        slot.lock().live_watch = Some(subscription);
    }

    store
}
