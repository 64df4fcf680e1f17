//! The per-page storefront context.
//!
//! A page constructs one [`Storefront`] on load. It owns every component,
//! all bound to the same persistence adapter, so no state lives in globals.
//! Cloning is cheap and shares the components.

use std::sync::Arc;

use askama::Template;
use neon_core::{CartSummary, Language, Order};
use url::Url;

use crate::address::AddressBook;
use crate::cart::CartStore;
use crate::catalog::{Catalog, CatalogLoader, refresh_requested};
use crate::checkout::{CheckoutForm, CheckoutService};
use crate::checkout::notify::{EmailJsClient, OrderNotifier};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};
use crate::preferences::Preferences;
use crate::render::{CartItemsTemplate, CartSummaryTemplate, CartSummaryView, CartView, LandingTemplate, ProductGridTemplate};
use crate::sheets::{SheetSource, SheetsClient};
use crate::storage::{FileStore, KeyValueStore};

/// The production wiring: files on disk, live sheets, EmailJS.
pub type LiveStorefront = Storefront<FileStore, SheetsClient, EmailJsClient>;

/// Every storefront component, bound to one store.
pub struct Storefront<S, Src, N> {
    inner: Arc<StorefrontInner<S, Src, N>>,
}

impl<S, Src, N> Clone for Storefront<S, Src, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct StorefrontInner<S, Src, N> {
    store: Arc<S>,
    catalog: CatalogLoader<S, Src>,
    cart: CartStore<S>,
    addresses: Option<AddressBook<S, Src>>,
    preferences: Preferences<S>,
    checkout: CheckoutService<S, N>,
}

impl LiveStorefront {
    /// Open the file store under the configured data directory and build
    /// the HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or an HTTP client cannot be set up.
    pub fn connect(config: &StorefrontConfig) -> Result<Self> {
        let store = Arc::new(FileStore::open(&config.data_dir)?);
        let source = SheetsClient::new(config.sheets_base_url.clone())?;
        let notifier = config.emailjs.clone().map(EmailJsClient::new).transpose()?;
        if notifier.is_none() {
            tracing::info!("EmailJS not configured, order notifications disabled");
        }
        Ok(Self::new(config, store, source, notifier))
    }
}

impl<S, Src, N> Storefront<S, Src, N>
where
    S: KeyValueStore,
    Src: SheetSource + Clone,
    N: OrderNotifier,
{
    #[must_use]
    pub fn new(config: &StorefrontConfig, store: Arc<S>, source: Src, notifier: Option<N>) -> Self {
        let cart = CartStore::new(Arc::clone(&store), config.delivery_fee_policy);
        let addresses = config.address_sheet_id.as_ref().map(|sheet_id| {
            AddressBook::new(
                Arc::clone(&store),
                source.clone(),
                sheet_id.clone(),
                config.address_ttl,
            )
        });

        Self {
            inner: Arc::new(StorefrontInner {
                catalog: CatalogLoader::new(
                    Arc::clone(&store),
                    source,
                    config.products_sheet_id.clone(),
                    config.catalog_ttl,
                ),
                checkout: CheckoutService::new(Arc::clone(&store), cart.clone(), notifier),
                preferences: Preferences::new(Arc::clone(&store)),
                addresses,
                cart,
                store,
            }),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogLoader<S, Src> {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore<S> {
        &self.inner.cart
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences<S> {
        &self.inner.preferences
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService<S, N> {
        &self.inner.checkout
    }

    /// Load the catalog for a page, honouring its `?refresh=true` signal.
    pub async fn open_page(&self, page: &Url) -> Catalog {
        self.inner.catalog.load(refresh_requested(page)).await
    }

    /// Addresses for autocomplete; empty when no address sheet is configured.
    pub async fn addresses(&self) -> Vec<String> {
        match &self.inner.addresses {
            Some(book) => book.load().await,
            None => Vec::new(),
        }
    }

    /// The display language, falling back to the default on storage errors.
    fn language(&self) -> Language {
        self.inner.preferences.language().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read language preference");
            Language::default()
        })
    }

    /// Render the landing-page sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_landing(&self, catalog: &Catalog) -> Result<String> {
        Ok(LandingTemplate::new(catalog, self.language()).render()?)
    }

    /// Render the full product grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_products(&self, catalog: &Catalog) -> Result<String> {
        Ok(ProductGridTemplate::new(catalog, self.language()).render()?)
    }

    /// Run one cart action from the page and re-render the cart.
    ///
    /// Failures are reported (internal faults reach Sentry) and come back as
    /// the alert text to show the shopper.
    ///
    /// # Errors
    ///
    /// Returns the alert text if the action or the re-render fails.
    pub fn cart_action(
        &self,
        action: impl FnOnce(&CartStore<S>) -> Result<CartSummary>,
    ) -> std::result::Result<RenderedCart, String> {
        action(&self.inner.cart)
            .and_then(|_| self.render_cart())
            .map_err(AppError::into_alert)
    }

    /// Submit the checkout form.
    ///
    /// # Errors
    ///
    /// Returns the alert text if validation or storage fails.
    pub async fn place_order(&self, form: &CheckoutForm) -> std::result::Result<Order, String> {
        self.inner
            .checkout
            .submit(form)
            .await
            .map_err(|e| AppError::from(e).into_alert())
    }

    /// Render the cart item list and the totals panel from persisted state.
    /// Also persists the checkout total.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or a template fails to render.
    pub fn render_cart(&self) -> Result<RenderedCart> {
        let lines = self.inner.cart.lines()?;
        let summary = self.inner.cart.compute_summary()?;
        let items = CartItemsTemplate::new(CartView::new(&lines, &summary), self.language()).render()?;
        let totals = CartSummaryTemplate {
            summary: CartSummaryView::from(&summary),
        }
        .render()?;
        Ok(RenderedCart {
            items,
            totals,
            summary,
        })
    }
}

/// Output of [`Storefront::render_cart`].
#[derive(Debug, Clone)]
pub struct RenderedCart {
    pub items: String,
    pub totals: String,
    pub summary: CartSummary,
}
