//! Application state shared across handlers.

use std::sync::Arc;

use url::Url;

use crate::api::ApiClient;
use crate::audit::{AuditFeed, AuditService};
use crate::catalog::{CatalogPrefsStore, CatalogService};
use crate::config::StorefrontConfig;
use crate::prefs::PreferenceStore;
use crate::services::{
    AppointmentService, AuthService, CartService, CheckoutService, QuoteService,
};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; every service shares the one API client and
/// its resolved base URL.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    auth: AuthService,
    cart: CartService,
    catalog: CatalogService,
    checkout: CheckoutService,
    quotes: QuoteService,
    appointments: AppointmentService,
    audit: AuditService,
    audit_feed: AuditFeed,
    catalog_prefs: CatalogPrefsStore,
}

impl AppState {
    /// Build the state around an already-resolved API base URL.
    #[must_use]
    pub fn new(config: StorefrontConfig, api_base: Url) -> Self {
        let api = ApiClient::new(api_base);
        let prefs = Arc::new(PreferenceStore::open(&config.prefs_path));

        let auth = AuthService::new(api.clone(), Arc::clone(&prefs));
        auth.restore();

        Self {
            inner: Arc::new(AppStateInner {
                auth,
                cart: CartService::new(api.clone()),
                catalog: CatalogService::new(api.clone()),
                checkout: CheckoutService::new(api.clone()),
                quotes: QuoteService::new(api.clone()),
                appointments: AppointmentService::new(api.clone()),
                audit: AuditService::new(api.clone()),
                audit_feed: AuditFeed::new(),
                catalog_prefs: CatalogPrefsStore::new(prefs),
                api,
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    #[must_use]
    pub fn quotes(&self) -> &QuoteService {
        &self.inner.quotes
    }

    #[must_use]
    pub fn appointments(&self) -> &AppointmentService {
        &self.inner.appointments
    }

    #[must_use]
    pub fn audit(&self) -> &AuditService {
        &self.inner.audit
    }

    #[must_use]
    pub fn audit_feed(&self) -> &AuditFeed {
        &self.inner.audit_feed
    }

    #[must_use]
    pub fn catalog_prefs(&self) -> &CatalogPrefsStore {
        &self.inner.catalog_prefs
    }
}
