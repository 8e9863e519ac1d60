//! Catalog fetching and the filter/sort/paginate pipeline.
//!
//! Server pages are fetched unfiltered and cached briefly; filtering,
//! sorting, and client-side pagination run locally over the cached page.
//! The pipeline order is fixed: filter, then sort, then paginate.

use std::sync::Arc;
use std::time::Duration;

use aurora_core::ProductId;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::api::types::{Paginated, Pagination, Product};
use crate::api::{ApiClient, ApiError, endpoints};

use super::filter::ProductFilter;
use super::page::Paginator;
use super::sort::SortKey;

/// How long a fetched server page stays fresh.
const PAGE_CACHE_TTL: Duration = Duration::from_secs(300);
const PAGE_CACHE_CAPACITY: u64 = 100;

/// Which product collection to browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogKind {
    #[serde(rename = "lentes")]
    Lentes,
    #[serde(rename = "accesorios")]
    Accesorios,
}

impl CatalogKind {
    const fn endpoint(self) -> &'static str {
        match self {
            Self::Lentes => endpoints::LENTES,
            Self::Accesorios => endpoints::ACCESORIOS,
        }
    }
}

/// Query for one rendered grid page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    /// 1-based backend page.
    pub server_page: Option<u32>,
    pub filter: ProductFilter,
    pub sort: SortKey,
    pub paginator: Paginator,
}

/// One rendered grid page plus the counts the UI needs.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub items: Vec<Product>,
    /// Products surviving the filter on the current server page.
    pub filtered_total: usize,
    /// Client-side page actually rendered (clamped).
    pub page: u32,
    pub total_pages: u32,
    /// Backend pagination of the unfiltered catalog, when reported.
    pub server_pagination: Option<Pagination>,
}

/// Catalog reads with a short-lived page cache.
pub struct CatalogService {
    api: ApiClient,
    pages: Cache<(CatalogKind, u32), Arc<Paginated<Product>>>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            pages: Cache::builder()
                .max_capacity(PAGE_CACHE_CAPACITY)
                .time_to_live(PAGE_CACHE_TTL)
                .build(),
        }
    }

    /// Fetch one unfiltered server page, from cache when fresh.
    ///
    /// Only successful responses are cached; errors surface every time.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    #[instrument(skip(self), fields(kind = ?kind, page = server_page))]
    pub async fn fetch_page(
        &self,
        kind: CatalogKind,
        server_page: u32,
    ) -> Result<Arc<Paginated<Product>>, ApiError> {
        let key = (kind, server_page);
        if let Some(cached) = self.pages.get(&key).await {
            debug!("Server page cache hit");
            return Ok(cached);
        }

        let params = [("page", server_page.to_string())];
        let page: Paginated<Product> = self.api.get_paginated(kind.endpoint(), &params).await?;
        let page = Arc::new(page);
        self.pages.insert(key, Arc::clone(&page)).await;
        Ok(page)
    }

    /// Run the full pipeline for one grid render.
    ///
    /// Filtering applies to the current server page only; it never spans
    /// pages. The client-side page is clamped into the filtered result, so
    /// a filter that shrinks the grid still renders a valid page.
    ///
    /// # Errors
    ///
    /// Returns an error if the server page cannot be fetched.
    pub async fn browse(
        &self,
        kind: CatalogKind,
        query: &CatalogQuery,
    ) -> Result<CatalogView, ApiError> {
        let server_page = query.server_page.unwrap_or(1).max(1);
        let page = self.fetch_page(kind, server_page).await?;

        let mut filtered = query.filter.apply(&page.data);
        query.sort.sort(&mut filtered);

        let paginator = query.paginator.clamped(filtered.len());
        let items = paginator.slice(&filtered).to_vec();

        Ok(CatalogView {
            filtered_total: filtered.len(),
            page: paginator.page,
            total_pages: paginator.total_pages(filtered.len()),
            items,
            server_pagination: page.pagination,
        })
    }

    /// Fetch one product by id.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    pub async fn get_product(
        &self,
        kind: CatalogKind,
        id: &ProductId,
    ) -> Result<Product, ApiError> {
        let endpoint = format!("{}/{}", kind.endpoint(), id);
        self.api.get(&endpoint, &[]).await
    }

    /// Drop all cached pages (after admin-side catalog edits).
    pub fn invalidate(&self) {
        self.pages.invalidate_all();
    }
}
