//! Catalog route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use aurora_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::types::Product;
use crate::catalog::{
    CatalogKind, CatalogPrefs, CatalogQuery, CatalogView, Paginator, PriceRange, ProductFilter,
    SortKey,
};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Flat query-string form of a grid request.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowseParams {
    /// Which collection; defaults to lenses.
    pub tipo: Option<CatalogKind>,
    /// 1-based backend page.
    pub server_page: Option<u32>,
    /// 1-based client-side page over the filtered grid.
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub busqueda: Option<String>,
    pub categoria: Option<String>,
    pub marca: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub tipo_lente: Option<String>,
    pub precio_min: Option<f64>,
    pub precio_max: Option<f64>,
    pub solo_promocion: Option<bool>,
    pub orden: Option<SortKey>,
}

impl BrowseParams {
    fn price_range(&self) -> Result<Option<PriceRange>> {
        match (self.precio_min, self.precio_max) {
            (None, None) => Ok(None),
            (min, max) => {
                let min = decimal_price(min.unwrap_or(0.0))?;
                let max = match max {
                    Some(v) => decimal_price(v)?,
                    None => Price::new(Decimal::MAX),
                };
                Ok(Some(PriceRange { min, max }))
            }
        }
    }

    fn into_query(self) -> Result<(CatalogKind, CatalogQuery)> {
        let precio = self.price_range()?;
        let kind = self.tipo.unwrap_or(CatalogKind::Lentes);
        let query = CatalogQuery {
            server_page: self.server_page,
            filter: ProductFilter {
                busqueda: self.busqueda.unwrap_or_default(),
                categoria: self.categoria.unwrap_or_default(),
                marca: self.marca.unwrap_or_default(),
                material: self.material.unwrap_or_default(),
                color: self.color.unwrap_or_default(),
                tipo_lente: self.tipo_lente.unwrap_or_default(),
                precio,
                solo_promocion: self.solo_promocion.unwrap_or(false),
            },
            sort: self.orden.unwrap_or_default(),
            paginator: Paginator::new(
                self.page.unwrap_or(1),
                self.per_page
                    .unwrap_or(crate::catalog::page::DEFAULT_PER_PAGE),
            ),
        };
        Ok((kind, query))
    }
}

fn decimal_price(value: f64) -> Result<Price> {
    Decimal::try_from(value)
        .map(Price::new)
        .map_err(|_| AppError::BadRequest(format!("Invalid price bound: {value}")))
}

/// `GET /products` - run the filter/sort/paginate pipeline.
pub async fn browse(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<CatalogView>> {
    if let Some(term) = &params.busqueda {
        state.catalog_prefs().record_search(term);
    }

    let (kind, query) = params.into_query()?;
    let view = state.catalog().browse(kind, &query).await?;
    Ok(Json(view))
}

/// `GET /products/{tipo}/{id}` - product detail.
pub async fn show(
    State(state): State<AppState>,
    Path((tipo, id)): Path<(String, String)>,
) -> Result<Json<Product>> {
    let kind = parse_kind(&tipo)?;
    let product = state
        .catalog()
        .get_product(kind, &ProductId::new(id))
        .await?;
    Ok(Json(product))
}

/// `GET /products/prefs` - persisted catalog UI state.
pub async fn get_prefs(State(state): State<AppState>) -> Json<CatalogPrefs> {
    Json(state.catalog_prefs().load())
}

/// `PUT /products/prefs` - save catalog UI state.
pub async fn put_prefs(
    State(state): State<AppState>,
    Json(prefs): Json<CatalogPrefs>,
) -> Json<CatalogPrefs> {
    state.catalog_prefs().save(&prefs);
    Json(prefs)
}

/// `GET /products/search-history` - recent searches, newest first.
pub async fn search_history(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog_prefs().search_history())
}

/// `DELETE /products/search-history` - clear recent searches.
pub async fn clear_search_history(State(state): State<AppState>) -> Json<Vec<String>> {
    state.catalog_prefs().clear_search_history();
    Json(Vec::new())
}

fn parse_kind(tipo: &str) -> Result<CatalogKind> {
    match tipo {
        "lentes" => Ok(CatalogKind::Lentes),
        "accesorios" => Ok(CatalogKind::Accesorios),
        other => Err(AppError::BadRequest(format!(
            "Unknown product collection: {other}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_to_lenses_page_one() {
        let (kind, query) = BrowseParams::default().into_query().unwrap();
        assert_eq!(kind, CatalogKind::Lentes);
        assert_eq!(query.paginator.page, 1);
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_price_bounds_become_a_range() {
        let params = BrowseParams {
            precio_min: Some(0.0),
            precio_max: Some(100.0),
            ..Default::default()
        };
        let (_, query) = params.into_query().unwrap();
        let range = query.filter.precio.unwrap();
        assert_eq!(range.min, Price::ZERO);
        assert_eq!(range.max, Price::from_cents(10000));
    }

    #[test]
    fn test_min_only_is_open_ended() {
        let params = BrowseParams {
            precio_min: Some(50.0),
            ..Default::default()
        };
        let (_, query) = params.into_query().unwrap();
        let range = query.filter.precio.unwrap();
        assert!(range.contains(Price::from_cents(1_000_000_00)));
        assert!(!range.contains(Price::from_cents(100)));
    }

    #[test]
    fn test_parse_kind_rejects_unknown() {
        assert!(parse_kind("lentes").is_ok());
        assert!(parse_kind("accesorios").is_ok());
        assert!(parse_kind("relojes").is_err());
    }
}
