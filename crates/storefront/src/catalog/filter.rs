//! Catalog filtering.
//!
//! One data-driven predicate covers every facet instead of a separate
//! function per field. Dropdown facets use `"todos"` as the no-selection
//! sentinel, matching the values the backend seeds its facet lists with.
//! Filters apply to the server page currently in hand, never across pages.

use aurora_core::Price;
use serde::{Deserialize, Serialize};

use crate::api::types::Product;

/// Sentinel meaning "no selection" for dropdown facets.
pub const ALL: &str = "todos";

/// Inclusive price window over the effective (discounted-else-base) price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

impl PriceRange {
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Current filter selections. `Default` means everything passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductFilter {
    /// Case-insensitive substring over name and description.
    pub busqueda: String,
    pub categoria: String,
    pub marca: String,
    pub material: String,
    pub color: String,
    pub tipo_lente: String,
    pub precio: Option<PriceRange>,
    pub solo_promocion: bool,
}

impl ProductFilter {
    /// Whether no facet is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a product passes every selected facet.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        // Dropdown facets: selected value against the product's field
        let facets: [(&str, &str); 4] = [
            (&self.material, &product.material),
            (&self.color, &product.color),
            (&self.tipo_lente, &product.tipo_lente),
            (&self.marca, product.marca_nombre()),
        ];
        for (selected, actual) in facets {
            if is_selected(selected) && !actual.eq_ignore_ascii_case(selected) {
                return false;
            }
        }
        if is_selected(&self.categoria)
            && !product
                .categoria_nombre()
                .eq_ignore_ascii_case(&self.categoria)
        {
            return false;
        }

        if !self.busqueda.trim().is_empty() {
            let needle = self.busqueda.trim().to_lowercase();
            let haystack = format!(
                "{} {} {} {} {}",
                product.nombre, product.descripcion, product.material, product.color,
                product.tipo_lente
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }

        if let Some(range) = &self.precio
            && !range.contains(product.effective_price())
        {
            return false;
        }

        if self.solo_promocion && !product.en_promocion {
            return false;
        }

        true
    }

    /// Filter one server page of products.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect()
    }
}

fn is_selected(value: &str) -> bool {
    !value.is_empty() && !value.eq_ignore_ascii_case(ALL)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(nombre: &str, cents: i64, material: &str, promo: bool) -> Product {
        serde_json::from_value(json!({
            "_id": format!("id-{nombre}"),
            "nombre": nombre,
            "descripcion": "descripción de prueba",
            "precioBase": f64::from(u32::try_from(cents).unwrap()) / 100.0,
            "material": material,
            "color": "negro",
            "tipoLente": "sol",
            "marcaId": {"_id": "m1", "nombre": "Ray-Ban"},
            "enPromocion": promo
        }))
        .unwrap()
    }

    #[test]
    fn test_default_filter_passes_everything() {
        let filter = ProductFilter::default();
        assert!(filter.matches(&product("Aviador", 9900, "metal", false)));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_todos_sentinel_is_no_selection() {
        let filter = ProductFilter {
            material: ALL.to_string(),
            marca: "todos".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&product("Aviador", 9900, "acetato", false)));
    }

    #[test]
    fn test_material_facet() {
        let filter = ProductFilter {
            material: "metal".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&product("Aviador", 9900, "Metal", false)));
        assert!(!filter.matches(&product("Wayfarer", 9900, "acetato", false)));
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let filter = ProductFilter {
            busqueda: "AVIADOR".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&product("Aviador Clásico", 9900, "metal", false)));
        assert!(!filter.matches(&product("Wayfarer", 9900, "metal", false)));

        let by_description = ProductFilter {
            busqueda: "prueba".to_string(),
            ..Default::default()
        };
        assert!(by_description.matches(&product("Wayfarer", 9900, "metal", false)));

        let by_material = ProductFilter {
            busqueda: "acetato".to_string(),
            ..Default::default()
        };
        assert!(by_material.matches(&product("Wayfarer", 9900, "acetato", false)));
    }

    #[test]
    fn test_price_range_is_inclusive_and_excludes_outside() {
        let filter = ProductFilter {
            precio: Some(PriceRange {
                min: Price::ZERO,
                max: Price::from_cents(10000),
            }),
            ..Default::default()
        };
        assert!(filter.matches(&product("Barato", 5000, "metal", false)));
        assert!(filter.matches(&product("Justo", 10000, "metal", false)));
        assert!(!filter.matches(&product("Caro", 20000, "metal", false)));
    }

    #[test]
    fn test_price_range_uses_effective_price() {
        let mut discounted = product("Oferta", 20000, "metal", true);
        discounted.precio_actual = Some(Price::from_cents(9000));
        let filter = ProductFilter {
            precio: Some(PriceRange {
                min: Price::ZERO,
                max: Price::from_cents(10000),
            }),
            ..Default::default()
        };
        assert!(filter.matches(&discounted));
    }

    #[test]
    fn test_promotion_only() {
        let filter = ProductFilter {
            solo_promocion: true,
            ..Default::default()
        };
        assert!(filter.matches(&product("Oferta", 9900, "metal", true)));
        assert!(!filter.matches(&product("Normal", 9900, "metal", false)));
    }

    #[test]
    fn test_facets_combine_with_and() {
        let filter = ProductFilter {
            material: "metal".to_string(),
            solo_promocion: true,
            ..Default::default()
        };
        assert!(filter.matches(&product("A", 100, "metal", true)));
        assert!(!filter.matches(&product("B", 100, "metal", false)));
        assert!(!filter.matches(&product("C", 100, "acetato", true)));
    }
}
