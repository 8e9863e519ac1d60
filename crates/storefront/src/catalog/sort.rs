//! Catalog sorting.

use serde::{Deserialize, Serialize};

use crate::api::types::Product;

/// Sort order for the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "nombre")]
    Nombre,
    #[serde(rename = "precio-asc")]
    PrecioAsc,
    #[serde(rename = "precio-desc")]
    PrecioDesc,
    #[serde(rename = "marca")]
    Marca,
}

impl SortKey {
    /// Sort products in place.
    ///
    /// Sorts are stable, and descending price is defined as the exact
    /// reverse of ascending price so equal-priced products flip order
    /// predictably between the two.
    pub fn sort(self, products: &mut [Product]) {
        match self {
            Self::Nombre => products.sort_by(|a, b| a.nombre.cmp(&b.nombre)),
            Self::PrecioAsc => {
                products.sort_by(|a, b| a.effective_price().cmp(&b.effective_price()));
            }
            Self::PrecioDesc => {
                products.sort_by(|a, b| a.effective_price().cmp(&b.effective_price()));
                products.reverse();
            }
            Self::Marca => {
                products.sort_by(|a, b| a.marca_nombre().cmp(b.marca_nombre()));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aurora_core::Price;
    use serde_json::json;

    fn product(nombre: &str, cents: i64) -> Product {
        serde_json::from_value(json!({
            "_id": format!("id-{nombre}"),
            "nombre": nombre,
            "precioBase": 0.0,
            "precioActual": f64::from(u32::try_from(cents).unwrap()) / 100.0
        }))
        .unwrap()
    }

    fn prices(products: &[Product]) -> Vec<Price> {
        products.iter().map(Product::effective_price).collect()
    }

    #[test]
    fn test_precio_asc_orders_by_effective_price() {
        let mut items = vec![product("a", 10000), product("b", 5000), product("c", 20000)];
        SortKey::PrecioAsc.sort(&mut items);
        assert_eq!(
            prices(&items),
            vec![
                Price::from_cents(5000),
                Price::from_cents(10000),
                Price::from_cents(20000)
            ]
        );
    }

    #[test]
    fn test_precio_desc_is_exact_reverse_of_asc() {
        let mut asc = vec![
            product("a", 10000),
            product("b", 5000),
            product("c", 10000),
            product("d", 20000),
        ];
        let mut desc = asc.clone();

        SortKey::PrecioAsc.sort(&mut asc);
        SortKey::PrecioDesc.sort(&mut desc);

        asc.reverse();
        let asc_names: Vec<&str> = asc.iter().map(|p| p.nombre.as_str()).collect();
        let desc_names: Vec<&str> = desc.iter().map(|p| p.nombre.as_str()).collect();
        assert_eq!(asc_names, desc_names);
    }

    #[test]
    fn test_nombre_sorts_alphabetically() {
        let mut items = vec![product("zafiro", 1), product("aviador", 2), product("metro", 3)];
        SortKey::Nombre.sort(&mut items);
        let names: Vec<&str> = items.iter().map(|p| p.nombre.as_str()).collect();
        assert_eq!(names, vec!["aviador", "metro", "zafiro"]);
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(
            serde_json::to_string(&SortKey::PrecioAsc).unwrap(),
            "\"precio-asc\""
        );
        let key: SortKey = serde_json::from_str("\"precio-desc\"").unwrap();
        assert_eq!(key, SortKey::PrecioDesc);
    }
}
