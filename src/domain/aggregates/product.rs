//! Catalog: products and the per-shop offers they sell.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::value_objects::{CategoryId, ProductId, ProductInfoId, Quantity, ShopId};

/// Row of the product list.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    pub category: String,
}

/// A shop's offer for a product: the row every basket line points at.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ProductInfo {
    pub id: ProductInfoId,
    pub external_id: i64,
    pub model: String,
    pub product_id: ProductId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub price_rrc: Decimal,
}

impl ProductInfo {
    /// Rejects requests for more units than the shop has in stock.
    pub fn reserve(&self, requested: Quantity) -> Result<(), ProductError> {
        check_stock(self.id, self.quantity, i64::from(requested.value()))
    }
}

/// Rejects a basket line total above the offer's stock. A negative stock
/// counts as none.
pub fn check_stock(product_info_id: ProductInfoId, stock: i32, requested: i64) -> Result<(), ProductError> {
    let available = u32::try_from(stock).unwrap_or(0);
    if requested > i64::from(available) {
        return Err(ProductError::InsufficientStock { product_info_id, available, requested });
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ProductParameter {
    pub product_info_id: ProductInfoId,
    pub parameter: String,
    pub value: String,
}

/// Product card: the product plus one shop's offer for it.
#[derive(Clone, Debug, Serialize)]
pub struct ProductCard {
    pub product: ProductSummary,
    pub offer: ProductInfo,
    pub parameters: Vec<ProductParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("offer {product_info_id} has {available} in stock, {requested} requested")]
    InsufficientStock { product_info_id: ProductInfoId, available: u32, requested: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(quantity: i32) -> ProductInfo {
        ProductInfo {
            id: ProductInfoId::new(1),
            external_id: 4216292,
            model: "apple/iphone/xs-max".into(),
            product_id: ProductId::new(1),
            shop_id: ShopId::new(1),
            shop_name: "Svyaznoy".into(),
            quantity,
            price: Decimal::new(110_000, 0),
            price_rrc: Decimal::new(116_990, 0),
        }
    }

    #[test]
    fn test_reserve_within_stock() {
        assert!(offer(14).reserve(Quantity::new(14).unwrap()).is_ok());
    }

    #[test]
    fn test_reserve_beyond_stock() {
        let err = offer(2).reserve(Quantity::new(3).unwrap()).unwrap_err();
        assert_eq!(err, ProductError::InsufficientStock { product_info_id: ProductInfoId::new(1), available: 2, requested: 3 });
    }

    #[test]
    fn test_line_total_checked_against_stock() {
        let id = ProductInfoId::new(1);
        assert!(check_stock(id, 14, 14).is_ok());
        assert!(check_stock(id, 14, 20).is_err());
        // 2 × i32::MAX does not wrap
        assert!(check_stock(id, i32::MAX, 2 * i64::from(i32::MAX)).is_err());
        assert!(check_stock(id, -1, 1).is_err());
    }
}
