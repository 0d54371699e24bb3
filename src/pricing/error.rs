use serde::Serialize;
use thiserror::Error;

use crate::domain::value_objects::{OrderId, OrderItemId, ProductInfoId, ShopId, UserId};

/// A basket line whose offer could not be priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingLine {
    pub order_item_id: OrderItemId,
    pub product_info_id: ProductInfoId,
    pub shop_id: ShopId,
}

/// Data-integrity failures while deriving prices.
///
/// Any of these aborts pricing of the affected order; no partial totals are
/// ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingError {
    #[error("order {order_id}: no current price for {} line(s)", lines.len())]
    MissingPriceData { order_id: OrderId, lines: Vec<MissingLine> },

    #[error("shop {shop_id}: invalid delivery distance {value:?}")]
    InvalidDistance { shop_id: ShopId, value: Option<i64> },

    #[error("user {user_id}: invalid discount factor {value}")]
    InvalidDiscountFactor { user_id: UserId, value: i64 },

    #[error("order item {order_item_id}: invalid quantity {value}")]
    InvalidQuantity { order_item_id: OrderItemId, value: i64 },

    #[error("order {order_id}: amount out of range")]
    Overflow { order_id: OrderId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_payload() {
        let err = PricingError::MissingPriceData {
            order_id: OrderId::new(3),
            lines: vec![MissingLine {
                order_item_id: OrderItemId::new(10),
                product_info_id: ProductInfoId::new(44),
                shop_id: ShopId::new(2),
            }],
        };
        assert_eq!(err.to_string(), "order 3: no current price for 1 line(s)");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "missing_price_data");
        assert_eq!(json["lines"][0]["product_info_id"], 44);
    }
}
