//! Basket aggregation: line subtotals grouped by order and by shop.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::{MissingLine, PricingError};
use crate::domain::value_objects::{Money, OrderId, OrderItemId, ProductInfoId, Quantity, ShopId};

/// One ordered line joined with the current price of its offer.
///
/// `price` is `None` when the offer no longer exists or no longer belongs
/// to the line's shop.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct LineRow {
    pub order_id: OrderId,
    pub order_item_id: OrderItemId,
    pub product_info_id: ProductInfoId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub price: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub id: OrderItemId,
    pub product_info_id: ProductInfoId,
    pub product_name: String,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Units ordered from one shop; the delivery calculator works per shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShopQuantity {
    pub shop_id: ShopId,
    pub quantity: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSubtotal {
    pub order_id: OrderId,
    pub lines: Vec<PricedLine>,
    pub shops: Vec<ShopQuantity>,
    pub subtotal: Money,
}

impl OrderSubtotal {
    pub fn empty(order_id: OrderId) -> Self {
        Self { order_id, lines: vec![], shops: vec![], subtotal: Money::ZERO }
    }

    pub fn total_quantity(&self) -> u64 { self.shops.iter().map(|s| s.quantity).sum() }
}

/// Sums `quantity × unit price` over the lines of one order.
///
/// Every unpriced line is collected before failing so the error names all
/// of them at once.
pub fn aggregate_order<'a, I>(order_id: OrderId, rows: I) -> Result<OrderSubtotal, PricingError>
where
    I: IntoIterator<Item = &'a LineRow>,
{
    let overflow = || PricingError::Overflow { order_id };
    let mut out = OrderSubtotal::empty(order_id);
    let mut per_shop: BTreeMap<ShopId, u64> = BTreeMap::new();
    let mut missing = Vec::new();

    for row in rows {
        let quantity = Quantity::new(row.quantity.into())
            .map_err(|e| PricingError::InvalidQuantity { order_item_id: row.order_item_id, value: e.value })?;
        let Some(price) = row.price else {
            missing.push(MissingLine { order_item_id: row.order_item_id, product_info_id: row.product_info_id, shop_id: row.shop_id });
            continue;
        };
        let unit_price = Money::new(price);
        let subtotal = unit_price.checked_multiply(quantity.value().into()).ok_or_else(overflow)?;
        out.subtotal = out.subtotal.checked_add(subtotal).ok_or_else(overflow)?;
        *per_shop.entry(row.shop_id).or_default() += u64::from(quantity.value());
        out.lines.push(PricedLine {
            id: row.order_item_id,
            product_info_id: row.product_info_id,
            product_name: row.product_name.clone().unwrap_or_default(),
            shop_id: row.shop_id,
            shop_name: row.shop_name.clone(),
            quantity: quantity.value(),
            unit_price,
            subtotal,
        });
    }

    if !missing.is_empty() {
        return Err(PricingError::MissingPriceData { order_id, lines: missing });
    }
    out.shops = per_shop.into_iter().map(|(shop_id, quantity)| ShopQuantity { shop_id, quantity }).collect();
    Ok(out)
}

/// Aggregates every order in `order_ids`, in that order. Orders without
/// rows come out as empty subtotals.
pub fn aggregate(order_ids: &[OrderId], rows: &[LineRow]) -> Vec<Result<OrderSubtotal, PricingError>> {
    let mut by_order: BTreeMap<OrderId, Vec<&LineRow>> = BTreeMap::new();
    for row in rows {
        by_order.entry(row.order_id).or_default().push(row);
    }
    order_ids
        .iter()
        .map(|&id| aggregate_order(id, by_order.remove(&id).unwrap_or_default()))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(order: i64, item: i64, shop: i64, quantity: i32, price: Option<Decimal>) -> LineRow {
        LineRow {
            order_id: OrderId::new(order),
            order_item_id: OrderItemId::new(item),
            product_info_id: ProductInfoId::new(item * 10),
            shop_id: ShopId::new(shop),
            shop_name: format!("shop-{shop}"),
            product_name: price.map(|_| format!("product-{item}")),
            quantity,
            price,
        }
    }

    fn dec(v: i64) -> Option<Decimal> { Some(Decimal::from(v)) }

    #[test]
    fn test_subtotal_is_sum_of_price_times_quantity() {
        let rows = vec![
            row(1, 1, 1, 3, Some(Decimal::new(1999, 2))),
            row(1, 2, 1, 1, dec(110_000)),
            row(1, 3, 2, 2, Some(Decimal::new(5, 1))),
        ];
        let sub = aggregate_order(OrderId::new(1), &rows).unwrap();
        // 3 × 19.99 + 1 × 110000 + 2 × 0.5
        assert_eq!(sub.subtotal.amount(), Decimal::new(11_006_097, 2));
        assert_eq!(sub.lines.len(), 3);
        assert_eq!(sub.lines[0].subtotal.amount(), Decimal::new(5997, 2));
    }

    #[test]
    fn test_quantities_grouped_by_shop() {
        let rows = vec![row(1, 1, 2, 3, dec(10)), row(1, 2, 1, 1, dec(10)), row(1, 3, 2, 4, dec(10))];
        let sub = aggregate_order(OrderId::new(1), &rows).unwrap();
        assert_eq!(
            sub.shops,
            vec![ShopQuantity { shop_id: ShopId::new(1), quantity: 1 }, ShopQuantity { shop_id: ShopId::new(2), quantity: 7 }]
        );
        assert_eq!(sub.total_quantity(), 8);
    }

    #[test]
    fn test_missing_price_fails_whole_order() {
        let rows = vec![row(1, 1, 1, 3, dec(100)), row(1, 2, 1, 1, None), row(1, 3, 2, 1, None)];
        let err = aggregate_order(OrderId::new(1), &rows).unwrap_err();
        match err {
            PricingError::MissingPriceData { order_id, lines } => {
                assert_eq!(order_id, OrderId::new(1));
                let flagged: Vec<_> = lines.iter().map(|l| l.order_item_id).collect();
                assert_eq!(flagged, vec![OrderItemId::new(2), OrderItemId::new(3)]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let rows = vec![row(1, 5, 1, 0, dec(100))];
        assert_eq!(
            aggregate_order(OrderId::new(1), &rows),
            Err(PricingError::InvalidQuantity { order_item_id: OrderItemId::new(5), value: 0 })
        );
    }

    #[test]
    fn test_amount_out_of_range_fails_order() {
        let rows = vec![row(4, 1, 1, 2, Some(Decimal::MAX))];
        assert_eq!(aggregate_order(OrderId::new(4), &rows), Err(PricingError::Overflow { order_id: OrderId::new(4) }));

        let rows = vec![row(4, 1, 1, 1, Some(Decimal::MAX)), row(4, 2, 1, 1, Some(Decimal::MAX))];
        assert_eq!(aggregate_order(OrderId::new(4), &rows), Err(PricingError::Overflow { order_id: OrderId::new(4) }));
    }

    #[test]
    fn test_aggregate_keeps_orders_separate() {
        let rows = vec![row(2, 1, 1, 1, dec(5)), row(1, 2, 1, 2, dec(7)), row(2, 3, 1, 1, None)];
        let ids = [OrderId::new(1), OrderId::new(2), OrderId::new(3)];
        let results = aggregate(&ids, &rows);
        assert_eq!(results[0].as_ref().unwrap().subtotal.amount(), Decimal::from(14));
        assert!(matches!(results[1], Err(PricingError::MissingPriceData { .. })));
        assert_eq!(results[2], Ok(OrderSubtotal::empty(OrderId::new(3))));
    }
}
