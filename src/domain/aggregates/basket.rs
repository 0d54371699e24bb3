//! Basket Aggregate
//!
//! Turns basket requests into a validated list of changes before anything
//! touches storage. Duplicate lines in one request are merged the same way
//! an existing line absorbs a repeated add.

use crate::domain::value_objects::{OrderItemId, ProductInfoId, Quantity};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasketAddition {
    pub product_info_id: ProductInfoId,
    pub quantity: Quantity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasketUpdate {
    pub item_id: OrderItemId,
    pub quantity: Quantity,
}

/// Validates and merges `(product_info, quantity)` pairs.
pub fn plan_additions(items: &[(ProductInfoId, i64)]) -> Result<Vec<BasketAddition>, BasketError> {
    if items.is_empty() { return Err(BasketError::Empty); }
    let mut planned: Vec<BasketAddition> = Vec::with_capacity(items.len());
    for &(product_info_id, raw) in items {
        let quantity = Quantity::new(raw).map_err(|_| BasketError::InvalidQuantity { value: raw })?;
        if let Some(existing) = planned.iter_mut().find(|a| a.product_info_id == product_info_id) {
            existing.quantity = existing.quantity.add(quantity);
        } else {
            planned.push(BasketAddition { product_info_id, quantity });
        }
    }
    Ok(planned)
}

/// Validates `(item, quantity)` pairs; an item may appear only once.
pub fn plan_updates(items: &[(OrderItemId, i64)]) -> Result<Vec<BasketUpdate>, BasketError> {
    if items.is_empty() { return Err(BasketError::Empty); }
    let mut planned: Vec<BasketUpdate> = Vec::with_capacity(items.len());
    for &(item_id, raw) in items {
        let quantity = Quantity::new(raw).map_err(|_| BasketError::InvalidQuantity { value: raw })?;
        if planned.iter().any(|u| u.item_id == item_id) { return Err(BasketError::DuplicateItem(item_id)); }
        planned.push(BasketUpdate { item_id, quantity });
    }
    Ok(planned)
}

/// Deduplicates the ids of lines to remove.
pub fn plan_removals(items: &[OrderItemId]) -> Result<Vec<OrderItemId>, BasketError> {
    if items.is_empty() { return Err(BasketError::Empty); }
    let mut ids = items.to_vec();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasketError {
    #[error("no items given")]
    Empty,
    #[error("quantity must be a positive integer, got {value}")]
    InvalidQuantity { value: i64 },
    #[error("item {0} listed more than once")]
    DuplicateItem(OrderItemId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additions_are_merged() {
        let p1 = ProductInfoId::new(1);
        let p2 = ProductInfoId::new(2);
        let planned = plan_additions(&[(p1, 2), (p2, 1), (p1, 1)]).unwrap();
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].quantity.value(), 3); // Merged
        assert_eq!(planned[1].product_info_id, p2);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(plan_additions(&[(ProductInfoId::new(1), 0)]), Err(BasketError::InvalidQuantity { value: 0 }));
        assert_eq!(plan_updates(&[(OrderItemId::new(1), -3)]), Err(BasketError::InvalidQuantity { value: -3 }));
    }

    #[test]
    fn test_duplicate_update_rejected() {
        let id = OrderItemId::new(9);
        assert_eq!(plan_updates(&[(id, 1), (id, 2)]), Err(BasketError::DuplicateItem(id)));
    }

    #[test]
    fn test_removals_deduplicated() {
        let ids = plan_removals(&[OrderItemId::new(3), OrderItemId::new(1), OrderItemId::new(3)]).unwrap();
        assert_eq!(ids, vec![OrderItemId::new(1), OrderItemId::new(3)]);
        assert_eq!(plan_removals(&[]), Err(BasketError::Empty));
    }
}
