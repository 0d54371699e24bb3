//! Final order prices.
//!
//! `final_price = order_price + cost_delivery`, where the delivery cost is
//! summed over the shops an order buys from. Components are rounded before
//! they are added so the identity also holds for the serialized values.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::aggregator::{aggregate, LineRow, OrderSubtotal, PricedLine};
use super::delivery::delivery_cost;
use super::error::PricingError;
use crate::domain::aggregates::{OrderContact, OrderStatus};
use crate::domain::value_objects::{DiscountFactor, Distance, Money, OrderId, ShopId, UserId};

/// Order header as read alongside the pricing rows.
#[derive(Clone, Debug)]
pub struct OrderHeader {
    pub id: OrderId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub contact: Option<OrderContact>,
}

/// Everything pricing needs, read in one snapshot.
#[derive(Clone, Debug)]
pub struct PricingInputs {
    pub user_id: UserId,
    pub discount_factor: i64,
    pub orders: Vec<OrderHeader>,
    pub lines: Vec<LineRow>,
    pub shop_distances: HashMap<ShopId, i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderPricing {
    pub total_quantity: u64,
    pub order_price: Money,
    pub cost_delivery: Money,
    pub final_price: Money,
}

#[derive(Clone, Debug, Serialize)]
pub struct PricedOrder {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub ordered_items: Vec<PricedLine>,
    #[serde(flatten)]
    pub pricing: OrderPricing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<OrderContact>,
}

/// Outcome of pricing one order. Failed orders keep their header so the
/// caller can say which order could not be priced.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum OrderOutcome {
    Priced(PricedOrder),
    Failed {
        id: OrderId,
        created_at: DateTime<Utc>,
        status: OrderStatus,
        error: PricingError,
    },
}

impl OrderOutcome {
    pub fn into_result(self) -> Result<PricedOrder, PricingError> {
        match self {
            Self::Priced(order) => Ok(order),
            Self::Failed { error, .. } => Err(error),
        }
    }
}

/// Totals over every order in a basket view.
#[derive(Clone, Debug, Serialize)]
pub struct BasketSummary {
    pub orders: Vec<PricedOrder>,
    pub total_quantity: u64,
    pub order_price: Money,
    pub cost_delivery: Money,
    pub final_price: Money,
}

#[derive(Clone, Copy, Debug)]
pub struct Composer {
    scale: u32,
}

impl Composer {
    pub fn new(scale: u32) -> Self { Self { scale } }

    /// Prices one aggregated order.
    pub fn price(
        &self,
        subtotal: &OrderSubtotal,
        shop_distances: &HashMap<ShopId, i64>,
        discount: DiscountFactor,
    ) -> Result<OrderPricing, PricingError> {
        let overflow = || PricingError::Overflow { order_id: subtotal.order_id };
        let mut delivery = Money::ZERO;
        for shop in &subtotal.shops {
            let raw = shop_distances.get(&shop.shop_id).copied();
            let distance = raw
                .and_then(|v| Distance::new(v).ok())
                .ok_or(PricingError::InvalidDistance { shop_id: shop.shop_id, value: raw })?;
            let cost = delivery_cost(distance, discount, shop.quantity).ok_or_else(overflow)?;
            delivery = delivery.checked_add(cost).ok_or_else(overflow)?;
        }

        let order_price = subtotal.subtotal.rounded(self.scale);
        let cost_delivery = delivery.rounded(self.scale);
        let final_price = order_price.checked_add(cost_delivery).ok_or_else(overflow)?;
        Ok(OrderPricing { total_quantity: subtotal.total_quantity(), order_price, cost_delivery, final_price })
    }

    /// Prices every order in `inputs`, one outcome per order, in input order.
    pub fn compose(&self, inputs: &PricingInputs) -> Vec<OrderOutcome> {
        let ids: Vec<OrderId> = inputs.orders.iter().map(|o| o.id).collect();
        let subtotals = aggregate(&ids, &inputs.lines);
        let discount = DiscountFactor::new(inputs.discount_factor).map_err(|e| PricingError::InvalidDiscountFactor {
            user_id: inputs.user_id,
            value: e.value,
        });

        inputs
            .orders
            .iter()
            .zip(subtotals)
            .map(|(header, subtotal)| {
                let priced = subtotal.and_then(|sub| {
                    let discount = discount.clone()?;
                    let pricing = self.price(&sub, &inputs.shop_distances, discount)?;
                    Ok((sub.lines, pricing))
                });
                match priced {
                    Ok((ordered_items, pricing)) => OrderOutcome::Priced(PricedOrder {
                        id: header.id,
                        created_at: header.created_at,
                        status: header.status,
                        ordered_items,
                        pricing,
                        contact: header.contact.clone().filter(|_| header.status.shows_contact()),
                    }),
                    Err(error) => {
                        tracing::warn!(order_id = %header.id, %error, "order could not be priced");
                        OrderOutcome::Failed { id: header.id, created_at: header.created_at, status: header.status, error }
                    }
                }
            })
            .collect()
    }

    /// Basket view: every order must price, otherwise the first failure is
    /// returned.
    pub fn summarize(&self, inputs: &PricingInputs) -> Result<BasketSummary, PricingError> {
        let orders = self
            .compose(inputs)
            .into_iter()
            .map(OrderOutcome::into_result)
            .collect::<Result<Vec<_>, _>>()?;

        let zero = Money::ZERO.rounded(self.scale);
        let mut summary = BasketSummary {
            orders: vec![],
            total_quantity: 0,
            order_price: zero,
            cost_delivery: zero,
            final_price: zero,
        };
        for order in &orders {
            let overflow = || PricingError::Overflow { order_id: order.id };
            summary.total_quantity += order.pricing.total_quantity;
            summary.order_price = summary.order_price.checked_add(order.pricing.order_price).ok_or_else(overflow)?;
            summary.cost_delivery = summary.cost_delivery.checked_add(order.pricing.cost_delivery).ok_or_else(overflow)?;
            summary.final_price = summary.final_price.checked_add(order.pricing.final_price).ok_or_else(overflow)?;
        }
        summary.orders = orders;
        Ok(summary)
    }
}
