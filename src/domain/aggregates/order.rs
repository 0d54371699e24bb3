//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{OrderId, UserId};

/// Lifecycle of an order.
///
/// ```text
/// basket -> new -> confirmed -> assembled -> sent -> delivered
///    \-------\---------\------------\---------\--> canceled
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Basket,
    New,
    Confirmed,
    Assembled,
    Sent,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        Self::Basket, Self::New, Self::Confirmed, Self::Assembled, Self::Sent, Self::Delivered, Self::Canceled,
    ];

    /// Every status an order can hold once it has left the basket.
    pub const PLACED: [OrderStatus; 6] = [
        Self::New, Self::Confirmed, Self::Assembled, Self::Sent, Self::Delivered, Self::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basket => "basket",
            Self::New => "new",
            Self::Confirmed => "confirmed",
            Self::Assembled => "assembled",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        }
    }

    /// Only the active basket accepts line item changes.
    pub fn is_mutable(&self) -> bool { *self == Self::Basket }

    /// Orders past confirmation expose the contact captured at placement.
    pub fn shows_contact(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Assembled | Self::Sent | Self::Delivered)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Basket, New)
                | (New, Confirmed)
                | (Confirmed, Assembled)
                | (Assembled, Sent)
                | (Sent, Delivered)
                | (Basket | New | Confirmed | Assembled | Sent, Canceled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

/// Order header. Line items and prices live elsewhere: items are rows of
/// their own and prices are always derived at read time.
#[derive(Clone, Debug)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl Order {
    pub fn restore(id: OrderId, user_id: UserId, status: OrderStatus, created_at: DateTime<Utc>) -> Self {
        Self { id, user_id, status, created_at, events: vec![] }
    }

    pub fn id(&self) -> OrderId { self.id }
    pub fn user_id(&self) -> UserId { self.user_id }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    /// Customer checkout: the basket becomes a new order.
    pub fn place(&mut self, item_count: usize) -> Result<(), OrderError> {
        if item_count == 0 { return Err(OrderError::NoItems); }
        self.transition(OrderStatus::New)?;
        self.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: self.id, user_id: self.user_id }));
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Delivered { return Err(OrderError::CannotCancel); }
        self.transition(OrderStatus::Canceled)
    }

    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition { from: self.status, to: next });
        }
        let from = self.status;
        self.status = next;
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id, from, to: next }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,
    #[error("delivered orders cannot be canceled")]
    CannotCancel,
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basket() -> Order { Order::restore(OrderId::new(1), UserId::new(7), OrderStatus::Basket, Utc::now()) }

    #[test]
    fn test_order_workflow() {
        let mut order = basket();
        order.place(2).unwrap();
        assert_eq!(order.status(), OrderStatus::New);
        for next in [OrderStatus::Confirmed, OrderStatus::Assembled, OrderStatus::Sent, OrderStatus::Delivered] {
            order.transition(next).unwrap();
        }
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(order.cancel(), Err(OrderError::CannotCancel));
    }

    #[test]
    fn test_empty_basket_cannot_be_placed() {
        assert_eq!(basket().place(0), Err(OrderError::NoItems));
    }

    #[test]
    fn test_no_skipping_states() {
        let mut order = basket();
        let err = order.transition(OrderStatus::Sent).unwrap_err();
        assert_eq!(err, OrderError::InvalidTransition { from: OrderStatus::Basket, to: OrderStatus::Sent });
        assert_eq!(order.status(), OrderStatus::Basket);
    }

    #[test]
    fn test_cancel_from_any_pre_delivered_state() {
        for status in [OrderStatus::Basket, OrderStatus::New, OrderStatus::Confirmed, OrderStatus::Assembled, OrderStatus::Sent] {
            assert!(status.can_transition_to(OrderStatus::Canceled), "{status}");
        }
        assert!(!OrderStatus::Canceled.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Canceled));
    }

    #[test]
    fn test_place_raises_events() {
        let mut order = basket();
        order.place(1).unwrap();
        let events = order.take_events();
        assert_eq!(events.len(), 2);
        assert!(order.take_events().is_empty());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
